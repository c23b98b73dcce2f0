use serde::{Deserialize, Serialize};

/// Per-service health state as reported by the monitoring backend.
///
/// The backend encodes state as an integer: 0 down, 1 up, 2 pending,
/// 3 maintenance. Any other integer is kept verbatim in `Unknown` so the
/// worst-state scan can compare raw codes exactly as they arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Down,
    Up,
    Pending,
    Maintenance,
    Unknown(i64),
}

impl Severity {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Severity::Down,
            1 => Severity::Up,
            2 => Severity::Pending,
            3 => Severity::Maintenance,
            other => Severity::Unknown(other),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Severity::Down => 0,
            Severity::Up => 1,
            Severity::Pending => 2,
            Severity::Maintenance => 3,
            Severity::Unknown(code) => code,
        }
    }

    /// Lower code means worse among the known states. `Unknown` never
    /// outranks anything, whatever its raw code.
    pub fn is_worse_than(self, other: Severity) -> bool {
        match (self, other) {
            (Severity::Unknown(_), _) => false,
            (_, Severity::Unknown(_)) => true,
            _ => self.code() < other.code(),
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Severity::Up => "🟢",
            Severity::Down => "🔴",
            Severity::Pending => "🟡",
            Severity::Maintenance => "🔵",
            Severity::Unknown(_) => "⚪",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_map_to_variants() {
        assert_eq!(Severity::from_code(0), Severity::Down);
        assert_eq!(Severity::from_code(1), Severity::Up);
        assert_eq!(Severity::from_code(2), Severity::Pending);
        assert_eq!(Severity::from_code(3), Severity::Maintenance);
        assert_eq!(Severity::from_code(7), Severity::Unknown(7));
        assert_eq!(Severity::Unknown(-4).code(), -4);
    }

    #[test]
    fn test_worse_ordering_follows_codes() {
        assert!(Severity::Down.is_worse_than(Severity::Up));
        assert!(!Severity::Pending.is_worse_than(Severity::Up));
        assert!(!Severity::Unknown(9).is_worse_than(Severity::Down));
        assert!(!Severity::Unknown(-1).is_worse_than(Severity::Down));
        assert!(Severity::Down.is_worse_than(Severity::Unknown(-1)));
    }
}

//! Parser for the Prometheus-style text exposition served by Uptime Kuma.
//!
//! Only `monitor_status` samples are kept. Lines of any other shape or
//! metric family are skipped silently; recognised samples that cannot be
//! decoded are skipped and reported as [`LineIssue`]s.

use thiserror::Error;
use tracing::warn;

use crate::severity::Severity;
use crate::status::{ServiceStatus, ServiceStatuses};

pub const MONITOR_STATUS_METRIC: &str = "monitor_status";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelKey {
    Name,
    Kind,
    Url,
    Hostname,
    Port,
}

const LABEL_KEYS: &[(&str, LabelKey)] = &[
    ("monitor_name", LabelKey::Name),
    ("monitor_type", LabelKey::Kind),
    ("monitor_url", LabelKey::Url),
    ("monitor_hostname", LabelKey::Hostname),
    ("monitor_port", LabelKey::Port),
];

fn label_key(raw: &str) -> Option<LabelKey> {
    LABEL_KEYS
        .iter()
        .find(|(name, _)| *name == raw)
        .map(|(_, key)| *key)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty metrics data")]
    Empty,
    #[error("no valid metrics found")]
    NoValidMetrics,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineIssueKind {
    InvalidValue(String),
    EmptyLabels,
    MissingMonitorName,
}

/// A `monitor_status` line that was skipped. `line` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIssue {
    pub line: usize,
    pub kind: LineIssueKind,
}

impl std::fmt::Display for LineIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            LineIssueKind::InvalidValue(value) => {
                write!(f, "line {}: status value {value:?} is not an integer", self.line)
            }
            LineIssueKind::EmptyLabels => write!(f, "line {}: empty label string", self.line),
            LineIssueKind::MissingMonitorName => {
                write!(f, "line {}: no monitor_name label found", self.line)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseReport {
    pub statuses: ServiceStatuses,
    pub issues: Vec<LineIssue>,
}

/// Parses exposition text, logging each skipped sample at `warn`.
pub fn parse_metrics(text: &str) -> Result<ServiceStatuses, ParseError> {
    let report = parse_report(text)?;
    for issue in &report.issues {
        warn!("Skipping metrics sample: {}", issue);
    }
    Ok(report.statuses)
}

/// Parses exposition text and returns the skipped samples alongside the result.
pub fn parse_report(text: &str) -> Result<ParseReport, ParseError> {
    if text.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut report = ParseReport::default();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((metric, labels, value)) = split_sample(line) else {
            continue;
        };
        if metric != MONITOR_STATUS_METRIC {
            continue;
        }

        let number = index + 1;
        let code = match value.parse::<i64>() {
            Ok(code) => code,
            Err(_) => {
                report.issues.push(LineIssue {
                    line: number,
                    kind: LineIssueKind::InvalidValue(value.to_string()),
                });
                continue;
            }
        };

        match parse_labels(labels, Severity::from_code(code)) {
            Ok((name, status)) => {
                report.statuses.insert(name, status);
            }
            Err(kind) => report.issues.push(LineIssue { line: number, kind }),
        }
    }

    if report.statuses.is_empty() {
        return Err(ParseError::NoValidMetrics);
    }
    Ok(report)
}

/// Splits `name{labels} value` into its three parts.
fn split_sample(line: &str) -> Option<(&str, &str, &str)> {
    let (metric, rest) = line.split_once('{')?;
    let (labels, value) = rest.split_once('}')?;
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some((metric.trim(), labels, value))
}

fn parse_labels(labels: &str, severity: Severity) -> Result<(String, ServiceStatus), LineIssueKind> {
    if labels.is_empty() {
        return Err(LineIssueKind::EmptyLabels);
    }

    let mut name = String::new();
    let mut status = ServiceStatus::new(severity);
    for pair in labels.split(',') {
        let Some((key, value)) = pair.trim().split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').to_string();
        match label_key(key.trim()) {
            Some(LabelKey::Name) => name = value,
            Some(LabelKey::Kind) => status.kind = value,
            Some(LabelKey::Url) => status.url = value,
            Some(LabelKey::Hostname) => status.hostname = value,
            Some(LabelKey::Port) => status.port = value,
            None => {}
        }
    }

    if name.is_empty() {
        return Err(LineIssueKind::MissingMonitorName);
    }
    Ok((name, status))
}

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::severity::Severity;

/// One monitor as described by a `monitor_status` sample.
///
/// Label values are kept as sent. The backend writes `"https://"` for an
/// absent URL and `"null"` for an absent host or port; rendering filters
/// those, the parser does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub severity: Severity,
    pub kind: String,
    pub url: String,
    pub hostname: String,
    pub port: String,
}

impl ServiceStatus {
    pub fn new(severity: Severity) -> Self {
        Self {
            severity,
            kind: String::new(),
            url: String::new(),
            hostname: String::new(),
            port: String::new(),
        }
    }
}

/// Monitor name to status, rebuilt from scratch on every poll.
pub type ServiceStatuses = HashMap<String, ServiceStatus>;

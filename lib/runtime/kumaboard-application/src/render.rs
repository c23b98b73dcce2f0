use chrono::{DateTime, Utc};

use kumaboard_domain::render::STATUS_TITLE;
use kumaboard_domain::{EmbedColor, RenderField, RenderPayload, ServiceStatus, ViewMode};

use crate::aggregate::StatusView;

/// Placeholder the backend sends when a monitor has no URL.
const EMPTY_URL: &str = "https://";
/// Placeholder the backend sends when a monitor has no host or port.
const NULL_LABEL: &str = "null";

pub fn build_payload(view: &StatusView, mode: ViewMode, timestamp: DateTime<Utc>) -> RenderPayload {
    let mut fields = Vec::new();
    for section in &view.sections {
        fields.push(RenderField::header(section.name.clone()));
        for row in &section.rows {
            let body = match mode {
                ViewMode::Minimal => String::new(),
                ViewMode::Detailed => detail_body(&row.status),
            };
            fields.push(RenderField {
                name: format!("{} {}", row.status.severity.glyph(), row.label),
                body,
            });
        }
    }

    RenderPayload {
        title: STATUS_TITLE.to_string(),
        color: EmbedColor::for_worst(view.worst),
        timestamp,
        fields,
    }
}

fn detail_body(status: &ServiceStatus) -> String {
    let mut body = format!("type: {}", status.kind);
    if status.url != EMPTY_URL {
        body.push_str(&format!("\nurl: {}", status.url));
    }
    if status.hostname != NULL_LABEL {
        body.push_str(&format!("\nhost: {}", status.hostname));
    }
    if status.port != NULL_LABEL {
        body.push_str(&format!("\nport: {}", status.port));
    }
    body
}

use tracing::warn;

use kumaboard_domain::{Catalog, ServiceStatus, ServiceStatuses, Severity};

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRow {
    pub label: String,
    pub status: ServiceStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionView {
    pub name: String,
    pub rows: Vec<ServiceRow>,
}

/// Catalog joined with one poll's statuses, in catalog order.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusView {
    pub worst: Severity,
    pub sections: Vec<SectionView>,
    /// Catalog names that had no sample in this poll.
    pub missing: Vec<String>,
}

pub fn aggregate(catalog: &Catalog, statuses: &ServiceStatuses) -> StatusView {
    let mut worst = Severity::Up;
    let mut missing = Vec::new();
    let sections = catalog
        .sections
        .iter()
        .map(|section| {
            let rows = section
                .services
                .iter()
                .filter_map(|service| {
                    let Some(status) = statuses.get(&service.name) else {
                        warn!(service = %service.name, "Service not found in metrics");
                        missing.push(service.name.clone());
                        return None;
                    };
                    if status.severity.is_worse_than(worst) {
                        worst = status.severity;
                    }
                    Some(ServiceRow {
                        label: service.label().to_string(),
                        status: status.clone(),
                    })
                })
                .collect();
            SectionView {
                name: section.name.clone(),
                rows,
            }
        })
        .collect();

    StatusView {
        worst,
        sections,
        missing,
    }
}

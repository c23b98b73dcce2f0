//! Create / update / retire transitions for posted status summaries.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use kumaboard_domain::{Catalog, RenderPayload, ViewMode, parse_metrics};
use kumaboard_ports::PortSet;

use crate::aggregate::{StatusView, aggregate};
use crate::error::ReconcileError;
use crate::render::build_payload;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// No summary existed for the destination.
    Created { message_id: String },
    /// The registered summary was edited in place.
    Updated { message_id: String },
    /// The registered summary was gone upstream and has been replaced.
    Recreated {
        stale_message_id: String,
        message_id: String,
    },
}

impl RequestOutcome {
    pub fn message_id(&self) -> &str {
        match self {
            RequestOutcome::Created { message_id }
            | RequestOutcome::Updated { message_id }
            | RequestOutcome::Recreated { message_id, .. } => message_id,
        }
    }

    pub fn reply(&self) -> &'static str {
        match self {
            RequestOutcome::Updated { .. } => "Status message has been updated.",
            RequestOutcome::Created { .. } | RequestOutcome::Recreated { .. } => {
                "Status message has been posted."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub updated: usize,
    pub removed: usize,
    pub failed: usize,
    /// Entries left untouched because metrics could not be fetched.
    pub skipped: usize,
}

/// Keeps one status summary per registered destination in sync with the
/// monitoring backend.
///
/// The registry serializes its own operations; no lock is held across
/// delivery calls, so a request and a scheduled tick may interleave. Any
/// resulting drift is corrected by the next tick.
pub struct StatusReconciler {
    ports: PortSet,
    catalog: Catalog,
}

impl StatusReconciler {
    pub fn new(ports: PortSet, catalog: Catalog) -> Self {
        Self { ports, catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    async fn snapshot(&self) -> Result<StatusView, ReconcileError> {
        let text = self
            .ports
            .metrics
            .fetch()
            .await
            .map_err(ReconcileError::Metrics)?;
        let statuses = parse_metrics(&text)?;
        Ok(aggregate(&self.catalog, &statuses))
    }

    /// Builds the payload a destination would receive, without delivering it.
    pub async fn preview(&self, view_mode: ViewMode) -> Result<RenderPayload, ReconcileError> {
        let view = self.snapshot().await?;
        Ok(build_payload(&view, view_mode, Utc::now()))
    }

    /// Posts or refreshes the summary for `destination_id` on user request.
    ///
    /// Fails closed: if metrics cannot be fetched nothing is delivered and
    /// the registry is left alone.
    pub async fn handle_request(
        &self,
        destination_id: &str,
        view_mode: ViewMode,
    ) -> Result<RequestOutcome, ReconcileError> {
        let payload = self.preview(view_mode).await?;
        let registry = &self.ports.registry;
        let delivery = &self.ports.delivery;

        let mut stale_message_id = None;
        let existing = registry
            .find(destination_id)
            .await
            .map_err(ReconcileError::Registry)?;
        if let Some(entry) = existing {
            if delivery
                .confirm_exists(destination_id, &entry.message_id)
                .await?
            {
                match delivery
                    .update(destination_id, &entry.message_id, &payload)
                    .await
                {
                    Ok(()) => {
                        registry
                            .upsert(destination_id, &entry.message_id, view_mode)
                            .await
                            .map_err(ReconcileError::Registry)?;
                        info!(
                            destination = %destination_id,
                            message_id = %entry.message_id,
                            view = %view_mode,
                            "Status message updated"
                        );
                        return Ok(RequestOutcome::Updated {
                            message_id: entry.message_id,
                        });
                    }
                    Err(err) if err.is_not_found() => {
                        warn!(destination = %destination_id, "Status message vanished during update");
                    }
                    Err(err) => return Err(err.into()),
                }
            } else {
                info!(
                    destination = %destination_id,
                    message_id = %entry.message_id,
                    "Status message no longer exists"
                );
            }
            registry
                .remove(&entry.message_id, destination_id)
                .await
                .map_err(ReconcileError::Registry)?;
            stale_message_id = Some(entry.message_id);
        }

        let message_id = delivery.create(destination_id, &payload).await?;
        registry
            .upsert(destination_id, &message_id, view_mode)
            .await
            .map_err(ReconcileError::Registry)?;
        info!(
            destination = %destination_id,
            message_id = %message_id,
            view = %view_mode,
            "Status message posted"
        );

        Ok(match stale_message_id {
            Some(stale_message_id) => RequestOutcome::Recreated {
                stale_message_id,
                message_id,
            },
            None => RequestOutcome::Created { message_id },
        })
    }

    /// One scheduled refresh of every registered destination.
    ///
    /// Metrics are fetched once and shared. Destinations whose message is
    /// gone are dropped from the registry; other failures wait for the next tick.
    pub async fn tick(&self) -> TickReport {
        let mut report = TickReport::default();
        let entries = match self.ports.registry.list_all().await {
            Ok(entries) => entries,
            Err(err) => {
                error!("Failed to get status entries: {err:#}");
                return report;
            }
        };
        if entries.is_empty() {
            return report;
        }

        let view = match self.snapshot().await {
            Ok(view) => view,
            Err(err) => {
                warn!("Skipping status refresh: {err}");
                report.skipped = entries.len();
                return report;
            }
        };

        let now = Utc::now();
        let mut payloads: HashMap<ViewMode, RenderPayload> = HashMap::new();
        for entry in entries {
            let payload = payloads
                .entry(entry.view_mode)
                .or_insert_with(|| build_payload(&view, entry.view_mode, now));
            match self
                .ports
                .delivery
                .update(&entry.destination_id, &entry.message_id, payload)
                .await
            {
                Ok(()) => {
                    debug!(destination = %entry.destination_id, "Status message refreshed");
                    report.updated += 1;
                }
                Err(err) if err.is_not_found() => {
                    info!(
                        destination = %entry.destination_id,
                        message_id = %entry.message_id,
                        "Status message is gone, removing registry entry"
                    );
                    match self
                        .ports
                        .registry
                        .remove(&entry.message_id, &entry.destination_id)
                        .await
                    {
                        Ok(()) => report.removed += 1,
                        Err(err) => {
                            error!(
                                destination = %entry.destination_id,
                                "Failed to delete status entry: {err:#}"
                            );
                            report.failed += 1;
                        }
                    }
                }
                Err(err) => {
                    warn!(
                        destination = %entry.destination_id,
                        "Failed to update status message: {err}"
                    );
                    report.failed += 1;
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{FakeDelivery, StaticMetrics, UpdateFailure, core_catalog};
    use kumaboard_domain::{EmbedColor, RegistryEntry};
    use kumaboard_ports::{InMemoryRegistry, RegistryPort};

    const UP_A: &str = "monitor_status{monitor_name=\"A\",monitor_type=\"http\"} 1\n";
    const DOWN_A: &str = "monitor_status{monitor_name=\"A\",monitor_type=\"http\"} 0\n";

    struct Harness {
        metrics: Arc<StaticMetrics>,
        delivery: Arc<FakeDelivery>,
        registry: Arc<InMemoryRegistry>,
        reconciler: StatusReconciler,
    }

    fn harness(text: &str) -> Harness {
        let metrics = Arc::new(StaticMetrics::new(text));
        let delivery = Arc::new(FakeDelivery::default());
        let registry = Arc::new(InMemoryRegistry::new());
        let ports = PortSet {
            metrics: metrics.clone(),
            delivery: delivery.clone(),
            registry: registry.clone(),
        };
        Harness {
            metrics,
            delivery,
            registry,
            reconciler: StatusReconciler::new(ports, core_catalog()),
        }
    }

    #[tokio::test]
    async fn test_first_request_creates_and_registers() {
        let h = harness(UP_A);
        let outcome = h.reconciler.handle_request("chan", ViewMode::Minimal).await.unwrap();

        assert_eq!(outcome, RequestOutcome::Created { message_id: "m1".into() });
        assert_eq!(outcome.reply(), "Status message has been posted.");
        assert_eq!(
            h.registry.list_all().await.unwrap(),
            vec![RegistryEntry::new("chan", "m1", ViewMode::Minimal)]
        );
        let payload = h.delivery.payload("chan", "m1").unwrap();
        assert_eq!(payload.fields.len(), 2);
        assert_eq!(payload.color, EmbedColor::Green);
    }

    #[tokio::test]
    async fn test_second_request_updates_view_mode_in_place() {
        let h = harness(UP_A);
        h.reconciler.handle_request("chan", ViewMode::Minimal).await.unwrap();
        let outcome = h.reconciler.handle_request("chan", ViewMode::Detailed).await.unwrap();

        assert_eq!(outcome, RequestOutcome::Updated { message_id: "m1".into() });
        assert_eq!(
            h.registry.list_all().await.unwrap(),
            vec![RegistryEntry::new("chan", "m1", ViewMode::Detailed)]
        );
        assert_eq!(h.delivery.payload("chan", "m1").unwrap().fields[1].body, "type: http");
        assert_eq!(h.delivery.created(), 1);
    }

    #[tokio::test]
    async fn test_deleted_message_is_recreated() {
        let h = harness(UP_A);
        h.reconciler.handle_request("chan", ViewMode::Minimal).await.unwrap();
        h.delivery.delete("chan", "m1");

        let outcome = h.reconciler.handle_request("chan", ViewMode::Minimal).await.unwrap();
        assert_eq!(
            outcome,
            RequestOutcome::Recreated {
                stale_message_id: "m1".into(),
                message_id: "m2".into(),
            }
        );
        assert_eq!(
            h.registry.list_all().await.unwrap(),
            vec![RegistryEntry::new("chan", "m2", ViewMode::Minimal)]
        );
    }

    #[tokio::test]
    async fn test_message_vanishing_during_update_is_recreated() {
        let h = harness(UP_A);
        h.reconciler.handle_request("chan", ViewMode::Minimal).await.unwrap();
        h.delivery.fail_updates(UpdateFailure::NotFound);

        let outcome = h.reconciler.handle_request("chan", ViewMode::Detailed).await.unwrap();
        assert_eq!(
            outcome,
            RequestOutcome::Recreated {
                stale_message_id: "m1".into(),
                message_id: "m2".into(),
            }
        );
        assert_eq!(
            h.registry.list_all().await.unwrap(),
            vec![RegistryEntry::new("chan", "m2", ViewMode::Detailed)]
        );
        assert_eq!(h.delivery.created(), 2);
    }

    #[tokio::test]
    async fn test_request_fails_closed_on_fetch_error() {
        let h = harness(UP_A);
        h.metrics.fail();

        let err = h.reconciler.handle_request("chan", ViewMode::Minimal).await.unwrap_err();
        assert!(matches!(err, ReconcileError::Metrics(_)));
        assert_eq!(err.reply(), "Failed to fetch service statuses.");
        assert_eq!(h.delivery.created(), 0);
        assert!(h.registry.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_request_fails_on_unparseable_metrics() {
        let h = harness("# nothing here\n");
        let err = h.reconciler.handle_request("chan", ViewMode::Minimal).await.unwrap_err();
        assert!(matches!(err, ReconcileError::Parse(_)));
        assert_eq!(h.delivery.created(), 0);
    }

    #[tokio::test]
    async fn test_update_failure_keeps_entry_and_surfaces() {
        let h = harness(UP_A);
        h.reconciler.handle_request("chan", ViewMode::Minimal).await.unwrap();
        h.delivery.fail_updates(UpdateFailure::Other);

        let err = h.reconciler.handle_request("chan", ViewMode::Detailed).await.unwrap_err();
        assert!(matches!(err, ReconcileError::Delivery(_)));
        assert_eq!(
            h.registry.list_all().await.unwrap(),
            vec![RegistryEntry::new("chan", "m1", ViewMode::Minimal)]
        );
    }

    #[tokio::test]
    async fn test_tick_refreshes_each_entry_with_its_view() {
        let h = harness(UP_A);
        h.reconciler.handle_request("one", ViewMode::Minimal).await.unwrap();
        h.reconciler.handle_request("two", ViewMode::Detailed).await.unwrap();
        h.metrics.set(DOWN_A);
        let fetches = h.metrics.fetches();

        let report = h.reconciler.tick().await;
        assert_eq!(report, TickReport { updated: 2, ..Default::default() });
        assert_eq!(h.metrics.fetches(), fetches + 1);

        let one = h.delivery.payload("one", "m1").unwrap();
        let two = h.delivery.payload("two", "m2").unwrap();
        assert_eq!(one.color, EmbedColor::Red);
        assert_eq!(one.fields[1].body, "");
        assert_eq!(two.fields[1].body, "type: http");
    }

    #[tokio::test]
    async fn test_tick_removes_entries_whose_message_is_gone() {
        let h = harness(UP_A);
        h.reconciler.handle_request("one", ViewMode::Minimal).await.unwrap();
        h.reconciler.handle_request("two", ViewMode::Minimal).await.unwrap();
        h.delivery.delete("one", "m1");

        let report = h.reconciler.tick().await;
        assert_eq!(report, TickReport { updated: 1, removed: 1, ..Default::default() });
        assert_eq!(
            h.registry.list_all().await.unwrap(),
            vec![RegistryEntry::new("two", "m2", ViewMode::Minimal)]
        );
    }

    #[tokio::test]
    async fn test_tick_keeps_entries_on_other_failures() {
        let h = harness(UP_A);
        h.reconciler.handle_request("one", ViewMode::Minimal).await.unwrap();
        h.delivery.fail_updates(UpdateFailure::Other);

        let report = h.reconciler.tick().await;
        assert_eq!(report, TickReport { failed: 1, ..Default::default() });
        assert_eq!(h.registry.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_tick_skips_cycle_when_fetch_fails() {
        let h = harness(UP_A);
        h.reconciler.handle_request("one", ViewMode::Minimal).await.unwrap();
        h.metrics.fail();

        let report = h.reconciler.tick().await;
        assert_eq!(report, TickReport { skipped: 1, ..Default::default() });
        assert_eq!(h.delivery.updates(), 0);
        assert_eq!(h.registry.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_tick_with_empty_registry_does_not_fetch() {
        let h = harness(UP_A);
        assert_eq!(h.reconciler.tick().await, TickReport::default());
        assert_eq!(h.metrics.fetches(), 0);
    }
}

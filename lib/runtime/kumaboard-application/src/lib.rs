//! Status aggregation, rendering, and per-destination reconciliation.

pub mod aggregate;
pub mod error;
pub mod reconcile;
pub mod render;
pub mod scheduler;

pub use aggregate::{SectionView, ServiceRow, StatusView, aggregate};
pub use error::ReconcileError;
pub use reconcile::{RequestOutcome, StatusReconciler, TickReport};
pub use render::build_payload;
pub use scheduler::RefreshScheduler;

#[cfg(test)]
mod testing;

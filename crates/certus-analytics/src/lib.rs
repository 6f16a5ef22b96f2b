//! Certus Analytics
//!
//! Stateless batch compliance computation over the identity registry:
//! per-user projections, aggregate reports keyed by an operation tag, and
//! renewal-candidate classification. Delivery of renewal alerts is an
//! external collaborator behind the [`RenewalNotifier`] seam.

pub mod engine;
pub mod error;
pub mod projection;
pub mod renewal;

pub use engine::{AnalyticsEngine, BatchOperation, BatchQuery, BatchReport, MAX_BATCH_USERS};
pub use error::AnalyticsError;
pub use projection::{UserCompliance, RENEWAL_WINDOW};
pub use renewal::{NoopNotifier, RenewalNotifier};

use crate::projection::UserCompliance;

/// Delivery seam for renewal alerts.
///
/// The engine calls this once per renewal candidate when running a
/// renewal-alert batch; wiring it to an actual notification channel is the
/// host's concern.
pub trait RenewalNotifier: Send + Sync {
    /// Called for a user whose verification is expired or about to expire.
    fn renewal_due(&self, status: &UserCompliance);
}

/// Default notifier that drops alerts on the floor.
pub struct NoopNotifier;

impl RenewalNotifier for NoopNotifier {
    fn renewal_due(&self, status: &UserCompliance) {
        tracing::trace!(user = %status.user, "renewal alert discarded (no notifier configured)");
    }
}

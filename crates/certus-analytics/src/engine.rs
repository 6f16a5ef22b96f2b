//! Batch compliance computation over the identity registry.

use serde::Serialize;
use std::sync::Arc;

use certus_core::{AccountId, Height, KycLevel};
use certus_registry::KycRegistry;

use crate::error::AnalyticsError;
use crate::projection::UserCompliance;
use crate::renewal::{NoopNotifier, RenewalNotifier};

/// Upper bound on the number of users in one batch.
pub const MAX_BATCH_USERS: usize = 10;

/// Upper bound on the operation tag length in bytes.
pub const MAX_OPERATION_TAG_BYTES: usize = 20;

/// Behavior variants keyed by the free-form operation tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOperation {
    /// Fire the renewal notifier for every renewal candidate.
    RenewalAlert,
    /// Attach the full per-user projection list to the report.
    ComplianceCheck,
    /// Aggregate counts only.
    Summary,
}

impl BatchOperation {
    /// Map a tag to its variant. Unrecognized tags fall back to the basic
    /// summary.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "RENEWAL_ALERT" => Self::RenewalAlert,
            "COMPLIANCE_CHECK" => Self::ComplianceCheck,
            _ => Self::Summary,
        }
    }
}

/// Inputs to a batch analytics run.
#[derive(Debug, Clone)]
pub struct BatchQuery {
    /// Users to evaluate, at most [`MAX_BATCH_USERS`].
    pub users: Vec<AccountId>,
    /// Free-form operation tag, at most [`MAX_OPERATION_TAG_BYTES`] bytes.
    pub operation: String,
    /// Numeric tier echoed in the report; must parse as a valid level.
    pub min_level: u8,
    /// Accepted for call compatibility. Detailed results always include
    /// expired rows.
    pub include_expired: bool,
}

/// Aggregate result of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Size of the input list, unregistered users included.
    pub total_processed: usize,
    /// Rows that are active, verified, and unexpired.
    pub valid_count: usize,
    /// Rows that are expired or inside the renewal window.
    pub expired_count: usize,
    /// `floor(valid_count * 100 / total_processed)`, zero for an empty batch.
    pub compliance_rate: u64,
    /// The tag the caller supplied, echoed back.
    pub operation: String,
    /// Height at which the batch ran.
    pub processed_at: Height,
    /// The requested minimum tier, echoed back.
    pub min_level_required: KycLevel,
    /// Full projection list for compliance checks, empty otherwise.
    pub detailed_results: Vec<UserCompliance>,
}

/// Batch analytics over a [`KycRegistry`].
///
/// Stateless apart from the registry handle and the notifier seam; every run
/// reads the registry at the current height.
pub struct AnalyticsEngine {
    registry: Arc<KycRegistry>,
    notifier: Arc<dyn RenewalNotifier>,
}

impl AnalyticsEngine {
    /// Engine with the default no-op notifier.
    pub fn new(registry: Arc<KycRegistry>) -> Self {
        Self::with_notifier(registry, Arc::new(NoopNotifier))
    }

    /// Engine with a custom renewal notifier.
    pub fn with_notifier(registry: Arc<KycRegistry>, notifier: Arc<dyn RenewalNotifier>) -> Self {
        Self { registry, notifier }
    }

    /// Run a batch over the query's users as `caller`.
    ///
    /// Only the owner and currently-authorized verifiers may run batches, and
    /// never while the registry is paused.
    pub fn run(
        &self,
        caller: &AccountId,
        query: &BatchQuery,
    ) -> Result<BatchReport, AnalyticsError> {
        if !self.registry.is_active()? {
            return Err(AnalyticsError::Unauthorized);
        }
        if caller != self.registry.owner() && !self.registry.is_authorized_verifier(caller)? {
            return Err(AnalyticsError::Unauthorized);
        }
        if query.users.len() > MAX_BATCH_USERS {
            return Err(AnalyticsError::BatchTooLarge {
                len: query.users.len(),
            });
        }
        if query.operation.len() > MAX_OPERATION_TAG_BYTES {
            return Err(AnalyticsError::OperationTagTooLong {
                len: query.operation.len(),
            });
        }
        let min_level = KycLevel::from_u8(query.min_level)?;

        let now = self.registry.current_height();
        let mut results = Vec::with_capacity(query.users.len());
        for user in &query.users {
            let record = self.registry.identity(user)?;
            results.push(UserCompliance::project(user.clone(), record.as_ref(), now));
        }

        let total_processed = results.len();
        let valid_count = results.iter().filter(|r| r.is_valid()).count();
        let expired_count = results.iter().filter(|r| r.needs_renewal()).count();
        let compliance_rate = if total_processed == 0 {
            0
        } else {
            (valid_count * 100 / total_processed) as u64
        };

        let operation = BatchOperation::from_tag(&query.operation);

        if operation == BatchOperation::RenewalAlert {
            for row in results.iter().filter(|r| r.needs_renewal()) {
                self.notifier.renewal_due(row);
                tracing::debug!(
                    user = %row.user,
                    blocks_until_expiry = row.blocks_until_expiry,
                    "renewal alert"
                );
            }
        }

        let detailed_results = match operation {
            BatchOperation::ComplianceCheck => results,
            BatchOperation::RenewalAlert | BatchOperation::Summary => Vec::new(),
        };

        tracing::info!(
            caller = %caller,
            operation = %query.operation,
            total = total_processed,
            valid = valid_count,
            expiring = expired_count,
            "batch analytics run"
        );

        Ok(BatchReport {
            total_processed,
            valid_count,
            expired_count,
            compliance_rate,
            operation: query.operation.clone(),
            processed_at: now,
            min_level_required: min_level,
            detailed_results,
        })
    }
}

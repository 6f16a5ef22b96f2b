use certus_core::{codes, CoreError};
use certus_registry::RegistryError;

use crate::engine::{MAX_BATCH_USERS, MAX_OPERATION_TAG_BYTES};

/// Batch analytics errors.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("caller is not authorized for batch analytics")]
    Unauthorized,

    #[error("batch of {len} users exceeds the limit of {}", MAX_BATCH_USERS)]
    BatchTooLarge { len: usize },

    #[error("operation tag is {len} bytes, limit is {}", MAX_OPERATION_TAG_BYTES)]
    OperationTagTooLong { len: usize },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl AnalyticsError {
    /// Stable numeric code for this error, if it has one.
    pub fn code(&self) -> Option<u32> {
        match self {
            Self::Unauthorized => Some(codes::UNAUTHORIZED),
            Self::Core(e) => e.code(),
            Self::Registry(e) => e.code(),
            Self::BatchTooLarge { .. } | Self::OperationTagTooLong { .. } => None,
        }
    }
}

use certus_core::{codes, CoreError};

use crate::records::MAX_METADATA_BYTES;

/// Registry operation errors.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("caller is not authorized for this operation")]
    Unauthorized,

    #[error("account already holds an identity record")]
    AlreadyRegistered,

    #[error("no matching record")]
    NotFound,

    #[error("request metadata is {len} bytes, limit is {}", MAX_METADATA_BYTES)]
    MetadataTooLong { len: usize },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("column family '{0}' not found")]
    MissingColumnFamily(String),

    #[error("storage error: {0}")]
    Storage(#[from] rocksdb::Error),

    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RegistryError {
    /// Stable numeric code for this error, if it has one.
    ///
    /// Infrastructure failures and malformed-input rejections carry no code;
    /// they are not part of the client-facing taxonomy.
    pub fn code(&self) -> Option<u32> {
        match self {
            Self::Unauthorized => Some(codes::UNAUTHORIZED),
            Self::AlreadyRegistered => Some(codes::ALREADY_REGISTERED),
            Self::NotFound => Some(codes::NOT_FOUND),
            Self::Core(e) => e.code(),
            Self::MetadataTooLong { .. }
            | Self::MissingColumnFamily(_)
            | Self::Storage(_)
            | Self::Codec(_)
            | Self::Io(_) => None,
        }
    }
}

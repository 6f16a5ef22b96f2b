//! RocksDB storage backend for the registry.
//!
//! One column family per persisted collection, plus a `state` family for the
//! two scalars (`next_request_id`, `paused`). Values are JSON-encoded
//! records; every mutating operation commits exactly one [`StateBatch`].

use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Options, WriteBatch, DB};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

use certus_core::{AccountId, RequestId};

use crate::error::RegistryError;

/// Identity records keyed by account id.
pub(crate) const CF_IDENTITIES: &str = "identities";
/// Verifier grants keyed by account id.
pub(crate) const CF_VERIFIERS: &str = "verifiers";
/// Pending requests keyed by (account id, request id).
pub(crate) const CF_REQUESTS: &str = "requests";
/// Scalar state: the request counter and the pause switch.
pub(crate) const CF_STATE: &str = "state";

pub(crate) const KEY_NEXT_REQUEST_ID: &[u8] = b"next_request_id";
pub(crate) const KEY_PAUSED: &[u8] = b"paused";

/// Separator between the account id and the request id in request keys.
/// Account ids are ASCII-graphic, so 0x1F cannot appear inside one.
const REQUEST_KEY_SEPARATOR: u8 = 0x1F;

/// Compose the storage key for a (user, request id) pair.
pub(crate) fn request_key(user: &AccountId, request_id: RequestId) -> Vec<u8> {
    let user = user.as_str().as_bytes();
    let mut key = Vec::with_capacity(user.len() + 9);
    key.extend_from_slice(user);
    key.push(REQUEST_KEY_SEPARATOR);
    key.extend_from_slice(&request_id.to_be_bytes());
    key
}

/// RocksDB-backed storage for the registry collections.
pub struct Storage {
    db: DB,
}

impl Storage {
    /// Open or create the database at the given path with all column families.
    pub fn open(path: &Path) -> Result<Self, RegistryError> {
        std::fs::create_dir_all(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_IDENTITIES, Options::default()),
            ColumnFamilyDescriptor::new(CF_VERIFIERS, Options::default()),
            ColumnFamilyDescriptor::new(CF_REQUESTS, Options::default()),
            ColumnFamilyDescriptor::new(CF_STATE, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;

        Ok(Self { db })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily, RegistryError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| RegistryError::MissingColumnFamily(name.to_string()))
    }

    /// Read and decode a value from a column family.
    pub fn get<T: DeserializeOwned>(
        &self,
        cf_name: &str,
        key: &[u8],
    ) -> Result<Option<T>, RegistryError> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Start a write batch. All staged writes become visible together on
    /// [`StateBatch::commit`], or not at all.
    pub fn batch(&self) -> StateBatch<'_> {
        StateBatch {
            storage: self,
            batch: WriteBatch::default(),
        }
    }
}

/// A staged set of writes applied atomically.
pub struct StateBatch<'a> {
    storage: &'a Storage,
    batch: WriteBatch,
}

impl StateBatch<'_> {
    /// Stage an encoded put.
    pub fn put<T: Serialize>(
        &mut self,
        cf_name: &str,
        key: &[u8],
        value: &T,
    ) -> Result<(), RegistryError> {
        let cf = self.storage.cf(cf_name)?;
        self.batch.put_cf(cf, key, serde_json::to_vec(value)?);
        Ok(())
    }

    /// Stage a deletion.
    pub fn delete(&mut self, cf_name: &str, key: &[u8]) -> Result<(), RegistryError> {
        let cf = self.storage.cf(cf_name)?;
        self.batch.delete_cf(cf, key);
        Ok(())
    }

    /// Commit all staged writes as one atomic unit.
    pub fn commit(self) -> Result<(), RegistryError> {
        self.storage.db.write(self.batch)?;
        Ok(())
    }
}

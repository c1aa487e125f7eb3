use serde::{Serialize, de::DeserializeOwned};

use crate::storage::error::StorageError;

pub mod db;
pub mod error;
pub mod fs;
pub mod operations;
pub(crate) mod schema;

/// Opaque payload with the content type it should be served with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Key-value store of binary payloads (imported audio)
pub trait BlobStore {
    fn put(&mut self, key: &str, blob: &Blob) -> Result<(), StorageError>;

    fn get(&self, key: &str) -> Result<Option<Blob>, StorageError>;

    /// Deleting a key that does not exist is not an error.
    fn delete(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Durable storage of a store's whole state, one document per store key
pub trait StatePersistence {
    fn save<T: Serialize>(&mut self, key: &str, state: &T) -> Result<(), StorageError>;

    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError>;
}

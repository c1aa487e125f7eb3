//! In-memory backend recording every blob and state write.

use std::collections::HashMap;

use anyhow::anyhow;
use serde::{Serialize, de::DeserializeOwned};

use crate::storage::{Blob, BlobStore, StatePersistence, error::StorageError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Put(String),
    Delete(String),
    Save(String),
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    pub blobs: HashMap<String, Blob>,
    pub states: HashMap<String, String>,
    pub events: Vec<Event>,
    pub fail_deletes: bool,
    pub fail_saves: bool,
}

impl MemoryBackend {
    /// stores a state document without recording an event
    pub fn seed_state<T: Serialize>(&mut self, key: &str, state: &T) {
        let document = serde_json::to_string(state).unwrap();
        self.states.insert(key.to_string(), document);
    }
}

impl BlobStore for MemoryBackend {
    fn put(&mut self, key: &str, blob: &Blob) -> Result<(), StorageError> {
        self.events.push(Event::Put(key.to_string()));
        self.blobs.insert(key.to_string(), blob.clone());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Blob>, StorageError> {
        Ok(self.blobs.get(key).cloned())
    }

    fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        if self.fail_deletes {
            return Err(StorageError::Internal(anyhow!("blob store unavailable")));
        }
        self.events.push(Event::Delete(key.to_string()));
        self.blobs.remove(key);
        Ok(())
    }
}

impl StatePersistence for MemoryBackend {
    fn save<T: Serialize>(&mut self, key: &str, state: &T) -> Result<(), StorageError> {
        if self.fail_saves {
            return Err(StorageError::Internal(anyhow!("disk full")));
        }
        self.events.push(Event::Save(key.to_string()));
        self.states
            .insert(key.to_string(), serde_json::to_string(state)?);
        Ok(())
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.states.get(key) {
            Some(document) => Ok(Some(serde_json::from_str(document)?)),
            None => Ok(None),
        }
    }
}

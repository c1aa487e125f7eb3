use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::SystemTime,
};

use anyhow::anyhow;
use rusqlite::{OptionalExtension, params};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    config,
    storage::{
        Blob, BlobStore, StatePersistence,
        db::{self, system_time_to_millis},
        error::StorageError,
        schema::{columns::*, tables::*},
    },
};

/// Handle to the database holding both blobs and persisted store states.
///
/// Cloning is cheap; all clones share one connection.
#[derive(Clone)]
pub struct Storage {
    db: Arc<Mutex<rusqlite::Connection>>,
}

impl Storage {
    /// when called, opens a data base connection
    pub fn new(db_config: &config::Database) -> Result<Self, StorageError> {
        let db = db::open(db_config)?;
        Ok(Self::from_existing_conn(db))
    }

    pub fn from_existing_conn(db: rusqlite::Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, rusqlite::Connection>, StorageError> {
        self.db.lock().map_err(|e| {
            StorageError::Internal(anyhow!("Could not access database under lock: {e}"))
        })
    }

    /// keys of every stored blob, sorted
    pub fn blob_keys(&self) -> Result<Vec<String>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {KEY} FROM {BLOBS} ORDER BY {KEY}"))?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

impl BlobStore for Storage {
    fn put(&mut self, key: &str, blob: &Blob) -> Result<(), StorageError> {
        self.conn()?.execute(
            &format!(
                "INSERT OR REPLACE INTO {BLOBS} ({KEY}, {CONTENT_TYPE}, {DATA}) VALUES (?1, ?2, ?3)"
            ),
            params![key, blob.content_type, blob.data],
        )?;
        log::debug!("stored blob {key} ({} bytes)", blob.data.len());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Blob>, StorageError> {
        let blob = self
            .conn()?
            .query_row(
                &format!("SELECT {CONTENT_TYPE}, {DATA} FROM {BLOBS} WHERE {KEY} = ?1"),
                params![key],
                |row| {
                    Ok(Blob {
                        content_type: row.get(0)?,
                        data: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(blob)
    }

    fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        let removed = self
            .conn()?
            .execute(&format!("DELETE FROM {BLOBS} WHERE {KEY} = ?1"), params![key])?;
        if removed == 0 {
            log::debug!("blob {key} was already absent");
        }
        Ok(())
    }
}

impl StatePersistence for Storage {
    fn save<T: Serialize>(&mut self, key: &str, state: &T) -> Result<(), StorageError> {
        let document = serde_json::to_string(state)?;
        let saved_at = system_time_to_millis(SystemTime::now()).map_err(StorageError::Internal)?;

        self.conn()?.execute(
            &format!(
                "INSERT OR REPLACE INTO {STATES} ({KEY}, {DOCUMENT}, {SAVED_AT}) VALUES (?1, ?2, ?3)"
            ),
            params![key, document, saved_at],
        )?;
        Ok(())
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let document: Option<String> = self
            .conn()?
            .query_row(
                &format!("SELECT {DOCUMENT} FROM {STATES} WHERE {KEY} = ?1"),
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        match document {
            Some(document) => Ok(Some(serde_json::from_str(&document)?)),
            None => Ok(None),
        }
    }
}

use std::{
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, anyhow};
use chrono::{DateTime, Local};
use rusqlite::Connection;

use crate::{
    config::Database,
    storage::{error::StorageError, schema},
};

pub type MillisSinceUnix = i64;

fn open_in_memory() -> Result<rusqlite::Connection, rusqlite::Error> {
    Connection::open_in_memory()
}

fn open_from_file(path: &Path) -> Result<rusqlite::Connection, rusqlite::Error> {
    Connection::open(path)
}

pub fn open(config: &Database) -> Result<rusqlite::Connection, StorageError> {
    let db = match (config.in_memory, &config.path) {
        (true, _) => open_in_memory()?,
        (false, Some(path)) => {
            log::debug!("opening database at {}", path.to_string_lossy());
            open_from_file(path)?
        }
        (false, None) => {
            return Err(StorageError::Internal(anyhow!(
                "database is not in memory, but no path is configured"
            )));
        }
    };
    schema::init(&db)?;
    Ok(db)
}

/// converts time to number of milliseconds since unix_epoch
pub fn system_time_to_millis(time: SystemTime) -> anyhow::Result<MillisSinceUnix> {
    i64::try_from(
        time.duration_since(UNIX_EPOCH)
            .with_context(|| "failed to get unix timestamp")?
            .as_millis(),
    )
    .with_context(|| "failed to get timestamp in milliseconds")
}

/// converts number of milliseconds since unix epoch to local date time
pub fn millis_to_local_time(since_unix: MillisSinceUnix) -> anyhow::Result<DateTime<Local>> {
    let datetime = DateTime::from_timestamp_millis(since_unix).ok_or(anyhow!(
        "failed to convert {since_unix} ms timestamp to datetime"
    ))?;

    Ok(DateTime::from(datetime))
}

use rusqlite::Connection;

pub mod tables {
    pub const BLOBS: &str = "blobs";
    pub const STATES: &str = "states";

    pub const ALL_TABLES: &[&str] = &[BLOBS, STATES];
}

pub mod columns {
    pub const KEY: &str = "key";
    pub const CONTENT_TYPE: &str = "content_type";
    pub const DATA: &str = "data";
    pub const DOCUMENT: &str = "document";
    pub const SAVED_AT: &str = "saved_at";
}

pub use columns::*;
pub use tables::*;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS blobs (
    key TEXT PRIMARY KEY NOT NULL,
    content_type TEXT NOT NULL,
    data BLOB NOT NULL
);

CREATE TABLE IF NOT EXISTS states (
    key TEXT PRIMARY KEY NOT NULL,
    document TEXT NOT NULL,
    saved_at INTEGER NOT NULL
);
"#;

pub fn init(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA)
}

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The data directory holding the database file could not be created.
    #[error("Cannot create database directory '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema migration {version} failed: {reason}")]
    Migration { version: u32, reason: String },

    /// A stored row could not be mapped back into a content item.
    #[error("Corrupt row for content item '{id}': {reason}")]
    CorruptRow { id: String, reason: String },

    #[error("Database connection lock poisoned")]
    LockPoisoned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_row_names_item() {
        let err = DatabaseError::CorruptRow {
            id: "abc".to_string(),
            reason: "unknown status 'archived'".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'abc'"));
        assert!(msg.contains("archived"));
    }
}

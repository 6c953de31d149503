//! Storage error handling
//!
//! Provides typed errors for catalogue loading with descriptive messages
//! and recovery suggestions.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading the catalogue
#[derive(Error, Debug)]
pub enum StorageError {
    /// The catalogue database does not exist
    #[error("No catalogue database at '{path}'")]
    MissingDatabase { path: PathBuf },

    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read file
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A stored row holds a value the catalogue can't represent
    #[error("Invalid row in '{table}' (id {id}): {details}")]
    InvalidRow {
        table: &'static str,
        id: String,
        details: String,
    },

    /// The database was written by a newer version
    #[error("Unsupported schema version {found} (expected at most {supported})")]
    UnsupportedSchema { found: i32, supported: i32 },

    /// SQLite database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StorageError {
    /// Create an error from an I/O error with path context
    ///
    /// Classifies the error based on its kind
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                path,
                source: error,
            },
            io::ErrorKind::NotFound => StorageError::MissingDatabase { path },
            _ => StorageError::ReadError {
                path,
                source: error,
            },
        }
    }

    pub(crate) fn invalid_row(
        table: &'static str,
        id: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        StorageError::InvalidRow {
            table,
            id: id.into(),
            details: details.into(),
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StorageError::MissingDatabase { .. } | StorageError::PermissionDenied { .. }
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::MissingDatabase { .. } => {
                Some("Set 'database' or 'data_dir' in the config file, or pass --db.")
            }
            StorageError::PermissionDenied { .. } => {
                Some("Check file and directory permissions.")
            }
            StorageError::InvalidRow { .. } => {
                Some("Fix or remove the offending row with the sqlite3 shell.")
            }
            StorageError::UnsupportedSchema { .. } => {
                Some("Upgrade bookmarker to read this catalogue.")
            }
            _ => None,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_classification() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = StorageError::from_io(io_err, PathBuf::from("/test/path"));

        assert!(matches!(err, StorageError::PermissionDenied { .. }));
        assert!(err.is_recoverable());
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_not_found_classification() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = StorageError::from_io(io_err, PathBuf::from("/missing/bookmarker.db"));

        assert!(matches!(err, StorageError::MissingDatabase { .. }));
        assert!(err.to_string().contains("/missing/bookmarker.db"));
    }

    #[test]
    fn test_other_io_is_read_error() {
        let io_err = io::Error::new(io::ErrorKind::Other, "device not ready");
        let err = StorageError::from_io(io_err, PathBuf::from("/mnt/db"));

        assert!(matches!(err, StorageError::ReadError { .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_invalid_row_display() {
        let err = StorageError::invalid_row("sections", "abc", "page_number must be positive");

        let msg = err.to_string();
        assert!(msg.contains("sections"));
        assert!(msg.contains("abc"));
        assert!(msg.contains("positive"));
        assert!(err.recovery_suggestion().is_some());
    }
}

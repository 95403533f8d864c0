use std::{io, path::PathBuf};

use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The target path does not exist.
    #[error("`{}` does not exist", path.display())]
    NotFound {
        /// Missing path.
        path: PathBuf,
    },
    /// Any other I/O failure.
    #[error("failed to {operation} `{}`", path.display())]
    Io {
        /// Operation that failed, such as `read` or `rename`.
        operation: &'static str,
        /// Path the operation targeted.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    /// Classify an I/O failure, keeping "not found" apart so callers can tolerate it.
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            StorageError::NotFound { path }
        } else {
            StorageError::Io {
                operation,
                path,
                source,
            }
        }
    }

    /// Whether the failure only means the path was missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_kept_apart() {
        let missing = StorageError::io(
            "remove",
            "state.prev.json",
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert!(missing.is_not_found());

        let denied = StorageError::io(
            "write",
            "state.json",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(!denied.is_not_found());
        assert_eq!(denied.to_string(), "failed to write `state.json`");
    }
}

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ManagerError>;

/// Boxed failure reported by a configuration-store implementation.
pub type StoreFailure = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Flat error classification for callers that only care about the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    CommitFailed,
    AlreadyExists,
    Unauthorized,
    Io,
    Config,
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ManagerError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("configuration commit failed: {0}")]
    CommitFailed(#[source] StoreFailure),

    #[error("file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("access denied: {}", .0.display())]
    Unauthorized(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid manager configuration: {0}")]
    Config(String),
}

impl ManagerError {
    /// Classify an I/O failure on `path` into the crate taxonomy.
    pub fn io(path: impl AsRef<Path>, err: io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => ManagerError::NotFound(path.display().to_string()),
            io::ErrorKind::PermissionDenied => ManagerError::Unauthorized(path),
            io::ErrorKind::AlreadyExists => ManagerError::AlreadyExists(path),
            _ => ManagerError::Io { path, source: err },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ManagerError::NotFound(_) => ErrorKind::NotFound,
            ManagerError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ManagerError::CommitFailed(_) => ErrorKind::CommitFailed,
            ManagerError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            ManagerError::Unauthorized(_) => ErrorKind::Unauthorized,
            ManagerError::Io { .. } => ErrorKind::Io,
            ManagerError::Config(_) => ErrorKind::Config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mapping() {
        let not_found = ManagerError::io("php.ini", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(not_found.kind(), ErrorKind::NotFound);

        let denied = ManagerError::io("php.ini", io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(denied.kind(), ErrorKind::Unauthorized);

        let exists = ManagerError::io("probe.php", io::Error::from(io::ErrorKind::AlreadyExists));
        assert_eq!(exists.kind(), ErrorKind::AlreadyExists);

        let other = ManagerError::io("php.ini", io::Error::other("disk on fire"));
        assert_eq!(other.kind(), ErrorKind::Io);
        assert!(other.to_string().contains("php.ini"));
    }
}

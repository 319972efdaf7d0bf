use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    Io,
    Codec,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("storage {kind:?} error: {message}")]
pub struct StorageError {
    pub kind: StorageErrorKind,
    pub message: String,
}

impl StorageError {
    pub fn new(kind: StorageErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

pub fn io_error(message: impl Into<String>) -> StorageError {
    StorageError::new(StorageErrorKind::Io, message)
}

pub fn codec_error(message: impl Into<String>) -> StorageError {
    StorageError::new(StorageErrorKind::Codec, message)
}

pub fn internal_error(message: impl Into<String>) -> StorageError {
    StorageError::new(StorageErrorKind::Internal, message)
}

/// Failure reported by the host's account-creation primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CreationError {
    pub message: String,
}

impl CreationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

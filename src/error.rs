//! Error taxonomy surfaced to the UI layer

use serde::Serialize;
use thiserror::Error;

use crate::storage::StorageError;
use crate::transfer::TransferKind;

/// Errors produced by [`crate::TransferController`] operations.
///
/// Every storage failure is converted into one of these kinds before it
/// leaves the controller, so callers only ever see a message they can show
/// inline next to the affected file.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransferError {
    #[error("Storage credentials were rejected: {0}")]
    Credentials(String),

    #[error("{name} is {size} bytes, the upload limit is {limit} bytes")]
    SizeLimitExceeded { name: String, size: u64, limit: u64 },

    #[error("A {kind} of {name} is already in progress")]
    OperationAlreadyInProgress { kind: TransferKind, name: String },

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Storage request failed: {0}")]
    Transport(String),

    #[error("Failed to list files: {0}")]
    List(String),
}

/// Stable machine-readable error name used in JSON payloads.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum ErrorKind {
    #[serde(rename = "credentials")]
    Credentials,
    #[serde(rename = "size_limit_exceeded")]
    SizeLimitExceeded,
    #[serde(rename = "operation_already_in_progress")]
    OperationAlreadyInProgress,
    #[serde(rename = "not_found")]
    NotFound,
    #[serde(rename = "transport")]
    Transport,
    #[serde(rename = "list")]
    List,
    #[serde(rename = "settings")]
    Settings,
}

impl TransferError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransferError::Credentials(_) => ErrorKind::Credentials,
            TransferError::SizeLimitExceeded { .. } => ErrorKind::SizeLimitExceeded,
            TransferError::OperationAlreadyInProgress { .. } => {
                ErrorKind::OperationAlreadyInProgress
            }
            TransferError::NotFound(_) => ErrorKind::NotFound,
            TransferError::Transport(_) => ErrorKind::Transport,
            TransferError::List(_) => ErrorKind::List,
        }
    }

    /// Convert a failure from a mutating storage call (upload, delete, presign).
    pub(crate) fn from_storage(err: StorageError, name: &str) -> Self {
        match err {
            StorageError::Unauthorized(msg) => TransferError::Credentials(msg),
            StorageError::NotFound(_) => TransferError::NotFound(name.to_string()),
            StorageError::InvalidObject(msg) | StorageError::Service(msg) => {
                TransferError::Transport(msg)
            }
        }
    }

    /// Convert a failure from `list_objects`. Credential problems keep their
    /// own kind, everything else is a list failure.
    pub(crate) fn from_list(err: StorageError) -> Self {
        match err {
            StorageError::Unauthorized(msg) => TransferError::Credentials(msg),
            other => TransferError::List(other.to_string()),
        }
    }
}

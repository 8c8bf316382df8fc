//! Upload, download and delete files in an S3-compatible storage bucket.
//!
//! [`TransferController`] owns the file list and every in-flight operation;
//! the bucket itself is reached through the [`ObjectStorage`] trait, with
//! [`S3Storage`] as the production backend. The `commands` module exposes
//! the controller to a UI as JSON-serializable action responses.

pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod files;
pub mod settings;
pub mod storage;
pub mod transfer;

pub use config::{StorageConfig, TransferLimits};
pub use error::{ErrorKind, TransferError};
pub use files::{DisplayFilterState, FileRecord};
pub use settings::{DisplayMode, DisplaySettings};
pub use storage::{ObjectStorage, S3Storage, StorageError};
pub use transfer::{ProgressHandle, TransferController, TransferKind, TransferState, UploadFile};

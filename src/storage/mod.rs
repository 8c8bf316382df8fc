//! Storage module - the bucket the transfer controller talks to
//!
//! This module is organized into submodules:
//! - `types`: Client creation and result alias
//! - `list`: Paginated object listing
//! - `objects`: Object deletion
//! - `upload`: Single-request object upload
//! - `presigned`: Presigned download URL generation
//! - `s3`: `ObjectStorage` implementation over the AWS S3 SDK

mod list;
mod objects;
mod presigned;
mod s3;
mod types;
mod upload;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use s3::S3Storage;
pub use types::create_s3_client;

/// Failure reported by a storage backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("no such object: {0}")]
    NotFound(String),

    #[error("invalid object: {0}")]
    InvalidObject(String),

    #[error("{0}")]
    Service(String),
}

/// Object metadata exactly as the backend reported it. Nothing here is
/// trusted until it has been converted into a [`crate::FileRecord`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteObject {
    pub key: Option<String>,
    pub size: Option<i64>,
    pub last_modified: Option<String>,
}

impl RemoteObject {
    pub fn new(key: impl Into<String>, size: i64, last_modified: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            size: Some(size),
            last_modified: Some(last_modified.into()),
        }
    }
}

/// The four bucket operations the controller needs.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Every object in the bucket, in whatever order the backend returns.
    async fn list_objects(&self) -> Result<Vec<RemoteObject>, StorageError>;

    /// Store `bytes` under `name`, replacing any existing object.
    async fn upload_object(&self, name: &str, bytes: Vec<u8>)
        -> Result<RemoteObject, StorageError>;

    async fn delete_object(&self, name: &str) -> Result<(), StorageError>;

    /// A URL that allows a GET of `name` for `ttl_secs` seconds.
    async fn get_download_url(&self, name: &str, ttl_secs: u64) -> Result<String, StorageError>;
}

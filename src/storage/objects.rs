//! Object deletion

use aws_sdk_s3::Client;

use super::types::{classify_sdk_error, StorageResult};

/// Delete a single object
pub(crate) async fn delete_object(client: &Client, bucket: &str, key: &str) -> StorageResult<()> {
    client
        .delete_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(classify_sdk_error)?;
    Ok(())
}

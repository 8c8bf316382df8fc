//! Object upload

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use super::types::{classify_sdk_error, StorageResult};

/// Upload an in-memory payload with a single PUT. Payloads are capped well
/// below the multipart threshold, so no part orchestration happens here.
pub(crate) async fn put_object(
    client: &Client,
    bucket: &str,
    key: &str,
    bytes: Vec<u8>,
    content_type: Option<&str>,
) -> StorageResult<String> {
    let mut request = client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(bytes));

    if let Some(ct) = content_type {
        request = request.content_type(ct);
    }

    let response = request.send().await.map_err(classify_sdk_error)?;
    Ok(response.e_tag().unwrap_or_default().to_string())
}

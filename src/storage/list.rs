//! Object listing

use aws_sdk_s3::Client;

use super::types::{classify_sdk_error, StorageResult};
use super::RemoteObject;

/// List every object in the bucket, following continuation tokens.
pub(crate) async fn list_all_objects(client: &Client, bucket: &str) -> StorageResult<Vec<RemoteObject>> {
    let mut all_objects: Vec<RemoteObject> = Vec::new();
    let mut continuation_token: Option<String> = None;

    loop {
        let mut request = client.list_objects_v2().bucket(bucket).max_keys(1000);

        if let Some(token) = &continuation_token {
            request = request.continuation_token(token);
        }

        let response = request.send().await.map_err(classify_sdk_error)?;

        all_objects.extend(response.contents().iter().map(|obj| RemoteObject {
            key: obj.key().map(str::to_string),
            size: obj.size(),
            last_modified: obj.last_modified().map(|dt| dt.to_string()),
        }));

        if !response.is_truncated().unwrap_or(false) {
            break;
        }

        continuation_token = response.next_continuation_token().map(|s| s.to_string());
        if continuation_token.is_none() {
            log::warn!("Listing of {} was truncated without a continuation token", bucket);
            break;
        }
    }

    log::debug!("Listed {} objects in {}", all_objects.len(), bucket);
    Ok(all_objects)
}

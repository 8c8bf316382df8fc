//! Loader and action handlers for the file page

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::response::{ActionResponse, ErrorPayload};
use crate::files::{format_file_size, format_last_modified, DisplayFilterState, FileRecord};
use crate::transfer::{DownloadLink, TransferController, UploadFile};

// ============ Types ============

/// Frontend-friendly file row
#[derive(Debug, Clone, Serialize)]
pub struct FileView {
    pub name: String,
    pub size: u64,
    pub size_label: String,
    pub last_modified: DateTime<Utc>,
    pub last_modified_label: String,
    #[serde(rename = "type")]
    pub file_type: String,
}

impl From<&FileRecord> for FileView {
    fn from(record: &FileRecord) -> Self {
        Self {
            name: record.name.clone(),
            size: record.size,
            size_label: format_file_size(record.size),
            last_modified: record.last_modified,
            last_modified_label: format_last_modified(&record.last_modified),
            file_type: record.file_type.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileListing {
    pub files: Vec<FileView>,
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    pub name: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
}

// ============ Loader ============

/// Refresh from storage and render the filtered, newest-first listing.
pub async fn load_files(
    controller: &TransferController,
    filter: &DisplayFilterState,
) -> ActionResponse<FileListing> {
    if let Err(e) = controller.refresh().await {
        return ActionResponse::failed(ErrorPayload::from(&e));
    }

    ActionResponse::ok(FileListing {
        files: controller
            .filtered_files(filter)
            .iter()
            .map(FileView::from)
            .collect(),
        types: controller.available_types().into_iter().collect(),
    })
}

// ============ Actions ============

/// Upload dropped files. The response fails if any file failed, and carries
/// the first error; per-file outcomes are always included.
pub async fn upload_files(
    controller: &TransferController,
    files: Vec<UploadFile>,
) -> ActionResponse<Vec<UploadOutcome>> {
    let outcomes: Vec<UploadOutcome> = controller
        .submit_uploads(files)
        .await
        .into_iter()
        .map(|(name, result)| match result {
            Ok(record) => UploadOutcome {
                name,
                success: true,
                file: Some(FileView::from(&record)),
                error: None,
            },
            Err(e) => UploadOutcome {
                name,
                success: false,
                file: None,
                error: Some(ErrorPayload::from(&e)),
            },
        })
        .collect();

    let first_error = outcomes.iter().find_map(|o| o.error.clone());
    ActionResponse {
        success: first_error.is_none(),
        data: Some(outcomes),
        error: first_error,
    }
}

pub async fn delete_file(controller: &TransferController, name: &str) -> ActionResponse<()> {
    controller.submit_delete(name).await.into()
}

pub async fn download_link(
    controller: &TransferController,
    name: &str,
) -> ActionResponse<DownloadLink> {
    controller.request_download_link(name).await.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ObjectStorage, RemoteObject, StorageError};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct StaticStorage;

    #[async_trait]
    impl ObjectStorage for StaticStorage {
        async fn list_objects(&self) -> Result<Vec<RemoteObject>, StorageError> {
            Ok(vec![
                RemoteObject::new("x.png", 1024, "2024-01-01"),
                RemoteObject::new("clip.mp4", 2_621_440, "2024-02-01"),
            ])
        }

        async fn upload_object(
            &self,
            _name: &str,
            _bytes: Vec<u8>,
        ) -> Result<RemoteObject, StorageError> {
            Err(StorageError::Unauthorized("token revoked".into()))
        }

        async fn delete_object(&self, _name: &str) -> Result<(), StorageError> {
            Ok(())
        }

        async fn get_download_url(
            &self,
            name: &str,
            _ttl_secs: u64,
        ) -> Result<String, StorageError> {
            Ok(format!("https://bucket.test/{}", name))
        }
    }

    fn controller() -> TransferController {
        TransferController::new(Arc::new(StaticStorage))
    }

    #[tokio::test]
    async fn load_files_renders_sizes_and_newest_first() {
        let controller = controller();
        let response = load_files(&controller, &DisplayFilterState::new()).await;
        let json = response.to_json();

        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["files"][0]["name"], "clip.mp4");
        assert_eq!(json["data"]["files"][0]["size_label"], "2.50 MB");
        assert_eq!(json["data"]["files"][1]["size_label"], "1 KB");
        assert_eq!(json["data"]["files"][1]["type"], "png");
        assert_eq!(json["data"]["types"], serde_json::json!(["mp4", "png"]));
        assert!(json.get("error").is_none());
    }

    #[tokio::test]
    async fn upload_failures_are_reported_as_data() {
        let controller = controller();
        let response = upload_files(
            &controller,
            vec![UploadFile::new("a.txt", b"abc".to_vec())],
        )
        .await;
        let json = response.to_json();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["kind"], "credentials");
        assert_eq!(json["data"][0]["name"], "a.txt");
        assert_eq!(json["data"][0]["success"], false);
    }

    #[tokio::test]
    async fn delete_and_download_of_unknown_file_fail_with_not_found() {
        let controller = controller();
        let json = delete_file(&controller, "ghost.txt").await.to_json();
        assert_eq!(json["error"]["kind"], "not_found");

        controller.refresh().await.unwrap();
        let json = download_link(&controller, "x.png").await.to_json();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["url"], "https://bucket.test/x.png");
        assert_eq!(json["data"]["expires_in_secs"], 3600);
    }
}

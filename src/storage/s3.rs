//! `ObjectStorage` over the AWS S3 SDK (R2, MinIO and AWS buckets)

use async_trait::async_trait;
use aws_sdk_s3::Client;
use chrono::Utc;

use super::types::create_s3_client;
use super::{list, objects, presigned, upload, ObjectStorage, RemoteObject, StorageError};
use crate::config::StorageConfig;

#[derive(Debug, Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            client: create_s3_client(config),
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn list_objects(&self) -> Result<Vec<RemoteObject>, StorageError> {
        list::list_all_objects(&self.client, &self.bucket).await
    }

    async fn upload_object(
        &self,
        name: &str,
        bytes: Vec<u8>,
    ) -> Result<RemoteObject, StorageError> {
        let size = bytes.len() as i64;
        let content_type = mime_guess::from_path(name).first_raw();
        let etag = upload::put_object(&self.client, &self.bucket, name, bytes, content_type).await?;
        log::debug!("Uploaded {} ({} bytes, etag {})", name, size, etag);

        // PUT does not echo the modification time; the next listing replaces it.
        Ok(RemoteObject::new(name, size, Utc::now().to_rfc3339()))
    }

    async fn delete_object(&self, name: &str) -> Result<(), StorageError> {
        objects::delete_object(&self.client, &self.bucket, name).await
    }

    async fn get_download_url(&self, name: &str, ttl_secs: u64) -> Result<String, StorageError> {
        presigned::generate_presigned_url(&self.client, &self.bucket, name, ttl_secs).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(endpoint: &str) -> StorageConfig {
        StorageConfig {
            account_id: String::new(),
            bucket: "uploads".to_string(),
            access_key_id: "test-key".to_string(),
            secret_access_key: "test-secret".to_string(),
            endpoint_url: Some(endpoint.to_string()),
            region: "auto".to_string(),
        }
    }

    #[tokio::test]
    async fn list_objects_reads_contents() {
        let server = MockServer::start().await;
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Name>uploads</Name>
  <Prefix></Prefix>
  <KeyCount>1</KeyCount>
  <MaxKeys>1000</MaxKeys>
  <IsTruncated>false</IsTruncated>
  <Contents>
    <Key>x.png</Key>
    <LastModified>2024-01-01T00:00:00.000Z</LastModified>
    <ETag>&quot;abc&quot;</ETag>
    <Size>1024</Size>
    <StorageClass>STANDARD</StorageClass>
  </Contents>
</ListBucketResult>"#;

        Mock::given(method("GET"))
            .and(path("/uploads"))
            .and(query_param("list-type", "2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/xml")
                    .set_body_string(body),
            )
            .mount(&server)
            .await;

        let storage = S3Storage::new(&config_for(&server.uri()));
        let objects = storage.list_objects().await.unwrap();

        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].key.as_deref(), Some("x.png"));
        assert_eq!(objects[0].size, Some(1024));
        assert!(objects[0]
            .last_modified
            .as_deref()
            .unwrap()
            .starts_with("2024-01-01T00:00:00"));
    }

    #[tokio::test]
    async fn delete_object_succeeds_on_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/uploads/a.txt"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let storage = S3Storage::new(&config_for(&server.uri()));
        storage.delete_object("a.txt").await.unwrap();
    }

    #[tokio::test]
    async fn access_denied_is_classified_as_unauthorized() {
        let server = MockServer::start().await;
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>AccessDenied</Code><Message>Access Denied</Message></Error>"#;
        Mock::given(method("DELETE"))
            .and(path("/uploads/a.txt"))
            .respond_with(
                ResponseTemplate::new(403)
                    .insert_header("content-type", "application/xml")
                    .set_body_string(body),
            )
            .mount(&server)
            .await;

        let storage = S3Storage::new(&config_for(&server.uri()));
        let err = storage.delete_object("a.txt").await.unwrap_err();
        assert!(matches!(err, StorageError::Unauthorized(_)), "{:?}", err);
    }

    #[tokio::test]
    async fn upload_sends_content_type_guessed_from_name() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/uploads/talk.webm"))
            .and(header("content-type", "video/webm"))
            .respond_with(ResponseTemplate::new(200).insert_header("etag", "\"abc\""))
            .expect(1)
            .mount(&server)
            .await;

        let storage = S3Storage::new(&config_for(&server.uri()));
        let obj = storage
            .upload_object("talk.webm", b"webm bytes".to_vec())
            .await
            .unwrap();

        assert_eq!(obj.key.as_deref(), Some("talk.webm"));
        assert_eq!(obj.size, Some(10));
    }

    #[tokio::test]
    async fn presigned_url_is_signed_for_requested_ttl() {
        let storage = S3Storage::new(&config_for("http://127.0.0.1:9"));
        let url = storage.get_download_url("x.png", 3600).await.unwrap();

        assert!(url.starts_with("http://127.0.0.1:9/uploads/x.png?"), "{}", url);
        assert!(url.contains("X-Amz-Expires=3600"), "{}", url);
        assert!(url.contains("X-Amz-Signature="), "{}", url);
    }
}

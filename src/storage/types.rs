//! S3 client creation and SDK error classification

use aws_config::Region;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::Client;

use super::StorageError;
use crate::config::StorageConfig;

pub(crate) type StorageResult<T> = Result<T, StorageError>;

/// Create an S3 client for the configured endpoint
pub fn create_s3_client(config: &StorageConfig) -> Client {
    let credentials = Credentials::new(
        &config.access_key_id,
        &config.secret_access_key,
        None,
        None,
        "bucket-drop",
    );

    let s3_config = S3ConfigBuilder::new()
        .credentials_provider(credentials)
        .region(Region::new(config.region.clone()))
        .endpoint_url(config.endpoint())
        .force_path_style(true)
        .build();

    Client::from_conf(s3_config)
}

const CREDENTIAL_CODES: &[&str] = &[
    "AccessDenied",
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
    "ExpiredToken",
    "InvalidToken",
    "Unauthorized",
];

const NOT_FOUND_CODES: &[&str] = &["NoSuchKey", "NotFound"];

/// Map an SDK failure onto [`StorageError`] using the service error code,
/// falling back to the HTTP status.
pub(crate) fn classify_sdk_error<E>(err: SdkError<E, HttpResponse>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let code = err.code().map(str::to_string);
    let status = err.raw_response().map(|r| r.status().as_u16());
    let message = DisplayErrorContext(&err).to_string();

    match (code.as_deref(), status) {
        (Some(code), _) if CREDENTIAL_CODES.contains(&code) => StorageError::Unauthorized(message),
        (Some(code), _) if NOT_FOUND_CODES.contains(&code) => StorageError::NotFound(message),
        (_, Some(401)) | (_, Some(403)) => StorageError::Unauthorized(message),
        (_, Some(404)) => StorageError::NotFound(message),
        _ => StorageError::Service(message),
    }
}

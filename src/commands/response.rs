use serde::Serialize;

use crate::error::{ErrorKind, TransferError};
use crate::settings::SettingsError;

/// Error payload rendered inline next to the affected file.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorPayload {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&TransferError> for ErrorPayload {
    fn from(err: &TransferError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<&SettingsError> for ErrorPayload {
    fn from(err: &SettingsError) -> Self {
        Self {
            kind: ErrorKind::Settings,
            message: err.to_string(),
        }
    }
}

/// JSON response of every action. Failures are data, never a panic or an
/// `Err` crossing into the UI.
#[derive(Debug, Clone, Serialize)]
pub struct ActionResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
}

impl<T> ActionResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(error: ErrorPayload) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

impl<T: Serialize> ActionResponse<T> {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            log::error!("Failed to serialize action response: {}", e);
            serde_json::json!({
                "success": false,
                "error": { "kind": ErrorKind::Transport, "message": e.to_string() }
            })
        })
    }
}

impl<T> From<Result<T, TransferError>> for ActionResponse<T> {
    fn from(result: Result<T, TransferError>) -> Self {
        match result {
            Ok(data) => ActionResponse::ok(data),
            Err(e) => ActionResponse::failed(ErrorPayload::from(&e)),
        }
    }
}

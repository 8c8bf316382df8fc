//! Transfer request types, states and event payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransferKind {
    #[serde(rename = "upload")]
    Upload,
    #[serde(rename = "download")]
    Download,
    #[serde(rename = "delete")]
    Delete,
}

impl std::fmt::Display for TransferKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferKind::Upload => write!(f, "upload"),
            TransferKind::Download => write!(f, "download"),
            TransferKind::Delete => write!(f, "delete"),
        }
    }
}

/// `Pending -> InProgress -> Succeeded | Failed`. Both outcomes are terminal
/// and nothing is retried automatically.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransferState {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "in_progress")]
    InProgress,
    #[serde(rename = "succeeded")]
    Succeeded,
    #[serde(rename = "failed")]
    Failed,
}

impl TransferState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferState::Succeeded | TransferState::Failed)
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(&self, next: TransferState) -> bool {
        matches!(
            (self, next),
            (TransferState::Pending, TransferState::InProgress)
                | (TransferState::Pending, TransferState::Failed)
                | (TransferState::InProgress, TransferState::Succeeded)
                | (TransferState::InProgress, TransferState::Failed)
        )
    }
}

impl std::fmt::Display for TransferState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferState::Pending => write!(f, "pending"),
            TransferState::InProgress => write!(f, "in_progress"),
            TransferState::Succeeded => write!(f, "succeeded"),
            TransferState::Failed => write!(f, "failed"),
        }
    }
}

/// In-flight requests are keyed by target and kind; at most one request per
/// key exists at a time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransferKey {
    pub kind: TransferKind,
    pub target_name: String,
}

impl TransferKey {
    pub fn new(kind: TransferKind, target_name: impl Into<String>) -> Self {
        Self {
            kind,
            target_name: target_name.into(),
        }
    }
}

/// One client-initiated operation as tracked in the in-flight set.
#[derive(Debug, Clone, Serialize)]
pub struct TransferRequest {
    pub kind: TransferKind,
    pub target_name: String,
    /// Payload size for uploads.
    pub payload_size: Option<u64>,
    pub state: TransferState,
    pub started_at: DateTime<Utc>,
}

/// A file picked or dropped by the user.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// A time-limited download link. Callers must treat the URL as expiring.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadLink {
    pub name: String,
    pub url: String,
    pub expires_in_secs: u64,
    pub expires_at: DateTime<Utc>,
}

impl DownloadLink {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// State change event payload
#[derive(Debug, Clone, Serialize)]
pub struct TransferEvent {
    pub kind: TransferKind,
    pub target_name: String,
    pub state: TransferState,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_state_display_matches_expected_strings() {
        assert_eq!(TransferState::Pending.to_string(), "pending");
        assert_eq!(TransferState::InProgress.to_string(), "in_progress");
        assert_eq!(TransferState::Succeeded.to_string(), "succeeded");
        assert_eq!(TransferState::Failed.to_string(), "failed");
    }

    #[test]
    fn terminal_states_have_no_successors() {
        for terminal in [TransferState::Succeeded, TransferState::Failed] {
            assert!(terminal.is_terminal());
            for next in [
                TransferState::Pending,
                TransferState::InProgress,
                TransferState::Succeeded,
                TransferState::Failed,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
        assert!(TransferState::Pending.can_transition_to(TransferState::InProgress));
        assert!(!TransferState::Pending.can_transition_to(TransferState::Succeeded));
    }

    #[test]
    fn download_link_expiry() {
        let now = Utc::now();
        let link = DownloadLink {
            name: "a".into(),
            url: "https://example.com/a".into(),
            expires_in_secs: 3600,
            expires_at: now + chrono::Duration::seconds(3600),
        };
        assert!(!link.is_expired_at(now));
        assert!(link.is_expired_at(now + chrono::Duration::seconds(3600)));
    }
}

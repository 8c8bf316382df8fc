//! Transfer module - client-side upload/delete/download state machine
//!
//! - `controller`: `TransferController`, the owner of the file list
//! - `state`: in-flight registry keyed by target and kind
//! - `progress`: simulated, cancellable progress stages
//! - `types`: request, state and event types

mod controller;
mod progress;
mod state;
mod types;

pub use controller::TransferController;
pub use progress::ProgressHandle;
pub use types::{
    DownloadLink, TransferEvent, TransferKey, TransferKind, TransferRequest, TransferState,
    UploadFile,
};

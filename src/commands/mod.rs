//! Action handlers for the UI layer
//!
//! Each handler wraps one controller or settings operation and returns a
//! serializable [`ActionResponse`]:
//! - `file_commands`: list, upload, delete, download link
//! - `settings_commands`: display mode

mod file_commands;
mod response;
mod settings_commands;

pub use file_commands::*;
pub use response::{ActionResponse, ErrorPayload};
pub use settings_commands::*;

//! File list model and the pure helpers the UI renders it with
//!
//! - `record`: `FileRecord` and validation of raw storage listings
//! - `filter`: extension filters and newest-first ordering
//! - `format`: size and date formatting

mod filter;
mod format;
mod record;

pub use filter::{available_types, filtered_files, sort_by_last_modified_desc, DisplayFilterState};
pub use format::{format_file_size, format_last_modified};
pub use record::{file_type_of, parse_timestamp, records_from_listing, FileRecord};

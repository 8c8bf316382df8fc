//! Display filtering and ordering of the file list

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::FileRecord;

/// Active file-extension filters. Empty means every type is shown.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayFilterState {
    active: BTreeSet<String>,
}

impl DisplayFilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            active: types.into_iter().map(|t| t.into().to_lowercase()).collect(),
        }
    }

    /// Flip one filter; returns whether it is active afterwards.
    pub fn toggle(&mut self, file_type: &str) -> bool {
        let file_type = file_type.to_lowercase();
        if self.active.remove(&file_type) {
            false
        } else {
            self.active.insert(file_type);
            true
        }
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn is_active(&self, file_type: &str) -> bool {
        self.active.contains(&file_type.to_lowercase())
    }

    pub fn active_types(&self) -> impl Iterator<Item = &str> {
        self.active.iter().map(String::as_str)
    }

    pub fn matches(&self, record: &FileRecord) -> bool {
        self.active.is_empty() || self.active.contains(&record.file_type)
    }

    /// Drop filters for types that no longer exist in `files`.
    pub fn retain_available(&mut self, files: &[FileRecord]) {
        let available = available_types(files);
        self.active.retain(|t| available.contains(t));
    }
}

/// Distinct file types present in `files`, sorted.
pub fn available_types(files: &[FileRecord]) -> BTreeSet<String> {
    files.iter().map(|f| f.file_type.clone()).collect()
}

/// Stable sort by modification time, newest first.
pub fn sort_by_last_modified_desc(files: &mut [FileRecord]) {
    files.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
}

/// The list the UI renders: filtered, then newest first.
pub fn filtered_files(files: &[FileRecord], filter: &DisplayFilterState) -> Vec<FileRecord> {
    let mut visible: Vec<FileRecord> = files
        .iter()
        .filter(|f| filter.matches(f))
        .cloned()
        .collect();
    sort_by_last_modified_desc(&mut visible);
    visible
}

//! FileRecord and boundary validation of storage listings

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::storage::{RemoteObject, StorageError};

/// One object already persisted in the bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRecord {
    pub name: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
    #[serde(rename = "type")]
    pub file_type: String,
}

impl FileRecord {
    pub fn new(name: impl Into<String>, size: u64, last_modified: DateTime<Utc>) -> Self {
        let name = name.into();
        let file_type = file_type_of(&name);
        Self {
            name,
            size,
            last_modified,
            file_type,
        }
    }
}

/// Lowercase suffix after the last dot of the final path segment, or `""`.
pub fn file_type_of(name: &str) -> String {
    let file_name = name.rsplit('/').next().unwrap_or(name);
    match file_name.rfind('.') {
        Some(idx) if idx + 1 < file_name.len() => file_name[idx + 1..].to_lowercase(),
        _ => String::new(),
    }
}

/// Parse a timestamp as returned by the storage service.
///
/// Accepts RFC 3339 (what the SDK renders) and plain `YYYY-MM-DD` dates,
/// which are taken as midnight UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl TryFrom<RemoteObject> for FileRecord {
    type Error = StorageError;

    fn try_from(obj: RemoteObject) -> Result<Self, Self::Error> {
        let name = obj
            .key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| StorageError::InvalidObject("object without a key".into()))?;

        if name.ends_with('/') {
            return Err(StorageError::InvalidObject(format!(
                "{} is a directory marker",
                name
            )));
        }

        let size = match obj.size {
            Some(size) if size >= 0 => size as u64,
            Some(size) => {
                return Err(StorageError::InvalidObject(format!(
                    "{} has negative size {}",
                    name, size
                )))
            }
            None => {
                return Err(StorageError::InvalidObject(format!("{} has no size", name)))
            }
        };

        let last_modified = obj
            .last_modified
            .as_deref()
            .and_then(parse_timestamp)
            .ok_or_else(|| {
                StorageError::InvalidObject(format!("{} has no valid modification time", name))
            })?;

        Ok(FileRecord::new(name, size, last_modified))
    }
}

/// Validate a raw listing. Invalid entries are skipped and duplicate names
/// keep the most recently modified entry, so names stay unique.
pub fn records_from_listing(objects: Vec<RemoteObject>) -> Vec<FileRecord> {
    let mut by_name: HashMap<String, FileRecord> = HashMap::with_capacity(objects.len());
    let mut order: Vec<String> = Vec::with_capacity(objects.len());

    for obj in objects {
        let record = match FileRecord::try_from(obj) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Skipping listing entry: {}", e);
                continue;
            }
        };

        match by_name.get(&record.name) {
            Some(existing) if existing.last_modified >= record.last_modified => {}
            Some(_) => {
                by_name.insert(record.name.clone(), record);
            }
            None => {
                order.push(record.name.clone());
                by_name.insert(record.name.clone(), record);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|name| by_name.remove(&name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn remote(key: Option<&str>, size: Option<i64>, modified: Option<&str>) -> RemoteObject {
        RemoteObject {
            key: key.map(str::to_string),
            size,
            last_modified: modified.map(str::to_string),
        }
    }

    #[test]
    fn file_type_uses_last_suffix_lowercased() {
        assert_eq!(file_type_of("report.tar.gz"), "gz");
        assert_eq!(file_type_of("README"), "");
        assert_eq!(file_type_of("Photo.PNG"), "png");
        assert_eq!(file_type_of("trailing."), "");
        assert_eq!(file_type_of("dir.v2/notes"), "");
    }

    #[test]
    fn parse_timestamp_accepts_rfc3339_and_plain_dates() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-01-01"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01T00:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn remote_object_requires_key_size_and_time() {
        let ok = FileRecord::try_from(remote(Some("x.png"), Some(1024), Some("2024-01-01")))
            .unwrap();
        assert_eq!(ok.size, 1024);
        assert_eq!(ok.file_type, "png");

        assert!(FileRecord::try_from(remote(None, Some(1), Some("2024-01-01"))).is_err());
        assert!(FileRecord::try_from(remote(Some("a"), None, Some("2024-01-01"))).is_err());
        assert!(FileRecord::try_from(remote(Some("a"), Some(-4), Some("2024-01-01"))).is_err());
        assert!(FileRecord::try_from(remote(Some("a"), Some(1), None)).is_err());
        assert!(FileRecord::try_from(remote(Some("dir/"), Some(0), Some("2024-01-01"))).is_err());
    }

    #[test]
    fn listing_skips_invalid_entries_and_dedupes_names() {
        let records = records_from_listing(vec![
            remote(Some("a.txt"), Some(1), Some("2024-01-01")),
            remote(None, Some(1), Some("2024-01-01")),
            remote(Some("b.txt"), Some(2), Some("2024-01-02")),
            remote(Some("a.txt"), Some(3), Some("2024-01-03")),
        ]);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "a.txt");
        assert_eq!(records[0].size, 3);
        assert_eq!(records[1].name, "b.txt");
    }
}

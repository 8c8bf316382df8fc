//! TransferController - mediates every user-triggered bucket operation

use chrono::Utc;
use futures_util::future::join_all;
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use super::progress::{cancel_gated, ProgressHandle, StageGate};
use super::state::InFlightRegistry;
use super::types::{
    DownloadLink, TransferEvent, TransferKind, TransferRequest, TransferState, UploadFile,
};
use crate::config::TransferLimits;
use crate::error::TransferError;
use crate::files::{self, DisplayFilterState, FileRecord};
use crate::storage::{ObjectStorage, RemoteObject};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// The published file list and the newest refresh it already reflects.
#[derive(Default)]
struct FileList {
    files: Arc<Vec<FileRecord>>,
    generation: u64,
}

/// Owns the file list and the in-flight request set for one session.
///
/// The file list is an immutable snapshot that is swapped wholesale on every
/// change, so a reader holding [`TransferController::files`] never observes a
/// partially applied update.
///
/// Every refresh takes a generation number before it lists the bucket. A
/// listing is only installed if nothing newer has been applied since, so a
/// slow listing started before a mutation can't undo what that mutation
/// confirmed.
pub struct TransferController {
    storage: Arc<dyn ObjectStorage>,
    limits: TransferLimits,
    files: RwLock<FileList>,
    refresh_issued: AtomicU64,
    in_flight: InFlightRegistry,
    events: broadcast::Sender<TransferEvent>,
    shutdown: CancellationToken,
    progress_gate: StageGate,
}

impl TransferController {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self::with_limits(storage, TransferLimits::default())
    }

    pub fn with_limits(storage: Arc<dyn ObjectStorage>, limits: TransferLimits) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            storage,
            limits,
            files: RwLock::new(FileList::default()),
            refresh_issued: AtomicU64::new(0),
            in_flight: InFlightRegistry::default(),
            events,
            shutdown: CancellationToken::new(),
            progress_gate: StageGate::default(),
        }
    }

    pub fn limits(&self) -> &TransferLimits {
        &self.limits
    }

    // ============ File List ============

    /// Current file list, in the order the last listing produced.
    pub fn files(&self) -> Arc<Vec<FileRecord>> {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .files
            .clone()
    }

    /// Files matching `filter`, newest first.
    pub fn filtered_files(&self, filter: &DisplayFilterState) -> Vec<FileRecord> {
        files::filtered_files(&self.files(), filter)
    }

    /// Distinct file types, for building the filter controls.
    pub fn available_types(&self) -> BTreeSet<String> {
        files::available_types(&self.files())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files().iter().any(|f| f.name == name)
    }

    /// Install the listing taken by refresh `generation`, unless a newer
    /// refresh or a later confirmed mutation is already in the list.
    fn install_listing(&self, generation: u64, records: Vec<FileRecord>) -> Arc<Vec<FileRecord>> {
        let mut list = self.files.write().unwrap_or_else(PoisonError::into_inner);
        if generation <= list.generation {
            debug!(
                "dropping stale listing #{} ({} files), list is at #{}",
                generation,
                records.len(),
                list.generation
            );
            return list.files.clone();
        }
        list.generation = generation;
        list.files = Arc::new(records);
        list.files.clone()
    }

    /// Apply a confirmed mutation to a copy of the list and publish the copy.
    /// Listings already in flight were taken before the mutation, so they
    /// are marked stale.
    fn update_files(&self, edit: impl FnOnce(&mut Vec<FileRecord>)) {
        let mut list = self.files.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = list.files.as_ref().clone();
        edit(&mut next);
        list.files = Arc::new(next);
        list.generation = list
            .generation
            .max(self.refresh_issued.load(Ordering::SeqCst));
    }

    /// Reload the whole list from storage. Used on initial load and after
    /// every successful mutation. If a newer listing lands first, this one is
    /// discarded and the current list is returned.
    pub async fn refresh(&self) -> Result<Arc<Vec<FileRecord>>, TransferError> {
        let generation = self.refresh_issued.fetch_add(1, Ordering::SeqCst) + 1;
        let objects = self.storage.list_objects().await.map_err(|e| {
            let err = TransferError::from_list(e);
            warn!("refresh failed: {}", err);
            err
        })?;

        let records = files::records_from_listing(objects);
        debug!("refresh #{}: {} files", generation, records.len());
        Ok(self.install_listing(generation, records))
    }

    async fn refresh_after_mutation(&self, action: &str) {
        if let Err(e) = self.refresh().await {
            warn!("refresh after {} failed, keeping local list: {}", action, e);
        }
    }

    // ============ Operations ============

    /// Upload one file. Files over the size limit are rejected before the
    /// storage backend is contacted.
    pub async fn submit_upload(&self, file: UploadFile) -> Result<FileRecord, TransferError> {
        let size = file.size();
        if size > self.limits.max_upload_bytes {
            let err = TransferError::SizeLimitExceeded {
                name: file.name,
                size,
                limit: self.limits.max_upload_bytes,
            };
            warn!("upload rejected: {}", err);
            return Err(err);
        }

        let UploadFile { name, bytes } = file;
        let request = self.in_flight.begin(TransferKind::Upload, &name, Some(size))?;
        request.transition(&self.events, TransferState::InProgress, None);

        match self.storage.upload_object(&name, bytes).await {
            Ok(obj) => {
                let record = uploaded_record(obj, &name, size);
                self.update_files(|list| upsert(list, record.clone()));
                self.refresh_after_mutation("upload").await;
                request.transition(&self.events, TransferState::Succeeded, None);
                Ok(record)
            }
            Err(e) => {
                let err = TransferError::from_storage(e, &name);
                request.transition(&self.events, TransferState::Failed, Some(err.to_string()));
                Err(err)
            }
        }
    }

    /// Upload every dropped file concurrently; one result per file, in input order.
    pub async fn submit_uploads(
        &self,
        files: Vec<UploadFile>,
    ) -> Vec<(String, Result<FileRecord, TransferError>)> {
        info!("submitting {} uploads", files.len());
        join_all(files.into_iter().map(|file| async move {
            let name = file.name.clone();
            (name, self.submit_upload(file).await)
        }))
        .await
    }

    /// Delete a file that is present in the current list.
    pub async fn submit_delete(&self, name: &str) -> Result<(), TransferError> {
        if !self.contains(name) {
            return Err(TransferError::NotFound(name.to_string()));
        }

        let request = self.in_flight.begin(TransferKind::Delete, name, None)?;
        request.transition(&self.events, TransferState::InProgress, None);

        match self.storage.delete_object(name).await {
            Ok(()) => {
                self.update_files(|list| list.retain(|f| f.name != name));
                self.refresh_after_mutation("delete").await;
                request.transition(&self.events, TransferState::Succeeded, None);
                Ok(())
            }
            Err(e) => {
                let err = TransferError::from_storage(e, name);
                request.transition(&self.events, TransferState::Failed, Some(err.to_string()));
                Err(err)
            }
        }
    }

    /// Get a pre-signed download link valid for the configured TTL.
    pub async fn request_download_link(&self, name: &str) -> Result<DownloadLink, TransferError> {
        if !self.contains(name) {
            return Err(TransferError::NotFound(name.to_string()));
        }

        let request = self.in_flight.begin(TransferKind::Download, name, None)?;
        request.transition(&self.events, TransferState::InProgress, None);

        let ttl = self.limits.download_ttl_secs;
        let issued_at = Utc::now();
        match self.storage.get_download_url(name, ttl).await {
            Ok(url) => {
                request.transition(&self.events, TransferState::Succeeded, None);
                Ok(DownloadLink {
                    name: name.to_string(),
                    url,
                    expires_in_secs: ttl,
                    expires_at: issued_at + chrono::Duration::seconds(ttl as i64),
                })
            }
            Err(e) => {
                let err = TransferError::from_storage(e, name);
                request.transition(&self.events, TransferState::Failed, Some(err.to_string()));
                Err(err)
            }
        }
    }

    // ============ Progress & Lifecycle ============

    /// Start the simulated progress display (see [`ProgressHandle`]). Must be
    /// called from within a tokio runtime. After [`shutdown`](Self::shutdown)
    /// the returned handle is already cancelled.
    pub fn report_progress(&self) -> ProgressHandle {
        ProgressHandle::start(
            self.limits.progress_stages,
            self.limits.progress_interval,
            self.shutdown.child_token(),
            self.progress_gate.clone(),
        )
    }

    pub fn in_flight(&self) -> Vec<TransferRequest> {
        self.in_flight.snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TransferEvent> {
        self.events.subscribe()
    }

    /// Tear down the controller: every progress timer stops. Idempotent.
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            info!("transfer controller shutting down");
        }
        cancel_gated(&self.progress_gate, &self.shutdown);
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl Drop for TransferController {
    fn drop(&mut self) {
        cancel_gated(&self.progress_gate, &self.shutdown);
    }
}

/// The record to show right after a successful upload. Backends that only
/// echo the key get the payload size and the current time.
fn uploaded_record(obj: RemoteObject, name: &str, size: u64) -> FileRecord {
    FileRecord::try_from(obj).unwrap_or_else(|_| FileRecord::new(name, size, Utc::now()))
}

fn upsert(list: &mut Vec<FileRecord>, record: FileRecord) {
    match list.iter_mut().find(|f| f.name == record.name) {
        Some(existing) => *existing = record,
        None => list.push(record),
    }
}

//! In-flight request registry and state transitions

use chrono::Utc;
use log::{info, warn};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

use super::types::{TransferEvent, TransferKey, TransferKind, TransferRequest, TransferState};
use crate::error::TransferError;

#[derive(Default)]
pub(crate) struct InFlightRegistry {
    requests: Mutex<HashMap<TransferKey, TransferRequest>>,
}

impl InFlightRegistry {
    fn lock(&self) -> MutexGuard<'_, HashMap<TransferKey, TransferRequest>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new `Pending` request, rejecting a duplicate key.
    pub(crate) fn begin<'a>(
        &'a self,
        kind: TransferKind,
        target_name: &str,
        payload_size: Option<u64>,
    ) -> Result<InFlightGuard<'a>, TransferError> {
        let key = TransferKey::new(kind, target_name);
        let mut requests = self.lock();
        if requests.contains_key(&key) {
            return Err(TransferError::OperationAlreadyInProgress {
                kind,
                name: target_name.to_string(),
            });
        }
        requests.insert(
            key.clone(),
            TransferRequest {
                kind,
                target_name: target_name.to_string(),
                payload_size,
                state: TransferState::Pending,
                started_at: Utc::now(),
            },
        );
        Ok(InFlightGuard {
            registry: self,
            key,
        })
    }

    pub(crate) fn snapshot(&self) -> Vec<TransferRequest> {
        let mut requests: Vec<TransferRequest> = self.lock().values().cloned().collect();
        requests.sort_by(|a, b| a.started_at.cmp(&b.started_at));
        requests
    }

    fn set_state(&self, key: &TransferKey, next: TransferState) -> bool {
        match self.lock().get_mut(key) {
            Some(request) if request.state.can_transition_to(next) => {
                request.state = next;
                true
            }
            _ => false,
        }
    }
}

/// Owns one in-flight slot. Dropping it releases the key, so a request whose
/// future is abandoned mid-flight never blocks a later resubmission.
pub(crate) struct InFlightGuard<'a> {
    registry: &'a InFlightRegistry,
    key: TransferKey,
}

impl InFlightGuard<'_> {
    /// Move the request to `next`, logging and broadcasting the change.
    /// Illegal transitions are ignored.
    pub(crate) fn transition(
        &self,
        events: &broadcast::Sender<TransferEvent>,
        next: TransferState,
        error: Option<String>,
    ) {
        if !self.registry.set_state(&self.key, next) {
            warn!(
                "transfer_state: ignoring {} for {} {}",
                next, self.key.kind, self.key.target_name
            );
            return;
        }

        match error.as_ref() {
            Some(err) => warn!(
                "transfer_state: {} {} -> {} error={}",
                self.key.kind, self.key.target_name, next, err
            ),
            None => info!(
                "transfer_state: {} {} -> {}",
                self.key.kind, self.key.target_name, next
            ),
        }

        let _ = events.send(TransferEvent {
            kind: self.key.kind,
            target_name: self.key.target_name.clone(),
            state: next,
            error,
        });
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_key_is_rejected_until_guard_drops() {
        let registry = InFlightRegistry::default();
        let guard = registry.begin(TransferKind::Upload, "a.txt", Some(3)).unwrap();

        let err = registry
            .begin(TransferKind::Upload, "a.txt", Some(3))
            .err()
            .unwrap();
        assert!(matches!(err, TransferError::OperationAlreadyInProgress { .. }));

        // Same name, different kind is a different key.
        let delete = registry.begin(TransferKind::Delete, "a.txt", None).unwrap();
        assert_eq!(registry.snapshot().len(), 2);

        drop(guard);
        drop(delete);
        assert!(registry.snapshot().is_empty());
        assert!(registry.begin(TransferKind::Upload, "a.txt", None).is_ok());
    }

    #[test]
    fn transitions_follow_state_machine_and_emit_events() {
        let registry = InFlightRegistry::default();
        let (tx, mut rx) = broadcast::channel(8);
        let guard = registry.begin(TransferKind::Delete, "b.txt", None).unwrap();

        guard.transition(&tx, TransferState::Succeeded, None);
        assert_eq!(registry.snapshot()[0].state, TransferState::Pending);
        assert!(rx.try_recv().is_err());

        guard.transition(&tx, TransferState::InProgress, None);
        guard.transition(&tx, TransferState::Failed, Some("boom".into()));
        assert_eq!(registry.snapshot()[0].state, TransferState::Failed);

        assert_eq!(rx.try_recv().unwrap().state, TransferState::InProgress);
        let failed = rx.try_recv().unwrap();
        assert_eq!(failed.state, TransferState::Failed);
        assert_eq!(failed.error.as_deref(), Some("boom"));
    }
}

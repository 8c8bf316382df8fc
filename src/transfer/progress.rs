//! Simulated transfer progress
//!
//! The stages reported here are a perceived-progress animation driven by a
//! timer. They are not a measurement: nothing links them to the bytes an
//! upload has actually sent, so the display can reach its last stage before
//! the upload resolves, or the upload can finish first. UI text built on this
//! must not present it as real progress.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Serializes stage publishes against cancellation. Timers publish under the
/// read side; cancelling takes the write side, so once a cancel returns no
/// timer sharing the gate can publish another stage.
pub(crate) type StageGate = Arc<RwLock<()>>;

/// Cancel `token` with every timer sharing `gate` held off.
pub(crate) fn cancel_gated(gate: &StageGate, token: &CancellationToken) {
    let _publishing = gate.write().unwrap_or_else(PoisonError::into_inner);
    token.cancel();
}

/// Handle to one running simulation. Dropping the handle cancels it.
#[derive(Debug)]
pub struct ProgressHandle {
    stage: watch::Receiver<u32>,
    total_stages: u32,
    cancel: CancellationToken,
    gate: StageGate,
}

impl ProgressHandle {
    /// Spawn the stage timer on the current tokio runtime. Stage 0 is
    /// reported immediately, then one stage per `cadence` up to
    /// `total_stages`. Cancelling `cancel` (or any parent of it) stops the
    /// timer before its next transition; cancellations of a parent must go
    /// through [`cancel_gated`] with the same `gate`.
    pub(crate) fn start(
        total_stages: u32,
        cadence: Duration,
        cancel: CancellationToken,
        gate: StageGate,
    ) -> Self {
        let (tx, rx) = watch::channel(0u32);
        let token = cancel.clone();
        let timer_gate = gate.clone();

        tokio::spawn(async move {
            let mut ticker = interval(cadence);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; stage 0 is already published.
            ticker.tick().await;

            let mut stage = 0u32;
            while stage < total_stages {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        stage += 1;
                        let published = {
                            let _publishing =
                                timer_gate.read().unwrap_or_else(PoisonError::into_inner);
                            tx.send_if_modified(|current| {
                                if token.is_cancelled() {
                                    return false;
                                }
                                *current = stage;
                                true
                            })
                        };
                        if !published {
                            break;
                        }
                    }
                }
            }
            log::debug!("progress simulation stopped at stage {}/{}", stage, total_stages);
        });

        Self {
            stage: rx,
            total_stages,
            cancel,
            gate,
        }
    }

    pub fn stage(&self) -> u32 {
        *self.stage.borrow()
    }

    pub fn total_stages(&self) -> u32 {
        self.total_stages
    }

    /// Percentage of the simulated stages shown so far.
    pub fn percent(&self) -> u32 {
        if self.total_stages == 0 {
            return 100;
        }
        self.stage() * 100 / self.total_stages
    }

    pub fn is_complete(&self) -> bool {
        self.stage() >= self.total_stages
    }

    /// Wait for the next stage. Returns `None` once the simulation has
    /// finished or was cancelled.
    pub async fn next_stage(&mut self) -> Option<u32> {
        if self.cancel.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            changed = self.stage.changed() => changed.ok().map(|_| *self.stage.borrow_and_update()),
        }
    }

    /// Stop the simulation. Calling this more than once has no further effect.
    pub fn cancel(&self) {
        cancel_gated(&self.gate, &self.cancel);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for ProgressHandle {
    fn drop(&mut self) {
        cancel_gated(&self.gate, &self.cancel);
    }
}

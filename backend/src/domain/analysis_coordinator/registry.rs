//! Supervision of background analyses.
//!
//! At most one analysis runs per record. Each run holds an [`AnalysisClaim`]
//! that removes its registry entry when dropped, so a panicking or cancelled
//! task cannot leave a record permanently locked.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use crate::domain::{RecordId, TraceId};

/// Returned when a record already has an analysis in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("an analysis is already running for record {record_id}")]
pub struct AnalysisAlreadyRunning {
    /// Record that is busy.
    pub record_id: RecordId,
}

/// Why a running analysis was asked to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The record was deleted; nothing should be written for it.
    Deleted,
    /// The process is shutting down; the record must not stay `processing`.
    Shutdown,
}

#[derive(Debug)]
struct InFlight {
    generation: u64,
    token: CancellationToken,
}

/// Registry of in-flight analyses and the tasks running them.
#[derive(Debug, Default)]
pub struct AnalysisRegistry {
    in_flight: Mutex<HashMap<RecordId, InFlight>>,
    next_generation: AtomicU64,
    shutting_down: AtomicBool,
    tasks: TaskTracker,
}

impl AnalysisRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `record_id` for a new analysis.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use finlens::domain::{AnalysisRegistry, RecordId};
    ///
    /// let registry = Arc::new(AnalysisRegistry::new());
    /// let claim = registry.try_claim(RecordId::new(7)).expect("first claim");
    /// assert!(registry.try_claim(RecordId::new(7)).is_err());
    /// drop(claim);
    /// assert!(registry.try_claim(RecordId::new(7)).is_ok());
    /// ```
    pub fn try_claim(
        self: &Arc<Self>,
        record_id: RecordId,
    ) -> Result<AnalysisClaim, AnalysisAlreadyRunning> {
        let mut in_flight = self.lock();
        if in_flight.contains_key(&record_id) {
            return Err(AnalysisAlreadyRunning { record_id });
        }
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        in_flight.insert(
            record_id,
            InFlight {
                generation,
                token: token.clone(),
            },
        );
        Ok(AnalysisClaim {
            registry: Arc::clone(self),
            record_id,
            generation,
            token,
        })
    }

    /// Signal cancellation to the analysis running for `record_id`.
    ///
    /// The entry stays registered until the task observes the signal and
    /// drops its claim. Returns whether an analysis was running.
    pub fn cancel(&self, record_id: RecordId) -> bool {
        match self.lock().get(&record_id) {
            Some(entry) => {
                entry.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Signal cancellation to every running analysis.
    pub fn cancel_all(&self) -> usize {
        let in_flight = self.lock();
        for entry in in_flight.values() {
            entry.token.cancel();
        }
        in_flight.len()
    }

    /// Whether `record_id` currently has an analysis registered.
    #[must_use]
    pub fn is_in_flight(&self, record_id: RecordId) -> bool {
        self.lock().contains_key(&record_id)
    }

    /// Number of registered analyses.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.lock().len()
    }

    /// Spawn a supervised task bound to the caller's trace identifier.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.spawn(TraceId::propagate(task));
    }

    /// Wait for every spawned task to finish without cancelling them.
    pub async fn wait_idle(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }

    /// Whether [`shutdown`](Self::shutdown) has started.
    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }

    /// Cancel running analyses and wait up to `grace` for their tasks to
    /// exit. Returns `false` when the grace period elapsed first.
    ///
    /// Tasks observe [`CancelReason::Shutdown`] and may use the grace period
    /// to record the interruption.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.shutting_down.store(true, Ordering::Release);
        let cancelled = self.cancel_all();
        self.tasks.close();
        let drained = tokio::time::timeout(grace, self.tasks.wait()).await.is_ok();
        if drained {
            debug!(cancelled, "analysis tasks drained");
        } else {
            warn!(
                cancelled,
                remaining = self.tasks.len(),
                "analysis tasks still running after shutdown grace period"
            );
        }
        drained
    }

    fn release(&self, record_id: RecordId, generation: u64) {
        let mut in_flight = self.lock();
        if in_flight
            .get(&record_id)
            .is_some_and(|entry| entry.generation == generation)
        {
            in_flight.remove(&record_id);
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RecordId, InFlight>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exclusive right to analyse one record. Dropping it frees the record.
#[derive(Debug)]
pub struct AnalysisClaim {
    registry: Arc<AnalysisRegistry>,
    record_id: RecordId,
    generation: u64,
    token: CancellationToken,
}

impl AnalysisClaim {
    /// Record this claim covers.
    #[must_use]
    pub fn record_id(&self) -> RecordId {
        self.record_id
    }

    /// Token cancelled by [`AnalysisRegistry::cancel`] and shutdown.
    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Reason for cancellation, or `None` while the claim is live.
    #[must_use]
    pub fn cancel_reason(&self) -> Option<CancelReason> {
        if !self.token.is_cancelled() {
            return None;
        }
        if self.registry.is_shutting_down() {
            Some(CancelReason::Shutdown)
        } else {
            Some(CancelReason::Deleted)
        }
    }
}

impl Drop for AnalysisClaim {
    fn drop(&mut self) {
        self.registry.release(self.record_id, self.generation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn registry() -> Arc<AnalysisRegistry> {
        Arc::new(AnalysisRegistry::new())
    }

    #[rstest]
    fn second_claim_for_same_record_is_rejected() {
        let registry = registry();
        let _claim = registry.try_claim(RecordId::new(1)).expect("first claim");
        let err = registry.try_claim(RecordId::new(1)).expect_err("busy");
        assert_eq!(err.record_id, RecordId::new(1));
    }

    #[rstest]
    fn claims_for_different_records_coexist() {
        let registry = registry();
        let _a = registry.try_claim(RecordId::new(1)).expect("claim a");
        let _b = registry.try_claim(RecordId::new(2)).expect("claim b");
        assert_eq!(registry.in_flight_count(), 2);
    }

    #[rstest]
    fn dropping_claim_releases_record() {
        let registry = registry();
        let claim = registry.try_claim(RecordId::new(3)).expect("claim");
        assert!(registry.is_in_flight(RecordId::new(3)));
        drop(claim);
        assert!(!registry.is_in_flight(RecordId::new(3)));
    }

    #[rstest]
    fn cancel_signals_token_but_keeps_entry_until_release() {
        let registry = registry();
        let claim = registry.try_claim(RecordId::new(4)).expect("claim");
        assert!(registry.cancel(RecordId::new(4)));
        assert!(claim.token().is_cancelled());
        assert!(registry.is_in_flight(RecordId::new(4)));
        assert!(!registry.cancel(RecordId::new(5)));
    }

    #[rstest]
    fn cancel_all_reaches_every_claim() {
        let registry = registry();
        let a = registry.try_claim(RecordId::new(1)).expect("claim a");
        let b = registry.try_claim(RecordId::new(2)).expect("claim b");
        assert_eq!(registry.cancel_all(), 2);
        assert!(a.token().is_cancelled() && b.token().is_cancelled());
    }

    #[tokio::test]
    async fn shutdown_waits_for_cancelled_tasks() {
        let registry = registry();
        let claim = registry.try_claim(RecordId::new(9)).expect("claim");
        registry.spawn(async move {
            claim.token().cancelled().await;
        });
        assert!(registry.shutdown(Duration::from_secs(1)).await);
        assert_eq!(registry.in_flight_count(), 0);
    }

    #[rstest]
    fn cancel_reason_distinguishes_delete_from_shutdown() {
        let registry = registry();
        let claim = registry.try_claim(RecordId::new(6)).expect("claim");
        assert_eq!(claim.cancel_reason(), None);
        registry.cancel(RecordId::new(6));
        assert_eq!(claim.cancel_reason(), Some(CancelReason::Deleted));
    }

    #[tokio::test]
    async fn shutdown_cancels_with_shutdown_reason() {
        let registry = registry();
        let claim = registry.try_claim(RecordId::new(8)).expect("claim");
        let (tx, rx) = tokio::sync::oneshot::channel();
        registry.spawn(async move {
            claim.token().cancelled().await;
            let _ = tx.send(claim.cancel_reason());
        });
        assert!(registry.shutdown(Duration::from_secs(1)).await);
        assert!(registry.is_shutting_down());
        assert_eq!(rx.await.expect("reason sent"), Some(CancelReason::Shutdown));
    }

    #[tokio::test]
    async fn wait_idle_leaves_registry_usable() {
        let registry = registry();
        registry.spawn(async {});
        registry.wait_idle().await;
        registry.spawn(async {});
        registry.wait_idle().await;
        assert!(registry.try_claim(RecordId::new(1)).is_ok());
    }
}

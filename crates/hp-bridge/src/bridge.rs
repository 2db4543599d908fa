//! Save bridge: hands save payloads to the store and reports the outcome.
//!
//! Every save is sent as soon as it is requested. There is no queue, no
//! coalescing, no retry, and no cancellation, so two saves in flight race
//! and their reports come back in the order the store answers them. Each
//! report carries the sequence number handed out when the save was
//! requested, so the shell can tell which request it is looking at.

use crate::store::PlannerStore;
use hp_core::{HexError, HexResult, PlannerRecord, SavePayload};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

/// How a save ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// The planner as stored after the save.
    Saved(PlannerRecord),
    /// Always a [`HexError::PersistenceFailure`].
    Failed(HexError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveReport {
    /// Request order, starting at 1.
    pub seq: u64,
    pub outcome: SaveOutcome,
}

impl SaveReport {
    pub fn is_saved(&self) -> bool {
        matches!(self.outcome, SaveOutcome::Saved(_))
    }

    /// The user-facing message, for the shell's toast.
    pub fn message(&self) -> String {
        match &self.outcome {
            SaveOutcome::Saved(_) => "Planner saved".to_string(),
            SaveOutcome::Failed(e) => format!("Error saving planner: {e}"),
        }
    }
}

pub struct SaveBridge {
    store: Arc<dyn PlannerStore>,
    planner_id: String,
    timeout: Option<Duration>,
    seq: AtomicU64,
    reports: mpsc::UnboundedSender<SaveReport>,
}

impl SaveBridge {
    /// A bridge for one planner, plus the receiving end of its report
    /// channel (fed by [`SaveBridge::submit`]).
    pub fn new(
        store: Arc<dyn PlannerStore>,
        planner_id: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<SaveReport>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let bridge = Self {
            store,
            planner_id: planner_id.into(),
            timeout: None,
            seq: AtomicU64::new(0),
            reports: tx,
        };
        (bridge, rx)
    }

    /// Give up on a save after `timeout`. The request itself is not
    /// cancelled at the store; only the report is.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn planner_id(&self) -> &str {
        &self.planner_id
    }

    /// Fetch the planner for mounting.
    pub async fn load(&self) -> HexResult<PlannerRecord> {
        log::info!("loading planner {}", self.planner_id);
        self.store.load(&self.planner_id).await
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Send one save and wait for its outcome.
    pub async fn save(&self, payload: SavePayload) -> SaveReport {
        let seq = self.next_seq();
        run_save(
            Arc::clone(&self.store),
            self.planner_id.clone(),
            self.timeout,
            seq,
            payload,
        )
        .await
    }

    /// Send a save in the background. The report arrives on the channel
    /// returned by [`SaveBridge::new`]. Returns the save's sequence number.
    ///
    /// Needs a running tokio runtime.
    pub fn submit(&self, payload: SavePayload) -> HexResult<u64> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| HexError::PersistenceFailure(format!("no async runtime: {e}")))?;
        let seq = self.next_seq();
        let store = Arc::clone(&self.store);
        let planner_id = self.planner_id.clone();
        let timeout = self.timeout;
        let reports = self.reports.clone();
        handle.spawn(async move {
            let report = run_save(store, planner_id, timeout, seq, payload).await;
            if reports.send(report).is_err() {
                log::debug!("save #{seq} finished after the report channel closed");
            }
        });
        Ok(seq)
    }
}

async fn run_save(
    store: Arc<dyn PlannerStore>,
    planner_id: String,
    timeout: Option<Duration>,
    seq: u64,
    payload: SavePayload,
) -> SaveReport {
    log::info!(
        "save #{seq} of planner {planner_id}: {} hexagons, {} connections",
        payload.hexagons.len(),
        payload.connections.len()
    );
    let request = store.save(&planner_id, payload);
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, request).await {
            Ok(result) => result,
            Err(_) => Err(HexError::PersistenceFailure(format!(
                "no answer within {limit:?}"
            ))),
        },
        None => request.await,
    };

    let outcome = match result {
        Ok(record) => {
            log::info!("save #{seq} of planner {planner_id} stored");
            SaveOutcome::Saved(record)
        }
        Err(e) => {
            let e = if e.is_persistence() {
                e
            } else {
                HexError::PersistenceFailure(e.to_string())
            };
            log::warn!("save #{seq} of planner {planner_id} failed: {e}");
            SaveOutcome::Failed(e)
        }
    };
    SaveReport { seq, outcome }
}

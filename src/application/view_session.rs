// View session - Holds the single authoritative snapshot for one view
use crate::application::fetch_orchestrator::FetchRound;
use crate::domain::filter::FilterSelection;
use crate::domain::record::Record;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub generation: u64,
    pub filter: FilterSelection,
    pub records: Vec<Record>,
    pub failed_months: Vec<String>,
}

impl Snapshot {
    /// What the views show before any round has landed.
    pub fn empty() -> Self {
        Self {
            generation: 0,
            filter: FilterSelection::new(),
            records: Vec::new(),
            failed_months: Vec::new(),
        }
    }
}

impl From<FetchRound> for Snapshot {
    fn from(round: FetchRound) -> Self {
        Self {
            generation: round.generation,
            filter: round.filter,
            records: round.records,
            failed_months: round.failed_months,
        }
    }
}

/// Generation-token gate in front of the current snapshot.
///
/// Only the round carrying the most recently issued token may replace the
/// snapshot; anything older is dropped on arrival.
#[derive(Default)]
pub struct ViewSession {
    latest_issued: AtomicU64,
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl ViewSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new token, superseding every round still in flight.
    pub fn begin_round(&self) -> u64 {
        self.latest_issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn latest_issued(&self) -> u64 {
        self.latest_issued.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.latest_issued()
    }

    /// Apply a finished round. Returns `false` if it was stale.
    pub async fn commit(&self, round: FetchRound) -> bool {
        let mut current = self.current.write().await;

        // Checked under the write lock so a newer commit cannot interleave.
        if !self.is_current(round.generation) {
            tracing::debug!(
                generation = round.generation,
                latest = self.latest_issued(),
                "Discarding stale fetch round"
            );
            return false;
        }

        *current = Some(Arc::new(Snapshot::from(round)));
        true
    }

    pub async fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.current.read().await.clone()
    }
}

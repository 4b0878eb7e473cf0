use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

use super::reported_method::{AggregatedRecord, ReportedMethod};
use crate::measurement::Measurement;

/// Thread-safe aggregation table keyed by full path.
///
/// Rows keep insertion order, so `export()` lists paths in the order they
/// were first reported.
pub struct AggregationStore {
    session_id: Uuid,
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    index: HashMap<String, usize>,
    rows: Vec<Arc<ReportedMethod>>,
}

impl AggregationStore {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Identifies this store; a fresh one is minted on every `prepare()`.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Add one call to the row for the measurement's full path, creating
    /// the row on first sight.
    pub fn report(&self, measurement: &Measurement) {
        let row = self.row_for(measurement);
        row.increment(measurement.elapsed_ms(), measurement.recorded_at());
    }

    /// Snapshot of every row, in first-report order. Does not mutate.
    pub fn export(&self) -> Vec<AggregatedRecord> {
        self.inner.read().rows.iter().map(|row| row.snapshot()).collect()
    }

    pub fn get(&self, full_path: &str) -> Option<AggregatedRecord> {
        let inner = self.inner.read();
        inner
            .index
            .get(full_path)
            .map(|&i| inner.rows[i].snapshot())
    }

    pub fn len(&self) -> usize {
        self.inner.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up the row, or insert it. The second lookup under the write
    /// lock keeps racing first-reporters from creating two rows.
    fn row_for(&self, measurement: &Measurement) -> Arc<ReportedMethod> {
        let full_path = measurement.full_path();

        {
            let inner = self.inner.read();
            if let Some(&i) = inner.index.get(&full_path) {
                return inner.rows[i].clone();
            }
        }

        let mut inner = self.inner.write();
        if let Some(&i) = inner.index.get(&full_path) {
            return inner.rows[i].clone();
        }

        tracing::debug!(session = %self.session_id, path = %full_path, "tracking new path");
        let row = Arc::new(ReportedMethod::new(measurement));
        let idx = inner.rows.len();
        inner.rows.push(row.clone());
        inner.index.insert(full_path, idx);
        row
    }
}

impl Default for AggregationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AggregationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregationStore")
            .field("session_id", &self.session_id)
            .field("paths", &self.len())
            .finish()
    }
}

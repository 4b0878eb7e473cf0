use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::reported_method::AggregatedRecord;
use super::store::AggregationStore;
use crate::configuration::Configuration;
use crate::measurement::Measurement;

/// Lifecycle façade over the aggregation store.
///
/// Unprepared until `prepare()` installs a store through the
/// configuration's store slot. While unprepared, `report` and `export`
/// log a warning and do nothing; they never panic and never create a store.
#[derive(Clone, Copy)]
pub struct Manager<'c> {
    config: &'c Configuration,
}

impl<'c> Manager<'c> {
    pub fn new(config: &'c Configuration) -> Self {
        Self { config }
    }

    /// Manager over `Configuration::global()`.
    pub fn global() -> Manager<'static> {
        Manager::new(Configuration::global())
    }

    /// Install a brand-new empty store, discarding whatever was there.
    pub fn prepare(&self) {
        let store = Arc::new(AggregationStore::new());
        tracing::info!(session = %store.session_id(), "profiling manager prepared");
        self.config.store_slot().install(Some(store));
    }

    pub fn is_prepared(&self) -> bool {
        self.store().is_some()
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.store().map(|s| s.session_id())
    }

    pub fn report(&self, measurement: &Measurement) {
        match self.store() {
            Some(store) => store.report(measurement),
            None => warn_unprepared(),
        }
    }

    /// All aggregated records, in first-report order. Empty when unprepared.
    pub fn export(&self) -> Vec<AggregatedRecord> {
        match self.store() {
            Some(store) => store.export(),
            None => {
                warn_unprepared();
                Vec::new()
            }
        }
    }

    /// `export()` as a JSON array.
    pub fn export_json(&self) -> Value {
        json_array_or_empty(&self.export())
    }

    fn store(&self) -> Option<Arc<AggregationStore>> {
        self.config.store_slot().get()
    }
}

fn warn_unprepared() {
    tracing::warn!(
        "profiling manager is not prepared; call Manager::prepare before reporting measurements or exporting reported methods"
    );
}

fn json_array_or_empty<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to serialize reported methods; exporting an empty array");
        Value::Array(Vec::new())
    })
}

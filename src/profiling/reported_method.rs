use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

use crate::measurement::{CallSite, Measurement};

// ─── Live row ────────────────────────────────────────────────────

/// One live row of the aggregation table.
///
/// Identity is frozen from the first measurement seen for the path; only
/// the counters move afterwards.
pub(crate) struct ReportedMethod {
    call: CallSite,
    full_path: String,
    method_path: String,
    counters: Mutex<Counters>,
}

struct Counters {
    runtime_sum: f64,
    call_count: u64,
    first_reported_at: DateTime<Utc>,
    last_reported_at: DateTime<Utc>,
}

impl ReportedMethod {
    /// Seed a zeroed row from the measurement's identity.
    pub(crate) fn new(measurement: &Measurement) -> Self {
        let call = measurement.call_site().clone();
        Self {
            full_path: call.full_path(),
            method_path: call.method_path(),
            call,
            counters: Mutex::new(Counters {
                runtime_sum: 0.0,
                call_count: 0,
                first_reported_at: measurement.recorded_at(),
                last_reported_at: measurement.recorded_at(),
            }),
        }
    }

    /// Add one call. Sum and count move together under the row lock.
    pub(crate) fn increment(&self, runtime_ms: f64, at: DateTime<Utc>) {
        let mut c = self.counters.lock();
        c.runtime_sum += runtime_ms;
        c.call_count += 1;
        if at > c.last_reported_at {
            c.last_reported_at = at;
        }
    }

    pub(crate) fn snapshot(&self) -> AggregatedRecord {
        let c = self.counters.lock();
        AggregatedRecord {
            class_name: self.call.class_name.clone(),
            method_name: self.call.method_name.clone(),
            segment: self.call.segment.clone(),
            metadata: self.call.metadata.clone(),
            full_path: self.full_path.clone(),
            method_path: self.method_path.clone(),
            runtime_sum: c.runtime_sum,
            call_count: c.call_count,
            first_reported_at: c.first_reported_at,
            last_reported_at: c.last_reported_at,
        }
    }
}

// ─── Exported snapshot ───────────────────────────────────────────

/// Accumulated statistics for one full path, as returned by `export()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRecord {
    class_name: String,
    method_name: String,
    segment: Option<String>,
    metadata: Option<Value>,
    full_path: String,
    method_path: String,
    /// Milliseconds
    runtime_sum: f64,
    call_count: u64,
    first_reported_at: DateTime<Utc>,
    last_reported_at: DateTime<Utc>,
}

impl AggregatedRecord {
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn segment(&self) -> Option<&str> {
        self.segment.as_deref()
    }

    pub fn metadata(&self) -> Option<&Value> {
        self.metadata.as_ref()
    }

    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    pub fn method_path(&self) -> &str {
        &self.method_path
    }

    /// Total runtime across all reported calls, in milliseconds.
    pub fn runtime_sum(&self) -> f64 {
        self.runtime_sum
    }

    pub fn call_count(&self) -> u64 {
        self.call_count
    }

    /// `runtime_sum / call_count`, or 0 for a row with no calls.
    pub fn mean_runtime(&self) -> f64 {
        if self.call_count == 0 {
            0.0
        } else {
            self.runtime_sum / self.call_count as f64
        }
    }

    pub fn first_reported_at(&self) -> DateTime<Utc> {
        self.first_reported_at
    }

    pub fn last_reported_at(&self) -> DateTime<Utc> {
        self.last_reported_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn measurement(call: CallSite, ms: u64) -> Measurement {
        let t0 = Instant::now();
        Measurement::new(call, t0, t0 + Duration::from_millis(ms))
    }

    #[test]
    fn test_new_row_is_zeroed() {
        let m = measurement(CallSite::new("Foo", "bar").with_segment("x"), 3);
        let row = ReportedMethod::new(&m).snapshot();

        assert_eq!(row.full_path(), "Foo#bar:x");
        assert_eq!(row.method_path(), "Foo#bar");
        assert_eq!(row.segment(), Some("x"));
        assert_eq!(row.call_count(), 0);
        assert_eq!(row.runtime_sum(), 0.0);
        assert_eq!(row.mean_runtime(), 0.0);
    }

    #[test]
    fn test_increment_accumulates() {
        let m = measurement(CallSite::new("Foo", "bar"), 10);
        let row = ReportedMethod::new(&m);
        row.increment(10.0, m.recorded_at());
        row.increment(20.0, m.recorded_at());

        let snap = row.snapshot();
        assert_eq!(snap.call_count(), 2);
        assert_eq!(snap.runtime_sum(), 30.0);
        assert_eq!(snap.mean_runtime(), 15.0);
    }

    #[test]
    fn test_serializes_paths() {
        let m = measurement(CallSite::new("Foo", "bar"), 1);
        let json = serde_json::to_value(ReportedMethod::new(&m).snapshot()).unwrap();
        assert_eq!(json["full_path"], "Foo#bar");
        assert_eq!(json["call_count"], 0);
        assert!(json["segment"].is_null());
    }
}

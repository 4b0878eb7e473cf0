use std::time::Instant;

use chrono::{DateTime, Utc};
use serde_json::Value;

// ─── Call identity ───────────────────────────────────────────────

/// Identity of a tracked operation: who was called, and under which
/// aggregation bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSite {
    /// e.g. "OrderService"
    pub class_name: String,
    /// e.g. "checkout"
    pub method_name: String,
    /// Optional disambiguator, e.g. a request type. Splits one method into
    /// several independent aggregation buckets.
    pub segment: Option<String>,
    /// Opaque host data, carried onto the aggregated record unexamined.
    pub metadata: Option<Value>,
}

impl CallSite {
    pub fn new(class_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
            segment: None,
            metadata: None,
        }
    }

    pub fn with_segment(mut self, segment: impl Into<String>) -> Self {
        self.segment = Some(segment.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// `Class#method`
    pub fn method_path(&self) -> String {
        format!("{}#{}", self.class_name, self.method_name)
    }

    /// The aggregation key: `Class#method`, or `Class#method:segment`.
    pub fn full_path(&self) -> String {
        match &self.segment {
            Some(segment) => format!("{}:{}", self.method_path(), segment),
            None => self.method_path(),
        }
    }
}

// ─── Measurement ─────────────────────────────────────────────────

/// One completed call's identity and timing. Immutable once built.
#[derive(Debug, Clone)]
pub struct Measurement {
    call: CallSite,
    t0: Instant,
    t1: Instant,
    recorded_at: DateTime<Utc>,
}

impl Measurement {
    /// Build from a caller-supplied `(t0, t1)` pair. `t1 < t0` is accepted
    /// and yields a negative elapsed time.
    pub fn new(call: CallSite, t0: Instant, t1: Instant) -> Self {
        Self {
            call,
            t0,
            t1,
            recorded_at: Utc::now(),
        }
    }

    pub fn call_site(&self) -> &CallSite {
        &self.call
    }

    pub fn class_name(&self) -> &str {
        &self.call.class_name
    }

    pub fn method_name(&self) -> &str {
        &self.call.method_name
    }

    pub fn segment(&self) -> Option<&str> {
        self.call.segment.as_deref()
    }

    pub fn metadata(&self) -> Option<&Value> {
        self.call.metadata.as_ref()
    }

    pub fn t0(&self) -> Instant {
        self.t0
    }

    pub fn t1(&self) -> Instant {
        self.t1
    }

    /// Wall-clock time at which the measurement was built.
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn method_path(&self) -> String {
        self.call.method_path()
    }

    pub fn full_path(&self) -> String {
        self.call.full_path()
    }

    /// `(t1 - t0)` in fractional milliseconds, signed.
    pub fn elapsed_ms(&self) -> f64 {
        match self.t1.checked_duration_since(self.t0) {
            Some(d) => d.as_secs_f64() * 1000.0,
            None => -(self.t0.duration_since(self.t1).as_secs_f64() * 1000.0),
        }
    }
}

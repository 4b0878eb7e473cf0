use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use crate::configuration::Configuration;
use crate::measurement::CallSite;
use crate::timing;

/// Call-site decorator: binds a class name (plus optional segment and
/// metadata) once, then times any number of method calls under it.
///
/// ```ignore
/// let tracker = Tracker::of::<OrderService>();
/// let total = tracker.track("checkout", || service.checkout(&cart));
/// ```
#[derive(Clone)]
pub struct Tracker {
    class_name: String,
    segment: Option<String>,
    metadata: Option<Value>,
    config: Option<Arc<Configuration>>,
}

impl Tracker {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            segment: None,
            metadata: None,
            config: None,
        }
    }

    /// Named after `T`'s last path segment, e.g. `OrderService`.
    pub fn of<T: ?Sized>() -> Self {
        Self::new(short_type_name(std::any::type_name::<T>()))
    }

    pub fn with_segment(mut self, segment: impl Into<String>) -> Self {
        self.segment = Some(segment.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Use `config` instead of `Configuration::global()`.
    pub fn with_config(mut self, config: Arc<Configuration>) -> Self {
        self.config = Some(config);
        self
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn call_site(&self, method_name: impl Into<String>) -> CallSite {
        CallSite {
            class_name: self.class_name.clone(),
            method_name: method_name.into(),
            segment: self.segment.clone(),
            metadata: self.metadata.clone(),
        }
    }

    pub fn track<T>(&self, method_name: &str, work: impl FnOnce() -> T) -> T {
        timing::measure_with(self.config(), self.call_site(method_name), work)
    }

    pub fn try_track<T, E>(&self, method_name: &str, work: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        timing::try_measure_with(self.config(), self.call_site(method_name), work)
    }

    pub async fn track_async<F: Future>(&self, method_name: &str, work: F) -> F::Output {
        timing::measure_async_with(self.config(), self.call_site(method_name), work).await
    }

    fn config(&self) -> &Configuration {
        self.config.as_deref().unwrap_or(Configuration::global())
    }
}

/// `a::b::Foo<c::Bar>` → `Foo<c::Bar>`
fn short_type_name(full: &str) -> &str {
    let head = full.split('<').next().unwrap_or(full);
    match head.rfind("::") {
        Some(i) => &full[i + 2..],
        None => full,
    }
}

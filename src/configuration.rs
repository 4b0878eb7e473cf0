use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::error::{BoxError, Error};
use crate::measurement::Measurement;
use crate::profiling::{AggregationStore, Manager};

// ─── Hook types ──────────────────────────────────────────────────

/// Runs once per successful `measure()` call.
pub type PostMeasuringHook = Arc<dyn Fn(&Measurement) -> Result<(), BoxError> + Send + Sync>;

/// Receives post-measuring hook failures together with the class name.
pub type ErrorRecoveryHook = Arc<dyn Fn(&Error, &str) + Send + Sync>;

/// Where the manager keeps its aggregation store.
///
/// `install(None)` empties the slot, leaving the manager unprepared.
pub trait StoreSlot: Send + Sync {
    fn install(&self, store: Option<Arc<AggregationStore>>);
    fn get(&self) -> Option<Arc<AggregationStore>>;
}

/// Default slot: one shared cell.
#[derive(Default)]
pub struct SharedSlot {
    store: RwLock<Option<Arc<AggregationStore>>>,
}

impl SharedSlot {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoreSlot for SharedSlot {
    fn install(&self, store: Option<Arc<AggregationStore>>) {
        *self.store.write() = store;
    }

    fn get(&self) -> Option<Arc<AggregationStore>> {
        self.store.read().clone()
    }
}

/// Adapts a host-supplied (set, get) closure pair into a `StoreSlot`.
struct AccessorSlot<S, G> {
    set: S,
    get: G,
}

impl<S, G> StoreSlot for AccessorSlot<S, G>
where
    S: Fn(Option<Arc<AggregationStore>>) + Send + Sync,
    G: Fn() -> Option<Arc<AggregationStore>> + Send + Sync,
{
    fn install(&self, store: Option<Arc<AggregationStore>>) {
        (self.set)(store)
    }

    fn get(&self) -> Option<Arc<AggregationStore>> {
        (self.get)()
    }
}

// ─── Configuration ───────────────────────────────────────────────

/// The replaceable behaviours used by `measure()` and `Manager`.
///
/// Every setter takes `&self`; the last write wins and is visible to
/// subsequent reads. Hooks are cloned out of their lock before being
/// called, so a hook may reconfigure without deadlocking.
pub struct Configuration {
    /// `None` forwards to `Manager::report`.
    post_measuring_hook: RwLock<Option<PostMeasuringHook>>,
    error_recovery_hook: RwLock<ErrorRecoveryHook>,
    store_slot: RwLock<Arc<dyn StoreSlot>>,
}

static GLOBAL: OnceLock<Configuration> = OnceLock::new();

impl Configuration {
    pub fn new() -> Self {
        let error_recovery_hook: ErrorRecoveryHook = Arc::new(default_error_recovery);
        let store_slot: Arc<dyn StoreSlot> = Arc::new(SharedSlot::new());
        Self {
            post_measuring_hook: RwLock::new(None),
            error_recovery_hook: RwLock::new(error_recovery_hook),
            store_slot: RwLock::new(store_slot),
        }
    }

    /// Process-wide default instance, built on first use.
    pub fn global() -> &'static Configuration {
        GLOBAL.get_or_init(Configuration::new)
    }

    pub fn set_post_measuring_hook<F>(&self, hook: F)
    where
        F: Fn(&Measurement) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let hook: PostMeasuringHook = Arc::new(hook);
        *self.post_measuring_hook.write() = Some(hook);
    }

    /// Restore the default: forward every measurement to `Manager::report`.
    pub fn reset_post_measuring_hook(&self) {
        *self.post_measuring_hook.write() = None;
    }

    pub fn set_error_recovery_hook<F>(&self, hook: F)
    where
        F: Fn(&Error, &str) + Send + Sync + 'static,
    {
        *self.error_recovery_hook.write() = Arc::new(hook);
    }

    pub fn set_store_slot(&self, slot: Arc<dyn StoreSlot>) {
        *self.store_slot.write() = slot;
    }

    /// Relocate the store behind a (set, get) pair. Both sides must agree.
    pub fn set_store_accessors<S, G>(&self, set: S, get: G)
    where
        S: Fn(Option<Arc<AggregationStore>>) + Send + Sync + 'static,
        G: Fn() -> Option<Arc<AggregationStore>> + Send + Sync + 'static,
    {
        self.set_store_slot(Arc::new(AccessorSlot { set, get }));
    }

    pub fn store_slot(&self) -> Arc<dyn StoreSlot> {
        self.store_slot.read().clone()
    }

    pub(crate) fn run_post_measuring_hook(&self, measurement: &Measurement) -> Result<(), BoxError> {
        let hook = self.post_measuring_hook.read().clone();
        match hook {
            Some(hook) => hook(measurement),
            None => {
                Manager::new(self).report(measurement);
                Ok(())
            }
        }
    }

    pub(crate) fn run_error_recovery_hook(&self, error: &Error, class_name: &str) {
        let hook = self.error_recovery_hook.read().clone();
        hook(error, class_name);
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

fn default_error_recovery(error: &Error, class_name: &str) {
    tracing::debug!(class = class_name, error = %error, "post-measuring hook failed");
}

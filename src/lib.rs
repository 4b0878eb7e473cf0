//! In-process call timing aggregation.
//!
//! A host wraps the calls it wants tracked with [`measure`] (or a
//! [`Tracker`]). Each completed call becomes a [`Measurement`] handed to
//! the configured post-measuring hook, which by default reports it into
//! the [`Manager`]'s aggregation store: one running runtime sum and call
//! count per `Class#method[:segment]` path.
//!
//! ```ignore
//! use timeasure::{measure, CallSite, Manager};
//!
//! Manager::global().prepare();
//! let rows = measure(CallSite::new("Repo", "load"), || repo.load(id));
//! for record in Manager::global().export() {
//!     println!("{} {} {}", record.full_path(), record.call_count(), record.runtime_sum());
//! }
//! ```

pub mod configuration;
pub mod error;
pub mod measurement;
pub mod profiling;
pub mod timing;
pub mod tracker;

pub use configuration::{Configuration, SharedSlot, StoreSlot};
pub use error::{BoxError, Error};
pub use measurement::{CallSite, Measurement};
pub use profiling::{AggregatedRecord, AggregationStore, Manager};
pub use timing::{
    measure, measure_async, measure_async_with, measure_timings, measure_timings_with, measure_with,
    try_measure, try_measure_with,
};
pub use tracker::Tracker;

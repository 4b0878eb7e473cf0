pub mod manager;
pub mod reported_method;
pub mod store;
pub mod summary;

pub use manager::Manager;
pub use reported_method::AggregatedRecord;
pub use store::AggregationStore;

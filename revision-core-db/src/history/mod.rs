pub mod differ;
pub mod entry_builder;
pub mod interceptor;
pub mod reconciler;
pub mod registry;
pub mod scope;
pub mod tracker;

pub use differ::diff_fields;
pub use registry::HistoryRegistry;
pub use scope::HistoryScope;
pub use tracker::HistoryTracker;

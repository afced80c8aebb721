pub mod batch_mutate;
pub mod clock;
pub mod find_by_filters;
pub mod load;
pub mod pagination;
pub mod persist;
pub mod record_store;

// Re-exports
pub use batch_mutate::*;
pub use clock::*;
pub use find_by_filters::*;
pub use load::*;
pub use pagination::*;
pub use persist::*;
pub use record_store::*;

pub mod batch_operation;
pub mod filter;
pub mod identifiable;
pub mod record;
pub mod tracked_record;

// Re-exports
pub use batch_operation::*;
pub use filter::*;
pub use identifiable::*;
pub use record::*;
pub use tracked_record::*;

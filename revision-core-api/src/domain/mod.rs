pub mod action;
pub mod context;
pub mod entry;
pub mod field_map;
pub mod options;

pub use action::*;
pub use context::*;
pub use entry::*;
pub use field_map::*;
pub use options::*;

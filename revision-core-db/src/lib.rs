pub mod history;
pub mod memory;
pub mod models;
pub mod repository;
pub mod utils;

pub use history::*;
pub use memory::InMemoryRecordStore;
pub use models::*;
pub use repository::*;

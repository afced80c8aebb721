pub mod repository;
pub mod utils;

pub use repository::record_repository::{RecordRepoFactory, RecordRepositoryImpl};

#[cfg(test)]
pub mod test_helper;

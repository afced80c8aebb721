pub mod batch_mutate;
pub mod factory;
pub mod filter_sql;
pub mod find_by_filters;
pub mod load;
pub mod persist;
pub mod repo_impl;

pub use factory::RecordRepoFactory;
pub use repo_impl::RecordRepositoryImpl;

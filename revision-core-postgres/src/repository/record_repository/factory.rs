use postgres_unit_of_work::UnitOfWorkSession;
use std::sync::Arc;

use super::RecordRepositoryImpl;

/// Builds record repositories bound to a unit-of-work session
///
/// This should be used as a singleton throughout the application.
#[derive(Default)]
pub struct RecordRepoFactory {}

impl RecordRepoFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {})
    }

    /// Build a repository for `collection` sharing the session's transaction
    pub fn build_record_repo(
        &self,
        session: &impl UnitOfWorkSession,
        collection: &str,
    ) -> Arc<RecordRepositoryImpl> {
        Arc::new(RecordRepositoryImpl::new(
            session.executor().clone(),
            collection,
        ))
    }
}

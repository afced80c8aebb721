use revision_core_api::HistoryContext;
use std::error::Error;

use crate::history::tracker::HistoryTracker;
use crate::models::batch_operation::{BatchOperation, BatchResult};
use crate::models::tracked_record::TrackedRecord;
use crate::repository::record_store::RecordStore;

/// Handle carrying caller metadata (actor, reason) into the entries produced by the
/// operations run through it.
///
/// The metadata travels with the call instead of living in shared state, so saves
/// made outside the scope, concurrently or afterwards, never see it.
///
/// # Example
/// ```ignore
/// tracker
///     .with_context(HistoryContext::new().with_actor(moderator_id, moderator_name).with_reason("spam"))
///     .save(&mut listing)
///     .await?;
/// ```
pub struct HistoryScope<'a, S: RecordStore> {
    tracker: &'a HistoryTracker<S>,
    context: HistoryContext,
}

impl<'a, S: RecordStore> HistoryScope<'a, S> {
    pub(crate) fn new(tracker: &'a HistoryTracker<S>, context: HistoryContext) -> Self {
        Self { tracker, context }
    }

    pub fn context(&self) -> &HistoryContext {
        &self.context
    }

    pub async fn save(
        &self,
        record: &mut TrackedRecord,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.tracker
            .save_with_context(record, self.context.as_map())
            .await
    }

    pub async fn batch_mutate(
        &self,
        operations: Vec<BatchOperation>,
    ) -> Result<BatchResult, Box<dyn Error + Send + Sync>> {
        self.tracker
            .batch_mutate_with_context(operations, self.context.as_map())
            .await
    }
}

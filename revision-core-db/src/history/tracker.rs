use revision_core_api::{FieldMap, HistoryContext, HistoryEntry, HistoryOptions, HistoryResult};
use std::error::Error;
use std::sync::Arc;
use uuid::Uuid;

use crate::history::entry_builder::parse_history;
use crate::history::scope::HistoryScope;
use crate::models::batch_operation::{BatchOperation, BatchResult};
use crate::models::record::RecordModel;
use crate::models::tracked_record::TrackedRecord;
use crate::repository::pagination::{Page, PageRequest};
use crate::repository::record_store::RecordStore;

/// History tracking for one record type, bound to the store holding its records.
///
/// Every mutation path, single save or batch, ends in the same entry builder and
/// ring buffer, so entries look the same whichever path produced them.
pub struct HistoryTracker<S: RecordStore> {
    store: Arc<S>,
    options: Arc<HistoryOptions>,
}

impl<S: RecordStore> Clone for HistoryTracker<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            options: self.options.clone(),
        }
    }
}

impl<S: RecordStore> HistoryTracker<S> {
    /// Validates `options` and binds them to `store`.
    pub fn new(store: Arc<S>, options: HistoryOptions) -> HistoryResult<Self> {
        options.validate_options()?;
        Ok(Self::from_validated(store, Arc::new(options)))
    }

    pub(crate) fn from_validated(store: Arc<S>, options: Arc<HistoryOptions>) -> Self {
        Self { store, options }
    }

    pub fn options(&self) -> &HistoryOptions {
        &self.options
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Scope whose metadata is merged into every entry it produces.
    pub fn with_context(&self, context: HistoryContext) -> HistoryScope<'_, S> {
        HistoryScope::new(self, context)
    }

    /// Persists the record, appending an entry when tracked fields changed.
    pub async fn save(
        &self,
        record: &mut TrackedRecord,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.save_with_context(record, &FieldMap::new()).await
    }

    /// Runs the native batch mutation and reconstructs history for it, without
    /// caller metadata.
    pub async fn batch_mutate_with_history(
        &self,
        operations: Vec<BatchOperation>,
    ) -> Result<BatchResult, Box<dyn Error + Send + Sync>> {
        self.batch_mutate_with_context(operations, &FieldMap::new())
            .await
    }

    /// The record's history, oldest first.
    pub fn history(&self, record: &RecordModel) -> HistoryResult<Vec<HistoryEntry>> {
        parse_history(record, &self.options)
    }

    /// Loads a record and returns one page of its history, oldest first.
    ///
    /// An unknown identifier yields an empty page.
    pub async fn load_history(
        &self,
        id: Uuid,
        page: PageRequest,
    ) -> Result<Page<HistoryEntry>, Box<dyn Error + Send + Sync>> {
        let entries = match self.store.load(id).await? {
            Some(record) => self.history(&record)?,
            None => Vec::new(),
        };
        Ok(Page::from_items(entries, page))
    }
}

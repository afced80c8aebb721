use revision_core_api::{Action, FieldMap};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::error::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::history::differ::{creation_state, diff_fields};
use crate::history::entry_builder::{append_entry, build_entry, read_history};
use crate::history::tracker::HistoryTracker;
use crate::models::batch_operation::{BatchOperation, BatchResult};
use crate::models::filter::RecordFilter;
use crate::models::record::RecordModel;
use crate::repository::record_store::RecordStore;

/// History lists to write back after a batch, one per record, in staging order.
#[derive(Default)]
struct StagedHistories {
    order: Vec<Uuid>,
    lists: HashMap<Uuid, Vec<Value>>,
}

impl StagedHistories {
    fn get(&self, id: &Uuid) -> Option<&Vec<Value>> {
        self.lists.get(id)
    }

    fn stage(&mut self, id: Uuid, history: Vec<Value>) {
        if self.lists.insert(id, history).is_none() {
            self.order.push(id);
        }
    }

    fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn into_operations(mut self, history_field: &str) -> Vec<BatchOperation> {
        self.order
            .iter()
            .filter_map(|id| {
                self.lists.remove(id).map(|history| {
                    let mut set = FieldMap::new();
                    set.insert(history_field.to_string(), Value::Array(history));
                    BatchOperation::update(RecordFilter::by_id(*id), set)
                })
            })
            .collect()
    }
}

impl<S: RecordStore> HistoryTracker<S> {
    /// Batch path: the native batch offers no per-item hook, so the call is bracketed
    /// by a snapshot of the targeted records and a re-fetch, and the entries are
    /// derived from the difference.
    ///
    /// Round trips, strictly in order: snapshot, batch, re-fetch, history flush.
    /// Only the batch itself can fail the call; everything else is logged.
    pub(crate) async fn batch_mutate_with_context(
        &self,
        operations: Vec<BatchOperation>,
        context: &FieldMap,
    ) -> Result<BatchResult, Box<dyn Error + Send + Sync>> {
        let update_filters: Vec<RecordFilter> = operations
            .iter()
            .filter_map(|operation| match operation {
                BatchOperation::Update { filter, .. } => Some(filter.clone()),
                BatchOperation::Insert { .. } => None,
            })
            .collect();

        let before = match self.snapshot(&update_filters).await {
            Ok(before) => Some(before),
            Err(e) => {
                warn!(
                    error = %e,
                    "pre-batch snapshot failed, updates in this batch get no history"
                );
                None
            }
        };

        let result = self.store().batch_mutate(operations.clone()).await?;

        match self
            .reconcile(&operations, &update_filters, before.as_ref(), context)
            .await
        {
            Ok(staged) => self.flush(staged).await,
            Err(e) => warn!(error = %e, "batch history reconciliation failed"),
        }

        Ok(result)
    }

    async fn snapshot(
        &self,
        filters: &[RecordFilter],
    ) -> Result<HashMap<Uuid, RecordModel>, Box<dyn Error + Send + Sync>> {
        if filters.is_empty() {
            return Ok(HashMap::new());
        }
        let records = self.store().find_by_filters(filters).await?;
        Ok(records.into_iter().map(|record| (record.id, record)).collect())
    }

    async fn reconcile(
        &self,
        operations: &[BatchOperation],
        update_filters: &[RecordFilter],
        before: Option<&HashMap<Uuid, RecordModel>>,
        context: &FieldMap,
    ) -> Result<StagedHistories, Box<dyn Error + Send + Sync>> {
        let inserted: HashMap<Uuid, &RecordModel> = operations
            .iter()
            .filter_map(|operation| match operation {
                BatchOperation::Insert { document } => Some((document.id, document)),
                BatchOperation::Update { .. } => None,
            })
            .collect();

        // Original filters miss records whose update moved them out of their own
        // filter, so baseline records are also re-fetched by identifier.
        let mut refetch: Vec<RecordFilter> = Vec::new();
        if before.is_some() {
            refetch.extend(update_filters.iter().cloned());
        }
        refetch.extend(before.into_iter().flat_map(|b| b.keys()).map(|id| RecordFilter::by_id(*id)));
        refetch.extend(inserted.keys().map(|id| RecordFilter::by_id(*id)));

        let mut staged = StagedHistories::default();
        if refetch.is_empty() {
            return Ok(staged);
        }
        let after = self.store().find_by_filters(&refetch).await?;
        let after_ids: BTreeSet<Uuid> = after.iter().map(|record| record.id).collect();

        for (index, operation) in operations.iter().enumerate() {
            if let BatchOperation::Insert { document } = operation {
                if after_ids.contains(&document.id) {
                    self.stage_creation(&mut staged, document, context, index);
                } else {
                    debug!(record_id = %document.id, operation = index, "inserted record not found after batch");
                }
            }
        }

        if let Some(before) = before {
            for record in &after {
                let baseline = before
                    .get(&record.id)
                    .or_else(|| inserted.get(&record.id).copied());
                if let Some(baseline) = baseline {
                    self.stage_update(&mut staged, operations, baseline, record, context);
                }
            }
        }

        Ok(staged)
    }

    fn stage_creation(
        &self,
        staged: &mut StagedHistories,
        document: &RecordModel,
        context: &FieldMap,
        index: usize,
    ) {
        let options = self.options();
        let state = creation_state(&document.fields, options);
        if state.is_empty() {
            debug!(record_id = %document.id, operation = index, "inserted record has no tracked field");
            return;
        }

        let entry = build_entry(state, Action::Created, context, options, self.store().now_utc());
        let mut history = Vec::new();
        match append_entry(&mut history, &entry, options) {
            Ok(()) => staged.stage(document.id, history),
            Err(e) => warn!(
                record_id = %document.id,
                operation = index,
                error = %e,
                "could not build creation entry"
            ),
        }
    }

    /// Diffs one re-fetched record against its pre-batch baseline over the keys set by
    /// every update whose filter matches it, giving one entry for the net effect.
    fn stage_update(
        &self,
        staged: &mut StagedHistories,
        operations: &[BatchOperation],
        baseline: &RecordModel,
        current: &RecordModel,
        context: &FieldMap,
    ) {
        let options = self.options();
        let mut attempted: BTreeSet<String> = BTreeSet::new();
        for operation in operations {
            if let BatchOperation::Update { filter, set } = operation {
                if filter.matches_exactly(baseline) || filter.matches_exactly(current) {
                    attempted.extend(set.keys().cloned());
                }
            }
        }
        if attempted.is_empty() {
            return;
        }

        let state = diff_fields(Some(&baseline.fields), &current.fields, &attempted, options);
        if state.is_empty() {
            debug!(record_id = %current.id, "batch update changed no tracked field");
            return;
        }

        let mut history = match staged.get(&current.id) {
            Some(history) => history.clone(),
            None => match read_history(current.id, &current.fields, options) {
                Ok(history) => history,
                Err(e) => {
                    warn!(record_id = %current.id, error = %e, "skipping history for record");
                    return;
                }
            },
        };

        let entry = build_entry(state, Action::Updated, context, options, self.store().now_utc());
        match append_entry(&mut history, &entry, options) {
            Ok(()) => staged.stage(current.id, history),
            Err(e) => warn!(record_id = %current.id, error = %e, "could not build update entry"),
        }
    }

    async fn flush(&self, staged: StagedHistories) {
        if staged.is_empty() {
            return;
        }
        let operations = staged.into_operations(&self.options().history_field);
        let count = operations.len();
        match self.store().batch_mutate(operations).await {
            Ok(_) => debug!(records = count, "batch history flushed"),
            Err(e) => warn!(
                records = count,
                error = %e,
                "batch history flush failed, primary mutation is unaffected"
            ),
        }
    }
}

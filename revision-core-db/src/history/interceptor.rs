use revision_core_api::{Action, FieldMap, HistoryResult};
use std::error::Error;
use tracing::{debug, warn};

use crate::history::differ::diff_fields;
use crate::history::entry_builder::{append_to_record, build_entry};
use crate::history::tracker::HistoryTracker;
use crate::models::record::RecordModel;
use crate::models::tracked_record::TrackedRecord;
use crate::repository::record_store::RecordStore;

impl<S: RecordStore> HistoryTracker<S> {
    /// Single-record persistence path.
    ///
    /// The entry is appended to a copy of the record which is then persisted, so the
    /// history field and the changed fields commit in the same write. The in-memory
    /// record only takes the new state once the store accepted it. A failure to build
    /// the entry is logged and the record is persisted without it.
    pub(crate) async fn save_with_context(
        &self,
        record: &mut TrackedRecord,
        context: &FieldMap,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut candidate = record.record().clone();

        match self.annotate(record, &mut candidate, context) {
            Ok(Some(action)) => {
                debug!(record_id = %candidate.id, %action, "history entry appended");
            }
            Ok(None) => {
                debug!(record_id = %candidate.id, "no tracked field changed, history untouched");
            }
            Err(e) => {
                warn!(
                    record_id = %candidate.id,
                    error = %e,
                    "history annotation failed, persisting record without entry"
                );
                candidate = record.record().clone();
            }
        }

        self.store().persist(&candidate).await?;

        *record.record_mut() = candidate;
        record.mark_persisted();
        Ok(())
    }

    fn annotate(
        &self,
        record: &TrackedRecord,
        candidate: &mut RecordModel,
        context: &FieldMap,
    ) -> HistoryResult<Option<Action>> {
        let options = self.options();
        let proposed = &record.record().fields;

        let (state, action) = match record.persisted_fields() {
            None => (
                diff_fields(None, proposed, proposed.keys(), options),
                Action::Created,
            ),
            Some(previous) => (
                diff_fields(Some(previous), proposed, record.dirty_fields(), options),
                Action::Updated,
            ),
        };

        if state.is_empty() {
            return Ok(None);
        }

        let entry = build_entry(state, action, context, options, self.store().now_utc());
        append_to_record(candidate, &entry, options)?;
        Ok(Some(action))
    }
}

#[cfg(test)]
mod tests {
    use crate::history::tracker::HistoryTracker;
    use crate::memory::InMemoryRecordStore;
    use crate::models::tracked_record::TrackedRecord;
    use crate::repository::load::Load;
    use revision_core_api::{Action, FieldMap, HistoryOptions};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn fields(value: Value) -> FieldMap {
        value.as_object().cloned().unwrap()
    }

    fn tracker(options: HistoryOptions) -> HistoryTracker<InMemoryRecordStore> {
        HistoryTracker::new(Arc::new(InMemoryRecordStore::new()), options).unwrap()
    }

    #[tokio::test]
    async fn test_creation_entry_holds_full_record() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let tracker = tracker(HistoryOptions::default());
        let mut record = TrackedRecord::create(fields(json!({"a": 1, "b": 2, "c": 3})));

        tracker.save(&mut record).await?;

        let history = tracker.history(record.record())?;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].action(), Action::Created);
        assert_eq!(history[0].state, fields(json!({"a": 1, "b": 2, "c": 3})));
        assert!(!record.is_new());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_entry_holds_only_changed_fields() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let tracker = tracker(HistoryOptions::default());
        let mut record = TrackedRecord::create(fields(json!({"a": 1, "b": 2})));
        tracker.save(&mut record).await?;

        record.set("a", json!(9));
        tracker.save(&mut record).await?;

        let history = tracker.history(record.record())?;
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].action(), Action::Updated);
        assert_eq!(history[1].state, fields(json!({"a": 9})));
        Ok(())
    }

    #[tokio::test]
    async fn test_no_op_save_adds_no_entry() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let tracker = tracker(HistoryOptions::new().omit(["updatedAt"]));
        let mut record = TrackedRecord::create(fields(json!({"a": 1, "updatedAt": "t0"})));
        tracker.save(&mut record).await?;

        record.set("a", json!(1));
        record.set("updatedAt", json!("t1"));
        tracker.save(&mut record).await?;

        let stored = tracker.store().load(record.record().id).await?.unwrap();
        assert_eq!(stored.fields["updatedAt"], json!("t1"));
        assert_eq!(tracker.history(&stored)?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_loaded_record_diffs_against_persisted_values() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let tracker = tracker(HistoryOptions::default());
        let mut created = TrackedRecord::create(fields(json!({"title": "Soup kitchen", "places": 4})));
        tracker.save(&mut created).await?;

        let loaded = tracker.store().load(created.record().id).await?.unwrap();
        let mut record = TrackedRecord::loaded(loaded);
        record.set("places", json!(6));
        record.remove("title");
        tracker.save(&mut record).await?;

        let history = tracker.history(record.record())?;
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].state, fields(json!({"places": 6, "title": null})));
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_history_does_not_block_persist() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let tracker = tracker(HistoryOptions::default());
        let mut record = TrackedRecord::create(fields(json!({"title": "x", "history": 42})));

        tracker.save(&mut record).await?;

        let stored = tracker.store().load(record.record().id).await?.unwrap();
        assert_eq!(stored.fields["title"], json!("x"));
        assert_eq!(stored.fields["history"], json!(42));
        Ok(())
    }

    #[tokio::test]
    async fn test_store_rejection_is_returned_and_record_kept_dirty() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let store = Arc::new(InMemoryRecordStore::new());
        let tracker = HistoryTracker::new(store.clone(), HistoryOptions::default())?;
        let mut record = TrackedRecord::create(fields(json!({"title": "x"})));

        store.reject_persists(true);
        assert!(tracker.save(&mut record).await.is_err());
        assert!(record.is_new());
        assert!(record.get("history").is_none());

        store.reject_persists(false);
        tracker.save(&mut record).await?;
        assert_eq!(tracker.history(record.record())?.len(), 1);
        Ok(())
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use revision_core_api::{StoreError, ID_FIELD};
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use uuid::Uuid;

use crate::models::batch_operation::{BatchOperation, BatchResult};
use crate::models::filter::RecordFilter;
use crate::models::record::RecordModel;
use crate::repository::batch_mutate::BatchMutate;
use crate::repository::clock::Clock;
use crate::repository::find_by_filters::FindByFilters;
use crate::repository::load::Load;
use crate::repository::persist::Persist;

/// # Documentation
/// Record store kept in process memory.
///
/// Implements the full store contract, batches applied all-or-nothing, and
/// supports fault injection so callers can exercise their failure paths:
/// - `fail_batch_call(n)` rejects the n-th batch call (0-based)
/// - `reject_persists(true)` rejects single-record writes
/// - `reject_finds(true)` rejects multi-filter lookups
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<BTreeMap<Uuid, RecordModel>>,
    frozen_now: RwLock<Option<DateTime<Utc>>>,
    batch_calls: AtomicUsize,
    failing_batch_call: RwLock<Option<usize>>,
    rejecting_persists: AtomicBool,
    rejecting_finds: AtomicBool,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = RecordModel>) -> Self {
        let store = Self::new();
        {
            let mut map = store.records.write();
            for record in records {
                map.insert(record.id, record);
            }
        }
        store
    }

    /// Makes `now_utc` return `now` until changed.
    pub fn freeze_clock(&self, now: DateTime<Utc>) {
        *self.frozen_now.write() = Some(now);
    }

    pub fn fail_batch_call(&self, call_index: usize) {
        *self.failing_batch_call.write() = Some(call_index);
    }

    pub fn reject_persists(&self, reject: bool) {
        self.rejecting_persists.store(reject, Ordering::SeqCst);
    }

    pub fn reject_finds(&self, reject: bool) {
        self.rejecting_finds.store(reject, Ordering::SeqCst);
    }

    /// Number of batch calls received so far, rejected ones included.
    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    pub fn get(&self, id: Uuid) -> Option<RecordModel> {
        self.records.read().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn apply(
        records: &mut BTreeMap<Uuid, RecordModel>,
        operation: BatchOperation,
        result: &mut BatchResult,
    ) -> Result<(), StoreError> {
        match operation {
            BatchOperation::Insert { document } => {
                if records.contains_key(&document.id) {
                    return Err(StoreError::DuplicateId(document.id));
                }
                records.insert(document.id, document);
                result.inserted += 1;
            }
            BatchOperation::Update { filter, set } => {
                if set.contains_key(ID_FIELD) {
                    return Err(StoreError::Rejected(
                        "the identifier cannot be updated".to_string(),
                    ));
                }
                for record in records.values_mut() {
                    if !filter.evaluate(record)? {
                        continue;
                    }
                    result.matched += 1;
                    let mut changed = false;
                    for (name, value) in &set {
                        if record.get(name) != Some(value) {
                            record.set(name.clone(), value.clone());
                            changed = true;
                        }
                    }
                    if changed {
                        result.modified += 1;
                    }
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Load for InMemoryRecordStore {
    async fn load(&self, id: Uuid) -> Result<Option<RecordModel>, Box<dyn Error + Send + Sync>> {
        Ok(self.get(id))
    }
}

#[async_trait]
impl FindByFilters for InMemoryRecordStore {
    async fn find_by_filters(
        &self,
        filters: &[RecordFilter],
    ) -> Result<Vec<RecordModel>, Box<dyn Error + Send + Sync>> {
        if self.rejecting_finds.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("lookup rejected".to_string()).into());
        }
        if filters.is_empty() {
            return Ok(Vec::new());
        }

        let records = self.records.read();
        let mut found = Vec::new();
        for record in records.values() {
            let mut matched = false;
            for filter in filters {
                if filter.evaluate(record)? {
                    matched = true;
                    break;
                }
            }
            if matched {
                found.push(record.clone());
            }
        }
        Ok(found)
    }
}

#[async_trait]
impl Persist for InMemoryRecordStore {
    async fn persist(&self, record: &RecordModel) -> Result<(), Box<dyn Error + Send + Sync>> {
        if self.rejecting_persists.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected(format!("persist of {} rejected", record.id)).into());
        }
        self.records.write().insert(record.id, record.clone());
        Ok(())
    }
}

#[async_trait]
impl BatchMutate for InMemoryRecordStore {
    async fn batch_mutate(
        &self,
        operations: Vec<BatchOperation>,
    ) -> Result<BatchResult, Box<dyn Error + Send + Sync>> {
        let call = self.batch_calls.fetch_add(1, Ordering::SeqCst);
        if *self.failing_batch_call.read() == Some(call) {
            return Err(StoreError::Rejected(format!("batch call {call} rejected")).into());
        }

        let mut records = self.records.write();
        let mut working = records.clone();
        let mut result = BatchResult::default();
        for operation in operations {
            Self::apply(&mut working, operation, &mut result)?;
        }
        *records = working;
        Ok(result)
    }
}

impl Clock for InMemoryRecordStore {
    fn now_utc(&self) -> DateTime<Utc> {
        let frozen = *self.frozen_now.read();
        frozen.unwrap_or_else(Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revision_core_api::FieldMap;
    use serde_json::{json, Value};

    fn fields(value: Value) -> FieldMap {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_batch_is_all_or_nothing() -> Result<(), Box<dyn Error + Send + Sync>> {
        let existing = RecordModel::new(Uuid::new_v4(), fields(json!({"title": "a"})));
        let store = InMemoryRecordStore::with_records([existing.clone()]);

        let result = store
            .batch_mutate(vec![
                BatchOperation::insert(RecordModel::new(Uuid::new_v4(), FieldMap::new())),
                BatchOperation::insert(existing.clone()),
            ])
            .await;

        assert!(result.is_err());
        assert_eq!(store.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_counts_matched_and_modified() -> Result<(), Box<dyn Error + Send + Sync>> {
        let a = RecordModel::new(Uuid::new_v4(), fields(json!({"status": "PENDING"})));
        let b = RecordModel::new(Uuid::new_v4(), fields(json!({"status": "ONLINE"})));
        let store = InMemoryRecordStore::with_records([a.clone(), b.clone()]);

        let result = store
            .batch_mutate(vec![BatchOperation::update(
                RecordFilter::new().eq("status", json!({"$in": ["PENDING", "ONLINE"]})),
                fields(json!({"status": "ONLINE"})),
            )])
            .await?;

        assert_eq!(result.matched, 2);
        assert_eq!(result.modified, 1);
        assert_eq!(store.get(a.id).unwrap().fields["status"], json!("ONLINE"));
        Ok(())
    }

    #[tokio::test]
    async fn test_find_by_filters_is_a_union() -> Result<(), Box<dyn Error + Send + Sync>> {
        let a = RecordModel::new(Uuid::new_v4(), fields(json!({"publisher": "p1"})));
        let b = RecordModel::new(Uuid::new_v4(), fields(json!({"publisher": "p2"})));
        let c = RecordModel::new(Uuid::new_v4(), fields(json!({"publisher": "p3"})));
        let store = InMemoryRecordStore::with_records([a.clone(), b.clone(), c]);

        let found = store
            .find_by_filters(&[
                RecordFilter::new().eq("publisher", json!("p1")),
                RecordFilter::by_id(b.id),
                RecordFilter::by_id(a.id),
            ])
            .await?;

        let mut ids: Vec<Uuid> = found.iter().map(|r| r.id).collect();
        ids.sort();
        let mut expected = vec![a.id, b.id];
        expected.sort();
        assert_eq!(ids, expected);
        Ok(())
    }

    #[tokio::test]
    async fn test_fault_injection_targets_one_batch_call() -> Result<(), Box<dyn Error + Send + Sync>> {
        let store = InMemoryRecordStore::new();
        store.fail_batch_call(1);

        store.batch_mutate(vec![]).await?;
        assert!(store.batch_mutate(vec![]).await.is_err());
        store.batch_mutate(vec![]).await?;
        assert_eq!(store.batch_calls(), 3);
        Ok(())
    }
}

use revision_core_api::FieldMap;
use serde_json::Value;
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::models::identifiable::Identifiable;
use crate::models::record::RecordModel;

/// # Documentation
/// A record held in memory between load and persist.
///
/// Tracks which fields the caller touched since the last persist, independently of
/// the history layer, and keeps the last persisted field values as the diff baseline.
/// - New records have no baseline: every field counts as changed on first save.
/// - `set`/`remove` mark a field dirty even if the value ends up unchanged; the
///   history layer filters those out when diffing.
#[derive(Debug, Clone)]
pub struct TrackedRecord {
    record: RecordModel,
    persisted: Option<FieldMap>,
    dirty: BTreeSet<String>,
}

impl TrackedRecord {
    /// A record that has never been persisted.
    pub fn new(id: Uuid, fields: FieldMap) -> Self {
        Self {
            record: RecordModel::new(id, fields),
            persisted: None,
            dirty: BTreeSet::new(),
        }
    }

    /// A new record with a freshly generated identifier.
    pub fn create(fields: FieldMap) -> Self {
        Self::new(Uuid::new_v4(), fields)
    }

    /// A record as just loaded from the store.
    pub fn loaded(record: RecordModel) -> Self {
        let persisted = Some(record.fields.clone());
        Self {
            record,
            persisted,
            dirty: BTreeSet::new(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.persisted.is_none()
    }

    pub fn record(&self) -> &RecordModel {
        &self.record
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.record.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        self.dirty.insert(name.clone());
        self.record.set(name, value);
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.dirty.insert(name.to_string());
        self.record.fields.remove(name)
    }

    /// Names of the fields modified in memory since load or last persist.
    pub fn dirty_fields(&self) -> &BTreeSet<String> {
        &self.dirty
    }

    /// Dirty field name to proposed value; removed fields map to `null`.
    pub fn modified_fields(&self) -> FieldMap {
        self.dirty
            .iter()
            .map(|name| {
                let value = self.record.get(name).cloned().unwrap_or(Value::Null);
                (name.clone(), value)
            })
            .collect()
    }

    /// Field values as of the last persist, `None` for a new record.
    pub fn persisted_fields(&self) -> Option<&FieldMap> {
        self.persisted.as_ref()
    }

    pub(crate) fn record_mut(&mut self) -> &mut RecordModel {
        &mut self.record
    }

    /// Makes the current in-memory state the new baseline.
    pub fn mark_persisted(&mut self) {
        self.persisted = Some(self.record.fields.clone());
        self.dirty.clear();
    }

    pub fn into_record(self) -> RecordModel {
        self.record
    }
}

impl Identifiable for TrackedRecord {
    fn get_id(&self) -> Uuid {
        self.record.id
    }
}

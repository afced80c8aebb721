use revision_core_api::FieldMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::identifiable::Identifiable;

/// # Documentation
/// A business record as held by the primary store: a stable identifier plus a
/// schema-flexible map of named fields. The identifier is never part of `fields`.
/// The history layer never creates or deletes records, it only writes the
/// configured history field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordModel {
    pub id: Uuid,
    pub fields: FieldMap,
}

impl RecordModel {
    pub fn new(id: Uuid, fields: FieldMap) -> Self {
        Self { id, fields }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }
}

impl Identifiable for RecordModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

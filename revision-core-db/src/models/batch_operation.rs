use revision_core_api::FieldMap;
use serde::{Deserialize, Serialize};

use crate::models::filter::RecordFilter;
use crate::models::record::RecordModel;

/// One item of a native batch mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BatchOperation {
    /// Insert a full new record. Fails the batch if the identifier already exists.
    Insert { document: RecordModel },
    /// Set `set` on every record matching `filter`.
    Update { filter: RecordFilter, set: FieldMap },
}

impl BatchOperation {
    pub fn insert(document: RecordModel) -> Self {
        BatchOperation::Insert { document }
    }

    pub fn update(filter: RecordFilter, set: FieldMap) -> Self {
        BatchOperation::Update { filter, set }
    }
}

/// Outcome reported by the store for a batch mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub inserted: usize,
    pub matched: usize,
    pub modified: usize,
}

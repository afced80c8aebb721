use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::action::Action;
use super::field_map::FieldMap;

/// # Documentation
/// One element of a record's history.
/// - `state` holds only the fields changed by the mutation, except for the
///   creation entry which holds the full initial record.
/// - Immutable once appended; entries leave the history only through ring-buffer eviction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub state: FieldMap,
    pub metadata: EntryMetadata,
}

/// Metadata stored with each entry: the action discriminant plus caller context
/// such as actor id, actor name or reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub action: Action,
    #[serde(flatten)]
    pub context: FieldMap,
}

impl HistoryEntry {
    pub fn action(&self) -> Action {
        self.metadata.action
    }
}

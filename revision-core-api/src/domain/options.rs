use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use validator::Validate;

use super::field_map::{FieldMap, ACTION_KEY, ID_FIELD};
use crate::error::{HistoryError, HistoryResult};

pub const DEFAULT_HISTORY_FIELD: &str = "history";
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// # Documentation
/// History configuration for one record type. Fixed at setup time.
/// - `history_field`: field holding the ordered list of entries
/// - `omit`: fields never diffed and never stored in an entry
/// - `max_entries`: ring-buffer capacity, oldest entries are evicted first
/// - `metadata`: baseline context merged into every entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct HistoryOptions {
    #[validate(length(min = 1))]
    pub history_field: String,

    pub omit: BTreeSet<String>,

    #[validate(range(min = 1))]
    pub max_entries: usize,

    pub metadata: FieldMap,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            history_field: DEFAULT_HISTORY_FIELD.to_string(),
            omit: BTreeSet::new(),
            max_entries: DEFAULT_MAX_ENTRIES,
            metadata: FieldMap::new(),
        }
    }
}

impl HistoryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history_field(mut self, name: impl Into<String>) -> Self {
        self.history_field = name.into();
        self
    }

    pub fn omit<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.omit.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn metadata(mut self, metadata: FieldMap) -> Self {
        self.metadata = metadata;
        self
    }

    /// True when `name` must never be diffed or stored: the history field itself
    /// or any omitted field.
    pub fn is_excluded(&self, name: &str) -> bool {
        name == self.history_field || self.omit.contains(name)
    }

    /// Checks the options before any record is touched.
    pub fn validate_options(&self) -> HistoryResult<()> {
        self.validate()
            .map_err(|e| HistoryError::Configuration(e.to_string()))?;

        if self.history_field == ID_FIELD {
            return Err(HistoryError::Configuration(format!(
                "history field cannot be the identifier field '{ID_FIELD}'"
            )));
        }
        if self.omit.contains(ID_FIELD) {
            return Err(HistoryError::Configuration(format!(
                "omit set cannot contain the identifier field '{ID_FIELD}'"
            )));
        }
        if self.metadata.contains_key(ACTION_KEY) {
            return Err(HistoryError::Configuration(format!(
                "baseline metadata cannot carry '{ACTION_KEY}'"
            )));
        }
        Ok(())
    }
}

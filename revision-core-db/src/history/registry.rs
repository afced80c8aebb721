use revision_core_api::{HistoryError, HistoryOptions, HistoryResult};
use std::collections::HashMap;
use std::sync::Arc;

use crate::history::tracker::HistoryTracker;
use crate::repository::record_store::RecordStore;

/// History configuration per record type, set once during application setup.
///
/// # Example
/// ```
/// use revision_core_api::HistoryOptions;
/// use revision_core_db::{HistoryRegistry, InMemoryRecordStore};
/// use std::sync::Arc;
///
/// let mut registry = HistoryRegistry::new();
/// registry
///     .configure("mission", HistoryOptions::new().omit(["updatedAt"]).max_entries(50))
///     .unwrap();
/// let tracker = registry
///     .tracker("mission", Arc::new(InMemoryRecordStore::new()))
///     .unwrap();
/// assert_eq!(tracker.options().max_entries, 50);
/// ```
#[derive(Debug, Default)]
pub struct HistoryRegistry {
    configured: HashMap<String, Arc<HistoryOptions>>,
}

impl HistoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the options of a record type. Invalid options and a second
    /// registration of the same type are configuration errors.
    pub fn configure(
        &mut self,
        record_type: impl Into<String>,
        options: HistoryOptions,
    ) -> HistoryResult<()> {
        let record_type = record_type.into();
        if self.configured.contains_key(&record_type) {
            return Err(HistoryError::Configuration(format!(
                "record type '{record_type}' is already configured"
            )));
        }
        options.validate_options()?;
        self.configured.insert(record_type, Arc::new(options));
        Ok(())
    }

    pub fn options(&self, record_type: &str) -> Option<&HistoryOptions> {
        self.configured.get(record_type).map(|options| options.as_ref())
    }

    /// Tracker for `record_type` bound to the store holding its records.
    pub fn tracker<S: RecordStore>(
        &self,
        record_type: &str,
        store: Arc<S>,
    ) -> HistoryResult<HistoryTracker<S>> {
        let options = self
            .configured
            .get(record_type)
            .cloned()
            .ok_or_else(|| HistoryError::NotConfigured(record_type.to_string()))?;
        Ok(HistoryTracker::from_validated(store, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryRecordStore;

    #[test]
    fn test_configure_once_per_type() {
        let mut registry = HistoryRegistry::new();
        registry.configure("mission", HistoryOptions::default()).unwrap();

        let again = registry.configure("mission", HistoryOptions::default());
        assert!(matches!(again, Err(HistoryError::Configuration(_))));
        assert!(registry.options("mission").is_some());
    }

    #[test]
    fn test_invalid_options_fail_at_configure_time() {
        let mut registry = HistoryRegistry::new();
        let result = registry.configure("publisher", HistoryOptions::new().omit(["id"]));

        assert!(matches!(result, Err(HistoryError::Configuration(_))));
        assert!(registry.options("publisher").is_none());
    }

    #[test]
    fn test_unknown_type_has_no_tracker() {
        let registry = HistoryRegistry::new();
        let result = registry.tracker("widget", Arc::new(InMemoryRecordStore::new()));
        assert!(matches!(result, Err(HistoryError::NotConfigured(_))));
    }
}

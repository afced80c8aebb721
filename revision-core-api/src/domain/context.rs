use serde_json::Value;

use super::field_map::FieldMap;

/// Caller-supplied metadata merged into every entry produced under a scope.
///
/// # Example
/// ```
/// use revision_core_api::HistoryContext;
///
/// let context = HistoryContext::new()
///     .with_actor("9b2f", "Jane Moderator")
///     .with_reason("duplicate listing");
/// assert_eq!(context.as_map().len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryContext {
    values: FieldMap,
}

impl HistoryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actor(self, actor_id: impl Into<String>, actor_name: impl Into<String>) -> Self {
        self.with("actorId", Value::String(actor_id.into()))
            .with("actorName", Value::String(actor_name.into()))
    }

    pub fn with_reason(self, reason: impl Into<String>) -> Self {
        self.with("reason", Value::String(reason.into()))
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    pub fn as_map(&self) -> &FieldMap {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<FieldMap> for HistoryContext {
    fn from(values: FieldMap) -> Self {
        Self { values }
    }
}

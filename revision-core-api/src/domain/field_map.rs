use serde_json::{Map, Value};

/// Named field values of a record, keyed by field name.
pub type FieldMap = Map<String, Value>;

/// Reserved filter key addressing a record's identifier.
pub const ID_FIELD: &str = "id";

/// Metadata key carrying the entry action. Never part of a baseline.
pub const ACTION_KEY: &str = "action";

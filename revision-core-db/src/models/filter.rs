use revision_core_api::{FieldMap, StoreError, ID_FIELD};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use uuid::Uuid;

use crate::models::record::RecordModel;

/// # Documentation
/// A conjunction of per-field conditions selecting records.
///
/// A condition value is either a literal (exact match) or an operator object such
/// as `{"$gt": 5}`. Only literal conditions take part in history reconciliation;
/// operator conditions are evaluated by stores that support them.
/// The identifier is addressed by the reserved key `id` with a UUID string value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordFilter {
    conditions: FieldMap,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(id: Uuid) -> Self {
        Self::new().eq(ID_FIELD, Value::String(id.to_string()))
    }

    pub fn eq(mut self, name: impl Into<String>, value: Value) -> Self {
        self.conditions.insert(name.into(), value);
        self
    }

    pub fn conditions(&self) -> &FieldMap {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// True when every condition is a literal value.
    pub fn is_exact(&self) -> bool {
        self.conditions.values().all(|value| !is_operator(value))
    }

    /// Exact-match rule used to attribute an update back to a record: every key must
    /// equal the record's value, the identifier compared as a UUID. Filters carrying
    /// operator conditions never match.
    pub fn matches_exactly(&self, record: &RecordModel) -> bool {
        self.is_exact()
            && self
                .conditions
                .iter()
                .all(|(name, expected)| literal_matches(record, name, expected))
    }

    /// Full evaluation including the comparison operators `$eq`, `$ne`, `$gt`,
    /// `$gte`, `$lt`, `$lte` and `$in`.
    pub fn evaluate(&self, record: &RecordModel) -> Result<bool, StoreError> {
        for (name, condition) in &self.conditions {
            let matched = match condition {
                Value::Object(operators) if is_operator(condition) => {
                    let actual = field_value(record, name);
                    let mut all = true;
                    for (operator, operand) in operators {
                        if !apply_operator(operator, &actual, operand)? {
                            all = false;
                            break;
                        }
                    }
                    all
                }
                _ => literal_matches(record, name, condition),
            };
            if !matched {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl From<FieldMap> for RecordFilter {
    fn from(conditions: FieldMap) -> Self {
        Self { conditions }
    }
}

fn is_operator(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.keys().any(|key| key.starts_with('$')),
        _ => false,
    }
}

fn literal_matches(record: &RecordModel, name: &str, expected: &Value) -> bool {
    if name == ID_FIELD {
        return expected
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .is_some_and(|id| id == record.id);
    }
    // A missing field matches an explicit null.
    record.get(name).unwrap_or(&Value::Null) == expected
}

fn field_value(record: &RecordModel, name: &str) -> Value {
    if name == ID_FIELD {
        return Value::String(record.id.to_string());
    }
    record.get(name).cloned().unwrap_or(Value::Null)
}

fn apply_operator(operator: &str, actual: &Value, operand: &Value) -> Result<bool, StoreError> {
    let result = match operator {
        "$eq" => actual == operand,
        "$ne" => actual != operand,
        "$gt" => compare(actual, operand) == Some(Ordering::Greater),
        "$gte" => matches!(
            compare(actual, operand),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        "$lt" => compare(actual, operand) == Some(Ordering::Less),
        "$lte" => matches!(
            compare(actual, operand),
            Some(Ordering::Less | Ordering::Equal)
        ),
        "$in" => match operand {
            Value::Array(candidates) => candidates.contains(actual),
            _ => {
                return Err(StoreError::UnsupportedFilter(
                    "$in expects an array operand".to_string(),
                ))
            }
        },
        other => return Err(StoreError::UnsupportedFilter(other.to_string())),
    };
    Ok(result)
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => l.as_f64()?.partial_cmp(&r.as_f64()?),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        (Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
        _ => None,
    }
}

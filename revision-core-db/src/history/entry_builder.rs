use chrono::{DateTime, Utc};
use revision_core_api::{
    Action, EntryMetadata, FieldMap, HistoryEntry, HistoryError, HistoryOptions, HistoryResult,
    ACTION_KEY,
};
use serde_json::Value;
use uuid::Uuid;

use crate::models::record::RecordModel;

/// Assembles an entry stamped at `now`.
///
/// Metadata is the configured baseline overlaid with the caller context, caller keys
/// winning. Any `action` key in either is dropped: the action belongs to the entry.
pub fn build_entry(
    state: FieldMap,
    action: Action,
    context: &FieldMap,
    options: &HistoryOptions,
    now: DateTime<Utc>,
) -> HistoryEntry {
    let mut merged = options.metadata.clone();
    for (key, value) in context {
        merged.insert(key.clone(), value.clone());
    }
    merged.remove(ACTION_KEY);

    HistoryEntry {
        timestamp: now,
        state,
        metadata: EntryMetadata {
            action,
            context: merged,
        },
    }
}

/// The raw history list stored on a record. Absent or `null` reads as empty.
pub fn read_history(
    record_id: Uuid,
    fields: &FieldMap,
    options: &HistoryOptions,
) -> HistoryResult<Vec<Value>> {
    match fields.get(&options.history_field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(entries)) => Ok(entries.clone()),
        Some(other) => Err(HistoryError::MalformedHistory {
            record_id,
            reason: format!("expected an array, found {other}"),
        }),
    }
}

/// Pushes `entry` and evicts from the front until the list fits `max_entries`.
///
/// Every append goes through here.
pub fn append_entry(
    history: &mut Vec<Value>,
    entry: &HistoryEntry,
    options: &HistoryOptions,
) -> HistoryResult<()> {
    history.push(serde_json::to_value(entry)?);
    if history.len() > options.max_entries {
        let excess = history.len() - options.max_entries;
        history.drain(..excess);
    }
    Ok(())
}

/// Appends `entry` to the record's history field in memory.
pub fn append_to_record(
    record: &mut RecordModel,
    entry: &HistoryEntry,
    options: &HistoryOptions,
) -> HistoryResult<()> {
    let mut history = read_history(record.id, &record.fields, options)?;
    append_entry(&mut history, entry, options)?;
    record.set(options.history_field.clone(), Value::Array(history));
    Ok(())
}

/// Typed view of a record's history, oldest first.
pub fn parse_history(
    record: &RecordModel,
    options: &HistoryOptions,
) -> HistoryResult<Vec<HistoryEntry>> {
    read_history(record.id, &record.fields, options)?
        .into_iter()
        .map(|value| {
            serde_json::from_value(value).map_err(|e| HistoryError::MalformedHistory {
                record_id: record.id,
                reason: e.to_string(),
            })
        })
        .collect()
}

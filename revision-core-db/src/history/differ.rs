use revision_core_api::{FieldMap, HistoryOptions};
use serde_json::Value;

/// Computes the fields that actually changed between `previous` and `proposed`.
///
/// Only names in `tracked` are considered, minus the history field and the omit set.
/// A name is included when its proposed value differs from the previous one under
/// `serde_json::Value` equality; an absent field differs from an explicit `null`.
/// `previous = None` is an empty baseline, so every present tracked field counts as
/// changed. A field removed by the mutation is recorded as `null`.
///
/// An empty result means the mutation is a no-op for history purposes.
pub fn diff_fields<'a, I>(
    previous: Option<&FieldMap>,
    proposed: &FieldMap,
    tracked: I,
    options: &HistoryOptions,
) -> FieldMap
where
    I: IntoIterator<Item = &'a String>,
{
    let mut changed = FieldMap::new();
    for name in tracked {
        if options.is_excluded(name) {
            continue;
        }
        let before = previous.and_then(|fields| fields.get(name));
        let after = proposed.get(name);
        if before != after {
            changed.insert(name.clone(), after.cloned().unwrap_or(Value::Null));
        }
    }
    changed
}

/// The full record minus excluded fields, used as the state of a creation entry.
pub fn creation_state(fields: &FieldMap, options: &HistoryOptions) -> FieldMap {
    diff_fields(None, fields, fields.keys(), options)
}

//! Merge-patch application over document values.
//!
//! Null entries in a patch delete: map keys are removed outright, list slots
//! become `Null` holes and only a trailing run of holes is trimmed. Lists grow
//! when a patch addresses an index past their end.

use crate::value::{Map, Value};

/// How far past its current length a patch may grow a list. Indices beyond
/// this address the list as an index-keyed map instead.
const MAX_LIST_GAP: usize = 1 << 16;

/// Applies `patch` on top of `base` and returns the merged value.
///
/// If either side is not a list or map, the patch replaces the base wholesale
/// (a `Null` patch therefore deletes the whole subtree). Otherwise entries of
/// the patch are merged recursively, key by key for maps and index by index
/// for lists.
///
/// No schema is consulted; type mismatches only surface when the result is
/// validated again.
pub fn deep_merge(base: Value, patch: Value) -> Value {
    match (base, patch) {
        (Value::Map(map), patch) if patch.is_composite() => {
            Value::Map(merge_map(map, patch_entries(patch)))
        }
        (Value::List(items), patch) if patch.is_composite() => {
            let entries = patch_entries(patch);
            let reach = items.len().max(entries.len()).saturating_add(MAX_LIST_GAP);
            let indices = entries
                .iter()
                .map(|(key, _)| key.parse::<usize>().ok().filter(|&i| i < reach))
                .collect::<Option<Vec<_>>>();
            match indices {
                Some(indices) => {
                    let values = entries.into_iter().map(|(_, value)| value);
                    Value::List(merge_list(items, indices.into_iter().zip(values).collect()))
                }
                // A named key or a far-off index cannot address a list slot, so
                // the list degrades to an index-keyed map.
                None => Value::Map(merge_map(list_to_map(items), entries)),
            }
        }
        (_, patch) => patch,
    }
}

/// Merges two object-shaped documents; the result is always a map.
pub(crate) fn merge_maps(base: Map, patch: Map) -> Map {
    tracing::trace!(keys = patch.len(), "applying merge patch");
    merge_map(base, patch.into_iter().collect())
}

/// Flattens a composite patch into ordered `(key, value)` pairs.
fn patch_entries(patch: Value) -> Vec<(String, Value)> {
    match patch {
        Value::List(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        Value::Map(map) => map.into_iter().collect(),
        _ => Vec::new(),
    }
}

fn list_to_map(items: Vec<Value>) -> Map {
    items
        .into_iter()
        .enumerate()
        .map(|(i, v)| (i.to_string(), v))
        .collect()
}

fn merge_map(mut base: Map, entries: Vec<(String, Value)>) -> Map {
    for (key, value) in entries {
        if value.is_null() {
            base.insert(key, Value::Null);
            continue;
        }
        let merged = match base.remove(&key) {
            Some(existing) => deep_merge(existing, value),
            None => value,
        };
        base.insert(key, merged);
    }

    base.retain(|_, v| !v.is_null());
    base
}

fn merge_list(mut base: Vec<Value>, entries: Vec<(usize, Value)>) -> Vec<Value> {
    for (index, value) in entries {
        if value.is_null() {
            // A tombstone past the end has nothing to delete.
            if let Some(slot) = base.get_mut(index) {
                *slot = Value::Null;
            }
            continue;
        }
        if index >= base.len() {
            let Some(len) = index.checked_add(1) else {
                continue;
            };
            base.resize(len, Value::Null);
        }
        let existing = std::mem::take(&mut base[index]);
        base[index] = deep_merge(existing, value);
    }

    while base.last().is_some_and(Value::is_null) {
        base.pop();
    }
    base
}

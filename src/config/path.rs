//! Dotted-path lookup into documents.

use crate::value::{Map, Value};

/// Looks up a dotted path such as `server.hosts.0.name` in the document.
///
/// Each segment is a map key or, for lists, a decimal index. Returns `None`
/// as soon as a segment is missing or the current value cannot be indexed.
/// A map key holding `Null` counts as missing; a `Null` list slot is returned
/// as is.
pub(crate) fn lookup<'a>(root: &'a Map, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let first = parts.next()?;

    let mut current = field(root, first)?;
    for part in parts {
        current = match current {
            Value::Map(map) => field(map, part)?,
            other => other.get(part)?,
        };
    }

    Some(current)
}

fn field<'a>(map: &'a Map, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|value| !value.is_null())
}

//! Dotted path access over nested JSON objects.
//!
//! Paths look like `a.b.c` or `$.a.b.c`; the `$.` prefix is optional and empty
//! segments are ignored. `get` never fails: a missing key, a non-container
//! intermediate node or an empty path all yield `None`. A numeric segment
//! indexes into an array when reading.
//!
//! `set` mutates the destination in place, creating intermediate objects as
//! needed. A non-object value found at an intermediate segment is replaced by a
//! fresh object. An empty path is a no-op.

use serde_json::{Map, Value};

pub fn segments(path: &str) -> Vec<&str> {
    let p = path.strip_prefix("$.").unwrap_or(path);
    p.split('.').filter(|seg| !seg.is_empty()).collect()
}

pub fn get<'a>(root: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let segs = segments(path);
    let (first, rest) = segs.split_first()?;
    let mut cur = root.get(*first)?;
    for seg in rest {
        cur = match cur {
            Value::Object(map) => map.get(*seg)?,
            Value::Array(items) => items.get(seg.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(cur)
}

/// Like [`get`] but rooted at an arbitrary value; non-object roots yield `None`.
pub fn get_value<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    match root {
        Value::Object(map) => get(map, path),
        _ => None,
    }
}

/// Like [`get`] but treats an explicit JSON `null` as absent.
pub fn get_present<'a>(root: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    get(root, path).filter(|v| !v.is_null())
}

pub fn set(root: &mut Map<String, Value>, path: &str, value: Value) {
    let segs = segments(path);
    let Some((last, parents)) = segs.split_last() else {
        return;
    };
    let mut cur = root;
    for seg in parents {
        let slot = cur
            .entry(seg.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(map) = slot else {
            return;
        };
        cur = map;
    }
    cur.insert(last.to_string(), value);
}

//! Dotted-path access into nested attribute values.
//!
//! Paths address object keys and array indices, e.g. `author.name.first` or
//! `tags.0`. The first segment of a path is always the base attribute name;
//! change detection happens at that granularity.

use serde_json::{Map, Value};

use crate::errors::ModelError;

/// Split a dotted path into its base attribute and the remainder.
pub(crate) fn split_base(path: &str) -> (&str, Option<&str>) {
    match path.split_once('.') {
        Some((base, rest)) => (base, Some(rest)),
        None => (path, None),
    }
}

/// Human-readable kind of a JSON value, for error messages.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read the value at `path` relative to `root`, if every segment resolves.
pub(crate) fn read<'v>(root: &'v Value, path: &str) -> Option<&'v Value> {
    let mut cursor = root;
    for segment in path.split('.') {
        cursor = match cursor {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(cursor)
}

/// Write `value` at `path` relative to `root`.
///
/// Missing or null intermediate segments become empty objects; traversing
/// through a scalar or writing past the end of an array is an error.
pub(crate) fn write(root: &mut Value, path: &str, value: Value) -> Result<(), ModelError> {
    let (parents, last) = match path.rsplit_once('.') {
        Some((parents, last)) => (Some(parents), last),
        None => (None, path),
    };

    let mut cursor = root;
    if let Some(parents) = parents {
        for segment in parents.split('.') {
            cursor = descend(cursor, segment, path)?;
        }
    }

    if cursor.is_null() {
        *cursor = Value::Object(Map::new());
    }
    match cursor {
        Value::Object(map) => {
            map.insert(last.to_string(), value);
            Ok(())
        }
        Value::Array(items) => {
            let index = parse_index(last, path)?;
            let slot = items
                .get_mut(index)
                .ok_or_else(|| out_of_bounds(index, path))?;
            *slot = value;
            Ok(())
        }
        other => Err(invalid(
            path,
            format!("cannot write into {}", value_kind(other)),
        )),
    }
}

fn descend<'v>(cursor: &'v mut Value, segment: &str, path: &str) -> Result<&'v mut Value, ModelError> {
    if cursor.is_null() {
        *cursor = Value::Object(Map::new());
    }
    match cursor {
        Value::Object(map) => Ok(map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()))),
        Value::Array(items) => {
            let index = parse_index(segment, path)?;
            items
                .get_mut(index)
                .ok_or_else(|| out_of_bounds(index, path))
        }
        other => Err(invalid(
            path,
            format!("cannot descend into {}", value_kind(other)),
        )),
    }
}

fn parse_index(segment: &str, path: &str) -> Result<usize, ModelError> {
    segment
        .parse::<usize>()
        .map_err(|_| invalid(path, format!("'{segment}' is not an array index")))
}

fn out_of_bounds(index: usize, path: &str) -> ModelError {
    invalid(path, format!("array index {index} out of bounds"))
}

fn invalid(path: &str, message: String) -> ModelError {
    ModelError::InvalidPath {
        path: path.to_string(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_nested_segments() {
        let value = json!({"author": {"name": {"first": "Erik"}}, "tags": ["a", "b"]});
        assert_eq!(read(&value, "author.name.first"), Some(&json!("Erik")));
        assert_eq!(read(&value, "tags.1"), Some(&json!("b")));
        assert_eq!(read(&value, "author.missing"), None);
        assert_eq!(read(&value, "tags.7"), None);
    }

    #[test]
    fn writes_through_existing_objects() {
        let mut value = json!({"name": {"first": "Erik", "last": "Bryn"}});
        write(&mut value, "name.first", json!("Yehuda")).unwrap();
        assert_eq!(value, json!({"name": {"first": "Yehuda", "last": "Bryn"}}));
    }

    #[test]
    fn creates_missing_intermediate_objects() {
        let mut value = json!({});
        write(&mut value, "name.first", json!("Erik")).unwrap();
        assert_eq!(value, json!({"name": {"first": "Erik"}}));
    }

    #[test]
    fn writes_into_array_slots() {
        let mut value = json!({"tags": ["a", "b"]});
        write(&mut value, "tags.0", json!("z")).unwrap();
        assert_eq!(value, json!({"tags": ["z", "b"]}));
    }

    #[test]
    fn rejects_traversal_through_scalars() {
        let mut value = json!({"name": "Erik"});
        let err = write(&mut value, "name.first", json!("x")).unwrap_err();
        assert!(matches!(err, ModelError::InvalidPath { .. }));
    }

    #[test]
    fn rejects_out_of_bounds_indices() {
        let mut value = json!({"tags": []});
        let err = write(&mut value, "tags.3", json!("x")).unwrap_err();
        assert!(matches!(err, ModelError::InvalidPath { .. }));
    }
}

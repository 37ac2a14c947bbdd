use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::CoercionError;
use crate::path::value_kind;

/// Equality and coercion policy for one attribute.
///
/// Any object with an equality rule can act as an attribute type. The default
/// rule is deep structural equality, so a nested value changed and then
/// changed back to its original shape compares clean at every level.
/// Coercion converts raw persisted values into the attribute's runtime shape
/// at load time and defaults to identity.
pub trait AttributeType: Send + Sync {
    /// Whether `new` is semantically equal to the committed `old` value.
    fn is_equal(&self, old: &Value, new: &Value) -> bool {
        old == new
    }

    /// Convert a raw persisted value into this attribute's runtime shape.
    fn coerce(&self, raw: Value) -> Result<Value, CoercionError> {
        Ok(raw)
    }
}

/// Deep structural equality, no coercion. The silent fallback for attributes
/// declared without a type descriptor.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultType;

impl AttributeType for DefaultType {}

/// Boolean attribute. Accepts booleans plus the common raw spellings
/// (`"true"`, `"false"`, `"1"`, `"0"`, `0`, `1`) and normalizes them to a
/// JSON boolean at load time.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanType;

impl AttributeType for BooleanType {
    fn coerce(&self, raw: Value) -> Result<Value, CoercionError> {
        match raw {
            Value::Null => Ok(Value::Null),
            Value::Bool(flag) => Ok(Value::Bool(flag)),
            Value::String(text) => match text.as_str() {
                "true" | "1" => Ok(Value::Bool(true)),
                "false" | "0" => Ok(Value::Bool(false)),
                _ => Err(CoercionError::new(format!("'{text}' is not a boolean"))),
            },
            Value::Number(number) => match number.as_i64() {
                Some(0) => Ok(Value::Bool(false)),
                Some(1) => Ok(Value::Bool(true)),
                _ => Err(CoercionError::new(format!("{number} is not a boolean"))),
            },
            other => Err(CoercionError::new(format!(
                "{} is not a boolean",
                value_kind(&other)
            ))),
        }
    }
}

/// Date/time attribute persisted as ISO-8601.
///
/// Raw RFC 3339 strings and epoch-millisecond integers normalize to a
/// canonical UTC string at load time. Equality compares instants, so two
/// spellings of the same moment (`Z` vs `+00:00`) never count as a change.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeType;

impl DateTimeType {
    /// Parse a stored value back into a typed date, if it holds one.
    pub fn parse(value: &Value) -> Option<DateTime<Utc>> {
        match value {
            Value::String(text) => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|parsed| parsed.with_timezone(&Utc)),
            Value::Number(number) => number
                .as_i64()
                .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
            _ => None,
        }
    }
}

impl AttributeType for DateTimeType {
    fn is_equal(&self, old: &Value, new: &Value) -> bool {
        match (Self::parse(old), Self::parse(new)) {
            (Some(old_instant), Some(new_instant)) => old_instant == new_instant,
            _ => old == new,
        }
    }

    fn coerce(&self, raw: Value) -> Result<Value, CoercionError> {
        if raw.is_null() {
            return Ok(raw);
        }
        match Self::parse(&raw) {
            Some(instant) => Ok(Value::String(
                instant.to_rfc3339_opts(SecondsFormat::Millis, true),
            )),
            None => Err(CoercionError::new(format!(
                "{raw} is not an ISO-8601 date-time"
            ))),
        }
    }
}

/// How a relationship stores its related data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelationKind {
    #[default]
    HasMany,
    BelongsTo,
}

/// Declares a related-record attribute on a model class.
///
/// Relationships are declaration-only here: the related value lives inside
/// the owning record's attributes (embedded) or as a stored id (referenced),
/// and reading it never marks the owner dirty. Loading strategies belong to
/// the adapter layer.
#[derive(Debug, Clone)]
pub struct RelationshipDescriptor {
    pub name: String,
    pub target: String,
    pub kind: RelationKind,
    pub embedded: bool,
}

impl RelationshipDescriptor {
    pub fn belongs_to(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            kind: RelationKind::BelongsTo,
            embedded: false,
        }
    }

    pub fn has_many(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            kind: RelationKind::HasMany,
            embedded: false,
        }
    }

    /// Mark the related data as stored inline within the owner.
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }
}

/// Save/load lifecycle state of a record, derived from its dirty set and
/// in-flight save flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Clean,
    Dirty,
    Saving,
}

/// Wire shape of a persisted record: canonical id plus flattened attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_equality_is_deep() {
        let ty = DefaultType;
        let old = json!({"name": {"first": "Erik", "last": "Bryn"}});
        let same = json!({"name": {"first": "Erik", "last": "Bryn"}});
        let changed = json!({"name": {"first": "Yehuda", "last": "Bryn"}});
        assert!(ty.is_equal(&old, &same));
        assert!(!ty.is_equal(&old, &changed));
    }

    #[test]
    fn boolean_coercion_accepts_raw_spellings() {
        let ty = BooleanType;
        assert_eq!(ty.coerce(json!(true)).unwrap(), json!(true));
        assert_eq!(ty.coerce(json!("true")).unwrap(), json!(true));
        assert_eq!(ty.coerce(json!("0")).unwrap(), json!(false));
        assert_eq!(ty.coerce(json!(1)).unwrap(), json!(true));
        assert_eq!(ty.coerce(Value::Null).unwrap(), Value::Null);
        assert!(ty.coerce(json!("maybe")).is_err());
        assert!(ty.coerce(json!(7)).is_err());
        assert!(ty.coerce(json!([true])).is_err());
    }

    #[test]
    fn datetime_coercion_normalizes_to_utc() {
        let ty = DateTimeType;
        let coerced = ty.coerce(json!("2013-01-01T00:00:00.000Z")).unwrap();
        assert_eq!(coerced, json!("2013-01-01T00:00:00.000Z"));

        let from_offset = ty.coerce(json!("2013-01-01T01:00:00+01:00")).unwrap();
        assert_eq!(from_offset, json!("2013-01-01T00:00:00.000Z"));

        let from_millis = ty.coerce(json!(1356998400000_i64)).unwrap();
        assert_eq!(from_millis, json!("2013-01-01T00:00:00.000Z"));

        assert!(ty.coerce(json!("not a date")).is_err());
    }

    #[test]
    fn datetime_equality_compares_instants() {
        let ty = DateTimeType;
        assert!(ty.is_equal(
            &json!("2013-01-01T00:00:00.000Z"),
            &json!("2013-01-01T01:00:00+01:00")
        ));
        assert!(!ty.is_equal(
            &json!("2013-01-01T00:00:00.000Z"),
            &json!("2014-01-01T00:00:00.000Z")
        ));
    }

    #[test]
    fn record_document_round_trips_flattened() {
        let document = RecordDocument {
            id: Some("r1".to_string()),
            attributes: json!({"name": "Erik"}).as_object().unwrap().clone(),
        };
        let serialized = serde_json::to_value(&document).unwrap();
        assert_eq!(serialized, json!({"id": "r1", "name": "Erik"}));
        let back: RecordDocument = serde_json::from_value(serialized).unwrap();
        assert_eq!(back, document);
    }
}

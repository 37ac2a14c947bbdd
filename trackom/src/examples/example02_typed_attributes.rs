use anyhow::Result;
use serde_json::{Value, json};

use crate::{AttributeType, BooleanType, DateTimeType, ModelClass};

/// Treats a new value as unchanged when it still contains the committed one.
struct Containment;

impl AttributeType for Containment {
    fn is_equal(&self, old: &Value, new: &Value) -> bool {
        match (old.as_str(), new.as_str()) {
            (Some(old), Some(new)) => new.contains(old),
            _ => old == new,
        }
    }
}

/// Example 02 – type descriptors decide what counts as a change.
pub async fn run() -> Result<()> {
    let animals = ModelClass::builder("animals")
        .attr_typed("name", Containment)
        .attr_typed("can_swim", BooleanType)
        .attr_typed("born_at", DateTimeType)
        .build();

    let mut otter = animals.create();
    otter.load(
        "otter-1",
        json!({"name": "Otto", "can_swim": "true", "born_at": "2013-01-01T01:00:00+01:00"}),
    )?;

    // Coercion at load: raw spellings become typed values.
    assert_eq!(otter.get_bool("can_swim"), Some(true));
    assert_eq!(
        otter.get("born_at"),
        Some(&json!("2013-01-01T00:00:00.000Z"))
    );
    assert!(otter.get_datetime("born_at").is_some());

    // The containment rule says an extended name is not a change.
    otter.set("name", "Otto Jr")?;
    assert!(!otter.is_dirty());
    otter.set("name", "Pip")?;
    assert!(otter.is_dirty());
    otter.set("name", "Otto")?;
    assert!(!otter.is_dirty());

    // Same instant, different spelling: still clean.
    otter.set("born_at", "2013-01-01T00:00:00Z")?;
    assert!(!otter.is_dirty());

    otter.set("can_swim", false)?;
    assert!(otter.is_dirty(), "toggling a boolean is a change");
    Ok(())
}

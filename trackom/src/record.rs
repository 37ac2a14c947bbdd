//! Record instances with snapshot-based dirty tracking.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, trace};
use serde_json::{Map, Value};

use crate::class::ModelClass;
use crate::errors::ModelError;
use crate::path;
use crate::types::{DateTimeType, LifecycleState};

static NULL: Value = Value::Null;

/// One model instance: current attribute values, the last-committed snapshot,
/// and the set of attribute names that differ between the two.
///
/// Dirtiness is decided per attribute by its type descriptor's equality rule
/// and re-derived on every mutation. Reading a value, including embedded or
/// related substructures, never changes it. The snapshot is replaced
/// wholesale on `load` and on successful `save`, never merged.
pub struct Record {
    class: Arc<ModelClass>,
    id: Option<String>,
    attributes: Map<String, Value>,
    snapshot: Map<String, Value>,
    dirty: BTreeSet<String>,
    is_new: bool,
    is_saving: bool,
}

impl Record {
    pub(crate) fn new(class: Arc<ModelClass>) -> Self {
        Self {
            class,
            id: None,
            attributes: Map::new(),
            snapshot: Map::new(),
            dirty: BTreeSet::new(),
            is_new: true,
            is_saving: false,
        }
    }

    pub fn class(&self) -> &Arc<ModelClass> {
        &self.class
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn is_saving(&self) -> bool {
        self.is_saving
    }

    /// True iff any attribute currently differs from the snapshot. Derived
    /// at read time from the dirty set, never cached.
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Currently dirty attribute names, in lexicographic order.
    pub fn dirty_attributes(&self) -> Vec<&str> {
        self.dirty.iter().map(String::as_str).collect()
    }

    pub fn state(&self) -> LifecycleState {
        if self.is_saving {
            LifecycleState::Saving
        } else if self.dirty.is_empty() {
            LifecycleState::Clean
        } else {
            LifecycleState::Dirty
        }
    }

    /// Current attribute values as stored.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Read an attribute, aliased name, or dotted path. Never affects dirty
    /// state.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let target = self.class.resolve_alias(name);
        let (base, rest) = path::split_base(target);
        let value = self.attributes.get(base)?;
        match rest {
            Some(rest) => path::read(value, rest),
            None => Some(value),
        }
    }

    /// Read a declared relationship's stored value: the embedded substructure,
    /// or the referenced id(s). Never affects dirty state.
    pub fn get_related(&self, name: &str) -> Option<&Value> {
        let relationship = self.class.relationship(name)?;
        self.attributes.get(&relationship.name)
    }

    /// Typed read of a date/time attribute coerced at load time.
    pub fn get_datetime(&self, name: &str) -> Option<DateTime<Utc>> {
        self.get(name).and_then(DateTimeType::parse)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// Write an attribute, aliased name, or dotted path, then re-evaluate the
    /// dirtiness of the base attribute against the snapshot.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ModelError> {
        let value = value.into();
        let target = self.class.resolve_alias(name).to_string();
        let (base, rest) = path::split_base(&target);
        match rest {
            None => {
                self.attributes.insert(base.to_string(), value);
            }
            Some(rest) => {
                let slot = self.attributes.entry(base.to_string()).or_insert(Value::Null);
                path::write(slot, rest, value)?;
            }
        }
        self.reevaluate(base);
        Ok(())
    }

    /// Change detector: compare the base attribute's current value against
    /// the snapshot using its type descriptor and update the dirty set.
    /// Insertion and removal are both idempotent.
    fn reevaluate(&mut self, name: &str) {
        let current = self.attributes.get(name).unwrap_or(&NULL);
        let equal = match self.snapshot.get(name) {
            Some(committed) => self.class.registry().resolve(name).is_equal(committed, current),
            // Nothing committed yet: only an absent or null value is clean.
            None => current.is_null(),
        };
        trace!(
            "change check on {}.{}: equal={}",
            self.class.name(),
            name,
            equal
        );
        if equal {
            self.dirty.remove(name);
        } else {
            self.dirty.insert(name.to_string());
        }
    }

    /// Replace the record's state wholesale from raw persisted data.
    ///
    /// Typed attributes are coerced through the registry; the snapshot
    /// becomes the post-coercion values, the dirty set clears, and the record
    /// stops being new. Valid in any state, including while a save is
    /// pending.
    pub fn load(&mut self, id: impl Into<String>, raw: Value) -> Result<(), ModelError> {
        let Value::Object(raw) = raw else {
            return Err(ModelError::NotAnObject {
                found: path::value_kind(&raw),
            });
        };
        let registry = self.class.registry();
        let mut attributes = Map::with_capacity(raw.len());
        for (name, value) in raw {
            let coerced = registry
                .resolve(&name)
                .coerce(value)
                .map_err(|source| ModelError::Coercion {
                    attribute: name.clone(),
                    source,
                })?;
            attributes.insert(name, coerced);
        }

        self.id = Some(id.into());
        self.snapshot = attributes.clone();
        self.attributes = attributes;
        self.dirty.clear();
        self.is_new = false;
        debug!(
            "loaded {}/{} ({} attributes)",
            self.class.name(),
            self.id.as_deref().unwrap_or_default(),
            self.attributes.len()
        );
        Ok(())
    }

    /// Persist through the class adapter.
    ///
    /// A record with nothing dirty resolves immediately with `Ok(false)` and
    /// never touches the adapter. Otherwise the adapter is invoked exactly
    /// once with `is_saving` set; on success the canonical id is adopted,
    /// `did_save` commits the snapshot, and the call resolves `Ok(true)`. On
    /// failure `is_saving` resets and the record stays dirty for retry.
    pub async fn save(&mut self) -> Result<bool, ModelError> {
        if self.dirty.is_empty() {
            trace!("save on clean {} is a no-op", self.class.name());
            return Ok(false);
        }
        let adapter = match self.class.adapter() {
            Some(adapter) => Arc::clone(adapter),
            None => {
                return Err(ModelError::NoAdapter {
                    class: self.class.name().to_string(),
                });
            }
        };

        self.is_saving = true;
        debug!(
            "saving {} ({} dirty attributes)",
            self.class.name(),
            self.dirty.len()
        );
        match adapter.save_record(&*self).await {
            Ok(id) => {
                self.id = Some(id);
                self.did_save();
                Ok(true)
            }
            Err(err) => {
                self.is_saving = false;
                debug!("save of {} failed: {err}", self.class.name());
                Err(err.into())
            }
        }
    }

    /// Adapter success callback: commit the values current at completion time
    /// as the new snapshot and clear dirty state.
    ///
    /// The whole current value set becomes the snapshot, so attributes
    /// mutated while a save was pending are treated as already persisted
    /// (last write wins).
    pub fn did_save(&mut self) {
        self.snapshot = self.attributes.clone();
        self.dirty.clear();
        self.is_saving = false;
        self.is_new = false;
    }

    /// Discard local changes, restoring every attribute to its snapshot
    /// value.
    pub fn rollback(&mut self) {
        self.attributes = self.snapshot.clone();
        self.dirty.clear();
    }

    /// Wire-shape view of the record: id plus current attribute values.
    pub fn to_document(&self) -> crate::types::RecordDocument {
        crate::types::RecordDocument {
            id: self.id.clone(),
            attributes: self.attributes.clone(),
        }
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("class", &self.class.name())
            .field("id", &self.id)
            .field("dirty", &self.dirty)
            .field("is_new", &self.is_new)
            .field("is_saving", &self.is_saving)
            .finish()
    }
}

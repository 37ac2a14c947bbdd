use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::types::{AttributeType, DefaultType};

static DEFAULT_TYPE: DefaultType = DefaultType;

/// Maps attribute names to type descriptors for one model class.
///
/// Resolution never fails: names registered without a descriptor, and names
/// never registered at all, fall back silently to [`DefaultType`] (deep
/// structural equality, identity coercion).
#[derive(Clone, Default)]
pub struct AttributeRegistry {
    types: BTreeMap<String, Arc<dyn AttributeType>>,
    declared: Vec<String>,
}

impl AttributeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an attribute, optionally with a custom type descriptor.
    /// Re-registering a name replaces its descriptor.
    pub fn register(&mut self, name: impl Into<String>, descriptor: Option<Arc<dyn AttributeType>>) {
        let name = name.into();
        if !self.declared.contains(&name) {
            self.declared.push(name.clone());
        }
        if let Some(descriptor) = descriptor {
            self.types.insert(name, descriptor);
        }
    }

    /// Resolve the equality/coercion policy for an attribute name.
    pub fn resolve(&self, name: &str) -> &dyn AttributeType {
        match self.types.get(name) {
            Some(descriptor) => descriptor.as_ref(),
            None => &DEFAULT_TYPE,
        }
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.declared.iter().any(|declared| declared == name)
    }

    /// Attribute names in declaration order.
    pub fn declared(&self) -> impl Iterator<Item = &str> {
        self.declared.iter().map(String::as_str)
    }
}

impl fmt::Debug for AttributeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeRegistry")
            .field("declared", &self.declared)
            .field("typed", &self.types.keys().collect::<Vec<_>>())
            .finish()
    }
}

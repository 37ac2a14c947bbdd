//! Model class definitions.
//!
//! A [`ModelClass`] is the declarative surface for one kind of record:
//! attribute names and their type descriptors, aliases onto dotted paths,
//! relationship declarations, and the persistence adapter. It is built once,
//! immutable afterwards, and shared across instances behind an `Arc`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::adapter::Adapter;
use crate::errors::ModelError;
use crate::record::Record;
use crate::registry::AttributeRegistry;
use crate::types::{AttributeType, RelationshipDescriptor};

pub struct ModelClass {
    name: String,
    registry: AttributeRegistry,
    aliases: BTreeMap<String, String>,
    relationships: Vec<RelationshipDescriptor>,
    adapter: Option<Arc<dyn Adapter>>,
}

impl ModelClass {
    /// Start declaring a model class. `name` doubles as the adapter-side
    /// collection name.
    pub fn builder(name: impl Into<String>) -> ModelClassBuilder {
        ModelClassBuilder {
            name: name.into(),
            registry: AttributeRegistry::new(),
            aliases: BTreeMap::new(),
            relationships: Vec::new(),
            adapter: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &AttributeRegistry {
        &self.registry
    }

    pub fn adapter(&self) -> Option<&Arc<dyn Adapter>> {
        self.adapter.as_ref()
    }

    pub fn relationships(&self) -> &[RelationshipDescriptor] {
        &self.relationships
    }

    pub fn relationship(&self, name: &str) -> Option<&RelationshipDescriptor> {
        self.relationships.iter().find(|rel| rel.name == name)
    }

    /// Resolve a declared alias to its dotted path, or hand `name` back.
    pub fn resolve_alias<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Instantiate a fresh, unsaved record of this class.
    pub fn create(self: &Arc<Self>) -> Record {
        Record::new(Arc::clone(self))
    }

    /// Fetch raw attributes through the adapter and load them into a clean
    /// record.
    pub async fn find(self: &Arc<Self>, id: &str) -> Result<Record, ModelError> {
        let adapter = self.adapter.clone().ok_or_else(|| ModelError::NoAdapter {
            class: self.name.clone(),
        })?;
        let raw = adapter.find_record(&self.name, id).await?;
        let mut record = Record::new(Arc::clone(self));
        record.load(id, raw)?;
        Ok(record)
    }
}

impl fmt::Debug for ModelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelClass")
            .field("name", &self.name)
            .field("registry", &self.registry)
            .field("aliases", &self.aliases)
            .field("relationships", &self.relationships)
            .field("has_adapter", &self.adapter.is_some())
            .finish()
    }
}

/// Builder for [`ModelClass`].
pub struct ModelClassBuilder {
    name: String,
    registry: AttributeRegistry,
    aliases: BTreeMap<String, String>,
    relationships: Vec<RelationshipDescriptor>,
    adapter: Option<Arc<dyn Adapter>>,
}

impl ModelClassBuilder {
    /// Declare an attribute with default structural equality.
    pub fn attr(mut self, name: impl Into<String>) -> Self {
        self.registry.register(name, None);
        self
    }

    /// Declare an attribute with a custom type descriptor.
    pub fn attr_typed(mut self, name: impl Into<String>, descriptor: impl AttributeType + 'static) -> Self {
        self.registry.register(name, Some(Arc::new(descriptor)));
        self
    }

    /// Declare a read/write alias onto a dotted path, e.g.
    /// `alias("author_name", "author.name")`. Mutations through the alias
    /// dirty the path's base attribute.
    pub fn alias(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.insert(name.into(), target.into());
        self
    }

    /// Declare a relationship. The relationship name becomes a readable,
    /// settable attribute like any other.
    pub fn relationship(mut self, descriptor: RelationshipDescriptor) -> Self {
        self.registry.register(descriptor.name.clone(), None);
        self.relationships.push(descriptor);
        self
    }

    /// Inject the persistence adapter for this class.
    pub fn adapter(self, adapter: impl Adapter + 'static) -> Self {
        self.adapter_arc(Arc::new(adapter))
    }

    /// Inject an already-shared adapter (e.g. one inspected by tests or
    /// shared across classes).
    pub fn adapter_arc(mut self, adapter: Arc<dyn Adapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    pub fn build(self) -> Arc<ModelClass> {
        Arc::new(ModelClass {
            name: self.name,
            registry: self.registry,
            aliases: self.aliases,
            relationships: self.relationships,
            adapter: self.adapter,
        })
    }
}

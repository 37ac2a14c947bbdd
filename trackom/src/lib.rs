//! trackom core library.
//!
//! A change-tracking object mapper: model classes declare typed attributes,
//! records track dirtiness against their last loaded/saved snapshot, and a
//! pluggable adapter persists them.
//!
//! # Example
//! ```ignore
//! let posts = ModelClass::builder("posts")
//!     .attr("title")
//!     .attr_typed("created_at", DateTimeType)
//!     .adapter(MemoryAdapter::new())
//!     .build();
//!
//! let mut post = posts.create();
//! post.load("p1", json!({"title": "Hello"}))?;
//! post.set("title", "Hello, world")?;
//! assert!(post.is_dirty());
//! post.save().await?;
//! assert!(!post.is_dirty());
//! ```

pub mod adapter;
pub mod class;
pub mod errors;
pub mod examples;
pub mod id;
mod path;
pub mod record;
pub mod registry;
pub mod types;

pub use adapter::{Adapter, MemoryAdapter};
pub use class::{ModelClass, ModelClassBuilder};
pub use errors::{AdapterError, CoercionError, ModelError};
pub use record::Record;
pub use registry::AttributeRegistry;
pub use types::{
    AttributeType, BooleanType, DateTimeType, DefaultType, LifecycleState, RecordDocument,
    RelationKind, RelationshipDescriptor,
};

// Re-exports so adapter implementors don't need their own copies of the
// attribute macro and value types.
pub use async_trait::async_trait;
pub use serde_json;

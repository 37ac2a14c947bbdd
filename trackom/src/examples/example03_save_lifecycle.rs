use std::sync::Arc;

use anyhow::Result;
use serde_json::json;

use crate::{LifecycleState, MemoryAdapter, ModelClass, RelationshipDescriptor};

/// Example 03 – the save/load lifecycle against a memory adapter.
pub async fn run() -> Result<()> {
    let adapter = Arc::new(MemoryAdapter::new());
    let posts = ModelClass::builder("posts")
        .attr("title")
        .relationship(RelationshipDescriptor::belongs_to("author", "authors").embedded())
        .adapter_arc(adapter.clone())
        .build();

    // A brand-new record picks up a generated id at save time.
    let mut post = posts.create();
    post.set("title", "Drafts")?;
    post.set("author", json!({"id": "a1", "name": "Cory Loken"}))?;
    assert!(post.id().is_none());
    assert!(post.is_new());

    post.save().await?;
    let id = post.id().expect("saved record has an id").to_string();
    assert!(!post.is_new());
    assert_eq!(post.state(), LifecycleState::Clean);
    assert_eq!(adapter.len("posts").await, 1);

    // Find hands back a clean record with the persisted values.
    let found = posts.find(&id).await?;
    assert!(!found.is_dirty());
    assert!(!found.is_new());
    assert_eq!(found.get("title"), Some(&json!("Drafts")));

    // Reading a relationship never dirties the owner.
    let author = found.get_related("author").expect("embedded author");
    assert_eq!(author["name"], json!("Cory Loken"));
    assert!(!found.is_dirty());
    Ok(())
}

use anyhow::Result;
use serde_json::json;

use crate::{MemoryAdapter, ModelClass};

/// Example 01 – load, mutate, revert: the dirty set follows value equality.
pub async fn run() -> Result<()> {
    let posts = ModelClass::builder("posts")
        .attr("title")
        .attr("body")
        .adapter(MemoryAdapter::new())
        .build();

    let mut post = posts.create();
    post.load("post-1", json!({"title": "Hello", "body": "First!"}))?;
    assert!(!post.is_dirty(), "freshly loaded record is clean");

    post.set("title", "Hello, world")?;
    assert!(post.is_dirty());
    assert_eq!(post.dirty_attributes(), ["title"]);

    post.set("title", "Hello")?;
    assert!(!post.is_dirty(), "reverting to the loaded value clears dirtiness");

    post.set("body", "Edited")?;
    let saved = post.save().await?;
    assert!(saved, "dirty record reaches the adapter");
    assert!(!post.is_dirty(), "record is clean after a successful save");

    let saved_again = post.save().await?;
    assert!(!saved_again, "clean record never reaches the adapter");
    Ok(())
}

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};
use trackom::{
    Adapter, AdapterError, BooleanType, LifecycleState, MemoryAdapter, ModelClass, ModelError,
    Record,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Succeeds after a configurable number of failures, counting every attempt.
struct FlakyAdapter {
    failures_left: AtomicUsize,
    attempts: AtomicUsize,
}

impl FlakyAdapter {
    fn failing(times: usize) -> Self {
        Self {
            failures_left: AtomicUsize::new(times),
            attempts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Adapter for FlakyAdapter {
    async fn save_record(&self, record: &Record) -> Result<String, AdapterError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        assert!(record.is_saving(), "record reports an in-flight save");
        assert_eq!(record.state(), LifecycleState::Saving);

        if self.failures_left.load(Ordering::SeqCst) > 0 {
            self.failures_left.fetch_sub(1, Ordering::SeqCst);
            return Err(AdapterError::new("backend unavailable"));
        }
        Ok(record.id().unwrap_or("assigned-1").to_string())
    }

    async fn find_record(&self, _collection: &str, id: &str) -> Result<Value, AdapterError> {
        Err(AdapterError::not_found(format!("no record '{id}'")))
    }
}

#[tokio::test]
async fn failed_save_leaves_the_record_dirty_for_retry() {
    init_logging();
    let adapter = Arc::new(FlakyAdapter::failing(1));
    let models = ModelClass::builder("models")
        .attr("name")
        .adapter_arc(adapter.clone())
        .build();

    let mut record = models.create();
    record.load("1", json!({"name": "Erik"})).unwrap();
    record.set("name", "Jeffrey").unwrap();

    let err = record.save().await.unwrap_err();
    assert!(matches!(err, ModelError::Adapter(_)));
    assert!(record.is_dirty(), "failure does not clear dirty state");
    assert!(!record.is_saving());
    assert_eq!(record.state(), LifecycleState::Dirty);
    assert_eq!(record.get("name"), Some(&json!("Jeffrey")));

    let saved = record.save().await.unwrap();
    assert!(saved);
    assert!(!record.is_dirty());
    assert_eq!(adapter.attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn successful_save_commits_the_values_current_at_completion() {
    let adapter = Arc::new(FlakyAdapter::failing(0));
    let models = ModelClass::builder("models")
        .attr("name")
        .adapter_arc(adapter.clone())
        .build();

    let mut record = models.create();
    record.load("1", json!({"name": "Erik"})).unwrap();
    record.set("name", "Jeffrey").unwrap();

    let saved = record.save().await.unwrap();
    assert!(saved);
    assert_eq!(adapter.attempts.load(Ordering::SeqCst), 1);

    // The new snapshot equals the saved values: reverting to the pre-save
    // value is now itself a change.
    record.set("name", "Erik").unwrap();
    assert!(record.is_dirty());
    record.set("name", "Jeffrey").unwrap();
    assert!(!record.is_dirty());
}

#[tokio::test]
async fn save_without_an_adapter_is_an_error_only_when_dirty() {
    let models = ModelClass::builder("models").attr("name").build();

    let mut record = models.create();
    let saved = record.save().await.unwrap();
    assert!(!saved, "clean record needs no adapter");

    record.set("name", "Erik").unwrap();
    let err = record.save().await.unwrap_err();
    assert!(matches!(err, ModelError::NoAdapter { .. }));
    assert!(record.is_dirty());
}

#[tokio::test]
async fn memory_adapter_round_trip_assigns_ids_and_finds_clean_records() {
    let adapter = Arc::new(MemoryAdapter::new());
    let posts = ModelClass::builder("posts")
        .attr("title")
        .adapter_arc(adapter.clone())
        .build();

    let mut post = posts.create();
    assert!(post.is_new());
    post.set("title", "Drafts").unwrap();
    post.save().await.unwrap();

    let id = post.id().expect("generated id").to_string();
    assert_eq!(id.len(), 16);
    assert!(!post.is_new(), "saved record is no longer new");
    assert_eq!(adapter.len("posts").await, 1);

    let found = posts.find(&id).await.unwrap();
    assert!(!found.is_dirty());
    assert!(!found.is_new());
    assert_eq!(found.id(), Some(id.as_str()));
    assert_eq!(found.get("title"), Some(&json!("Drafts")));
}

#[tokio::test]
async fn finding_a_missing_record_reports_not_found() {
    let posts = ModelClass::builder("posts")
        .attr("title")
        .adapter(MemoryAdapter::new())
        .build();

    let err = posts.find("missing").await.unwrap_err();
    match err {
        ModelError::Adapter(adapter_err) => assert!(adapter_err.is_not_found()),
        other => panic!("expected an adapter error, got {other:?}"),
    }
}

#[tokio::test]
async fn find_coerces_typed_attributes() {
    let adapter = Arc::new(MemoryAdapter::new());
    adapter
        .insert_fixture("animals", "a1", json!({"can_swim": "true"}))
        .await
        .unwrap();

    let animals = ModelClass::builder("animals")
        .attr_typed("can_swim", BooleanType)
        .adapter_arc(adapter)
        .build();

    let animal = animals.find("a1").await.unwrap();
    assert_eq!(animal.get_bool("can_swim"), Some(true));
    assert!(!animal.is_dirty());
}

#[test]
fn load_rejects_values_a_type_cannot_coerce() {
    let animals = ModelClass::builder("animals")
        .attr_typed("can_swim", BooleanType)
        .build();

    let mut animal = animals.create();
    let err = animal.load("a1", json!({"can_swim": "maybe"})).unwrap_err();
    match err {
        ModelError::Coercion { attribute, .. } => assert_eq!(attribute, "can_swim"),
        other => panic!("expected a coercion error, got {other:?}"),
    }
}

#[test]
fn load_replaces_dirty_state_unconditionally() {
    let models = ModelClass::builder("models").attr("name").build();

    let mut record = models.create();
    record.load("1", json!({"name": "Erik"})).unwrap();
    record.set("name", "Jeffrey").unwrap();
    assert!(record.is_dirty());

    record.load("2", json!({"name": "Yehuda"})).unwrap();
    assert!(!record.is_dirty(), "load clears all dirty state");
    assert_eq!(record.id(), Some("2"));
    assert_eq!(record.get("name"), Some(&json!("Yehuda")));
}

#[test]
fn rollback_discards_local_changes() {
    let models = ModelClass::builder("models").attr("name").attr("author").build();

    let mut record = models.create();
    record
        .load("1", json!({"name": "Erik", "author": {"name": {"first": "Erik"}}}))
        .unwrap();
    record.set("name", "Jeffrey").unwrap();
    record.set("author.name.first", "Yehuda").unwrap();
    assert_eq!(record.dirty_attributes(), ["author", "name"]);

    record.rollback();
    assert!(!record.is_dirty());
    assert_eq!(record.get("name"), Some(&json!("Erik")));
    assert_eq!(record.get("author.name.first"), Some(&json!("Erik")));
}

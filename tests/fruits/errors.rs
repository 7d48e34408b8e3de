use find_or_create::{ModelsExt, Outcome, StoreError};
use serde_json::json;

use crate::support::{fruits, map, BrokenLookupStore};

#[tokio::test]
async fn lookup_error_short_circuits() {
    let store = BrokenLookupStore::default();
    let model = store.model(fruits());

    let outcome = model
        .find_or_create(map(json!({"name": "Apple"})))
        .fields(map(json!({"color": "red"})))
        .await;

    match &outcome {
        Outcome::LookupFailed(StoreError::Storage(msg)) => assert_eq!(msg, "connection refused"),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(outcome.record().is_none());
    assert!(!outcome.was_updated());
    assert!(!outcome.is_new());
    assert_eq!(store.saves(), 0);
}

#[tokio::test]
async fn lookup_error_rejects_resolve() {
    let store = BrokenLookupStore::default();
    let err = store
        .model(fruits())
        .find_or_create(map(json!({"name": "Apple"})))
        .resolve()
        .await
        .unwrap_err();

    assert_eq!(err, StoreError::Storage("connection refused".into()));
    assert_eq!(store.saves(), 0);
}

#[tokio::test]
async fn invalid_query_surfaces_unchanged() {
    let store = find_or_create::InMemoryDocumentStore::new();
    let outcome = store
        .model(fruits())
        .find_or_create(map(json!({"name": {"$regex": "^A"}})))
        .await;

    assert!(matches!(outcome.error(), Some(StoreError::InvalidQuery(_))));
    assert_eq!(store.count(&fruits()).unwrap(), 0);
}

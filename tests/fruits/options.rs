use find_or_create::{
    InMemoryDocumentStore, ModelsExt, OptionsOverride, Resolution, SaveOptions, StoreError,
};
use serde_json::json;
use tokio::sync::oneshot;

use crate::support::{fruits, map, strict_fruits};

#[tokio::test]
async fn validation_failure_is_reported_with_the_record() {
    let store = InMemoryDocumentStore::new();
    let model = store.model(strict_fruits());

    let outcome = model
        .find_or_create(map(json!({"name": "Blueberry"})))
        .fields(map(json!({"color": "blue"})))
        .await;

    assert!(matches!(outcome.error(), Some(StoreError::Validation(_))));
    assert!(outcome.was_updated());
    assert!(outcome.is_new());
    assert_eq!(outcome.record().unwrap().get("color"), Some(&json!("blue")));
    assert_eq!(store.count(model.schema()).unwrap(), 0);
}

#[tokio::test]
async fn save_options_can_disable_validation() {
    let store = InMemoryDocumentStore::new();
    let model = store.model(strict_fruits());

    let outcome = model
        .find_or_create(map(json!({"name": "Blueberry"})))
        .fields(map(json!({"color": "blue"})))
        .options(
            OptionsOverride::new()
                .save_options(SaveOptions::new().with("validateBeforeSave", false)),
        )
        .await;

    assert!(outcome.is_ok());
    assert!(outcome.was_updated());
    let stored = store.all(model.schema()).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].get("color"), Some(&json!("blue")));
}

#[tokio::test]
async fn schema_save_options_come_from_registration() {
    let store = InMemoryDocumentStore::new();
    let schema = strict_fruits().with_find_or_create(
        OptionsOverride::from_json(r#"{"saveOptions": {"validateBeforeSave": false}}"#).unwrap(),
    );
    let model = store.model(schema);

    let call = model.find_or_create(map(json!({"color": "purple"})));
    assert!(!call.effective_options().save_options.validate_before_save());

    let outcome = call.await;
    assert!(outcome.is_ok());
    assert_eq!(store.count(model.schema()).unwrap(), 1);
}

#[tokio::test]
async fn resolve_returns_bare_record_by_default() {
    let store = InMemoryDocumentStore::new();
    let model = store.model(fruits());

    let resolution = model
        .find_or_create(map(json!({"name": "Fig"})))
        .resolve()
        .await
        .unwrap();

    match resolution {
        Resolution::Record(record) => assert_eq!(record.get("name"), Some(&json!("Fig"))),
        Resolution::Status(_) => panic!("status was not requested"),
    }
}

#[tokio::test]
async fn resolve_returns_status_when_requested() {
    let store = InMemoryDocumentStore::new();
    let model = store.model(fruits());
    let query = map(json!({"name": "Date"}));

    let created = model
        .find_or_create(query.clone())
        .options(OptionsOverride::new().status(true))
        .resolve()
        .await
        .unwrap();
    let status = created.status().unwrap();
    assert!(status.is_new);
    assert!(status.was_updated);

    let found = model
        .find_or_create(query)
        .options(OptionsOverride::new().status(true))
        .resolve()
        .await
        .unwrap();
    let status = found.status().unwrap();
    assert!(!status.is_new);
    assert!(!status.was_updated);
    assert_eq!(found.record().id(), created.record().id());
}

#[tokio::test]
async fn resolve_rejects_with_the_store_error() {
    let store = InMemoryDocumentStore::new();
    let model = store.model(strict_fruits());

    let err = model
        .find_or_create(map(json!({"color": "red"})))
        .options(OptionsOverride::new().status(true))
        .resolve()
        .await
        .unwrap_err();

    match err {
        StoreError::Validation(validation) => assert!(validation.violation("name").is_some()),
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn spawn_delivers_outcome_to_callback() {
    let store = InMemoryDocumentStore::new();
    let model = store.model(fruits());
    let (tx, rx) = oneshot::channel();

    let handle = model
        .find_or_create(map(json!({"name": "Guava"})))
        .fields(map(json!({"color": "green"})))
        .spawn(move |outcome| {
            let _ = tx.send(outcome.into_parts());
        });

    let (error, record, was_updated, is_new) = rx.await.unwrap();
    handle.await.unwrap();

    assert!(error.is_none());
    assert!(was_updated);
    assert!(is_new);
    assert_eq!(record.unwrap().get("color"), Some(&json!("green")));
    assert_eq!(store.count(model.schema()).unwrap(), 1);
}

#[test]
#[should_panic]
fn spawn_outside_a_runtime_panics() {
    let store = InMemoryDocumentStore::new();
    let model = store.model(fruits());

    let _handle = model
        .find_or_create(map(json!({"name": "Guava"})))
        .spawn(|_| {});
}

#[tokio::test]
async fn per_call_options_override_schema_defaults() {
    let store = InMemoryDocumentStore::new();
    let schema = fruits().with_find_or_create(
        OptionsOverride::new().append_to_array(true).save_if_found(false),
    );
    let model = store.model(schema);

    let options = model
        .find_or_create(map(json!({"name": "Lychee"})))
        .options(OptionsOverride::new().save_if_found(true))
        .effective_options();

    assert!(options.append_to_array);
    assert!(options.save_if_found);
    assert!(!options.status);
}

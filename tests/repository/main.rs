//! Integration tests for DocumentRepository over the in-memory store.

mod delete;
mod increment;

use occ_repository::{
    AllowDeletes, CancellationToken, Document, DocumentRepository, DocumentStore, DocumentsExt,
    InMemoryDocumentStore, MessageKey, MessageOverrides, Repository, RepositoryConfig,
    RepositoryError,
};
use support::Widget;

#[tokio::test]
async fn stored_body_round_trips_through_the_store() {
    let store = InMemoryDocumentStore::new();
    let widgets = store.documents::<Widget>();
    let cancel = CancellationToken::new();

    let widget = Widget::new("sprocket", 4);
    widgets.insert(&widget, &cancel).await.unwrap();

    let raw = store
        .get("widgets", widget.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(raw["id"], serde_json::json!(widget.id().to_string()));
    assert_eq!(raw["version"], serde_json::json!(widget.version().to_string()));
    assert_eq!(raw["stock"], serde_json::json!(4));

    let loaded = widgets.single(widget.id(), &cancel).await.unwrap();
    assert_eq!(loaded, widget);
}

#[tokio::test]
async fn collection_prefix_isolates_repositories() {
    let store = InMemoryDocumentStore::new();
    let cancel = CancellationToken::new();
    let staging = DocumentRepository::<Widget, _>::with_config(
        store.clone(),
        AllowDeletes::new(),
        RepositoryConfig::new().collection_prefix("staging_"),
    )
    .unwrap();
    let live = store.documents::<Widget>();

    staging.insert(&Widget::new("a", 1), &cancel).await.unwrap();

    assert_eq!(staging.collection(), "staging_widgets");
    assert_eq!(staging.count(&cancel).await.unwrap(), 1);
    assert_eq!(live.count(&cancel).await.unwrap(), 0);
    assert_eq!(store.len("staging_widgets"), 1);
}

#[tokio::test]
async fn invalid_config_is_rejected_at_construction() {
    let result = DocumentRepository::<Widget, _>::with_config(
        InMemoryDocumentStore::new(),
        AllowDeletes::new(),
        RepositoryConfig::new().default_page_size(50).max_page_size(10),
    );
    assert!(matches!(result, Err(RepositoryError::InvalidArgument(_))));
}

#[tokio::test]
async fn message_overrides_reach_results() {
    let store = InMemoryDocumentStore::new();
    let widgets = store.documents::<Widget>().with_messages(
        MessageOverrides::new()
            .with(MessageKey::EntityInserted, "Gespeichert.")
            .with(MessageKey::EntityUpdated, "Aktualisiert."),
    );
    let cancel = CancellationToken::new();

    let inserted = widgets.insert(&Widget::new("a", 1), &cancel).await.unwrap();
    assert_eq!(inserted.message, "Gespeichert.");

    let updated = widgets.update(&inserted.document, &cancel).await.unwrap();
    assert_eq!(updated.message, "Aktualisiert.");
}

#[tokio::test]
async fn deletion_allowed_text_comes_from_the_catalog() {
    let store = InMemoryDocumentStore::new();
    let widgets = store.documents::<Widget>().with_messages(
        MessageOverrides::new().with(MessageKey::DeletionAllowed, "Loeschen erlaubt."),
    );
    let cancel = CancellationToken::new();
    let stored = widgets
        .insert(&Widget::new("a", 1), &cancel)
        .await
        .unwrap()
        .document;

    let verdict = widgets.can_delete(&stored, &cancel).await.unwrap();
    assert_eq!(verdict.message, "Loeschen erlaubt.");

    let deleted = widgets.delete(&stored, &cancel).await.unwrap();
    assert_eq!(deleted.can_delete.message, "Loeschen erlaubt.");
}

#[tokio::test]
async fn guard_text_wins_over_the_catalog() {
    let store = InMemoryDocumentStore::new();
    let widgets = store
        .guarded_documents::<Widget, _>(AllowDeletes::with_message("Archived first."))
        .with_messages(
            MessageOverrides::new().with(MessageKey::DeletionAllowed, "Loeschen erlaubt."),
        );
    let cancel = CancellationToken::new();
    let stored = widgets
        .insert(&Widget::new("a", 1), &cancel)
        .await
        .unwrap()
        .document;

    let deleted = widgets.delete(&stored, &cancel).await.unwrap();
    assert_eq!(deleted.can_delete.message, "Archived first.");
}

#[tokio::test]
async fn works_behind_a_trait_object() {
    let store = InMemoryDocumentStore::new();
    let widgets: Box<dyn Repository<Widget>> = Box::new(store.documents::<Widget>());
    let cancel = CancellationToken::new();

    let inserted = widgets.insert(&Widget::new("boxed", 2), &cancel).await.unwrap();
    let updated = widgets.update(&inserted.document, &cancel).await.unwrap();
    assert_eq!(widgets.count(&cancel).await.unwrap(), 1);

    let deleted = widgets.delete(&updated.document, &cancel).await.unwrap();
    assert_eq!(deleted.deleted_count, 1);
    assert!(widgets.first_or_default(&cancel).await.unwrap().is_none());
}

#[tokio::test]
async fn cancelled_token_stops_every_operation() {
    let store = InMemoryDocumentStore::new();
    let widgets = store.documents::<Widget>();
    let live = CancellationToken::new();
    let stored = widgets.insert(&Widget::new("a", 1), &live).await.unwrap().document;

    let cancelled = CancellationToken::new();
    cancelled.cancel();

    let err = widgets.insert(&Widget::new("b", 1), &cancelled).await.unwrap_err();
    assert_eq!(err, RepositoryError::Cancelled);
    let err = widgets.update(&stored, &cancelled).await.unwrap_err();
    assert_eq!(err, RepositoryError::Cancelled);
    let err = widgets.delete(&stored, &cancelled).await.unwrap_err();
    assert_eq!(err, RepositoryError::Cancelled);
    let err = widgets.list(&cancelled).await.unwrap_err();
    assert_eq!(err, RepositoryError::Cancelled);

    // Nothing changed.
    let current = widgets.single(stored.id(), &live).await.unwrap();
    assert_eq!(current, stored);
    assert_eq!(store.len("widgets"), 1);
}

#[tokio::test]
async fn store_outage_surfaces_as_unavailable() {
    let store = InMemoryDocumentStore::new();
    let widgets = store.documents::<Widget>();
    let cancel = CancellationToken::new();
    let stored = widgets.insert(&Widget::new("a", 1), &cancel).await.unwrap().document;

    store.set_available(false);
    let err = widgets.update(&stored, &cancel).await.unwrap_err();
    assert!(matches!(err, RepositoryError::StoreUnavailable(_)));
    let err = widgets.single_or_default(stored.id(), &cancel).await.unwrap_err();
    assert!(matches!(err, RepositoryError::StoreUnavailable(_)));

    store.set_available(true);
    // The earlier token is still current: the failed update never applied.
    assert_eq!(widgets.update(&stored, &cancel).await.unwrap().updated_count, 1);
}

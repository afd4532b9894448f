use occ_repository::{
    CancellationToken, Document, DocumentsExt, InMemoryDocumentStore, RepositoryError,
};

use crate::support::{BrokenGuard, OutOfStockOnly, RefuseDeletes, Widget};

#[tokio::test]
async fn delete_with_current_version_removes_document() {
    let store = InMemoryDocumentStore::new();
    let widgets = store.documents::<Widget>();
    let cancel = CancellationToken::new();
    let stored = widgets
        .insert(&Widget::new("gear", 3), &cancel)
        .await
        .unwrap()
        .document;

    let result = widgets.delete(&stored, &cancel).await.unwrap();

    assert_eq!(result.deleted_count, 1);
    assert!(result.can_delete.allowed);
    assert_eq!(result.can_delete.message, "Deletion is allowed.");
    assert!(widgets.single_or_default(stored.id(), &cancel).await.unwrap().is_none());
}

#[tokio::test]
async fn stale_delete_conflicts_and_keeps_document() {
    let store = InMemoryDocumentStore::new();
    let widgets = store.documents::<Widget>();
    let cancel = CancellationToken::new();
    let original = widgets
        .insert(&Widget::new("gear", 3), &cancel)
        .await
        .unwrap()
        .document;
    let newer = widgets.update(&original, &cancel).await.unwrap().document;

    let err = widgets.delete(&original, &cancel).await.unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(widgets.single(original.id(), &cancel).await.unwrap(), newer);
}

#[tokio::test]
async fn refused_delete_never_reaches_the_store() {
    let store = InMemoryDocumentStore::new();
    let guard = RefuseDeletes::default();
    let widgets = store.guarded_documents::<Widget, _>(guard.clone());
    let cancel = CancellationToken::new();
    let stored = widgets
        .insert(&Widget::new("gear", 3), &cancel)
        .await
        .unwrap()
        .document;

    // An offline store proves the refusal short-circuits: reaching it would
    // yield StoreUnavailable instead.
    store.set_available(false);
    let err = widgets.delete(&stored, &cancel).await.unwrap_err();
    store.set_available(true);

    assert_eq!(
        err,
        RepositoryError::DeletionRefused {
            message: "Widget is referenced by an order.".into()
        }
    );
    assert_eq!(guard.calls(), 1);
    assert_eq!(widgets.single(stored.id(), &cancel).await.unwrap(), stored);
}

#[tokio::test]
async fn guard_verdict_is_embedded_in_result() {
    let store = InMemoryDocumentStore::new();
    let widgets = store.guarded_documents::<Widget, _>(OutOfStockOnly);
    let cancel = CancellationToken::new();
    let stocked = widgets
        .insert(&Widget::new("gear", 3), &cancel)
        .await
        .unwrap()
        .document;
    let empty = widgets
        .insert(&Widget::new("cog", 0), &cancel)
        .await
        .unwrap()
        .document;

    let verdict = widgets.can_delete(&stocked, &cancel).await.unwrap();
    assert!(!verdict.allowed);
    assert_eq!(verdict.message, "3 still in stock.");

    let deleted = widgets.delete(&empty, &cancel).await.unwrap();
    assert_eq!(deleted.can_delete.message, "Out of stock.");
    assert_eq!(deleted.deleted_count, 1);
    assert_eq!(widgets.count(&cancel).await.unwrap(), 1);
}

#[tokio::test]
async fn guard_error_aborts_delete() {
    let store = InMemoryDocumentStore::new();
    let widgets = store.guarded_documents::<Widget, _>(BrokenGuard);
    let cancel = CancellationToken::new();
    let stored = widgets
        .insert(&Widget::new("gear", 0), &cancel)
        .await
        .unwrap()
        .document;

    let err = widgets.delete(&stored, &cancel).await.unwrap_err();
    assert!(matches!(err, RepositoryError::StoreUnavailable(_)));
    assert_eq!(store.len("widgets"), 1);
}

#[tokio::test]
async fn deleting_twice_is_not_found() {
    let store = InMemoryDocumentStore::new();
    let widgets = store.documents::<Widget>();
    let cancel = CancellationToken::new();
    let stored = widgets
        .insert(&Widget::new("gear", 3), &cancel)
        .await
        .unwrap()
        .document;

    widgets.delete(&stored, &cancel).await.unwrap();
    let err = widgets.delete(&stored, &cancel).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { id, .. } if id == stored.id()));
}

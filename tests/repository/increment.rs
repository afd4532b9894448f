use occ_repository::{
    CancellationToken, Document, DocumentStore, DocumentsExt, InMemoryDocumentStore,
    RepositoryError,
};

use crate::support::Widget;

#[tokio::test]
async fn increment_adds_and_rotates_version() {
    let store = InMemoryDocumentStore::new();
    let widgets = store.documents::<Widget>();
    let cancel = CancellationToken::new();
    let stored = widgets
        .insert(&Widget::new("gear", 3), &cancel)
        .await
        .unwrap()
        .document;

    let result = widgets
        .increment(stored.id(), "stock", stored.version(), 5.0, &cancel)
        .await
        .unwrap();
    assert!(result.applied);

    let after = widgets.single(stored.id(), &cancel).await.unwrap();
    assert_eq!(after.stock, 8);
    assert_eq!(Some(after.version()), result.version);
    assert_ne!(after.version(), stored.version());
    assert!(after.meta().updated_at().is_some());
}

#[tokio::test]
async fn increment_by_one_and_negative_amounts() {
    let store = InMemoryDocumentStore::new();
    let widgets = store.documents::<Widget>();
    let cancel = CancellationToken::new();
    let stored = widgets
        .insert(&Widget::new("gear", 3), &cancel)
        .await
        .unwrap()
        .document;

    let first = widgets
        .increment_by_one(stored.id(), "stock", stored.version(), &cancel)
        .await
        .unwrap();
    let version = first.version.unwrap();
    widgets
        .increment(stored.id(), "stock", version, -4.0, &cancel)
        .await
        .unwrap();

    assert_eq!(widgets.single(stored.id(), &cancel).await.unwrap().stock, 0);
}

#[tokio::test]
async fn fractional_increment_on_float_field() {
    let store = InMemoryDocumentStore::new();
    let widgets = store.documents::<Widget>();
    let cancel = CancellationToken::new();
    let stored = widgets
        .insert(&Widget::new("gear", 3), &cancel)
        .await
        .unwrap()
        .document;

    widgets
        .increment(stored.id(), "price", stored.version(), 0.25, &cancel)
        .await
        .unwrap();

    assert_eq!(widgets.single(stored.id(), &cancel).await.unwrap().price, 9.75);
}

#[tokio::test]
async fn stale_increment_conflicts_and_leaves_value() {
    let store = InMemoryDocumentStore::new();
    let widgets = store.documents::<Widget>();
    let cancel = CancellationToken::new();
    let stored = widgets
        .insert(&Widget::new("gear", 3), &cancel)
        .await
        .unwrap()
        .document;
    widgets
        .increment(stored.id(), "stock", stored.version(), 1.0, &cancel)
        .await
        .unwrap();

    let err = widgets
        .increment(stored.id(), "stock", stored.version(), 1.0, &cancel)
        .await
        .unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(widgets.single(stored.id(), &cancel).await.unwrap().stock, 4);
}

#[tokio::test]
async fn increment_on_missing_document_or_field() {
    let store = InMemoryDocumentStore::new();
    let widgets = store.documents::<Widget>();
    let cancel = CancellationToken::new();
    let stored = widgets
        .insert(&Widget::new("gear", 3), &cancel)
        .await
        .unwrap()
        .document;

    let ghost = Widget::new("ghost", 0);
    let err = widgets
        .increment(ghost.id(), "stock", ghost.version(), 1.0, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));

    for field in ["weight", "name"] {
        let err = widgets
            .increment(stored.id(), field, stored.version(), 1.0, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidArgument(_)), "{field}");
    }
    assert_eq!(widgets.single(stored.id(), &cancel).await.unwrap(), stored);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_increments_apply_exactly_once() {
    let store = InMemoryDocumentStore::new();
    let widgets = store.documents::<Widget>();
    let cancel = CancellationToken::new();
    let stored = widgets
        .insert(&Widget::new("gear", 0), &cancel)
        .await
        .unwrap()
        .document;

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let widgets = widgets.clone();
        let cancel = cancel.clone();
        let (id, version) = (stored.id(), stored.version());
        tasks.push(tokio::spawn(async move {
            widgets.increment(id, "stock", version, 1.0, &cancel).await
        }));
    }

    let mut applied = 0;
    let mut conflicts = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(result) if result.applied => applied += 1,
            Err(err) if err.is_conflict() => conflicts += 1,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    assert_eq!(applied, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(widgets.single(stored.id(), &cancel).await.unwrap().stock, 1);
}

#[tokio::test]
async fn fractional_increment_on_integer_field_is_rejected() {
    let store = InMemoryDocumentStore::new();
    let widgets = store.documents::<Widget>();
    let cancel = CancellationToken::new();
    let stored = widgets
        .insert(&Widget::new("gear", 3), &cancel)
        .await
        .unwrap()
        .document;
    let raw_before = store.get("widgets", stored.id()).await.unwrap();

    let err = widgets
        .increment(stored.id(), "stock", stored.version(), 0.5, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::InvalidArgument(_)));
    assert_eq!(store.get("widgets", stored.id()).await.unwrap(), raw_before);
    assert_eq!(widgets.single(stored.id(), &cancel).await.unwrap(), stored);
}

#[tokio::test]
async fn out_of_range_increment_on_integer_field_is_rejected() {
    let store = InMemoryDocumentStore::new();
    let widgets = store.documents::<Widget>();
    let cancel = CancellationToken::new();
    let stored = widgets
        .insert(&Widget::new("gear", 3), &cancel)
        .await
        .unwrap()
        .document;
    let raw_before = store.get("widgets", stored.id()).await.unwrap();

    for amount in [1e19, -1e19] {
        let err = widgets
            .increment(stored.id(), "stock", stored.version(), amount, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidArgument(_)), "{amount}");
    }

    assert_eq!(store.get("widgets", stored.id()).await.unwrap(), raw_before);
    let after = widgets.single(stored.id(), &cancel).await.unwrap();
    assert_eq!(after.stock, 3);
    assert_eq!(after.version(), stored.version());
}

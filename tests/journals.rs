mod common;

use common::TestStore;
use mnemo::AppError;
use mnemo::store::{entries, journals};
use uuid::Uuid;

#[tokio::test]
async fn create_and_get_journal() {
    let store = TestStore::new().await;
    let journal = journals::create(&store.db, "work", "things for work").await.unwrap();

    assert_eq!(journal.name, "work");
    assert_eq!(journal.description, "things for work");
    assert!(journal.active);
    assert_eq!(journal.created_at, journal.updated_at);

    let fetched = journals::get(&store.db, journal.id).await.unwrap();
    assert_eq!(fetched.id, journal.id);
    assert_eq!(fetched.name, "work");
}

#[tokio::test]
async fn names_are_not_unique() {
    let store = TestStore::new().await;
    let a = store.journal("same").await;
    let b = store.journal("same").await;
    assert_ne!(a.id, b.id);
}

#[tokio::test]
async fn get_missing_journal_is_not_found() {
    let store = TestStore::new().await;
    let id = Uuid::new_v4();
    let err = journals::get(&store.db, id).await.unwrap_err();
    assert!(matches!(err, AppError::JournalNotFound(missing) if missing == id));
}

#[tokio::test]
async fn list_orders_by_most_recently_updated() {
    let store = TestStore::new().await;
    let first = store.journal("first").await;
    let second = store.journal("second").await;

    let names: Vec<_> = journals::list(&store.db, false)
        .await
        .unwrap()
        .into_iter()
        .map(|j| j.name)
        .collect();
    assert_eq!(names, vec!["second", "first"]);

    journals::update(&store.db, first.id, "first", "touched", true)
        .await
        .unwrap();

    let ids: Vec<_> = journals::list(&store.db, false)
        .await
        .unwrap()
        .into_iter()
        .map(|j| j.id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[tokio::test]
async fn list_active_only_filters_inactive() {
    let store = TestStore::new().await;
    let live = store.journal("live").await;
    let old = store.journal("old").await;
    journals::update(&store.db, old.id, "old", "", false).await.unwrap();

    let active = journals::list(&store.db, true).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, live.id);

    assert_eq!(journals::list(&store.db, false).await.unwrap().len(), 2);
}

#[tokio::test]
async fn update_replaces_fields() {
    let store = TestStore::new().await;
    let journal = store.journal("draft").await;

    let updated = journals::update(&store.db, journal.id, "final", "done", false)
        .await
        .unwrap();
    assert_eq!(updated.name, "final");
    assert_eq!(updated.description, "done");
    assert!(!updated.active);
    assert_eq!(updated.created_at, journal.created_at);
    assert!(updated.updated_at >= journal.updated_at);
}

#[tokio::test]
async fn update_missing_journal_is_not_found() {
    let store = TestStore::new().await;
    let err = journals::update(&store.db, Uuid::new_v4(), "x", "", true)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::JournalNotFound(_)));
}

#[tokio::test]
async fn delete_cascades_to_entries_and_tag_links() {
    let store = TestStore::new().await;
    let doomed = store.journal("doomed").await;
    let kept = store.journal("kept").await;
    let a = store.entry(doomed.id, "a", &["x", "y"]).await;
    store.entry(doomed.id, "b", &["x"]).await;
    store.entry(kept.id, "c", &["x"]).await;

    journals::delete(&store.db, doomed.id).await.unwrap();

    assert!(matches!(
        journals::get(&store.db, doomed.id).await,
        Err(AppError::JournalNotFound(_))
    ));
    assert!(matches!(
        entries::get(&store.db, a.id).await,
        Err(AppError::EntryNotFound(_))
    ));
    assert_eq!(store.count("SELECT COUNT(*) FROM entries").await, 1);
    assert_eq!(store.count("SELECT COUNT(*) FROM entry_tags").await, 1);
    // Tags are global and survive.
    assert_eq!(store.count("SELECT COUNT(*) FROM tags").await, 2);
}

#[tokio::test]
async fn delete_missing_journal_is_not_found() {
    let store = TestStore::new().await;
    let err = journals::delete(&store.db, Uuid::new_v4()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn delete_inactive_removes_only_inactive() {
    let store = TestStore::new().await;
    let live = store.journal("live").await;
    for name in ["old1", "old2"] {
        let j = store.journal(name).await;
        store.entry(j.id, "note", &["t"]).await;
        journals::update(&store.db, j.id, name, "", false).await.unwrap();
    }

    let removed = journals::delete_inactive(&store.db).await.unwrap();
    assert_eq!(removed, 2);

    let remaining = journals::list(&store.db, false).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, live.id);
    assert_eq!(store.count("SELECT COUNT(*) FROM entries").await, 0);

    assert_eq!(journals::delete_inactive(&store.db).await.unwrap(), 0);
}

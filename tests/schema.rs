mod common;

use common::TestStore;
use mnemo::schema::{self, COMPONENT, SCHEMA_VERSION};
use mnemo::{AppError, Config, db};
use mnemo::store::journals;

#[tokio::test]
async fn fresh_store_reports_version_zero() {
    let store = TestStore::bare().await;
    assert_eq!(schema::current_version(&store.db, COMPONENT).await.unwrap(), 0);
    assert_eq!(schema::current_version(&store.db, "other").await.unwrap(), 0);
}

#[tokio::test]
async fn upgrade_fresh_store_then_again_is_noop() {
    let store = TestStore::bare().await;

    schema::upgrade(&store.db, COMPONENT, SCHEMA_VERSION).await.unwrap();
    assert_eq!(
        schema::current_version(&store.db, COMPONENT).await.unwrap(),
        SCHEMA_VERSION
    );

    schema::upgrade(&store.db, COMPONENT, SCHEMA_VERSION).await.unwrap();
    assert_eq!(
        schema::current_version(&store.db, COMPONENT).await.unwrap(),
        SCHEMA_VERSION
    );
}

#[tokio::test]
async fn unknown_component_is_zero_on_initialized_store() {
    let store = TestStore::new().await;
    assert_eq!(schema::current_version(&store.db, "plugins").await.unwrap(), 0);
}

#[tokio::test]
async fn older_target_is_blocked_and_version_unchanged() {
    let store = TestStore::bare().await;
    schema::initialize(&store.db, COMPONENT, 2).await.unwrap();

    let err = schema::upgrade(&store.db, COMPONENT, 1).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::MigrationBlocked {
            current: 2,
            target: 1,
            ..
        }
    ));
    assert_eq!(schema::current_version(&store.db, COMPONENT).await.unwrap(), 2);
}

#[tokio::test]
async fn newer_target_is_blocked_and_data_untouched() {
    let store = TestStore::new().await;
    store.journal("keep me").await;

    let err = schema::upgrade(&store.db, COMPONENT, SCHEMA_VERSION + 1)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::MigrationBlocked { .. }));
    assert_eq!(
        schema::current_version(&store.db, COMPONENT).await.unwrap(),
        SCHEMA_VERSION
    );
    assert_eq!(journals::list(&store.db, false).await.unwrap().len(), 1);
}

#[tokio::test]
async fn non_positive_target_is_rejected() {
    let store = TestStore::bare().await;
    let err = schema::upgrade(&store.db, COMPONENT, 0).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(schema::current_version(&store.db, COMPONENT).await.unwrap(), 0);
}

#[tokio::test]
async fn store_operations_fail_before_upgrade() {
    let store = TestStore::bare().await;
    let err = journals::create(&store.db, "work", "").await.unwrap_err();
    match err {
        AppError::Storage(e) => assert!(e.to_string().contains("no such table")),
        other => panic!("expected storage error, got {other:?}"),
    }
}

#[tokio::test]
async fn initialize_does_not_overwrite_recorded_version() {
    let store = TestStore::bare().await;
    schema::initialize(&store.db, COMPONENT, 2).await.unwrap();

    // Same target again is accepted and changes nothing.
    schema::initialize(&store.db, COMPONENT, 2).await.unwrap();

    let err = schema::initialize(&store.db, COMPONENT, 1).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::MigrationBlocked {
            current: 2,
            target: 1,
            ..
        }
    ));
    assert_eq!(schema::current_version(&store.db, COMPONENT).await.unwrap(), 2);
}

#[tokio::test]
async fn concurrent_upgrades_to_different_versions_admit_one() {
    let dir = tempfile::tempdir().unwrap();

    for round in 0..10 {
        let path = dir.path().join(format!("race-{round}.db"));
        let a = db::connect(&Config::file(&path)).await.unwrap();
        let b = db::connect(&Config::file(&path)).await.unwrap();

        let (first, second) = tokio::join!(
            schema::upgrade(&a, COMPONENT, 1),
            schema::upgrade(&b, COMPONENT, 2)
        );

        let winner = match (&first, &second) {
            (Ok(()), Err(_)) => 1,
            (Err(_), Ok(())) => 2,
            other => panic!("round {round}: expected exactly one upgrade to succeed, got {other:?}"),
        };
        for err in [first.err(), second.err()].into_iter().flatten() {
            assert!(
                matches!(err, AppError::MigrationBlocked { current, .. } if current == winner),
                "round {round}: loser should be blocked at {winner}, got {err:?}"
            );
        }

        assert_eq!(schema::current_version(&a, COMPONENT).await.unwrap(), winner);
        assert_eq!(schema::current_version(&b, COMPONENT).await.unwrap(), winner);

        a.close().await;
        b.close().await;
    }
}

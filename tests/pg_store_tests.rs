// tests/pg_store_tests.rs
//
// Runs against a real Postgres when DATABASE_URL is set; otherwise each test
// returns early.

use std::time::Duration;

use career_track::store::{DocumentStore, Paths, PgDocumentStore, WriteMode};
use serde_json::json;
use sqlx::postgres::PgPoolOptions;

async fn connect() -> Option<PgDocumentStore> {
    let database_url = std::env::var("DATABASE_URL").ok()?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    Some(
        PgDocumentStore::connect(pool, &database_url)
            .await
            .expect("Failed to start document listener"),
    )
}

#[tokio::test]
async fn concurrent_merges_creating_a_document_keep_both_fields() {
    let Some(store) = connect().await else {
        return;
    };
    let path = Paths::new(&uuid::Uuid::new_v4().to_string()).profile("u1");

    let (a, b) = tokio::join!(
        store.put(&path, json!({ "a": 1 }), WriteMode::Merge),
        store.put(&path, json!({ "b": 2 }), WriteMode::Merge),
    );
    a.unwrap();
    b.unwrap();

    let doc = store.get(&path).await.unwrap().unwrap();
    assert_eq!(doc, json!({ "a": 1, "b": 2 }));
}

#[tokio::test]
async fn abandoned_subscriptions_do_not_exhaust_the_pool() {
    let Some(store) = connect().await else {
        return;
    };
    let paths = Paths::new(&uuid::Uuid::new_v4().to_string());
    let watched = paths.results("u1");

    // More subscriptions than the pool has connections.
    for _ in 0..20 {
        drop(store.subscribe(&watched).await.unwrap());
    }
    tokio::time::sleep(Duration::from_millis(200)).await;

    tokio::time::timeout(
        Duration::from_secs(2),
        store.put(&watched, json!({ "progress": 0 }), WriteMode::Replace),
    )
    .await
    .expect("store call timed out")
    .unwrap();

    let mut rx = store.subscribe(&watched).await.unwrap();
    assert_eq!(rx.recv().await.unwrap()["progress"], 0);
    store.update(&watched, json!({ "progress": 25 })).await.unwrap();
    let next = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("no change delivered")
        .unwrap();
    assert_eq!(next["progress"], 25);
}

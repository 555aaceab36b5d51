use super::*;

#[tokio::test]
async fn missing_key_reads_as_none() {
    let store = SqliteStore::new("sqlite::memory:").await.expect("db");
    assert_eq!(store.get("source").await.expect("get"), None);
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let store = SqliteStore::new("sqlite::memory:").await.expect("db");
    store.health_check().await.expect("health check");
}

#[tokio::test]
async fn set_overwrites_previous_value() {
    let store = SqliteStore::new("sqlite::memory:").await.expect("db");
    store.set("source", "/media/sd/DCIM").await.expect("first write");
    store.set("source", "/media/sd2/DCIM").await.expect("second write");

    assert_eq!(
        store.get("source").await.expect("get").as_deref(),
        Some("/media/sd2/DCIM")
    );
}

#[tokio::test]
async fn keys_are_independent() {
    let store = SqliteStore::new("sqlite::memory:").await.expect("db");
    store.set("source", "/a").await.expect("source");
    store.set("destination", "/b").await.expect("destination");

    assert_eq!(store.get("source").await.expect("get").as_deref(), Some("/a"));
    assert_eq!(
        store.get("destination").await.expect("get").as_deref(),
        Some("/b")
    );
}

#[tokio::test]
async fn load_reports_write_timestamp() {
    let store = SqliteStore::new("sqlite::memory:").await.expect("db");
    let before = Utc::now();
    store.set("destination", "/x/y").await.expect("write");

    let stored = store
        .load("destination")
        .await
        .expect("load")
        .expect("stored value");
    assert_eq!(stored.key, "destination");
    assert_eq!(stored.value, "/x/y");
    let updated_at = stored.updated_at.expect("timestamp");
    assert!(updated_at >= before - chrono::Duration::seconds(1));
}

#[tokio::test]
async fn creates_database_file_when_missing_and_persists_across_reopen() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("selections.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let store = SqliteStore::new(&database_url).await.expect("db");
    store.set("source", "/a/b/c").await.expect("write");
    store.pool().close().await;
    drop(store);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );

    let reopened = SqliteStore::new(&database_url).await.expect("reopen");
    assert_eq!(
        reopened.get("source").await.expect("get").as_deref(),
        Some("/a/b/c")
    );
}

#[tokio::test]
async fn memory_store_round_trips_and_overwrites() {
    let store = MemoryStore::with_entries([("source", "/old")]);
    assert_eq!(store.get("source").await.expect("get").as_deref(), Some("/old"));

    store.set("source", "/new").await.expect("set");
    assert_eq!(store.get("source").await.expect("get").as_deref(), Some("/new"));
    assert_eq!(store.get("destination").await.expect("get"), None);
    assert_eq!(store.snapshot().len(), 1);
}

#[test]
fn database_dir_is_created_for_file_databases_only() {
    let memory = SqliteConnectOptions::from_str("sqlite::memory:").expect("memory url");
    create_database_dir(&memory).expect("in-memory database needs no directory");

    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root
        .path()
        .join("sdsync")
        .join("state")
        .join("selections.sqlite3");
    let options = SqliteConnectOptions::new().filename(&db_path);
    create_database_dir(&options).expect("create directory");

    assert!(db_path.parent().expect("parent").is_dir());
    assert!(!db_path.exists());
}

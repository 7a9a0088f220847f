/*!
 * On-disk storage behavior: durability across reopened connections.
 */

use lingopipe::storage::{CacheStore, SettingsStore, SqliteCacheStore, StorageConnection};

const FAR_FUTURE_MS: i64 = 10_000_000_000_000;

#[test]
fn test_cache_entries_should_survive_reopening_the_database() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lingopipe.db");

    {
        let conn = StorageConnection::new(&path).unwrap();
        let store = SqliteCacheStore::new(conn, "translation", 10);
        store.set("k1", "v1", FAR_FUTURE_MS, 1).unwrap();
    }

    let conn = StorageConnection::new(&path).unwrap();
    let store = SqliteCacheStore::new(conn, "translation", 10);
    assert_eq!(
        store.get("k1", 2).unwrap(),
        Some(("v1".to_string(), FAR_FUTURE_MS))
    );
}

#[test]
fn test_settings_should_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lingopipe.db");

    {
        let conn = StorageConnection::new(&path).unwrap();
        let settings = SettingsStore::new(conn);
        settings.set("target_language", "zh").unwrap();
    }

    let conn = StorageConnection::new(&path).unwrap();
    let settings = SettingsStore::new(conn);
    assert_eq!(
        settings.get("target_language").unwrap(),
        Some("zh".to_string())
    );
}

#[test]
fn test_clearing_one_scope_should_not_touch_the_other() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lingopipe.db");
    let conn = StorageConnection::new(&path).unwrap();

    let translation = SqliteCacheStore::new(conn.clone(), "translation", 10);
    let polish = SqliteCacheStore::new(conn, "polish", 10);
    translation.set("t1", "v", FAR_FUTURE_MS, 1).unwrap();
    polish.set("p1", "v", FAR_FUTURE_MS, 2).unwrap();

    translation.clear().unwrap();

    assert!(translation.is_empty().unwrap());
    assert_eq!(
        polish.get("p1", 3).unwrap(),
        Some(("v".to_string(), FAR_FUTURE_MS))
    );
}

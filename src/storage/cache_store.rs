/*!
 * SQLite-backed durable cache tier.
 *
 * Mirrors the memory tier's semantics: lazy expiry on read, bounded
 * capacity enforced by dropping the oldest insertions first.
 */

use anyhow::Result;
use log::debug;
use rusqlite::{params, OptionalExtension};

use super::{CacheStore, StorageConnection};

/// Durable cache tier over the shared `cache_entries` table. Each store
/// owns one scope ("translation" or "polish"); capacity eviction never
/// crosses scopes.
#[derive(Debug, Clone)]
pub struct SqliteCacheStore {
    conn: StorageConnection,
    scope: String,
    capacity: usize,
}

impl SqliteCacheStore {
    pub fn new(conn: StorageConnection, scope: &str, capacity: usize) -> Self {
        Self {
            conn,
            scope: scope.to_string(),
            capacity,
        }
    }

    /// Number of entries in this scope, live or expired
    pub fn len(&self) -> Result<usize> {
        self.conn.execute(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM cache_entries WHERE scope = ?1",
                params![self.scope],
                |row| row.get(0),
            )?;
            Ok(count as usize)
        })
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl CacheStore for SqliteCacheStore {
    fn get(&self, key: &str, now_ms: i64) -> Result<Option<(String, i64)>> {
        self.conn.execute(|conn| {
            let entry: Option<(String, i64)> = conn
                .query_row(
                    "SELECT value, expires_at FROM cache_entries
                     WHERE key = ?1 AND expires_at > ?2",
                    params![key, now_ms],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            Ok(entry)
        })
    }

    fn set(&self, key: &str, value: &str, expires_ms: i64, inserted_ms: i64) -> Result<()> {
        self.conn.execute(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO cache_entries (key, scope, value, expires_at, inserted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![key, self.scope, value, expires_ms, inserted_ms],
            )?;

            // Keep the scope bounded: drop everything past the newest
            // `capacity` insertions
            let evicted = conn.execute(
                "DELETE FROM cache_entries WHERE key IN (
                    SELECT key FROM cache_entries WHERE scope = ?1
                    ORDER BY inserted_at DESC, key
                    LIMIT -1 OFFSET ?2
                )",
                params![self.scope, self.capacity as i64],
            )?;
            if evicted > 0 {
                debug!("Evicted {} persisted cache entries from {}", evicted, self.scope);
            }

            Ok(())
        })
    }

    fn clear(&self) -> Result<()> {
        self.conn.execute(|conn| {
            conn.execute(
                "DELETE FROM cache_entries WHERE scope = ?1",
                params![self.scope],
            )?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(capacity: usize) -> SqliteCacheStore {
        let conn = StorageConnection::new_in_memory().expect("storage");
        SqliteCacheStore::new(conn, "translation", capacity)
    }

    #[test]
    fn test_set_then_get_should_return_live_value() {
        let store = store(10);
        store.set("k1", "v1", 1_000, 0).unwrap();
        assert_eq!(store.get("k1", 500).unwrap(), Some(("v1".to_string(), 1_000)));
    }

    #[test]
    fn test_get_should_treat_expired_entry_as_absent() {
        let store = store(10);
        store.set("k1", "v1", 1_000, 0).unwrap();
        assert_eq!(store.get("k1", 1_000).unwrap(), None);
        assert_eq!(store.get("k1", 2_000).unwrap(), None);
    }

    #[test]
    fn test_set_should_evict_oldest_insertions_past_capacity() {
        let store = store(2);
        store.set("k1", "v1", 10_000, 1).unwrap();
        store.set("k2", "v2", 10_000, 2).unwrap();
        store.set("k3", "v3", 10_000, 3).unwrap();

        assert_eq!(store.len().unwrap(), 2);
        assert_eq!(store.get("k1", 5).unwrap(), None);
        assert_eq!(store.get("k2", 5).unwrap(), Some(("v2".to_string(), 10_000)));
        assert_eq!(store.get("k3", 5).unwrap(), Some(("v3".to_string(), 10_000)));
    }

    #[test]
    fn test_replacing_key_should_not_grow_the_table() {
        let store = store(2);
        store.set("k1", "v1", 10_000, 1).unwrap();
        store.set("k1", "v1-updated", 10_000, 2).unwrap();

        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(
            store.get("k1", 5).unwrap(),
            Some(("v1-updated".to_string(), 10_000))
        );
    }

    #[test]
    fn test_eviction_should_not_cross_scopes() {
        let conn = StorageConnection::new_in_memory().expect("storage");
        let translation = SqliteCacheStore::new(conn.clone(), "translation", 10);
        let polish = SqliteCacheStore::new(conn, "polish", 1);

        translation.set("t1", "v", 10_000, 1).unwrap();
        translation.set("t2", "v", 10_000, 2).unwrap();
        polish.set("p1", "v", 10_000, 3).unwrap();
        polish.set("p2", "v", 10_000, 4).unwrap();

        assert_eq!(translation.len().unwrap(), 2);
        assert_eq!(polish.len().unwrap(), 1);
        assert_eq!(polish.get("p2", 5).unwrap(), Some(("v".to_string(), 10_000)));
    }

    #[test]
    fn test_clear_should_remove_all_entries() {
        let store = store(10);
        store.set("k1", "v1", 10_000, 1).unwrap();
        store.set("k2", "v2", 10_000, 2).unwrap();
        store.clear().unwrap();
        assert!(store.is_empty().unwrap());
    }
}

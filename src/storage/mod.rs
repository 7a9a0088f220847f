/*!
 * Persisted storage layer.
 *
 * A single SQLite file backs the durable cache tier and the settings store.
 * The pipeline talks to storage through the `CacheStore` trait so tests and
 * cache-less runs can skip SQLite entirely.
 */

use anyhow::Result;

pub mod cache_store;
pub mod connection;
pub mod schema;
pub mod settings;

pub use cache_store::SqliteCacheStore;
pub use connection::StorageConnection;
pub use settings::SettingsStore;

/// Durable tier of the transformation cache.
///
/// Timestamps are unix epoch milliseconds; the caller supplies `now_ms` so
/// expiry stays testable without touching the wall clock.
pub trait CacheStore: Send + Sync + std::fmt::Debug {
    /// Fetch a live value together with its expiry timestamp, or None when
    /// absent or expired. The expiry lets the memory tier promote a hit with
    /// its remaining lifetime instead of a fresh one.
    fn get(&self, key: &str, now_ms: i64) -> Result<Option<(String, i64)>>;

    /// Insert or replace a value
    fn set(&self, key: &str, value: &str, expires_ms: i64, inserted_ms: i64) -> Result<()>;

    /// Drop every entry
    fn clear(&self) -> Result<()>;
}

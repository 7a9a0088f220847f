/*!
 * Persisted key/value settings.
 *
 * Small string table with an in-memory write-through overlay so repeated
 * reads never hit SQLite. Unknown keys fall back to a fixed default table.
 */

use anyhow::Result;
use log::debug;
use parking_lot::Mutex;
use rusqlite::{params, OptionalExtension};
use std::collections::HashMap;

use super::StorageConnection;

/// Defaults applied when a key has never been written
const DEFAULTS: &[(&str, &str)] = &[
    ("target_language", "en"),
    ("platform", "desktop"),
    ("provider", "google_basic"),
    ("termbase", "true"),
    ("auto_polish", "true"),
    ("auto_format", "true"),
];

/// Persisted settings with a write-through memory overlay
#[derive(Debug)]
pub struct SettingsStore {
    conn: StorageConnection,
    overlay: Mutex<HashMap<String, String>>,
}

impl SettingsStore {
    pub fn new(conn: StorageConnection) -> Self {
        Self {
            conn,
            overlay: Mutex::new(HashMap::new()),
        }
    }

    /// Read a setting that was actually written, skipping the defaults
    /// table. Callers that carry their own fallback use this form.
    pub fn persisted(&self, key: &str) -> Result<Option<String>> {
        if let Some(value) = self.overlay.lock().get(key) {
            return Ok(Some(value.clone()));
        }

        let persisted: Option<String> = self.conn.execute(|conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM settings WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value)
        })?;

        if let Some(value) = persisted {
            self.overlay.lock().insert(key.to_string(), value.clone());
            return Ok(Some(value));
        }
        Ok(None)
    }

    /// Read a setting: overlay first, then SQLite, then the defaults table
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        if let Some(value) = self.persisted(key)? {
            return Ok(Some(value));
        }

        Ok(DEFAULTS
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string()))
    }

    /// Read a setting with a caller-supplied fallback
    pub fn get_or(&self, key: &str, default: &str) -> Result<String> {
        Ok(self.get(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// Write a setting to both the overlay and SQLite
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.overlay
            .lock()
            .insert(key.to_string(), value.to_string());

        self.conn.execute(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO settings (key, value, updated_at)
                 VALUES (?1, ?2, datetime('now'))",
                params![key, value],
            )?;
            Ok(())
        })?;

        debug!("Setting updated: {} = {}", key, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SettingsStore {
        SettingsStore::new(StorageConnection::new_in_memory().expect("storage"))
    }

    #[test]
    fn test_get_should_fall_back_to_defaults_for_unwritten_keys() {
        let store = store();
        assert_eq!(store.get("target_language").unwrap(), Some("en".to_string()));
        assert_eq!(store.get("termbase").unwrap(), Some("true".to_string()));
        assert_eq!(store.get("no_such_key").unwrap(), None);
    }

    #[test]
    fn test_persisted_should_skip_the_defaults_table() {
        let store = store();
        assert_eq!(store.persisted("target_language").unwrap(), None);
        store.set("target_language", "zh").unwrap();
        assert_eq!(
            store.persisted("target_language").unwrap(),
            Some("zh".to_string())
        );
    }

    #[test]
    fn test_set_then_get_should_return_written_value() {
        let store = store();
        store.set("target_language", "zh").unwrap();
        assert_eq!(store.get("target_language").unwrap(), Some("zh".to_string()));
    }

    #[test]
    fn test_written_values_should_survive_a_fresh_overlay() {
        let conn = StorageConnection::new_in_memory().expect("storage");
        let first = SettingsStore::new(conn.clone());
        first.set("platform", "mobile").unwrap();

        // Same connection, empty overlay
        let second = SettingsStore::new(conn);
        assert_eq!(second.get("platform").unwrap(), Some("mobile".to_string()));
    }
}

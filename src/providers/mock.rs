/*!
 * Mock backend implementations for testing.
 *
 * This module provides mock backends that simulate different behaviors:
 * - `MockBackend::working()` - Always succeeds with translated text
 * - `MockBackend::failing()` - Always fails with an error
 * - `MockBackend::slow(ms)` - Succeeds after a delay (for timeout testing)
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::app_config::{Language, TranslationProvider};
use crate::errors::ProviderError;
use crate::providers::{PolishBackend, TranslationBackend, ensure_batch_fits};

/// Behavior mode for the mock backends
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a deterministic translation
    Working,
    /// Always fails with an error
    Failing,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Simulates slow response (for timeout testing)
    Slow { delay_ms: u64 },
}

/// Mock translation backend for testing orchestration behavior
#[derive(Debug)]
pub struct MockBackend {
    /// Behavior mode
    behavior: MockBehavior,
    /// Batch size to advertise
    batch_size: usize,
    /// Number of `translate` calls issued so far
    call_count: Arc<AtomicUsize>,
}

impl MockBackend {
    /// Create a new mock backend with the specified behavior
    pub fn new(behavior: MockBehavior, batch_size: usize) -> Self {
        Self {
            behavior,
            batch_size,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a working mock backend that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working, 50)
    }

    /// Create a working mock backend with no batch support
    pub fn single_item() -> Self {
        Self::new(MockBehavior::Working, 1)
    }

    /// Create an always-failing mock backend
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing, 50)
    }

    /// Create a slow mock backend
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms }, 50)
    }

    /// Number of `translate` calls issued so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Shared handle to the call counter, survives moves into services
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.call_count.clone()
    }

    /// Deterministic mock translation for an input
    pub fn mock_translation(text: &str, target: Language) -> String {
        format!("[{}] {}", target.code(), text)
    }
}

#[async_trait]
impl TranslationBackend for MockBackend {
    fn kind(&self) -> TranslationProvider {
        TranslationProvider::GoogleBasic
    }

    fn max_batch_size(&self) -> usize {
        self.batch_size
    }

    async fn translate(
        &self,
        texts: &[String],
        _source: Language,
        target: Language,
        _termbase: bool,
    ) -> Result<Vec<String>, ProviderError> {
        ensure_batch_fits(texts, self.batch_size)?;
        let count = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;

        match self.behavior {
            MockBehavior::Working => {}
            MockBehavior::Failing => {
                return Err(ProviderError::RequestFailed(
                    "mock backend configured to fail".to_string(),
                ));
            }
            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == 0 {
                    return Err(ProviderError::RequestFailed(format!(
                        "mock backend intermittent failure on call {}",
                        count
                    )));
                }
            }
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
            }
        }

        Ok(texts
            .iter()
            .map(|t| Self::mock_translation(t, target))
            .collect())
    }
}

/// Mock polish backend
#[derive(Debug)]
pub struct MockPolisher {
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of `polish` calls issued so far
    call_count: Arc<AtomicUsize>,
}

impl MockPolisher {
    /// Create a new mock polisher with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a working mock polisher
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an always-failing mock polisher
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Number of `polish` calls issued so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PolishBackend for MockPolisher {
    async fn polish(&self, content: &str, _target: Language) -> Result<String, ProviderError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::RequestFailed(
                "mock polisher configured to fail".to_string(),
            )),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
                Ok(format!("{} (polished)", content))
            }
            _ => Ok(format!("{} (polished)", content)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_working_backend_should_translate_all_texts() {
        let backend = MockBackend::working();
        let texts = vec!["Hello".to_string(), "World".to_string()];
        let result = backend
            .translate(&texts, Language::En, Language::Zh, false)
            .await
            .unwrap();
        assert_eq!(result, vec!["[zh] Hello", "[zh] World"]);
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failing_backend_should_error_and_count() {
        let backend = MockBackend::failing();
        let texts = vec!["Hello".to_string()];
        assert!(backend
            .translate(&texts, Language::En, Language::Zh, false)
            .await
            .is_err());
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_intermittent_backend_should_fail_every_second_call() {
        let backend = MockBackend::new(MockBehavior::Intermittent { fail_every: 2 }, 10);
        let texts = vec!["x".to_string()];
        assert!(backend.translate(&texts, Language::En, Language::Zh, false).await.is_ok());
        assert!(backend.translate(&texts, Language::En, Language::Zh, false).await.is_err());
        assert!(backend.translate(&texts, Language::En, Language::Zh, false).await.is_ok());
    }

    #[tokio::test]
    async fn test_single_item_backend_should_reject_batches() {
        let backend = MockBackend::single_item();
        let texts = vec!["a".to_string(), "b".to_string()];
        assert!(backend
            .translate(&texts, Language::En, Language::Zh, false)
            .await
            .is_err());
    }
}

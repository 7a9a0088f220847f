/*!
 * Translation orchestration.
 *
 * `translate_batch` is the single entry point: dedup, cache lookup, chunked
 * provider calls under the rate limiter, cache write-back, and expansion to
 * the original batch shape. Provider errors propagate; deciding whether to
 * substitute original content is the controller's call, not ours.
 *
 * Provider selection lives here too: Google-family backends are subject to
 * a time-cached liveness probe and fall back to Baidu with a warning when
 * the API is unreachable.
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, info, warn};
use parking_lot::Mutex;
use reqwest::Client;

use crate::app_config::Language;
use crate::errors::{ProviderError, TranslationError};
use crate::pipeline::cache::TransformCache;
use crate::pipeline::dedup::dedupe;
use crate::pipeline::progress::{NoticeLevel, ProgressSink};
use crate::pipeline::rate_limit::RateLimiter;
use crate::providers::TranslationBackend;

/// How long one probe verdict stays valid
pub const PROBE_TTL: Duration = Duration::from_secs(5 * 60);

/// Probe timeout; reachability has to be cheap to answer
const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Cheap reachability check for a provider endpoint
#[async_trait]
pub trait LivenessProbe: Send + Sync + std::fmt::Debug {
    async fn check(&self) -> bool;
}

/// Probe that issues a GET against the free translation endpoint. Any HTTP
/// response counts as reachable; only transport failures count against it.
#[derive(Debug)]
pub struct HttpLivenessProbe {
    client: Client,
    url: String,
}

impl HttpLivenessProbe {
    pub fn new() -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: "https://translate.googleapis.com/translate_a/single?client=gtx&sl=en&tl=zh&dt=t&q=ping"
                .to_string(),
        })
    }

    pub fn with_url(url: &str) -> Result<Self, ProviderError> {
        let mut probe = Self::new()?;
        probe.url = url.to_string();
        Ok(probe)
    }
}

#[async_trait]
impl LivenessProbe for HttpLivenessProbe {
    async fn check(&self) -> bool {
        match self.client.get(&self.url).send().await {
            Ok(_) => true,
            Err(e) => {
                warn!("Liveness probe failed: {}", e);
                false
            }
        }
    }
}

/// Coordinates dedup, cache, rate limiting and provider calls for one
/// translation service. Shared across concurrent pipeline runs.
pub struct Orchestrator {
    cache: Arc<TransformCache>,
    limiter: RateLimiter,
    probe: Option<Arc<dyn LivenessProbe>>,
    fallback: Option<Arc<dyn TranslationBackend>>,
    /// Last probe verdict and when it was taken
    probe_state: Mutex<Option<(Instant, bool)>>,
}

impl Orchestrator {
    pub fn new(cache: Arc<TransformCache>, limiter: RateLimiter) -> Self {
        Self {
            cache,
            limiter,
            probe: None,
            fallback: None,
            probe_state: Mutex::new(None),
        }
    }

    /// Enable the unreachable-provider fallback path
    pub fn with_fallback(
        mut self,
        probe: Arc<dyn LivenessProbe>,
        fallback: Arc<dyn TranslationBackend>,
    ) -> Self {
        self.probe = Some(probe);
        self.fallback = Some(fallback);
        self
    }

    /// Pick the backend to use: the preferred one, unless it is a
    /// Google-family provider the probe reports unreachable, in which case
    /// the fallback takes over with a non-fatal warning.
    pub async fn resolve_backend(
        &self,
        preferred: Arc<dyn TranslationBackend>,
        sink: &dyn ProgressSink,
    ) -> Arc<dyn TranslationBackend> {
        if !preferred.kind().is_google_family() {
            return preferred;
        }
        let (Some(probe), Some(fallback)) = (&self.probe, &self.fallback) else {
            return preferred;
        };

        if self.reachable(probe.as_ref()).await {
            preferred
        } else {
            let message = format!(
                "{} is unreachable, falling back to {}",
                preferred.kind().display_name(),
                fallback.kind().display_name()
            );
            warn!("{}", message);
            sink.notify(NoticeLevel::Warning, &message);
            fallback.clone()
        }
    }

    /// Probe verdicts are cached; within `PROBE_TTL` the stored answer wins
    async fn reachable(&self, probe: &dyn LivenessProbe) -> bool {
        if let Some((at, verdict)) = *self.probe_state.lock() {
            if at.elapsed() < PROBE_TTL {
                return verdict;
            }
        }

        let verdict = probe.check().await;
        *self.probe_state.lock() = Some((Instant::now(), verdict));
        debug!("Liveness probe verdict: {}", verdict);
        verdict
    }

    /// Translate a batch, returning one result per input in input order.
    ///
    /// Repeated fragments cost one provider slot, cached fragments cost
    /// none. Chunks run concurrently, bounded only by the rate limiter.
    pub async fn translate_batch(
        &self,
        backend: &dyn TranslationBackend,
        texts: &[String],
        source: Language,
        target: Language,
        termbase: bool,
    ) -> Result<Vec<String>, TranslationError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let deduped = dedupe(texts);
        let provider_id = backend.kind().to_lowercase_string();

        let mut slots: Vec<Option<String>> = deduped
            .unique
            .iter()
            .map(|text| self.cache.get(&provider_id, target, termbase, text))
            .collect();

        let misses: Vec<(usize, String)> = slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(i, _)| (i, deduped.unique[i].clone()))
            .collect();

        debug!(
            "Translating batch of {} ({} unique, {} cached, {} to fetch)",
            texts.len(),
            deduped.unique.len(),
            deduped.unique.len() - misses.len(),
            misses.len()
        );

        let chunk_size = backend.max_batch_size().max(1);
        let chunk_futures = misses.chunks(chunk_size).map(|chunk| async move {
            let chunk_texts: Vec<String> = chunk.iter().map(|(_, t)| t.clone()).collect();
            let permit = self.limiter.acquire().await;
            let result = backend.translate(&chunk_texts, source, target, termbase).await;
            drop(permit);
            result.map(|translated| (chunk, translated))
        });

        for outcome in join_all(chunk_futures).await {
            let (chunk, translated) = outcome?;
            if translated.len() != chunk.len() {
                return Err(TranslationError::Provider(ProviderError::IncompleteResponse {
                    expected: chunk.len(),
                    received: translated.len(),
                }));
            }
            for ((position, text), value) in chunk.iter().zip(translated) {
                self.cache.set(&provider_id, target, termbase, text, &value);
                slots[*position] = Some(value);
            }
        }

        let unique_results: Vec<String> = slots
            .into_iter()
            .collect::<Option<Vec<String>>>()
            .ok_or(TranslationError::Provider(ProviderError::IncompleteResponse {
                expected: deduped.unique.len(),
                received: 0,
            }))?;

        if !misses.is_empty() {
            info!("Fetched {} translations from {}", misses.len(), provider_id);
        }
        Ok(deduped.expand(&unique_results))
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("cache", &self.cache)
            .field("fallback", &self.fallback.as_ref().map(|b| b.kind()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::cache::{TRANSLATION_TTL, TRANSLATION_CAPACITY};
    use crate::pipeline::progress::{ProgressEvent, RecordingSink};
    use crate::providers::mock::MockBackend;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn orchestrator() -> Orchestrator {
        let cache = Arc::new(TransformCache::memory_only(TRANSLATION_CAPACITY, TRANSLATION_TTL));
        Orchestrator::new(cache, RateLimiter::for_translation())
    }

    fn batch(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[derive(Debug)]
    struct StaticProbe {
        verdict: bool,
        calls: AtomicUsize,
    }

    impl StaticProbe {
        fn new(verdict: bool) -> Self {
            Self { verdict, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl LivenessProbe for StaticProbe {
        async fn check(&self) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.verdict
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_identical_batch_should_make_zero_provider_calls() {
        let orchestrator = orchestrator();
        let backend = MockBackend::working();
        let texts = batch(&["Hello world"]);

        let first = orchestrator
            .translate_batch(&backend, &texts, Language::En, Language::Zh, false)
            .await
            .unwrap();
        assert_eq!(backend.call_count(), 1);

        let second = orchestrator
            .translate_batch(&backend, &texts, Language::En, Language::Zh, false)
            .await
            .unwrap();
        assert_eq!(backend.call_count(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicates_through_single_item_backend_should_share_one_call() {
        let orchestrator = orchestrator();
        let backend = MockBackend::single_item();
        let texts = batch(&["A", "A", "B"]);

        let result = orchestrator
            .translate_batch(&backend, &texts, Language::En, Language::Zh, false)
            .await
            .unwrap();

        assert_eq!(backend.call_count(), 2);
        assert_eq!(result.len(), 3);
        assert_eq!(result[0], result[1]);
        assert_ne!(result[0], result[2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_batch_should_return_empty_without_calls() {
        let orchestrator = orchestrator();
        let backend = MockBackend::working();

        let result = orchestrator
            .translate_batch(&backend, &[], Language::En, Language::Zh, false)
            .await
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backend_error_should_propagate() {
        let orchestrator = orchestrator();
        let backend = MockBackend::failing();
        let texts = batch(&["Hello"]);

        let result = orchestrator
            .translate_batch(&backend, &texts, Language::En, Language::Zh, false)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_provider_should_resolve_to_fallback_with_warning() {
        let preferred: Arc<dyn TranslationBackend> = Arc::new(MockBackend::working());
        let fallback: Arc<dyn TranslationBackend> = Arc::new(MockBackend::working());
        let orchestrator = orchestrator()
            .with_fallback(Arc::new(StaticProbe::new(false)), fallback.clone());
        let sink = RecordingSink::new();

        let resolved = orchestrator.resolve_backend(preferred, &sink).await;

        assert!(Arc::ptr_eq(&resolved, &fallback));
        assert!(sink
            .events()
            .iter()
            .any(|e| matches!(e, ProgressEvent::Notice(NoticeLevel::Warning, _))));
    }

    #[tokio::test]
    async fn test_reachable_provider_should_keep_preferred_backend() {
        let preferred: Arc<dyn TranslationBackend> = Arc::new(MockBackend::working());
        let fallback: Arc<dyn TranslationBackend> = Arc::new(MockBackend::working());
        let orchestrator = orchestrator()
            .with_fallback(Arc::new(StaticProbe::new(true)), fallback);
        let sink = RecordingSink::new();

        let resolved = orchestrator.resolve_backend(preferred.clone(), &sink).await;
        assert!(Arc::ptr_eq(&resolved, &preferred));
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn test_probe_verdict_should_be_cached_across_resolutions() {
        let probe = Arc::new(StaticProbe::new(true));
        let preferred: Arc<dyn TranslationBackend> = Arc::new(MockBackend::working());
        let fallback: Arc<dyn TranslationBackend> = Arc::new(MockBackend::working());
        let orchestrator = orchestrator().with_fallback(probe.clone(), fallback);
        let sink = RecordingSink::new();

        orchestrator.resolve_backend(preferred.clone(), &sink).await;
        orchestrator.resolve_backend(preferred, &sink).await;

        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
    }
}

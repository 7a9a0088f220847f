/*!
 * Content-polish stage.
 *
 * Wraps the polish backend with the eligibility predicate, the 48-hour
 * cache and the polish rate limiter. Polishing is best-effort: every
 * failure path resolves to the original content, never to an error, so the
 * stage can never block the pipeline or corrupt a fragment.
 */

use std::sync::Arc;

use log::{debug, warn};

use crate::app_config::Language;
use crate::pipeline::cache::TransformCache;
use crate::pipeline::predicates::needs_polishing;
use crate::pipeline::rate_limit::RateLimiter;
use crate::providers::PolishBackend;

/// Provider id segment of polish cache keys
const POLISH_CACHE_ID: &str = "polish";

/// Best-effort polish service shared across pipeline runs
pub struct Polisher {
    backend: Arc<dyn PolishBackend>,
    cache: Arc<TransformCache>,
    limiter: RateLimiter,
    /// Minimum Latin-word + CJK-character count before a fragment qualifies
    min_tokens: usize,
}

impl Polisher {
    pub fn new(
        backend: Arc<dyn PolishBackend>,
        cache: Arc<TransformCache>,
        limiter: RateLimiter,
        min_tokens: usize,
    ) -> Self {
        Self {
            backend,
            cache,
            limiter,
            min_tokens,
        }
    }

    /// Whether a fragment would go to the backend at all
    pub fn eligible(&self, content: &str) -> bool {
        needs_polishing(content, self.min_tokens)
    }

    /// Polish one fragment, falling back to the input on ineligibility,
    /// backend failure or an empty response
    pub async fn polish(&self, content: &str, target: Language) -> String {
        if !self.eligible(content) {
            return content.to_string();
        }

        if let Some(hit) = self.cache.get(POLISH_CACHE_ID, target, false, content) {
            return hit;
        }

        let permit = self.limiter.acquire().await;
        let result = self.backend.polish(content, target).await;
        drop(permit);

        match result {
            Ok(polished) if !polished.trim().is_empty() => {
                self.cache.set(POLISH_CACHE_ID, target, false, content, &polished);
                debug!("Polished fragment of {} chars", content.chars().count());
                polished
            }
            Ok(_) => {
                warn!("Polish backend returned empty content, keeping original");
                content.to_string()
            }
            Err(e) => {
                warn!("Polish failed, keeping original content: {}", e);
                content.to_string()
            }
        }
    }
}

impl std::fmt::Debug for Polisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Polisher")
            .field("min_tokens", &self.min_tokens)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::cache::{POLISH_CAPACITY, POLISH_TTL};
    use crate::providers::mock::MockPolisher;

    const LONG_TEXT: &str =
        "This sentence is certainly long enough to deserve a careful polish pass";

    fn polisher(backend: MockPolisher) -> (Polisher, Arc<MockPolisher>) {
        let backend = Arc::new(backend);
        let cache = Arc::new(TransformCache::memory_only(POLISH_CAPACITY, POLISH_TTL));
        let service = Polisher::new(backend.clone(), cache, RateLimiter::for_polish(), 10);
        (service, backend)
    }

    #[tokio::test(start_paused = true)]
    async fn test_polish_should_rewrite_eligible_content() {
        let (service, backend) = polisher(MockPolisher::working());
        let result = service.polish(LONG_TEXT, Language::En).await;
        assert_ne!(result, LONG_TEXT);
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_content_should_skip_the_backend() {
        let (service, backend) = polisher(MockPolisher::working());
        let result = service.polish("Save", Language::En).await;
        assert_eq!(result, "Save");
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backend_failure_should_resolve_to_original_content() {
        let (service, backend) = polisher(MockPolisher::failing());
        let result = service.polish(LONG_TEXT, Language::En).await;
        assert_eq!(result, LONG_TEXT);
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeat_polish_should_come_from_cache() {
        let (service, backend) = polisher(MockPolisher::working());
        let first = service.polish(LONG_TEXT, Language::En).await;
        let second = service.polish(LONG_TEXT, Language::En).await;
        assert_eq!(first, second);
        assert_eq!(backend.call_count(), 1);
    }
}

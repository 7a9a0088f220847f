/*!
 * Provider implementations for the external translation and polish services.
 *
 * This module contains client implementations for the supported backends:
 * - GoogleBasic: Cloud Translation v2, bulk POST
 * - GoogleAdvanced: Cloud Translation v3 with glossary support
 * - GoogleFree: unofficial single-item endpoint
 * - Baidu: fanyi API with signed requests
 * - Coze: chat-based content polishing (create/poll/fetch)
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::app_config::{Language, TranslationProvider};
use crate::errors::ProviderError;

/// Common trait for all translation backends
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing the orchestrator to use them interchangeably. Implementations are
/// responsible for their own wire format and for returning exactly one result
/// per input text, in input order.
#[async_trait]
pub trait TranslationBackend: Send + Sync + Debug {
    /// The provider this backend implements
    fn kind(&self) -> TranslationProvider;

    /// Largest number of texts a single request may carry
    fn max_batch_size(&self) -> usize;

    /// Translate a batch of texts
    ///
    /// # Arguments
    /// * `texts` - The texts to translate, at most `max_batch_size` of them
    /// * `source` - Source language
    /// * `target` - Target language
    /// * `termbase` - Whether the provider-side terminology intervention is requested
    ///
    /// # Returns
    /// * `Result<Vec<String>, ProviderError>` - One translation per input, in order
    async fn translate(
        &self,
        texts: &[String],
        source: Language,
        target: Language,
        termbase: bool,
    ) -> Result<Vec<String>, ProviderError>;
}

/// Trait for the content-polish backend
///
/// Polishing is a single-item operation; batch coordination, caching and the
/// best-effort fallback to original content live above this trait.
#[async_trait]
pub trait PolishBackend: Send + Sync + Debug {
    /// Rewrite one fragment in the target language's register
    async fn polish(&self, content: &str, target: Language) -> Result<String, ProviderError>;
}

/// Check a batch against the backend's limit before dispatching
pub(crate) fn ensure_batch_fits(
    texts: &[String],
    limit: usize,
) -> Result<(), ProviderError> {
    if texts.len() > limit {
        return Err(ProviderError::RequestFailed(format!(
            "batch of {} texts exceeds provider limit of {}",
            texts.len(),
            limit
        )));
    }
    Ok(())
}

pub mod baidu;
pub mod coze;
pub mod google_advanced;
pub mod google_basic;
pub mod google_free;
pub mod mock;

/*!
 * Top-level pipeline driver.
 *
 * Takes a batch of work items and drives each through the configured subset
 * of the translate / polish / format stages, then performs exactly one
 * write-back per item through the `ContentSink`. Glossary hits skip the
 * provider and the polish stage; items with nothing to translate go
 * straight to formatting. Provider chunks run concurrently and each
 * chunk's polish+format work starts as soon as that chunk's translation
 * lands, so network-bound and local work overlap.
 *
 * Failure isolation is absolute at the item level: a chunk translation
 * error or a polish timeout falls back to original content for the
 * affected items, the rest of the batch is untouched.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use async_trait::async_trait;
use futures::future::join_all;
use log::{info, warn};

use crate::app_config::{Language, Platform};
use crate::pipeline::format::format_content;
use crate::pipeline::glossary;
use crate::pipeline::orchestrator::Orchestrator;
use crate::pipeline::polish::Polisher;
use crate::pipeline::predicates::needs_translation;
use crate::pipeline::progress::{NoticeLevel, ProgressSink, Stage};
use crate::pipeline::typography;
use crate::providers::TranslationBackend;

/// One text fragment to transform, owned by the controller for the run
#[derive(Debug, Clone)]
pub struct WorkItem {
    /// Original fragment content
    pub content: String,
    /// Contextual node name, consulted by the casing rules
    pub node_name: String,
    /// Parent node name, same purpose
    pub parent_node_name: String,
    /// Current font style of the fragment, when known
    pub font_style: Option<String>,
    /// Current font size of the fragment, when known
    pub font_size: Option<u32>,
}

impl WorkItem {
    pub fn new(content: &str, node_name: &str, parent_node_name: &str) -> Self {
        Self {
            content: content.to_string(),
            node_name: node_name.to_string(),
            parent_node_name: parent_node_name.to_string(),
            font_style: None,
            font_size: None,
        }
    }

    pub fn with_font(mut self, style: &str, size: u32) -> Self {
        self.font_style = Some(style.to_string());
        self.font_size = Some(size);
        self
    }
}

/// Write-back boundary toward the content source. Fields left as `None`
/// mean "leave unchanged". Called exactly once per item per run.
#[async_trait]
pub trait ContentSink: Send + Sync {
    async fn write_back(
        &self,
        item_index: usize,
        content: Option<&str>,
        style_key: Option<&str>,
    ) -> anyhow::Result<()>;
}

/// Which stages a run executes, plus the run's language/platform context
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub translate: bool,
    pub polish: bool,
    pub format: bool,
    pub target: Language,
    pub platform: Platform,
    /// Ask glossary-capable providers for terminology intervention
    pub termbase: bool,
}

impl RunOptions {
    pub fn all(target: Language, platform: Platform) -> Self {
        Self {
            translate: true,
            polish: true,
            format: true,
            target,
            platform,
            termbase: false,
        }
    }

    fn no_stage_selected(&self) -> bool {
        !self.translate && !self.polish && !self.format
    }
}

/// Monotone per-stage completion counters for one run
#[derive(Default)]
struct StageCounters {
    translate: AtomicUsize,
    polish: AtomicUsize,
    format: AtomicUsize,
}

impl StageCounters {
    fn bump(&self, stage: Stage, by: usize, sink: &dyn ProgressSink) {
        let counter = match stage {
            Stage::Translate => &self.translate,
            Stage::Polish => &self.polish,
            Stage::Format => &self.format,
        };
        let completed = counter.fetch_add(by, Ordering::SeqCst) + by;
        sink.stage_completed(stage, completed);
    }
}

/// How one item participates in the run
#[derive(Debug)]
enum ItemRoute {
    /// Glossary hit: draft assigned, polish skipped
    Glossary(String),
    /// Goes to the translation provider
    Provider,
    /// Nothing to translate; original content flows to later stages
    Passthrough,
}

/// Drives batches through the pipeline. Holds only shared services; each
/// `run` owns its items, listeners and counters, so concurrent runs don't
/// interfere beyond intentionally sharing the caches and limiters.
pub struct PipelineController {
    orchestrator: Arc<Orchestrator>,
    polisher: Arc<Polisher>,
}

impl PipelineController {
    pub fn new(orchestrator: Arc<Orchestrator>, polisher: Arc<Polisher>) -> Self {
        Self { orchestrator, polisher }
    }

    /// Run one batch to completion. Item-level failures are absorbed;
    /// only infrastructure-level errors surface here.
    pub async fn run(
        &self,
        backend: Arc<dyn TranslationBackend>,
        items: &[WorkItem],
        options: &RunOptions,
        sink: &dyn ProgressSink,
        writer: &dyn ContentSink,
    ) -> anyhow::Result<()> {
        if items.is_empty() {
            sink.notify(NoticeLevel::Warning, "Nothing selected, no work to do");
            return Ok(());
        }
        if options.no_stage_selected() {
            sink.notify(NoticeLevel::Warning, "No stage enabled, skipping run");
            return Ok(());
        }

        let started = Instant::now();
        sink.batch_total(items.len());

        let backend = if options.translate {
            self.orchestrator.resolve_backend(backend, sink).await
        } else {
            backend
        };

        let source = options.target.counterpart();
        let routes: Vec<ItemRoute> = items
            .iter()
            .map(|item| {
                if !options.translate {
                    return ItemRoute::Passthrough;
                }
                if let Some(hit) = glossary::lookup(&item.content, source, options.target) {
                    ItemRoute::Glossary(hit.to_string())
                } else if needs_translation(&item.content, options.target) {
                    ItemRoute::Provider
                } else {
                    ItemRoute::Passthrough
                }
            })
            .collect();

        let provider_indexes: Vec<usize> = routes
            .iter()
            .enumerate()
            .filter(|(_, r)| matches!(r, ItemRoute::Provider))
            .map(|(i, _)| i)
            .collect();

        // Stage totals go out as soon as each partition size is known. The
        // polish total only counts items already known eligible; provider
        // chunks revise it upward once translated lengths are visible.
        if options.translate {
            sink.stage_total(Stage::Translate, provider_indexes.len());
        }
        let polish_total = AtomicUsize::new(0);
        let mut immediate: Vec<(usize, Option<String>, bool)> = Vec::new();
        for (index, route) in routes.iter().enumerate() {
            match route {
                ItemRoute::Glossary(hit) => immediate.push((index, Some(hit.clone()), false)),
                ItemRoute::Passthrough => {
                    // In a translating run these items carry nothing to
                    // translate and go straight to formatting; they are
                    // polish candidates only when translation is off
                    let do_polish = !options.translate
                        && options.polish
                        && self.polisher.eligible(&items[index].content);
                    if do_polish {
                        polish_total.fetch_add(1, Ordering::SeqCst);
                    }
                    immediate.push((index, None, do_polish));
                }
                ItemRoute::Provider => {}
            }
        }
        if options.polish {
            sink.stage_total(Stage::Polish, polish_total.load(Ordering::SeqCst));
        }
        if options.format {
            sink.stage_total(Stage::Format, items.len());
        }

        let counters = StageCounters::default();

        let immediate_work = join_all(immediate.iter().map(|(index, draft, do_polish)| {
            self.finish_item(
                *index,
                &items[*index],
                draft.clone(),
                *do_polish,
                options,
                &counters,
                sink,
                writer,
            )
        }));

        let chunk_size = backend.max_batch_size().max(1);
        let chunk_work = join_all(provider_indexes.chunks(chunk_size).map(|chunk| {
            let backend = backend.clone();
            let polish_total = &polish_total;
            let counters = &counters;
            async move {
                let texts: Vec<String> =
                    chunk.iter().map(|&i| items[i].content.clone()).collect();
                let translated = match self
                    .orchestrator
                    .translate_batch(backend.as_ref(), &texts, source, options.target, options.termbase)
                    .await
                {
                    Ok(results) => results.into_iter().map(Some).collect::<Vec<_>>(),
                    Err(e) => {
                        let message = format!(
                            "Translation failed for {} items, keeping original content: {}",
                            chunk.len(),
                            e
                        );
                        warn!("{}", message);
                        sink.notify(NoticeLevel::Warning, &message);
                        vec![None; chunk.len()]
                    }
                };
                counters.bump(Stage::Translate, chunk.len(), sink);

                // Polish eligibility depends on translated length, so the
                // stage total can only be settled per chunk
                let drafts: Vec<(usize, Option<String>, bool)> = chunk
                    .iter()
                    .zip(translated)
                    .map(|(&index, draft)| {
                        let text = draft.as_deref().unwrap_or(&items[index].content);
                        let do_polish = options.polish && self.polisher.eligible(text);
                        if do_polish {
                            polish_total.fetch_add(1, Ordering::SeqCst);
                        }
                        (index, draft, do_polish)
                    })
                    .collect();
                if options.polish {
                    sink.stage_total(Stage::Polish, polish_total.load(Ordering::SeqCst));
                }

                join_all(drafts.into_iter().map(|(index, draft, do_polish)| {
                    self.finish_item(
                        index,
                        &items[index],
                        draft,
                        do_polish,
                        options,
                        counters,
                        sink,
                        writer,
                    )
                }))
                .await;
            }
        }));

        futures::join!(immediate_work, chunk_work);

        let elapsed = started.elapsed();
        let message = format!(
            "Processed {} items in {:.1}s",
            items.len(),
            elapsed.as_secs_f64()
        );
        info!("{}", message);
        sink.notify(NoticeLevel::Info, &message);
        Ok(())
    }

    /// Polish + format + write-back for one item. Runs exactly once per
    /// item per run; the write-back is the item's completion point.
    #[allow(clippy::too_many_arguments)]
    async fn finish_item(
        &self,
        index: usize,
        item: &WorkItem,
        draft: Option<String>,
        do_polish: bool,
        options: &RunOptions,
        counters: &StageCounters,
        sink: &dyn ProgressSink,
        writer: &dyn ContentSink,
    ) {
        let mut text = draft.unwrap_or_else(|| item.content.clone());

        if do_polish {
            text = self.polisher.polish(&text, options.target).await;
            counters.bump(Stage::Polish, 1, sink);
        }

        let mut style_key = None;
        if options.format {
            if let Some(formatted) =
                format_content(&text, options.target, &item.node_name, &item.parent_node_name)
            {
                text = formatted;
            }
            if let (Some(font_style), Some(font_size)) = (&item.font_style, item.font_size) {
                style_key = typography::style_key_for(
                    font_style,
                    font_size,
                    options.target,
                    options.platform,
                );
            }
            counters.bump(Stage::Format, 1, sink);
        }

        let content = if text != item.content {
            Some(text.as_str())
        } else {
            None
        };
        if let Err(e) = writer.write_back(index, content, style_key).await {
            warn!("Write-back failed for item {}: {}", index, e);
            sink.notify(
                NoticeLevel::Error,
                &format!("Failed to write item {}: {}", index, e),
            );
        }
        sink.item_complete();
    }
}

impl std::fmt::Debug for PipelineController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineController").finish()
    }
}

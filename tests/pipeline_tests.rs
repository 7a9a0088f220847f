/*!
 * End-to-end pipeline tests over mock backends.
 *
 * Covers the cross-module behavior the units can't see: cache idempotence
 * across runs, dedup call counts, glossary bypass, polish failure fallback,
 * stage totals under partial participation, and failure isolation.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use lingopipe::app_config::{Language, Platform};
use lingopipe::pipeline::cache::TransformCache;
use lingopipe::pipeline::controller::{ContentSink, PipelineController, RunOptions, WorkItem};
use lingopipe::pipeline::orchestrator::Orchestrator;
use lingopipe::pipeline::polish::Polisher;
use lingopipe::pipeline::progress::{NoticeLevel, ProgressEvent, RecordingSink, Stage};
use lingopipe::pipeline::rate_limit::RateLimiter;
use lingopipe::providers::mock::{MockBackend, MockPolisher};

/// Write-back recorder shared by every scenario
struct RecordingWriter {
    writes: Mutex<Vec<(usize, Option<String>, Option<String>)>>,
}

impl RecordingWriter {
    fn new() -> Self {
        Self {
            writes: Mutex::new(Vec::new()),
        }
    }

    fn writes(&self) -> Vec<(usize, Option<String>, Option<String>)> {
        self.writes.lock().clone()
    }

    fn content_for(&self, index: usize) -> Option<String> {
        self.writes
            .lock()
            .iter()
            .find(|(i, _, _)| *i == index)
            .and_then(|(_, content, _)| content.clone())
    }
}

#[async_trait]
impl ContentSink for RecordingWriter {
    async fn write_back(
        &self,
        item_index: usize,
        content: Option<&str>,
        style_key: Option<&str>,
    ) -> anyhow::Result<()> {
        self.writes.lock().push((
            item_index,
            content.map(|s| s.to_string()),
            style_key.map(|s| s.to_string()),
        ));
        Ok(())
    }
}

fn controller_with(polisher: MockPolisher) -> PipelineController {
    let translation_cache = Arc::new(TransformCache::memory_only(500, Duration::from_secs(3600)));
    let polish_cache = Arc::new(TransformCache::memory_only(100, Duration::from_secs(3600)));
    let orchestrator = Arc::new(Orchestrator::new(
        translation_cache,
        RateLimiter::for_translation(),
    ));
    let polisher = Arc::new(Polisher::new(
        Arc::new(polisher),
        polish_cache,
        RateLimiter::for_polish(),
        10,
    ));
    PipelineController::new(orchestrator, polisher)
}

fn translate_only(target: Language) -> RunOptions {
    RunOptions {
        translate: true,
        polish: false,
        format: false,
        target,
        platform: Platform::Desktop,
        termbase: false,
    }
}

fn items(texts: &[&str]) -> Vec<WorkItem> {
    texts.iter().map(|t| WorkItem::new(t, "label", "")).collect()
}

#[tokio::test(start_paused = true)]
async fn test_second_identical_run_should_hit_cache_without_provider_calls() {
    let controller = controller_with(MockPolisher::working());
    let backend = Arc::new(MockBackend::working());
    let batch = items(&["你好世界"]);
    let options = translate_only(Language::En);

    let first_writer = RecordingWriter::new();
    controller
        .run(backend.clone(), &batch, &options, &RecordingSink::new(), &first_writer)
        .await
        .unwrap();
    assert_eq!(backend.call_count(), 1);

    let second_writer = RecordingWriter::new();
    controller
        .run(backend.clone(), &batch, &options, &RecordingSink::new(), &second_writer)
        .await
        .unwrap();

    assert_eq!(backend.call_count(), 1);
    assert_eq!(first_writer.content_for(0), second_writer.content_for(0));
    assert!(first_writer.content_for(0).is_some());
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_fragments_should_share_provider_calls() {
    let controller = controller_with(MockPolisher::working());
    let backend = Arc::new(MockBackend::single_item());
    let batch = items(&["你好", "你好", "世界"]);
    let writer = RecordingWriter::new();

    controller
        .run(
            backend.clone(),
            &batch,
            &translate_only(Language::En),
            &RecordingSink::new(),
            &writer,
        )
        .await
        .unwrap();

    assert_eq!(backend.call_count(), 2);
    assert_eq!(writer.writes().len(), 3);
    assert_eq!(writer.content_for(0), writer.content_for(1));
    assert_ne!(writer.content_for(0), writer.content_for(2));
}

#[tokio::test(start_paused = true)]
async fn test_glossary_hit_should_bypass_the_provider() {
    let controller = controller_with(MockPolisher::working());
    let backend = Arc::new(MockBackend::working());
    let batch = items(&["确定"]);
    let writer = RecordingWriter::new();

    controller
        .run(
            backend.clone(),
            &batch,
            &translate_only(Language::En),
            &RecordingSink::new(),
            &writer,
        )
        .await
        .unwrap();

    assert_eq!(backend.call_count(), 0);
    assert_eq!(writer.content_for(0), Some("Confirm".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_polish_failure_should_keep_translated_content() {
    let controller = controller_with(MockPolisher::failing());
    let backend = Arc::new(MockBackend::working());
    let batch = items(&["这是一段足够长的中文内容需要好好润色处理"]);
    let mut options = translate_only(Language::En);
    options.polish = true;
    let writer = RecordingWriter::new();

    controller
        .run(backend, &batch, &options, &RecordingSink::new(), &writer)
        .await
        .unwrap();

    // Polish failed but the translated draft survives untouched
    let content = writer.content_for(0).expect("content written");
    assert!(content.starts_with("[en]"));
    assert!(!content.contains("(polished)"));
}

#[tokio::test(start_paused = true)]
async fn test_polish_success_should_rewrite_translated_content() {
    let controller = controller_with(MockPolisher::working());
    let backend = Arc::new(MockBackend::working());
    let batch = items(&["这是一段足够长的中文内容需要好好润色处理"]);
    let mut options = translate_only(Language::En);
    options.polish = true;
    let writer = RecordingWriter::new();

    controller
        .run(backend, &batch, &options, &RecordingSink::new(), &writer)
        .await
        .unwrap();

    let content = writer.content_for(0).expect("content written");
    assert!(content.ends_with("(polished)"));
}

#[tokio::test(start_paused = true)]
async fn test_stage_totals_should_count_only_provider_items() {
    let controller = controller_with(MockPolisher::working());
    let backend = Arc::new(MockBackend::working());
    // Two glossary hits, three real translations
    let batch = items(&["确定", "取消", "欢迎使用", "立即开始", "查看更多"]);
    let sink = RecordingSink::new();
    let writer = RecordingWriter::new();
    let options = RunOptions::all(Language::En, Platform::Desktop);

    controller
        .run(backend, &batch, &options, &sink, &writer)
        .await
        .unwrap();

    assert_eq!(sink.last_stage_total(Stage::Translate), Some(3));
    // Glossary items still go through formatting
    assert_eq!(sink.last_stage_total(Stage::Format), Some(5));
    assert_eq!(sink.last_stage_completed(Stage::Format), Some(5));
    assert_eq!(sink.items_completed(), 5);
    assert_eq!(writer.writes().len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_provider_failure_should_fall_back_to_original_content() {
    let controller = controller_with(MockPolisher::working());
    let backend = Arc::new(MockBackend::failing());
    let batch = items(&["欢迎使用", "12345"]);
    let sink = RecordingSink::new();
    let writer = RecordingWriter::new();

    controller
        .run(
            backend,
            &batch,
            &translate_only(Language::En),
            &sink,
            &writer,
        )
        .await
        .unwrap();

    // Both items complete; the failing one keeps its original content
    assert_eq!(writer.writes().len(), 2);
    assert_eq!(writer.content_for(0), None);
    assert_eq!(writer.content_for(1), None);
    assert!(sink
        .events()
        .iter()
        .any(|e| matches!(e, ProgressEvent::Notice(NoticeLevel::Warning, _))));
    assert_eq!(sink.items_completed(), 2);
}

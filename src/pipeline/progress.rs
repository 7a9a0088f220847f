/*!
 * Stage-level progress reporting.
 *
 * The pipeline emits fire-and-forget events: per-stage expected totals,
 * per-stage completion counts, per-item completion, and user notifications.
 * Totals may be revised upward mid-run as glossary and eligibility decisions
 * change how many items actually need a stage; completion counts are
 * monotonically non-decreasing. Sinks must tolerate events in any order
 * across items, since only counts are guaranteed, not identities.
 */

use parking_lot::Mutex;

/// One pipeline stage with independent progress accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Translate,
    Polish,
    Format,
}

impl Stage {
    /// Stable lowercase name for logs and event payloads
    pub fn name(&self) -> &'static str {
        match self {
            Self::Translate => "translate",
            Self::Polish => "polish",
            Self::Format => "format",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Severity of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Event channel between the pipeline and whoever renders progress
pub trait ProgressSink: Send + Sync {
    /// Total number of work items in the batch
    fn batch_total(&self, items: usize);

    /// Revised expected total for one stage
    fn stage_total(&self, stage: Stage, total: usize);

    /// Number of completed steps for one stage so far
    fn stage_completed(&self, stage: Stage, completed: usize);

    /// One work item finished its write-back
    fn item_complete(&self);

    /// User-facing notification
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// Sink that forwards everything to the log facade
#[derive(Debug, Default)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn batch_total(&self, items: usize) {
        log::info!("Batch started with {} items", items);
    }

    fn stage_total(&self, stage: Stage, total: usize) {
        log::debug!("Stage {} expects {} steps", stage, total);
    }

    fn stage_completed(&self, stage: Stage, completed: usize) {
        log::debug!("Stage {} completed {} steps", stage, completed);
    }

    fn item_complete(&self) {
        log::debug!("Work item finalized");
    }

    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Info | NoticeLevel::Success => log::info!("{}", message),
            NoticeLevel::Warning => log::warn!("{}", message),
            NoticeLevel::Error => log::error!("{}", message),
        }
    }
}

/// One recorded event, kept simple for assertions
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    BatchTotal(usize),
    StageTotal(Stage, usize),
    StageCompleted(Stage, usize),
    ItemComplete,
    Notice(NoticeLevel, String),
}

/// Sink that records every event, for tests and for the CLI's progress bars
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().clone()
    }

    /// Latest expected total reported for a stage
    pub fn last_stage_total(&self, stage: Stage) -> Option<usize> {
        self.events
            .lock()
            .iter()
            .rev()
            .find_map(|e| match e {
                ProgressEvent::StageTotal(s, total) if *s == stage => Some(*total),
                _ => None,
            })
    }

    /// Latest completion count reported for a stage
    pub fn last_stage_completed(&self, stage: Stage) -> Option<usize> {
        self.events
            .lock()
            .iter()
            .rev()
            .find_map(|e| match e {
                ProgressEvent::StageCompleted(s, done) if *s == stage => Some(*done),
                _ => None,
            })
    }

    /// Number of item-complete events
    pub fn items_completed(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::ItemComplete))
            .count()
    }

    /// All notices at or above warning level
    pub fn warnings(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Notice(NoticeLevel::Warning | NoticeLevel::Error, msg) => {
                    Some(msg.clone())
                }
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn batch_total(&self, items: usize) {
        self.events.lock().push(ProgressEvent::BatchTotal(items));
    }

    fn stage_total(&self, stage: Stage, total: usize) {
        self.events.lock().push(ProgressEvent::StageTotal(stage, total));
    }

    fn stage_completed(&self, stage: Stage, completed: usize) {
        self.events
            .lock()
            .push(ProgressEvent::StageCompleted(stage, completed));
    }

    fn item_complete(&self) {
        self.events.lock().push(ProgressEvent::ItemComplete);
    }

    fn notify(&self, level: NoticeLevel, message: &str) {
        self.events
            .lock()
            .push(ProgressEvent::Notice(level, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_should_track_latest_stage_totals() {
        let sink = RecordingSink::new();
        sink.stage_total(Stage::Translate, 5);
        sink.stage_total(Stage::Translate, 3);
        sink.stage_total(Stage::Polish, 2);
        assert_eq!(sink.last_stage_total(Stage::Translate), Some(3));
        assert_eq!(sink.last_stage_total(Stage::Polish), Some(2));
        assert_eq!(sink.last_stage_total(Stage::Format), None);
    }

    #[test]
    fn test_recording_sink_should_collect_warnings_only() {
        let sink = RecordingSink::new();
        sink.notify(NoticeLevel::Info, "fine");
        sink.notify(NoticeLevel::Warning, "degraded");
        sink.notify(NoticeLevel::Error, "broken");
        assert_eq!(sink.warnings(), vec!["degraded", "broken"]);
    }

    #[test]
    fn test_stage_names_are_stable() {
        assert_eq!(Stage::Translate.name(), "translate");
        assert_eq!(Stage::Polish.name(), "polish");
        assert_eq!(Stage::Format.name(), "format");
    }
}

/*!
 * The transformation pipeline.
 *
 * - `dedup`: batch deduplication with index-map expansion
 * - `cache`: two-tier content-addressed TTL cache
 * - `rate_limit`: rps-paced, concurrency-capped request gate
 * - `glossary`: static bilingual vocabulary
 * - `predicates`: translate/polish eligibility checks
 * - `orchestrator`: dedup → cache → chunked provider calls → expansion
 * - `polish`: best-effort content polishing over the chat backend
 * - `format` / `typography`: typographic formatting rules and style keys
 * - `progress`: stage-level progress events
 * - `controller`: top-level driver with exactly-once write-back
 */

pub mod cache;
pub mod controller;
pub mod dedup;
pub mod format;
pub mod glossary;
pub mod orchestrator;
pub mod polish;
pub mod predicates;
pub mod progress;
pub mod rate_limit;
pub mod typography;

pub use cache::TransformCache;
pub use controller::{ContentSink, PipelineController, RunOptions, WorkItem};
pub use orchestrator::Orchestrator;
pub use polish::Polisher;
pub use progress::{NoticeLevel, ProgressSink, Stage};
pub use rate_limit::RateLimiter;

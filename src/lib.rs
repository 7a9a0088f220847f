/*!
 * # LingoPipe - batch text-fragment transformation pipeline
 *
 * A Rust library for bulk translation, polishing and typographic
 * formatting of short text fragments (UI copy, labels, design mockup
 * text) between English and Simplified Chinese.
 *
 * ## Features
 *
 * - Batch translation through several providers:
 *   - Google Cloud Translation v2 (bulk)
 *   - Google Cloud Translation v3 (glossary-assisted)
 *   - Google unofficial free endpoint
 *   - Baidu fanyi (signed requests)
 * - Best-effort content polishing through a chat backend
 * - Typographic formatting rules for both languages
 * - Two-tier content-addressed caching (memory + SQLite)
 * - Request pacing and concurrency capping per backend
 * - Static glossary short-circuit for fixed UI vocabulary
 *
 * ## Architecture
 *
 * - `app_config`: configuration management
 * - `pipeline`: the transformation pipeline (dedup, cache, rate limiting,
 *   orchestration, polishing, formatting, progress, controller)
 * - `providers`: client implementations for the external backends
 * - `storage`: SQLite-backed cache tier and settings store
 * - `errors`: custom error types
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod errors;
pub mod pipeline;
pub mod providers;
pub mod storage;

// Re-export main types for easier usage
pub use app_config::{Config, Language, Platform, TranslationProvider};
pub use pipeline::{PipelineController, RunOptions, WorkItem};

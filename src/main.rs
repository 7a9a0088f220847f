// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use lingopipe::app_config::{Config, Language, LogLevel, TranslationProvider};
use lingopipe::pipeline::cache::{
    POLISH_CAPACITY, POLISH_TTL, TRANSLATION_CAPACITY, TRANSLATION_TTL, TransformCache,
};
use lingopipe::pipeline::controller::{ContentSink, PipelineController, RunOptions, WorkItem};
use lingopipe::pipeline::orchestrator::{HttpLivenessProbe, Orchestrator};
use lingopipe::pipeline::polish::Polisher;
use lingopipe::pipeline::progress::{NoticeLevel, ProgressSink, Stage};
use lingopipe::pipeline::rate_limit::RateLimiter;
use lingopipe::providers::TranslationBackend;
use lingopipe::providers::baidu::Baidu;
use lingopipe::providers::coze::Coze;
use lingopipe::providers::google_advanced::GoogleAdvanced;
use lingopipe::providers::google_basic::GoogleBasic;
use lingopipe::providers::google_free::GoogleFree;
use lingopipe::storage::{SettingsStore, SqliteCacheStore, StorageConnection};

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    GoogleBasic,
    GoogleAdvanced,
    GoogleFree,
    Baidu,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::GoogleBasic => TranslationProvider::GoogleBasic,
            CliTranslationProvider::GoogleAdvanced => TranslationProvider::GoogleAdvanced,
            CliTranslationProvider::GoogleFree => TranslationProvider::GoogleFree,
            CliTranslationProvider::Baidu => TranslationProvider::Baidu,
        }
    }
}

/// CLI Wrapper for Language to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLanguage {
    En,
    Zh,
}

impl From<CliLanguage> for Language {
    fn from(cli_language: CliLanguage) -> Self {
        match cli_language {
            CliLanguage::En => Language::En,
            CliLanguage::Zh => Language::Zh,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a batch of fragments through the pipeline
    Run(RunArgs),

    /// Empty both cache tiers
    ClearCache {
        /// Configuration file path
        #[arg(short, long, default_value = "conf.json")]
        config_path: String,
    },
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// JSON batch file: [{"content", "name", "parent_name", "font_style"?, "font_size"?}]
    #[arg(value_name = "BATCH_FILE")]
    batch_path: PathBuf,

    /// Run the translate stage (selecting any stage flag disables the others
    /// unless they are also given; with no stage flags the config decides)
    #[arg(long)]
    translate: bool,

    /// Run the polish stage
    #[arg(long)]
    polish: bool,

    /// Run the format stage
    #[arg(long)]
    format: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Target language
    #[arg(short, long, value_enum)]
    target_language: Option<CliLanguage>,

    /// Output file for results JSON (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// LingoPipe - batch translation, polishing and formatting of text fragments
#[derive(Parser, Debug)]
#[command(name = "lingopipe")]
#[command(version = "0.3.0")]
#[command(about = "Batch text-fragment transformation pipeline")]
#[command(long_about = "LingoPipe translates, polishes and typographically formats batches of
short text fragments between English and Simplified Chinese.

EXAMPLES:
    lingopipe run batch.json                      # All configured stages
    lingopipe run --translate --format batch.json # Skip polishing
    lingopipe run -p baidu -t zh batch.json       # Specific provider and language
    lingopipe clear-cache                         # Drop both cache tiers

CONFIGURATION:
    Configuration is stored in conf.json by default. If the config file
    doesn't exist, a default one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:>5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// One fragment of the input batch file
#[derive(Debug, Deserialize)]
struct BatchItem {
    content: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    parent_name: String,
    #[serde(default)]
    font_style: Option<String>,
    #[serde(default)]
    font_size: Option<u32>,
}

/// One fragment of the results file
#[derive(Debug, Serialize)]
struct OutputItem {
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    style_key: Option<String>,
}

/// Content sink that collects write-backs for the results file
struct JsonWriter {
    results: Mutex<Vec<(Option<String>, Option<String>)>>,
}

impl JsonWriter {
    fn new(len: usize) -> Self {
        Self {
            results: Mutex::new(vec![(None, None); len]),
        }
    }

    fn into_output(self, items: &[WorkItem]) -> Vec<OutputItem> {
        let results = self.results.into_inner();
        items
            .iter()
            .zip(results)
            .map(|(item, (content, style_key))| OutputItem {
                content: content.unwrap_or_else(|| item.content.clone()),
                style_key,
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl ContentSink for JsonWriter {
    async fn write_back(
        &self,
        item_index: usize,
        content: Option<&str>,
        style_key: Option<&str>,
    ) -> Result<()> {
        let mut results = self.results.lock();
        let slot = results
            .get_mut(item_index)
            .ok_or_else(|| anyhow!("write-back for unknown item {}", item_index))?;
        *slot = (
            content.map(|s| s.to_string()),
            style_key.map(|s| s.to_string()),
        );
        Ok(())
    }
}

/// Progress sink rendering one indicatif bar per stage
struct TerminalSink {
    multi: MultiProgress,
    bars: Mutex<HashMap<&'static str, ProgressBar>>,
    items: ProgressBar,
}

impl TerminalSink {
    fn new() -> Self {
        let multi = MultiProgress::new();
        let items = multi.add(ProgressBar::new(0));
        items.set_style(Self::bar_style());
        items.set_prefix("items");
        Self {
            multi,
            bars: Mutex::new(HashMap::new()),
            items,
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{prefix:>9} [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn bar_for(&self, stage: Stage) -> ProgressBar {
        let mut bars = self.bars.lock();
        bars.entry(stage.name())
            .or_insert_with(|| {
                let bar = self.multi.add(ProgressBar::new(0));
                bar.set_style(Self::bar_style());
                bar.set_prefix(stage.name());
                bar
            })
            .clone()
    }

    fn finish(&self) {
        for bar in self.bars.lock().values() {
            bar.finish();
        }
        self.items.finish();
    }
}

impl ProgressSink for TerminalSink {
    fn batch_total(&self, items: usize) {
        self.items.set_length(items as u64);
    }

    fn stage_total(&self, stage: Stage, total: usize) {
        self.bar_for(stage).set_length(total as u64);
    }

    fn stage_completed(&self, stage: Stage, completed: usize) {
        self.bar_for(stage).set_position(completed as u64);
    }

    fn item_complete(&self) {
        self.items.inc(1);
    }

    fn notify(&self, level: NoticeLevel, message: &str) {
        let prefix = match level {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "done",
            NoticeLevel::Warning => "warn",
            NoticeLevel::Error => "error",
        };
        let _ = self.multi.println(format!("[{}] {}", prefix, message));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();
    match cli.command {
        Commands::Run(args) => run_pipeline(args).await,
        Commands::ClearCache { config_path } => clear_cache(&config_path),
    }
}

/// Build the configured translation backend, checking credentials up front
fn build_backend(config: &Config) -> Result<Arc<dyn TranslationBackend>> {
    let creds = &config.credentials;
    match config.provider {
        TranslationProvider::GoogleBasic => {
            if creds.google_api_key.is_empty() {
                return Err(anyhow!("Google API key is not configured"));
            }
            Ok(Arc::new(GoogleBasic::new(creds.google_api_key.clone(), "")))
        }
        TranslationProvider::GoogleAdvanced => {
            if creds.google_api_key.is_empty() {
                return Err(anyhow!("Google API key is not configured"));
            }
            Ok(Arc::new(GoogleAdvanced::new(
                creds.google_api_key.clone(),
                creds.google_glossary.clone(),
                "",
            )))
        }
        TranslationProvider::GoogleFree => Ok(Arc::new(GoogleFree::new(""))),
        TranslationProvider::Baidu => {
            if creds.baidu_app_id.is_empty() || creds.baidu_key.is_empty() {
                return Err(anyhow!("Baidu credentials are not configured"));
            }
            Ok(Arc::new(Baidu::new(
                creds.baidu_app_id.clone(),
                creds.baidu_key.clone(),
                "",
            )))
        }
    }
}

fn load_config(path: &str, log_level: Option<CliLogLevel>) -> Result<Config> {
    if let Some(level) = &log_level {
        log::set_max_level(LogLevel::from(level.clone()).to_level_filter());
    }

    let existed = std::path::Path::new(path).exists();
    if !existed {
        warn!("Config file not found at '{}', creating default config.", path);
    }
    let mut config = Config::load_or_create(path)
        .with_context(|| format!("Failed to load config from {}", path))?;

    if let Some(level) = log_level {
        config.log_level = level.into();
    }
    log::set_max_level(config.log_level.to_level_filter());
    Ok(config)
}

async fn run_pipeline(args: RunArgs) -> Result<()> {
    let mut config = load_config(&args.config_path, args.log_level.clone())?;

    let storage = StorageConnection::new(&config.storage_path)?;
    let settings = SettingsStore::new(storage.clone());

    // The previous run's choices come back when the command line is silent;
    // a fresh database falls through to the config file
    if args.provider.is_none() {
        if let Some(saved) = settings.persisted("provider")? {
            match saved.parse::<TranslationProvider>() {
                Ok(provider) => config.provider = provider,
                Err(_) => warn!("Ignoring unrecognized stored provider '{}'", saved),
            }
        }
    }
    if args.target_language.is_none() {
        if let Some(saved) = settings.persisted("target_language")? {
            match saved.parse::<Language>() {
                Ok(target) => config.target_language = target,
                Err(_) => warn!("Ignoring unrecognized stored language '{}'", saved),
            }
        }
    }
    if let Some(provider) = args.provider {
        config.provider = provider.into();
    }
    if let Some(target) = args.target_language {
        config.target_language = target.into();
    }

    // Stage selection: explicit flags pick exactly those stages, otherwise
    // the stored automatic toggles apply, then the config's (translation
    // always runs when nothing is flagged)
    let auto_polish = match settings.persisted("auto_polish")? {
        Some(value) => value == "true",
        None => config.auto_polish,
    };
    let auto_format = match settings.persisted("auto_format")? {
        Some(value) => value == "true",
        None => config.auto_format,
    };
    let any_stage_flag = args.translate || args.polish || args.format;
    let options = RunOptions {
        translate: if any_stage_flag { args.translate } else { true },
        polish: if any_stage_flag { args.polish } else { auto_polish },
        format: if any_stage_flag { args.format } else { auto_format },
        target: config.target_language,
        platform: config.platform,
        termbase: config.termbase
            && config.provider == TranslationProvider::GoogleAdvanced,
    };

    let batch: Vec<BatchItem> = {
        let content = std::fs::read_to_string(&args.batch_path)
            .with_context(|| format!("Failed to read batch file {:?}", args.batch_path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse batch file {:?}", args.batch_path))?
    };
    let items: Vec<WorkItem> = batch
        .into_iter()
        .map(|b| {
            let mut item = WorkItem::new(&b.content, &b.name, &b.parent_name);
            if let (Some(style), Some(size)) = (b.font_style, b.font_size) {
                item = item.with_font(&style, size);
            }
            item
        })
        .collect();

    info!(
        "Running {} items toward {} via {}",
        items.len(),
        config.target_language,
        config.provider.display_name()
    );

    let translation_cache = Arc::new(TransformCache::new(
        TRANSLATION_CAPACITY,
        TRANSLATION_TTL,
        Arc::new(SqliteCacheStore::new(
            storage.clone(),
            "translation",
            TRANSLATION_CAPACITY,
        )),
    ));
    let polish_cache = Arc::new(TransformCache::new(
        POLISH_CAPACITY,
        POLISH_TTL,
        Arc::new(SqliteCacheStore::new(storage, "polish", POLISH_CAPACITY)),
    ));

    let mut orchestrator =
        Orchestrator::new(translation_cache, RateLimiter::for_translation());
    let has_baidu_fallback = config.provider.is_google_family()
        && !config.credentials.baidu_app_id.is_empty()
        && !config.credentials.baidu_key.is_empty();
    if has_baidu_fallback {
        orchestrator = orchestrator.with_fallback(
            Arc::new(HttpLivenessProbe::new()?),
            Arc::new(Baidu::new(
                config.credentials.baidu_app_id.clone(),
                config.credentials.baidu_key.clone(),
                "",
            )),
        );
    }

    let polisher = Polisher::new(
        Arc::new(Coze::new(config.credentials.coze_api_key.clone(), "")),
        polish_cache,
        RateLimiter::for_polish(),
        config.min_polish_tokens,
    );

    let controller = PipelineController::new(Arc::new(orchestrator), Arc::new(polisher));
    let backend = build_backend(&config)?;

    let sink = TerminalSink::new();
    let writer = JsonWriter::new(items.len());
    controller
        .run(backend, &items, &options, &sink, &writer)
        .await?;
    sink.finish();

    let output = writer.into_output(&items);
    let json = serde_json::to_string_pretty(&output)?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write results to {:?}", path))?;
            info!("Results written to {:?}", path);
        }
        None => println!("{}", json),
    }

    // Remember this run's choices for the next invocation
    let remembered = [
        ("provider", config.provider.to_lowercase_string()),
        ("target_language", config.target_language.code().to_string()),
        ("auto_polish", options.polish.to_string()),
        ("auto_format", options.format.to_string()),
    ];
    for (key, value) in &remembered {
        if let Err(e) = settings.set(key, value) {
            warn!("Failed to persist setting {}: {}", key, e);
        }
    }
    Ok(())
}

fn clear_cache(config_path: &str) -> Result<()> {
    use lingopipe::storage::CacheStore;

    let config = load_config(config_path, None)?;
    let storage = StorageConnection::new(&config.storage_path)?;
    SqliteCacheStore::new(storage.clone(), "translation", TRANSLATION_CAPACITY).clear()?;
    SqliteCacheStore::new(storage, "polish", POLISH_CAPACITY).clear()?;
    info!("Cache cleared");
    Ok(())
}

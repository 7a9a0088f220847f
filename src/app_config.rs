use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Target language for translation
    #[serde(default)]
    pub target_language: Language,

    /// Target platform for typography lookups
    #[serde(default)]
    pub platform: Platform,

    /// Preferred translation provider
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Whether the static termbase is consulted before providers
    #[serde(default = "default_true")]
    pub termbase: bool,

    /// Whether translated content is polished automatically
    #[serde(default = "default_true")]
    pub auto_polish: bool,

    /// Whether typographic formatting runs automatically
    #[serde(default = "default_true")]
    pub auto_format: bool,

    /// Minimum word/character count before a fragment is worth polishing.
    /// Empirically tuned; kept configurable on purpose.
    #[serde(default = "default_min_polish_tokens")]
    pub min_polish_tokens: usize,

    /// Provider credentials
    #[serde(default)]
    pub credentials: Credentials,

    /// Path to the SQLite file backing the persisted cache tier and settings
    #[serde(default = "default_storage_path")]
    pub storage_path: String,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Supported languages. The pipeline translates between exactly this pair.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English
    #[default]
    En,
    /// Simplified Chinese
    Zh,
}

impl Language {
    /// Wire code used by every provider API
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Zh => "zh",
        }
    }

    /// The other half of the supported pair
    pub fn counterpart(&self) -> Language {
        match self {
            Self::En => Self::Zh,
            Self::Zh => Self::En,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "en" => Ok(Self::En),
            "zh" => Ok(Self::Zh),
            _ => Err(anyhow!("Unsupported language code: {}", s)),
        }
    }
}

/// Target platform, used only to resolve typography style keys
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Desktop,
    Mobile,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Google Cloud Translation v2 (bulk)
    #[default]
    GoogleBasic,
    // @provider: Google Cloud Translation v3 (glossary-assisted)
    GoogleAdvanced,
    // @provider: Google unofficial free endpoint (single item per call)
    GoogleFree,
    // @provider: Baidu fanyi (signed requests)
    Baidu,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::GoogleBasic => "Google Basic",
            Self::GoogleAdvanced => "Google Advanced",
            Self::GoogleFree => "Google Free",
            Self::Baidu => "Baidu",
        }
    }

    // @returns: Lowercase provider identifier, also used in cache keys
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::GoogleBasic => "google_basic".to_string(),
            Self::GoogleAdvanced => "google_advanced".to_string(),
            Self::GoogleFree => "google_free".to_string(),
            Self::Baidu => "baidu".to_string(),
        }
    }

    // @returns: Whether this provider belongs to the Google family and is
    //           subject to the reachability probe and Baidu fallback
    pub fn is_google_family(&self) -> bool {
        matches!(self, Self::GoogleBasic | Self::GoogleAdvanced | Self::GoogleFree)
    }
}

// Implement Display trait for TranslationProvider
impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for TranslationProvider
impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "google_basic" | "googlebasic" => Ok(Self::GoogleBasic),
            "google_advanced" | "googleadvanced" => Ok(Self::GoogleAdvanced),
            "google_free" | "googlefree" => Ok(Self::GoogleFree),
            "baidu" => Ok(Self::Baidu),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Credentials for the external backends
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Credentials {
    /// Google Cloud API key
    #[serde(default)]
    pub google_api_key: String,

    /// Glossary resource name for the glossary-assisted Google provider
    #[serde(default)]
    pub google_glossary: String,

    /// Baidu fanyi application id
    #[serde(default)]
    pub baidu_app_id: String,

    /// Baidu fanyi secret key
    #[serde(default)]
    pub baidu_key: String,

    /// Coze chat API key used by the polish backend
    #[serde(default)]
    pub coze_api_key: String,
}

/// Log level configuration
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to the log crate's level filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_min_polish_tokens() -> usize {
    10
}

fn default_storage_path() -> String {
    "lingopipe.db".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_language: Language::default(),
            platform: Platform::default(),
            provider: TranslationProvider::default(),
            termbase: true,
            auto_polish: true,
            auto_format: true,
            min_polish_tokens: default_min_polish_tokens(),
            credentials: Credentials::default(),
            storage_path: default_storage_path(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file, creating a default file if absent
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {:?}: {}", path, e))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {:?}: {}", path, e))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)
            .map_err(|e| anyhow!("Failed to write config file: {}", e))?;
        Ok(())
    }

    /// Validate the tuning constants
    pub fn validate(&self) -> Result<()> {
        if self.min_polish_tokens == 0 {
            return Err(anyhow!("min_polish_tokens must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_default_config_should_enable_all_stages() {
        let config = Config::default();
        assert!(config.termbase);
        assert!(config.auto_polish);
        assert!(config.auto_format);
        assert_eq!(config.target_language, Language::En);
        assert_eq!(config.provider, TranslationProvider::GoogleBasic);
    }

    #[test]
    fn test_provider_from_str_should_accept_both_spellings() {
        assert_eq!(
            TranslationProvider::from_str("google_basic").unwrap(),
            TranslationProvider::GoogleBasic
        );
        assert_eq!(
            TranslationProvider::from_str("GoogleAdvanced").unwrap(),
            TranslationProvider::GoogleAdvanced
        );
        assert!(TranslationProvider::from_str("deepl").is_err());
    }

    #[test]
    fn test_language_counterpart_should_flip_pair() {
        assert_eq!(Language::En.counterpart(), Language::Zh);
        assert_eq!(Language::Zh.counterpart(), Language::En);
    }

    #[test]
    fn test_config_roundtrip_should_preserve_fields() {
        let mut config = Config::default();
        config.target_language = Language::Zh;
        config.provider = TranslationProvider::Baidu;
        config.min_polish_tokens = 7;

        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.target_language, Language::Zh);
        assert_eq!(parsed.provider, TranslationProvider::Baidu);
        assert_eq!(parsed.min_polish_tokens, 7);
    }

    #[test]
    fn test_validate_should_reject_zero_threshold() {
        let mut config = Config::default();
        config.min_polish_tokens = 0;
        assert!(config.validate().is_err());
    }
}

//! Runtime configuration.
//!
//! Loaded from a JSON file with every field optional:
//!
//! ```json
//! {
//!   "generation": { "model": "gpt-4o-mini", "max_tokens": 1000, "language": "danish" },
//!   "crawl": { "timeout": 30, "denied_extensions": [".pdf"] },
//!   "smtp": {
//!     "server": "smtp.gmail.com",
//!     "sender_email": "app@example.com",
//!     "receiver_email": "dev@example.com"
//!   }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

#[cfg(feature = "fetch")]
use crate::discover::DiscoverConfig;
use crate::discover::DEFAULT_DENIED_EXTENSIONS;
use crate::error::ConfigError;
use crate::feedback::SmtpSettings;
#[cfg(feature = "fetch")]
use crate::fetch::FetchConfig;
use crate::generate::GenerationSettings;
use crate::prompt::PromptLanguage;

/// Environment variable that overrides `smtp.app_password`.
pub const SMTP_PASSWORD_ENV: &str = "SCRIBE_SMTP_PASSWORD";

/// Completion service settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout: u64,
    pub language: PromptLanguage,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        let settings = GenerationSettings::default();
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: settings.model,
            max_tokens: settings.max_tokens,
            timeout: 120,
            language: PromptLanguage::default(),
        }
    }
}

impl GenerationConfig {
    pub fn settings(&self) -> GenerationSettings {
        GenerationSettings { model: self.model.clone(), max_tokens: self.max_tokens }
    }
}

/// Link discovery settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    pub user_agent: String,
    pub denied_extensions: Vec<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: "Mozilla/5.0 (compatible; Scribe/0.1)".to_string(),
            denied_extensions: DEFAULT_DENIED_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }
}

#[cfg(feature = "fetch")]
impl CrawlConfig {
    pub fn discover_config(&self) -> DiscoverConfig {
        DiscoverConfig {
            fetch: FetchConfig { timeout: self.timeout, user_agent: self.user_agent.clone() },
            denied_extensions: self.denied_extensions.clone(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScribeConfig {
    pub generation: GenerationConfig,
    pub crawl: CrawlConfig,
    /// Feedback delivery is disabled when absent.
    pub smtp: Option<SmtpSettings>,
}

impl ScribeConfig {
    /// Reads configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Loads from `path`, else from the default location if a file exists
    /// there, else falls back to defaults. Environment overrides apply last.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        config.apply_env(std::env::var(SMTP_PASSWORD_ENV).ok());
        Ok(config)
    }

    fn apply_env(&mut self, smtp_password: Option<String>) {
        if let (Some(smtp), Some(password)) = (self.smtp.as_mut(), smtp_password) {
            smtp.app_password = password;
        }
    }
}

/// `<config dir>/scribe/config.json`.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("scribe").join("config.json"))
}

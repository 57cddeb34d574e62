//! Layered configuration
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults
//! 2. TOML file (`colorbook.toml` unless overridden)
//! 3. `OPENAI_API_KEY`
//! 4. `COLORBOOK_*` environment variables
//!
//! CLI flags are applied on top by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "colorbook.toml";

/// What to do when the image API fails for one page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Record the page as absent and continue with the next index
    #[default]
    Skip,
    /// Stop the batch at the first failed page
    Abort,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub chat_model: String,
    pub image_model: String,
    pub image_size: String,
    pub image_quality: String,
    /// Number of themes requested from the text API (not validated on the reply)
    pub theme_count: usize,
    /// Session folders and archives are created here
    pub output_dir: PathBuf,
    /// Ask the text API for a one-line theme description and embed it in prompts
    pub describe_theme: bool,
    pub failure_policy: FailurePolicy,
    /// Unset keeps the HTTP client's default (no timeout)
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: "https://api.openai.com/v1".to_string(),
            chat_model: "gpt-3.5-turbo".to_string(),
            image_model: "dall-e-3".to_string(),
            image_size: "1024x1024".to_string(),
            image_quality: "standard".to_string(),
            theme_count: 10,
            output_dir: PathBuf::from("."),
            describe_theme: false,
            failure_policy: FailurePolicy::Skip,
            request_timeout_secs: None,
        }
    }
}

impl Config {
    /// Load configuration from defaults, the given (or default) TOML file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        Ok(Self::figment(file).extract()?)
    }

    fn figment(file: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(file))
            .merge(
                Env::raw()
                    .only(&["OPENAI_API_KEY"])
                    .map(|_| "api_key".into()),
            )
            .merge(Env::prefixed("COLORBOOK_"))
    }

    /// Request timeout, if one is configured
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// API key with surrounding whitespace removed; blank keys count as absent
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

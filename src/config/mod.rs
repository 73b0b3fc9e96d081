//! User configuration.
//!
//! Preferences live in `<data-dir>/config.toml`. Every field is optional;
//! a missing file or a missing field falls back to the built-in default, so
//! a fresh install works with no configuration at all.
//!
//! ```toml
//! default_template = "bracket3"
//! default_bracket = "bracket3"
//! edhrec_base_url = "https://json.edhrec.com"
//! request_limit = 50
//! output_format = "human"  # or "json"
//! ```
//!
//! Precedence for any setting: CLI flag > config file > default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default template id applied when neither the request nor the config
/// file names one.
pub const DEFAULT_TEMPLATE_ID: &str = "bracket3";

/// Default base URL for the EDHREC JSON endpoints.
pub const DEFAULT_EDHREC_BASE_URL: &str = "https://json.edhrec.com";

/// Default number of recommendations requested per fetch.
pub const DEFAULT_REQUEST_LIMIT: u32 = 50;

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User preferences stored in config.toml. All fields optional; accessor
/// methods apply the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeckhandConfig {
    /// Template id used when a request doesn't name one.
    pub default_template: Option<String>,

    /// Bracket id used when a request doesn't name one; without it the
    /// template id doubles as the bracket id.
    pub default_bracket: Option<String>,

    /// Base URL for recommendation fetches.
    pub edhrec_base_url: Option<String>,

    /// Recommendations requested per fetch (1-500).
    pub request_limit: Option<u32>,

    /// Default output format for CLI commands.
    pub output_format: Option<OutputFormat>,
}

impl DeckhandConfig {
    /// Load config from `<data_dir>/config.toml`. A missing file yields the
    /// defaults; a malformed file is a fatal data-load error.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join("config.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)?;
        let config: Self = toml::from_str(&text).map_err(|e| Error::DataLoad {
            kind: "config",
            id: path.display().to_string(),
            reason: e.to_string(),
        })?;
        config.validate().map_err(|reason| Error::DataLoad {
            kind: "config",
            id: path.display().to_string(),
            reason,
        })?;
        Ok(config)
    }

    /// Validate the config values. Returns an error message if any value is
    /// invalid.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(limit) = self.request_limit {
            if limit == 0 || limit > 500 {
                return Err(format!("request_limit must be 1-500, got {}", limit));
            }
        }
        if let Some(ref url) = self.edhrec_base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!("edhrec_base_url must be an http(s) URL, got '{}'", url));
            }
        }
        Ok(())
    }

    pub fn default_template(&self) -> &str {
        self.default_template.as_deref().unwrap_or(DEFAULT_TEMPLATE_ID)
    }

    /// Configured bracket id, if any. When unset, bracket resolution falls
    /// back to the template id.
    pub fn default_bracket(&self) -> Option<&str> {
        self.default_bracket.as_deref()
    }

    pub fn edhrec_base_url(&self) -> &str {
        self.edhrec_base_url
            .as_deref()
            .unwrap_or(DEFAULT_EDHREC_BASE_URL)
    }

    pub fn request_limit(&self) -> u32 {
        self.request_limit.unwrap_or(DEFAULT_REQUEST_LIMIT)
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format.unwrap_or_default()
    }
}

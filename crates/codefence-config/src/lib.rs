//! Configuration management for codefence.
//!
//! Parses `codefence.toml` with serde and discovers the file in the current
//! directory or any parent. CLI settings can be applied during load via
//! [`CliSettings`].
//!
//! ```toml
//! [highlight]
//! service_url = "${PYGMENTIZE_URL:-http://pygmentize.herokuapp.com/}"
//! timeout_secs = 10
//!
//! [highlight.aliases]
//! sh = "bash"
//!
//! [cache]
//! enabled = true
//! dir = ".pygments-cache"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `highlight.service_url` supports `${VAR}` and `${VAR:-default}`.

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "codefence.toml";

/// Default highlighter service endpoint.
pub const DEFAULT_SERVICE_URL: &str = "http://pygmentize.herokuapp.com/";

/// Default timeout for one highlighter request, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default cache directory, relative to the config file.
const DEFAULT_CACHE_DIR: &str = ".pygments-cache";

/// Upper bound for `highlight.timeout_secs`.
const MAX_TIMEOUT_SECS: u64 = 300;

/// CLI settings that override configuration file values.
///
/// Only `Some` fields override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override highlighter service URL.
    pub service_url: Option<String>,
    /// Override cache directory.
    pub cache_dir: Option<PathBuf>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    highlight: HighlightConfigRaw,
    cache: CacheConfigRaw,

    /// Resolved highlighter settings (set after loading).
    #[serde(skip)]
    pub highlight_resolved: HighlightSettings,
    /// Resolved cache settings (set after loading).
    #[serde(skip)]
    pub cache_resolved: CacheSettings,
    /// Path to the config file, if one was loaded.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct HighlightConfigRaw {
    service_url: Option<String>,
    timeout_secs: Option<u64>,
    aliases: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct CacheConfigRaw {
    enabled: Option<bool>,
    dir: Option<String>,
}

/// Resolved highlighter service settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSettings {
    /// Highlighter service endpoint.
    pub service_url: String,
    /// Timeout for a single service request.
    pub timeout: Duration,
    /// Extra language aliases, applied on top of the built-in table.
    pub aliases: BTreeMap<String, String>,
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            aliases: BTreeMap::new(),
        }
    }
}

/// Resolved cache settings with an absolute directory.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CacheSettings {
    /// Whether highlighted output is cached.
    pub enabled: bool,
    /// Directory holding cache buckets.
    pub dir: PathBuf,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., `highlight.service_url`).
        field: String,
        /// Error message.
        message: String,
    },
}

impl Config {
    /// Load configuration with optional CLI settings.
    ///
    /// With `config_path`, loads that file. Otherwise searches for
    /// `codefence.toml` in the current directory and its parents, falling back
    /// to defaults rooted at the current directory. CLI settings are applied
    /// last and take precedence.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `config_path` doesn't exist, or if
    /// parsing, expansion or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_base(&std::env::current_dir().unwrap_or_default())
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(url) = &settings.service_url {
            self.highlight_resolved.service_url.clone_from(url);
        }
        if let Some(dir) = &settings.cache_dir {
            self.cache_resolved.dir.clone_from(dir);
        }
        if let Some(enabled) = settings.cache_enabled {
            self.cache_resolved.enabled = enabled;
        }
    }

    /// Search for the config file in the current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_base(base: &Path) -> Self {
        Self {
            highlight: HighlightConfigRaw::default(),
            cache: CacheConfigRaw::default(),
            highlight_resolved: HighlightSettings::default(),
            cache_resolved: CacheSettings {
                enabled: true,
                dir: base.join(DEFAULT_CACHE_DIR),
            },
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve(config_dir)?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        Ok(config)
    }

    /// Expand env vars and resolve relative paths against `config_dir`.
    fn resolve(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        let service_url = match &self.highlight.service_url {
            Some(url) => expand::expand_env(url, "highlight.service_url")?,
            None => DEFAULT_SERVICE_URL.to_owned(),
        };

        self.highlight_resolved = HighlightSettings {
            service_url,
            timeout: Duration::from_secs(
                self.highlight.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            aliases: self.highlight.aliases.clone(),
        };

        self.cache_resolved = CacheSettings {
            enabled: self.cache.enabled.unwrap_or(true),
            dir: config_dir.join(self.cache.dir.as_deref().unwrap_or(DEFAULT_CACHE_DIR)),
        };

        Ok(())
    }

    /// Validate resolved values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` naming the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.highlight_resolved.service_url;
        if url.is_empty() {
            return Err(ConfigError::Validation(
                "highlight.service_url cannot be empty".to_owned(),
            ));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "highlight.service_url must start with http:// or https://".to_owned(),
            ));
        }

        let secs = self.highlight_resolved.timeout.as_secs();
        if secs == 0 || secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::Validation(format!(
                "highlight.timeout_secs must be between 1 and {MAX_TIMEOUT_SECS}"
            )));
        }

        for (alias, target) in &self.highlight_resolved.aliases {
            if alias.trim().is_empty() || target.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "highlight.aliases entries cannot be empty".to_owned(),
                ));
            }
        }

        Ok(())
    }
}

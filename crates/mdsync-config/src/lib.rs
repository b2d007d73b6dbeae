//! Configuration management for mdsync.
//!
//! Parses `mdsync.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "mdsync.toml";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the search root.
    pub root: Option<PathBuf>,
    /// Override the filename pattern.
    pub pattern: Option<String>,
    /// Override excluded directory names.
    pub exclude: Option<Vec<String>>,
    /// Override the artifact directory name.
    pub output_dir: Option<String>,
    /// Override the shared-output flag.
    pub common_output: Option<bool>,
    /// Override the artifact image format.
    pub format: Option<String>,
    /// Override the screenshot service URL.
    pub screenshot_url: Option<String>,
    /// Override the browser binary path.
    pub chromium: Option<PathBuf>,
}

/// Application configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Document discovery configuration.
    pub search: SearchConfig,
    /// Artifact placement configuration.
    pub output: OutputConfig,
    /// Rendering backend configuration.
    pub render: RenderConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Document discovery configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Root of the tree to search.
    pub root: PathBuf,
    /// Regex matched against each file's root-relative path.
    pub pattern: String,
    /// Directory names pruned during the walk.
    pub exclude: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            pattern: "README.md".to_owned(),
            exclude: Vec::new(),
        }
    }
}

/// Artifact placement configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Artifact directory name, relative to each document.
    pub dir: String,
    /// Share one artifact directory at the search root.
    pub common: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "docs".to_owned(),
            common: false,
        }
    }
}

/// Rendering backend configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Artifact image format: png, jpeg or svg.
    pub format: String,
    /// Screenshot service URL. When set, rendering goes over HTTP.
    pub screenshot_url: Option<String>,
    /// Browser binary path. Auto-detected when unset.
    pub chromium: Option<PathBuf>,
    /// Per-render timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: "png".to_owned(),
            screenshot_url: None,
            chromium: None,
            timeout_secs: 30,
        }
    }
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
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdsync.toml` in current directory and
    /// parents, falling back to defaults.
    ///
    /// CLI settings are applied after loading, so CLI arguments take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `config_path` doesn't exist, parsing
    /// fails, or the merged configuration is invalid.
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
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(root) = &settings.root {
            self.search.root.clone_from(root);
        }
        if let Some(pattern) = &settings.pattern {
            self.search.pattern.clone_from(pattern);
        }
        if let Some(exclude) = &settings.exclude {
            self.search.exclude.clone_from(exclude);
        }
        if let Some(dir) = &settings.output_dir {
            self.output.dir.clone_from(dir);
        }
        if let Some(common) = settings.common_output {
            self.output.common = common;
        }
        if let Some(format) = &settings.format {
            self.render.format.clone_from(format);
        }
        if let Some(url) = &settings.screenshot_url {
            self.render.screenshot_url = Some(url.clone());
        }
        if let Some(chromium) = &settings.chromium {
            self.render.chromium = Some(chromium.clone());
        }
    }

    /// Search for config file in current directory and parents.
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

    /// Load configuration from a specific file.
    ///
    /// A relative `search.root` is resolved against the config file's
    /// directory, so the config works from anywhere.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        if config.search.root.is_relative() {
            config.search.root = config_dir.join(&config.search.root);
        }
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate the merged configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.search.pattern, "search.pattern")?;
        require_non_empty(&self.output.dir, "output.dir")?;
        if !matches!(self.render.format.as_str(), "png" | "jpeg" | "jpg" | "svg") {
            return Err(ConfigError::Validation(format!(
                "render.format must be png, jpeg or svg, got '{}'",
                self.render.format
            )));
        }
        if let Some(url) = &self.render.screenshot_url {
            require_http_url(url, "render.screenshot_url")?;
        }
        Ok(())
    }
}

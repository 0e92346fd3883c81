//! Book configuration management for buku.
//!
//! Parses `book.yaml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! The configuration carries the ordered chapter list, book metadata
//! (title, author), and the source/template/output directory layout.
//! CLI settings can be applied during load via [`CliSettings`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "book.yaml";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the chapters source directory.
    pub chapters_dir: Option<PathBuf>,
    /// Override the templates directory.
    pub templates_dir: Option<PathBuf>,
    /// Override the build output directory.
    pub build_dir: Option<PathBuf>,
    /// Override whether chapter titles get a number prefix.
    pub prefix_numbers: Option<bool>,
}

/// Book configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Book metadata (title, author, etc.).
    pub book: BookMeta,
    /// Ordered chapter keys; each maps to `<chapters_dir>/<key>.md`.
    pub chapters: Vec<String>,
    /// Directory layout as written in YAML (relative strings).
    #[serde(default)]
    paths: PathsRaw,

    /// Resolved directory layout (set after loading).
    #[serde(skip)]
    pub paths_resolved: Paths,
    /// Whether chapter titles get an `N. ` prefix (set from CLI).
    #[serde(skip)]
    pub prefix_numbers: bool,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Book metadata from the `book` section.
#[derive(Debug, Deserialize)]
pub struct BookMeta {
    /// Book title. Required and non-empty.
    pub title: String,
    /// Author name.
    pub author: Option<String>,
    /// Short description shown on the cover.
    pub description: Option<String>,
    /// Content language code.
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".to_owned()
}

/// Raw directory layout as parsed from YAML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PathsRaw {
    chapters_dir: Option<String>,
    templates_dir: Option<String>,
    build_dir: Option<String>,
}

/// Resolved directory layout with absolute paths.
#[derive(Debug, Default, Clone)]
pub struct Paths {
    /// Directory containing chapter markdown sources.
    pub chapters_dir: PathBuf,
    /// Directory containing page templates.
    pub templates_dir: PathBuf,
    /// Build output directory.
    pub build_dir: PathBuf,
}

impl Paths {
    /// Static assets directory (`<templates_dir>/static`).
    #[must_use]
    pub fn static_dir(&self) -> PathBuf {
        self.templates_dir.join("static")
    }

    /// Source file for a chapter key (`<chapters_dir>/<key>.md`).
    #[must_use]
    pub fn chapter_source(&self, key: &str) -> PathBuf {
        self.chapters_dir.join(format!("{key}.md"))
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
    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise,
    /// searches for `book.yaml` in the current directory and parents.
    /// A build cannot proceed without chapter order and book metadata,
    /// so a missing config is fatal.
    ///
    /// CLI settings are applied after loading and path resolution, allowing
    /// CLI arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no config file exists, `Parse` if
    /// the YAML is malformed, or `Validation` if required values are missing.
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
            return Err(ConfigError::NotFound(PathBuf::from(CONFIG_FILENAME)));
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Parse configuration from a YAML string, resolving paths against `base`.
    ///
    /// # Errors
    ///
    /// Returns `Parse` for malformed YAML or `Validation` for invalid values.
    pub fn from_yaml(content: &str, base: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yaml::from_str(content)?;
        config.resolve_paths(base);
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(chapters_dir) = &settings.chapters_dir {
            self.paths_resolved.chapters_dir.clone_from(chapters_dir);
        }
        if let Some(templates_dir) = &settings.templates_dir {
            self.paths_resolved.templates_dir.clone_from(templates_dir);
        }
        if let Some(build_dir) = &settings.build_dir {
            self.paths_resolved.build_dir.clone_from(build_dir);
        }
        if let Some(prefix_numbers) = settings.prefix_numbers {
            self.prefix_numbers = prefix_numbers;
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

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::from_yaml(&content, config_dir)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.book.title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "book.title cannot be empty".to_owned(),
            ));
        }
        if self.chapters.is_empty() {
            return Err(ConfigError::Validation(
                "chapters list cannot be empty".to_owned(),
            ));
        }

        let mut seen = HashSet::new();
        for key in &self.chapters {
            if key.is_empty() {
                return Err(ConfigError::Validation(
                    "chapter keys cannot be empty".to_owned(),
                ));
            }
            if key.contains('/') || key.contains('\\') {
                return Err(ConfigError::Validation(format!(
                    "chapter key '{key}' cannot contain path separators"
                )));
            }
            if !seen.insert(key.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate chapter key '{key}'"
                )));
            }
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.paths_resolved = Paths {
            chapters_dir: resolve(self.paths.chapters_dir.as_deref(), "chapters"),
            templates_dir: resolve(self.paths.templates_dir.as_deref(), "templates"),
            build_dir: resolve(self.paths.build_dir.as_deref(), "build"),
        };
    }
}

//! Configuration file support for rbgg.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/rbgg/config.toml` (lowest priority)
//! - Project-local: `.rbgg.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

/// Name of the project-local config file.
const PROJECT_CONFIG: &str = ".rbgg.toml";

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Background estimation settings.
    pub flatten: FlattenConfig,
    /// Output settings.
    pub output: OutputConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
}

/// Background estimation configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct FlattenConfig {
    /// Window size as a percentage of `sqrt(width * height)`, in (0, 100].
    pub size: Option<f64>,
    /// Local percentile, in (0, 100].
    pub percentile: Option<f64>,
    /// Target brightness (0-255).
    pub target: Option<u8>,
    /// Sweep columns in parallel.
    pub parallel: Option<bool>,
}

/// Output configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for output images (default: next to each input).
    pub dir: Option<PathBuf>,
    /// Write the grayscale copy of each input.
    pub gray: Option<bool>,
    /// Report format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/rbgg/config.toml`
    /// 2. Project-local: `.rbgg.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are reported as
    /// warnings and dropped, so the built-in default applies instead.
    pub fn load() -> Self {
        let mut config = Self::default();

        // Load XDG config (lowest priority)
        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        // Load project-local config (higher priority, merged)
        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        for problem in config.sanitize() {
            eprintln!("warning: {problem}");
        }

        config
    }

    /// Drops out-of-range values, returning one message per dropped value.
    fn sanitize(&mut self) -> Vec<String> {
        let mut problems = Vec::new();

        if let Some(size) = self.flatten.size {
            if !is_percent(size) {
                problems.push(format!("flatten.size must be in (0, 100], got {size}"));
                self.flatten.size = None;
            }
        }
        if let Some(p) = self.flatten.percentile {
            if !is_percent(p) {
                problems.push(format!("flatten.percentile must be in (0, 100], got {p}"));
                self.flatten.percentile = None;
            }
        }
        if let Some(ref f) = self.output.format {
            if f != "json" && f != "jsonl" {
                problems.push(format!(
                    "output.format must be 'json' or 'jsonl', got '{f}'"
                ));
                self.output.format = None;
            }
        }

        problems
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        // General
        self.general.recursive = other.general.recursive.or(self.general.recursive);

        // Flatten
        self.flatten.size = other.flatten.size.or(self.flatten.size);
        self.flatten.percentile = other.flatten.percentile.or(self.flatten.percentile);
        self.flatten.target = other.flatten.target.or(self.flatten.target);
        self.flatten.parallel = other.flatten.parallel.or(self.flatten.parallel);

        // Output
        self.output.dir = other.output.dir.or_else(|| self.output.dir.take());
        self.output.gray = other.output.gray.or(self.output.gray);
        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);
    }
}

/// Percentages are accepted in (0, 100].
pub fn is_percent(value: f64) -> bool {
    value > 0.0 && value <= 100.0
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("rbgg").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.rbgg.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(PROJECT_CONFIG);
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}

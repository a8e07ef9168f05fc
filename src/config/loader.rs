//! Configuration loading and discovery for `texpack.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::TexpackConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "texpack.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse texpack.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override base output directory
    pub out: Option<PathBuf>,
    /// Override originals directory
    pub originals: Option<PathBuf>,
    /// Override originals extension
    pub original_ext: Option<String>,
    /// Override image extensions
    pub extensions: Option<Vec<String>>,
    /// Override recursive directory expansion
    pub recursive: Option<bool>,
    /// Number of parallel jobs
    pub jobs: Option<usize>,
}

/// Find texpack.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for texpack.toml
/// 2. Check XDG_CONFIG_HOME/texpack/texpack.toml (or ~/.config/texpack/texpack.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find texpack.toml in XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("texpack").join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find texpack.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a texpack.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the default
/// configuration.
pub fn load_config(path: Option<&Path>) -> Result<TexpackConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(default_config()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<TexpackConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let mut config: TexpackConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    // Relative paths in the file are relative to the file, not the caller
    if let Some(root) = project_root(path) {
        if let Some(dir) = config.output.dir.take() {
            config.output.dir = Some(resolve_path(root, &dir));
        }
        if let Some(dir) = config.originals.dir.take() {
            config.originals.dir = Some(resolve_path(root, &dir));
        }
    }

    tracing::debug!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

/// Default configuration used when no texpack.toml is found.
pub fn default_config() -> TexpackConfig {
    TexpackConfig::default()
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut TexpackConfig, overrides: &CliOverrides) {
    if let Some(ref out) = overrides.out {
        config.output.dir = Some(out.clone());
    }

    if let Some(ref originals) = overrides.originals {
        config.originals.dir = Some(originals.clone());
    }

    if let Some(ref ext) = overrides.original_ext {
        config.originals.extension = Some(ext.clone());
    }

    if let Some(ref extensions) = overrides.extensions {
        config.input.extensions = extensions.clone();
    }

    if let Some(recursive) = overrides.recursive {
        config.input.recursive = recursive;
    }

    if let Some(jobs) = overrides.jobs {
        config.pipeline.jobs = jobs;
    }
}

/// Get the directory containing a config file.
pub fn project_root(config_path: &Path) -> Option<&Path> {
    config_path.parent().filter(|p| !p.as_os_str().is_empty())
}

/// Resolve a path relative to a root directory.
///
/// If the path is absolute, returns it unchanged.
/// If relative, joins it with the root.
pub fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

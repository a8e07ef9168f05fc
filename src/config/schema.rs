//! Configuration schema types for `texpack.toml`
//!
//! Defines the structure and validation rules for texture pack repair runs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output layout section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Base output directory (defaults to the directory of the first input)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Subdirectory receiving two-color mask images
    #[serde(default = "default_masks_dir")]
    pub masks: String,
    /// Subdirectory receiving single-color images
    #[serde(default = "default_solid_color_dir")]
    pub solid_color: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: None, masks: default_masks_dir(), solid_color: default_solid_color_dir() }
    }
}

fn default_masks_dir() -> String {
    "masks".to_string()
}

fn default_solid_color_dir() -> String {
    "solid_color".to_string()
}

/// Input selection section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// File extensions treated as images (without the leading dot)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Descend into subdirectories when expanding a directory input
    #[serde(default)]
    pub recursive: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { extensions: default_extensions(), recursive: false }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["png".to_string()]
}

/// Where pre-upscale originals are found
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OriginalsConfig {
    /// Directory holding the originals under the same file names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Extension of the originals when it differs from the upscaled files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

/// Worker pool settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of worker threads (0 = available parallelism)
    #[serde(default)]
    pub jobs: usize,
}

/// External upscaler invocation
///
/// `{list}` and `{output}` in `args` are replaced by the image list file and
/// the output directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpscalerConfig {
    /// Program to run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    /// Argument template
    #[serde(default)]
    pub args: Vec<String>,
}

/// Complete texpack.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TexpackConfig {
    /// Output layout
    #[serde(default)]
    pub output: OutputConfig,
    /// Input selection
    #[serde(default)]
    pub input: InputConfig,
    /// Original lookup
    #[serde(default)]
    pub originals: OriginalsConfig,
    /// Worker pool
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// External upscaler
    #[serde(default)]
    pub upscaler: UpscalerConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "output.masks")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "texpack.toml: '{}' {}", self.field, self.message)
    }
}

/// A directory name must be a single, non-empty path component.
fn is_plain_dir_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(|c: char| c == '/' || c == '\\')
}

impl TexpackConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        for (field, name) in
            [("output.masks", &self.output.masks), ("output.solid_color", &self.output.solid_color)]
        {
            if !is_plain_dir_name(name) {
                errors.push(ConfigValidationError {
                    field: field.to_string(),
                    message: "must be a single directory name".to_string(),
                });
            }
        }

        if self.output.masks == self.output.solid_color {
            errors.push(ConfigValidationError {
                field: "output.solid_color".to_string(),
                message: "must differ from output.masks".to_string(),
            });
        }

        if self.input.extensions.is_empty() {
            errors.push(ConfigValidationError {
                field: "input.extensions".to_string(),
                message: "must contain at least one extension".to_string(),
            });
        }
        if self.input.extensions.iter().any(|e| e.trim_start_matches('.').is_empty()) {
            errors.push(ConfigValidationError {
                field: "input.extensions".to_string(),
                message: "must not contain empty extensions".to_string(),
            });
        }

        if self.upscaler.program.is_none() && !self.upscaler.args.is_empty() {
            errors.push(ConfigValidationError {
                field: "upscaler.program".to_string(),
                message: "is required when upscaler.args is set".to_string(),
            });
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Extensions without their leading dot, lowercased
    pub fn normalized_extensions(&self) -> Vec<String> {
        self.input
            .extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_parse() {
        let config: TexpackConfig = toml::from_str("").unwrap();
        assert_eq!(config.output.masks, "masks");
        assert_eq!(config.output.solid_color, "solid_color");
        assert_eq!(config.input.extensions, vec!["png"]);
        assert!(!config.input.recursive);
        assert_eq!(config.pipeline.jobs, 0);
        assert!(config.output.dir.is_none());
        assert!(config.is_valid());
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[output]
dir = "textures/out"
masks = "alpha"
solid_color = "flat"

[input]
extensions = ["png", ".TGA"]
recursive = true

[originals]
dir = "textures/dump"
extension = "bmp"

[pipeline]
jobs = 4

[upscaler]
program = "waifu2x"
args = ["-l", "{list}", "-o", "{output}"]
"#;
        let config: TexpackConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.output.dir, Some(PathBuf::from("textures/out")));
        assert_eq!(config.output.masks, "alpha");
        assert_eq!(config.output.solid_color, "flat");
        assert!(config.input.recursive);
        assert_eq!(config.normalized_extensions(), vec!["png", "tga"]);
        assert_eq!(config.originals.dir, Some(PathBuf::from("textures/dump")));
        assert_eq!(config.originals.extension.as_deref(), Some("bmp"));
        assert_eq!(config.pipeline.jobs, 4);
        assert_eq!(config.upscaler.program.as_deref(), Some("waifu2x"));
        assert_eq!(config.upscaler.args.len(), 4);
        assert!(config.is_valid());
    }

    #[test]
    fn test_validation_rejects_nested_dir_names() {
        let mut config = TexpackConfig::default();
        config.output.masks = "out/masks".to_string();
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "output.masks");
    }

    #[test]
    fn test_validation_rejects_same_dirs() {
        let mut config = TexpackConfig::default();
        config.output.solid_color = "masks".to_string();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "output.solid_color"));
    }

    #[test]
    fn test_validation_rejects_empty_extensions() {
        let mut config = TexpackConfig::default();
        config.input.extensions.clear();
        assert!(!config.is_valid());

        config.input.extensions = vec![".".to_string()];
        assert!(!config.is_valid());
    }

    #[test]
    fn test_validation_requires_program_for_args() {
        let mut config = TexpackConfig::default();
        config.upscaler.args = vec!["{list}".to_string()];
        let errors = config.validate();
        assert_eq!(errors[0].field, "upscaler.program");
        assert!(errors[0].to_string().contains("texpack.toml"));
    }
}

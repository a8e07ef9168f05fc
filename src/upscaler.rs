//! External upscaler invocation.
//!
//! The upscaler itself is a separate program; texpack only hands it an image
//! list and an output directory and waits for it to finish.

use crate::config::UpscalerConfig;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Placeholder replaced by the list file path.
pub const LIST_PLACEHOLDER: &str = "{list}";
/// Placeholder replaced by the output directory.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Error running the upscaler.
#[derive(Debug, Error)]
pub enum UpscaleError {
    /// No program configured
    #[error("No upscaler configured; set [upscaler] program in texpack.toml")]
    NotConfigured,
    /// Output directory could not be created
    #[error("Cannot create output directory '{path}': {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Program could not be started
    #[error("Failed to start upscaler '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    /// Program exited unsuccessfully
    #[error("Upscaler '{program}' exited with {status}")]
    Failed { program: String, status: String },
}

/// Runs an upscaler over a list of images.
pub trait UpscalerInvoker {
    /// Upscale every image in `list` into `output_dir`.
    fn upscale(&self, list: &Path, output_dir: &Path) -> Result<(), UpscaleError>;
}

/// Upscaler launched as a child process.
#[derive(Debug, Clone)]
pub struct CommandUpscaler {
    program: String,
    args: Vec<String>,
}

impl CommandUpscaler {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }

    /// Build from the `[upscaler]` config section.
    pub fn from_config(config: &UpscalerConfig) -> Result<Self, UpscaleError> {
        let program = config.program.clone().ok_or(UpscaleError::NotConfigured)?;
        Ok(Self::new(program, config.args.clone()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments with placeholders substituted.
    pub fn arguments(&self, list: &Path, output_dir: &Path) -> Vec<String> {
        let list = list.display().to_string();
        let output = output_dir.display().to_string();
        self.args
            .iter()
            .map(|arg| arg.replace(LIST_PLACEHOLDER, &list).replace(OUTPUT_PLACEHOLDER, &output))
            .collect()
    }
}

impl UpscalerInvoker for CommandUpscaler {
    fn upscale(&self, list: &Path, output_dir: &Path) -> Result<(), UpscaleError> {
        fs::create_dir_all(output_dir).map_err(|source| UpscaleError::OutputDir {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let args = self.arguments(list, output_dir);
        tracing::info!(program = %self.program, ?args, "Running upscaler");

        let status = Command::new(&self.program).args(&args).status().map_err(|source| {
            UpscaleError::Spawn { program: self.program.clone(), source }
        })?;

        if !status.success() {
            return Err(UpscaleError::Failed {
                program: self.program.clone(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

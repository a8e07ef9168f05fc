//! Error types shared by the classification and repair pipeline.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error raised while processing a single image or preparing a run.
///
/// Only [`PipelineError::Directory`] is fatal for a run; every other variant
/// is recorded against the item that produced it and the batch continues.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PipelineError {
    /// Missing, unreadable or unwritable file (including failed moves)
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Corrupt, unsupported or empty image data
    #[error("Failed to decode '{}': {message}", path.display())]
    Decode { path: PathBuf, message: String },
    /// The image could not be written back
    #[error("Failed to encode '{}': {message}", path.display())]
    Encode { path: PathBuf, message: String },
    /// Upscaled and original dimensions are not related by an integer factor
    #[error(
        "Dimension mismatch for '{}': {}x{} is not an integer upscale of {}x{}",
        path.display(), upscaled.0, upscaled.1, original.0, original.1
    )]
    DimensionMismatch { path: PathBuf, original: (u32, u32), upscaled: (u32, u32) },
    /// A required output directory could not be created or listed
    #[error("Output directory '{}' is unusable: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        PipelineError::Io { path: path.to_path_buf(), source }
    }

    pub(crate) fn decode(path: &Path, message: impl Into<String>) -> Self {
        PipelineError::Decode { path: path.to_path_buf(), message: message.into() }
    }

    pub(crate) fn encode(path: &Path, message: impl Into<String>) -> Self {
        PipelineError::Encode { path: path.to_path_buf(), message: message.into() }
    }

    pub(crate) fn directory(path: &Path, source: io::Error) -> Self {
        PipelineError::Directory { path: path.to_path_buf(), source }
    }

    /// Whether this error aborts the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PipelineError::Directory { .. })
    }

    /// Short machine-friendly name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Io { .. } => "io",
            PipelineError::Decode { .. } => "decode",
            PipelineError::Encode { .. } => "encode",
            PipelineError::DimensionMismatch { .. } => "dimension_mismatch",
            PipelineError::Directory { .. } => "directory",
        }
    }
}

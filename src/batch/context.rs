//! Batch context containing configuration and paths for a repair run.

use crate::classify::Classification;
use crate::config::TexpackConfig;
use std::path::{Path, PathBuf};

/// Default number of parallel jobs (uses available parallelism).
pub(crate) fn default_jobs() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Everything the orchestrator needs to know about a run.
///
/// The context is built explicitly by the caller; nothing is read from the
/// process environment once it exists.
#[derive(Debug, Clone)]
pub struct BatchContext {
    /// The loaded configuration
    config: TexpackConfig,
    /// Base output directory; unclassified images stay here
    output_dir: PathBuf,
    /// Worker count override
    jobs: Option<usize>,
}

impl BatchContext {
    /// Create a new batch context rooted at `output_dir`.
    pub fn new(config: TexpackConfig, output_dir: PathBuf) -> Self {
        Self { config, output_dir, jobs: None }
    }

    /// Get the configuration.
    pub fn config(&self) -> &TexpackConfig {
        &self.config
    }

    /// Base output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Directory owning mask images.
    pub fn masks_dir(&self) -> PathBuf {
        self.output_dir.join(&self.config.output.masks)
    }

    /// Directory owning solid-color images.
    pub fn solid_color_dir(&self) -> PathBuf {
        self.output_dir.join(&self.config.output.solid_color)
    }

    /// Directory a classified image is moved into, or `None` if it stays put.
    pub fn dir_for(&self, classification: Classification) -> Option<PathBuf> {
        match classification {
            Classification::SolidColor => Some(self.solid_color_dir()),
            Classification::Mask => Some(self.masks_dir()),
            Classification::Unclassified => None,
        }
    }

    /// Image extensions, normalized.
    pub fn extensions(&self) -> Vec<String> {
        self.config.normalized_extensions()
    }

    /// Number of worker threads (at least 1).
    pub fn jobs(&self) -> usize {
        let configured = self.jobs.unwrap_or(self.config.pipeline.jobs);
        if configured == 0 {
            default_jobs()
        } else {
            configured
        }
    }

    /// Set the number of worker threads.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs.max(1));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_config;

    #[test]
    fn test_batch_context_dirs() {
        let ctx = BatchContext::new(default_config(), PathBuf::from("/out"));

        assert_eq!(ctx.output_dir(), Path::new("/out"));
        assert_eq!(ctx.masks_dir(), PathBuf::from("/out/masks"));
        assert_eq!(ctx.solid_color_dir(), PathBuf::from("/out/solid_color"));
    }

    #[test]
    fn test_dir_for_classification() {
        let ctx = BatchContext::new(default_config(), PathBuf::from("/out"));

        assert_eq!(ctx.dir_for(Classification::Mask), Some(ctx.masks_dir()));
        assert_eq!(ctx.dir_for(Classification::SolidColor), Some(ctx.solid_color_dir()));
        assert_eq!(ctx.dir_for(Classification::Unclassified), None);
    }

    #[test]
    fn test_custom_dir_names() {
        let mut config = default_config();
        config.output.masks = "alpha".to_string();
        config.output.solid_color = "flat".to_string();
        let ctx = BatchContext::new(config, PathBuf::from("/out"));

        assert_eq!(ctx.masks_dir(), PathBuf::from("/out/alpha"));
        assert_eq!(ctx.solid_color_dir(), PathBuf::from("/out/flat"));
    }

    #[test]
    fn test_jobs() {
        let mut config = default_config();
        assert!(BatchContext::new(config.clone(), PathBuf::from("/out")).jobs() >= 1);

        config.pipeline.jobs = 3;
        let ctx = BatchContext::new(config, PathBuf::from("/out"));
        assert_eq!(ctx.jobs(), 3);
        assert_eq!(ctx.clone().with_jobs(6).jobs(), 6);
        assert_eq!(ctx.with_jobs(0).jobs(), 1);
    }
}

//! Repair pipeline orchestration.
//!
//! The pipeline moves a batch through a fixed sequence of stages:
//!
//! ```text
//! Init → DirectoriesReady → Classifying → ClassificationComplete → Repairing → Done
//!   └──────────────┴──────────── Failed (output directories unusable) ┘
//! ```
//!
//! Classification must finish for every image before any repair starts,
//! because repairs are planned from the final directory partition. The two
//! repair sweeps share one worker pool and run side by side.

use crate::batch::{
    discover_images, has_extension, BatchContext, CancelToken, ItemResult, RunReport, Step,
    WorkerPool,
};
use crate::classify::{classify, Classification};
use crate::error::PipelineError;
use crate::image_access::{ImageAccess, ImageAsset};
use crate::mask::fix_mask;
use crate::originals::OriginalLocator;
use crate::solid::remap_solid_color;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

/// Stage of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Init,
    DirectoriesReady,
    Classifying,
    ClassificationComplete,
    Repairing,
    Done,
    /// Terminal state after a fatal error
    Failed,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineStage::Init => "init",
            PipelineStage::DirectoriesReady => "directories ready",
            PipelineStage::Classifying => "classifying",
            PipelineStage::ClassificationComplete => "classification complete",
            PipelineStage::Repairing => "repairing",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Directory partition after classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// Files currently in the masks directory
    pub masks: Vec<PathBuf>,
    /// Files currently in the solid-color directory
    pub solid_color: Vec<PathBuf>,
}

/// One repair unit, derived from the directory a file sits in.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RepairTask {
    Mask(PathBuf),
    SolidColor(PathBuf),
}

impl RepairTask {
    fn path(&self) -> &Path {
        match self {
            RepairTask::Mask(p) | RepairTask::SolidColor(p) => p,
        }
    }

    fn step(&self) -> Step {
        match self {
            RepairTask::Mask(_) => Step::MaskRepair,
            RepairTask::SolidColor(_) => Step::SolidColorRepair,
        }
    }
}

/// Classification and repair orchestrator.
pub struct Pipeline {
    /// Paths and settings
    context: BatchContext,
    /// Image decode/encode capability
    access: Box<dyn ImageAccess>,
    /// Upscaled → original path convention
    locator: Box<dyn OriginalLocator>,
    /// Stops dispatch of new work
    cancel: CancelToken,
    /// Current stage
    stage: PipelineStage,
}

impl Pipeline {
    /// Create a new pipeline.
    pub fn new(
        context: BatchContext,
        access: Box<dyn ImageAccess>,
        locator: Box<dyn OriginalLocator>,
    ) -> Self {
        Self { context, access, locator, cancel: CancelToken::new(), stage: PipelineStage::Init }
    }

    /// Share a cancellation token with the pipeline.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Handle that cancels this pipeline.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Get the batch context.
    pub fn context(&self) -> &BatchContext {
        &self.context
    }

    /// Current stage.
    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    fn transition(&mut self, stage: PipelineStage) {
        tracing::debug!(from = %self.stage, to = %stage, "Pipeline stage change");
        self.stage = stage;
    }

    fn pool(&self) -> WorkerPool {
        WorkerPool::new(self.context.jobs()).with_cancel(self.cancel.clone())
    }

    /// Run classification and both repair sweeps over `inputs`.
    ///
    /// Per-image failures are recorded in the report and never abort the run;
    /// only unusable output directories do.
    pub fn run(&mut self, inputs: &[PathBuf]) -> Result<RunReport, PipelineError> {
        let start = Instant::now();
        let mut report = self.classify_batch(inputs)?;

        let partition = self.fail_on_error(|p| p.collect_partition())?;
        tracing::info!(
            masks = partition.masks.len(),
            solid_color = partition.solid_color.len(),
            "Classification complete"
        );

        self.transition(PipelineStage::Repairing);
        for result in self.repair(&partition) {
            report.add_result(result);
        }
        self.transition(PipelineStage::Done);

        report.cancelled = self.cancel.is_cancelled();
        report.total_duration = start.elapsed();
        Ok(report)
    }

    /// Prepare directories and classify `inputs`, without repairing.
    ///
    /// Leaves the pipeline in [`PipelineStage::ClassificationComplete`].
    pub fn classify_batch(&mut self, inputs: &[PathBuf]) -> Result<RunReport, PipelineError> {
        let start = Instant::now();
        self.transition(PipelineStage::Init);
        self.fail_on_error(|p| p.prepare_directories())?;
        self.transition(PipelineStage::DirectoriesReady);

        self.transition(PipelineStage::Classifying);
        tracing::info!(images = inputs.len(), jobs = self.context.jobs(), "Classifying images");

        let mut report = RunReport::new();
        let claimed = Mutex::new(HashSet::new());
        let results = self.pool().run(inputs, |path| self.classify_one(path, &claimed));
        for (path, result) in inputs.iter().zip(results) {
            report.add_result(
                result.unwrap_or_else(|| ItemResult::cancelled(path.clone(), Step::Classify)),
            );
        }
        self.transition(PipelineStage::ClassificationComplete);

        report.cancelled = self.cancel.is_cancelled();
        report.total_duration = start.elapsed();
        Ok(report)
    }

    /// Run `op`, moving to [`PipelineStage::Failed`] if it errors.
    fn fail_on_error<T>(
        &mut self,
        op: impl FnOnce(&Self) -> Result<T, PipelineError>,
    ) -> Result<T, PipelineError> {
        let result = op(&*self);
        if let Err(e) = &result {
            tracing::error!(error = %e, "Pipeline aborted");
            self.transition(PipelineStage::Failed);
        }
        result
    }

    /// Ensure the masks and solid-color directories exist.
    ///
    /// Existing directories are left alone.
    pub fn prepare_directories(&self) -> Result<(), PipelineError> {
        for dir in [self.context.masks_dir(), self.context.solid_color_dir()] {
            if dir.is_dir() {
                tracing::debug!(path = %dir.display(), "Output directory already exists");
                continue;
            }
            fs::create_dir_all(&dir).map_err(|e| PipelineError::directory(&dir, e))?;
            tracing::debug!(path = %dir.display(), "Created output directory");
        }
        Ok(())
    }

    /// List what the masks and solid-color directories contain right now.
    pub fn collect_partition(&self) -> Result<Partition, PipelineError> {
        let extensions = self.context.extensions();
        let list = |dir: PathBuf| {
            discover_images(&dir, &extensions, false).map_err(|e| {
                let source = match e {
                    crate::batch::DiscoveryError::Io(source) => source,
                    other => io::Error::new(io::ErrorKind::Other, other.to_string()),
                };
                PipelineError::directory(&dir, source)
            })
        };
        Ok(Partition {
            masks: list(self.context.masks_dir())?,
            solid_color: list(self.context.solid_color_dir())?,
        })
    }

    fn classify_one(&self, path: &Path, claimed: &Mutex<HashSet<PathBuf>>) -> ItemResult {
        let start = Instant::now();
        match self.classify_and_move(path, claimed) {
            Ok(classification) => {
                tracing::debug!(path = %path.display(), %classification, "Classified");
                ItemResult::done(path.to_path_buf(), Step::Classify, start.elapsed())
                    .with_classification(classification)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping image");
                ItemResult::failed(path.to_path_buf(), Step::Classify, &e, start.elapsed())
            }
        }
    }

    fn classify_and_move(
        &self,
        path: &Path,
        claimed: &Mutex<HashSet<PathBuf>>,
    ) -> Result<Classification, PipelineError> {
        // The repair sweep only re-lists configured extensions
        let extensions = self.context.extensions();
        if !has_extension(path, &extensions) {
            let message = format!(
                "extension is not one of the configured image types ({})",
                extensions.join(", ")
            );
            return Err(PipelineError::decode(path, message));
        }

        let classification = {
            let asset = ImageAsset::load(self.access.as_ref(), path)?;
            classify(&asset)?
        };

        if let Some(dir) = self.context.dir_for(classification) {
            let name = path.file_name().ok_or_else(|| {
                PipelineError::io(path, io::Error::new(io::ErrorKind::InvalidInput, "no file name"))
            })?;
            let target = dir.join(name);
            if is_same_file(path, &target) {
                return Ok(classification);
            }
            self.claim_target(path, &target, claimed)?;
            fs::rename(path, &target).map_err(|e| PipelineError::io(path, e))?;
        }
        Ok(classification)
    }

    /// Reserve `target` for `path`, refusing to replace another image.
    fn claim_target(
        &self,
        path: &Path,
        target: &Path,
        claimed: &Mutex<HashSet<PathBuf>>,
    ) -> Result<(), PipelineError> {
        let mut claimed = claimed.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if target.exists() || !claimed.insert(target.to_path_buf()) {
            return Err(PipelineError::io(
                path,
                io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("'{}' already exists", target.display()),
                ),
            ));
        }
        Ok(())
    }

    /// Repair every file in `partition`; masks and solid colors interleave.
    fn repair(&self, partition: &Partition) -> Vec<ItemResult> {
        let tasks: Vec<RepairTask> = partition
            .masks
            .iter()
            .cloned()
            .map(RepairTask::Mask)
            .chain(partition.solid_color.iter().cloned().map(RepairTask::SolidColor))
            .collect();

        let results = self.pool().run(&tasks, |task| self.repair_one(task));
        tasks
            .iter()
            .zip(results)
            .map(|(task, result)| {
                result.unwrap_or_else(|| ItemResult::cancelled(task.path().to_path_buf(), task.step()))
            })
            .collect()
    }

    fn repair_one(&self, task: &RepairTask) -> ItemResult {
        let start = Instant::now();
        let outcome = match task {
            RepairTask::Mask(path) => self.repair_mask(path),
            RepairTask::SolidColor(path) => self.repair_solid_color(path),
        };

        let path = task.path().to_path_buf();
        match outcome {
            Ok(()) => {
                tracing::debug!(path = %path.display(), step = %task.step(), "Repaired");
                ItemResult::done(path, task.step(), start.elapsed())
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Repair skipped");
                ItemResult::failed(path, task.step(), &e, start.elapsed())
            }
        }
    }

    fn repair_mask(&self, path: &Path) -> Result<(), PipelineError> {
        let asset = ImageAsset::load(self.access.as_ref(), path)?;
        let fixed = fix_mask(asset.image());
        self.access.encode(path, &fixed)
    }

    fn repair_solid_color(&self, path: &Path) -> Result<(), PipelineError> {
        let original_path = self.locator.locate(path).ok_or_else(|| {
            PipelineError::io(
                path,
                io::Error::new(io::ErrorKind::NotFound, "no original known for this image"),
            )
        })?;

        let original = ImageAsset::load(self.access.as_ref(), &original_path)?;
        let upscaled = ImageAsset::load(self.access.as_ref(), path)?;
        let remapped = remap_solid_color(&original, &upscaled)?;
        self.access.encode(path, &remapped)
    }
}

/// Both paths name the same existing file (an input already in its bucket).
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

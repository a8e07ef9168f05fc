//! Run result types.
//!
//! Every unit of work (one classification or one repair of one file) yields
//! an [`ItemResult`]; the run collects them into a [`RunReport`] whose
//! summary lists every skipped item with its reason.

use crate::classify::Classification;
use crate::error::PipelineError;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Pipeline step an item result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Histogram classification and move
    Classify,
    /// Alpha reconstruction of a mask
    MaskRepair,
    /// Ground-truth remap of a solid-color image
    SolidColorRepair,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Classify => write!(f, "classify"),
            Step::MaskRepair => write!(f, "mask repair"),
            Step::SolidColorRepair => write!(f, "solid color repair"),
        }
    }
}

/// Outcome of a single unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ItemStatus {
    /// Completed
    Done,
    /// Failed; the file was left where it was
    Failed(String),
    /// Never dispatched because the run was cancelled
    Cancelled,
}

impl ItemStatus {
    pub fn is_done(&self) -> bool {
        matches!(self, ItemStatus::Done)
    }

    /// Failed or cancelled
    pub fn is_skipped(&self) -> bool {
        !self.is_done()
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemStatus::Done => write!(f, "done"),
            ItemStatus::Failed(reason) => write!(f, "{}", reason),
            ItemStatus::Cancelled => write!(f, "cancelled before processing"),
        }
    }
}

/// Result of one unit of work.
#[derive(Debug, Clone, Serialize)]
pub struct ItemResult {
    /// File the unit worked on (its location when the unit started)
    pub path: PathBuf,
    /// Pipeline step
    pub step: Step,
    /// Outcome
    #[serde(flatten)]
    pub status: ItemStatus,
    /// Bucket assigned by a successful classification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    /// Error kind for failures (see [`PipelineError::kind`])
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    /// Processing time
    #[serde(skip)]
    pub duration: Duration,
}

impl ItemResult {
    /// Create a successful result.
    pub fn done(path: PathBuf, step: Step, duration: Duration) -> Self {
        Self { path, step, status: ItemStatus::Done, classification: None, error_kind: None, duration }
    }

    /// Create a failed result from the error that caused it.
    pub fn failed(path: PathBuf, step: Step, error: &PipelineError, duration: Duration) -> Self {
        Self {
            path,
            step,
            status: ItemStatus::Failed(error.to_string()),
            classification: None,
            error_kind: Some(error.kind()),
            duration,
        }
    }

    /// Create a result for an item that was never dispatched.
    pub fn cancelled(path: PathBuf, step: Step) -> Self {
        Self {
            path,
            step,
            status: ItemStatus::Cancelled,
            classification: None,
            error_kind: None,
            duration: Duration::ZERO,
        }
    }

    /// Attach the classification.
    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classification = Some(classification);
        self
    }

    pub fn is_done(&self) -> bool {
        self.status.is_done()
    }
}

/// Result of a complete run.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    /// Results for each unit of work, classification first
    pub items: Vec<ItemResult>,
    /// Whether cancellation was requested during the run
    pub cancelled: bool,
    /// Total run duration
    #[serde(skip)]
    pub total_duration: Duration,
}

impl RunReport {
    /// Create a new empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item result.
    pub fn add_result(&mut self, result: ItemResult) {
        self.items.push(result);
    }

    /// Results of one step.
    pub fn step(&self, step: Step) -> impl Iterator<Item = &ItemResult> {
        self.items.iter().filter(move |r| r.step == step)
    }

    /// Number of images classified into `classification`.
    pub fn classified_count(&self, classification: Classification) -> usize {
        self.step(Step::Classify).filter(|r| r.classification == Some(classification)).count()
    }

    /// Number of successful repairs in a step.
    pub fn repaired_count(&self, step: Step) -> usize {
        self.step(step).filter(|r| r.is_done()).count()
    }

    /// Failed or cancelled items.
    pub fn skipped(&self) -> Vec<&ItemResult> {
        self.items.iter().filter(|r| r.status.is_skipped()).collect()
    }

    /// Number of failed or cancelled items.
    pub fn skipped_count(&self) -> usize {
        self.items.iter().filter(|r| r.status.is_skipped()).count()
    }

    /// Check if every unit completed.
    pub fn is_success(&self) -> bool {
        self.skipped_count() == 0
    }

    /// Format a summary of the run.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();

        let classified = self.step(Step::Classify).count();
        lines.push(format!(
            "Classified {} images: {} masks, {} solid color, {} unclassified",
            classified,
            self.classified_count(Classification::Mask),
            self.classified_count(Classification::SolidColor),
            self.classified_count(Classification::Unclassified),
        ));
        lines.push(format!(
            "Repaired {} masks and {} solid color images in {:?}",
            self.repaired_count(Step::MaskRepair),
            self.repaired_count(Step::SolidColorRepair),
            self.total_duration,
        ));
        if self.cancelled {
            lines.push("Run was cancelled; remaining items were not processed".to_string());
        }

        let skipped = self.skipped();
        if !skipped.is_empty() {
            lines.push(format!("Skipped {} items:", skipped.len()));
            for item in skipped {
                lines.push(format!("  - {} ({}): {}", item.path.display(), item.step, item.status));
            }
        }

        lines.join("\n")
    }
}

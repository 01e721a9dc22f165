//! Progress reporting for an analysis run.
//!
//! # Example
//!
//! ```rust,ignore
//! use food_imports::Analysis;
//!
//! let report = Analysis::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run(df)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of an analysis run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStage {
    /// Reading the CSV file
    Loading,
    /// Trimming headers, dropping malformed rows
    Cleaning,
    /// Overview and correlation matrix
    Profiling,
    /// Yearly totals, rankings and trends
    Aggregating,
    /// Price-per-unit derivation
    Deriving,
    /// Writing chart files
    Rendering,
    /// Run completed successfully
    Complete,
    /// Run failed with an error
    Failed,
}

impl AnalysisStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Data",
            Self::Cleaning => "Cleaning Data",
            Self::Profiling => "Profiling Dataset",
            Self::Aggregating => "Aggregating Imports",
            Self::Deriving => "Deriving Price per Unit",
            Self::Rendering => "Rendering Charts",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of the whole run taken by this stage (0.0 - 1.0).
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.10,
            Self::Cleaning => 0.15,
            Self::Profiling => 0.10,
            Self::Aggregating => 0.30,
            Self::Deriving => 0.10,
            Self::Rendering => 0.25,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Returns the cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::Cleaning => 0.10,
            Self::Profiling => 0.25,
            Self::Aggregating => 0.35,
            Self::Deriving => 0.65,
            Self::Rendering => 0.75,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// A single progress notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current stage
    pub stage: AnalysisStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within the current stage (0.0 - 1.0)
    pub stage_progress: f32,

    /// Human-readable message describing current activity
    pub message: String,
}

impl ProgressUpdate {
    pub fn new(stage: AnalysisStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: AnalysisStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: AnalysisStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
        }
    }
}

/// Receives progress updates from [`Analysis`](crate::Analysis).
///
/// Implementations must be `Send + Sync` so a run can be moved to a worker
/// thread while updates go elsewhere.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// [`ProgressReporter`] backed by a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const RUN_STAGES: [AnalysisStage; 6] = [
        AnalysisStage::Loading,
        AnalysisStage::Cleaning,
        AnalysisStage::Profiling,
        AnalysisStage::Aggregating,
        AnalysisStage::Deriving,
        AnalysisStage::Rendering,
    ];

    #[test]
    fn test_weights_sum_to_one() {
        let total: f32 = RUN_STAGES.iter().map(|s| s.weight()).sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_base_progress_is_cumulative() {
        let mut expected = 0.0f32;
        for stage in RUN_STAGES {
            assert!((stage.base_progress() - expected).abs() < 1e-6, "{:?}", stage);
            expected += stage.weight();
        }
        assert!((AnalysisStage::Complete.base_progress() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_progress_update_clamps() {
        let update = ProgressUpdate::new(AnalysisStage::Rendering, 2.0, "done");
        assert_eq!(update.stage_progress, 1.0);
        assert!(update.progress <= 1.0);

        let start = ProgressUpdate::new(AnalysisStage::Cleaning, 0.0, "start");
        assert!((start.progress - 0.10).abs() < 1e-6);
    }

    #[test]
    fn test_terminal_updates() {
        assert_eq!(ProgressUpdate::complete("ok").progress, 1.0);
        let failed = ProgressUpdate::failed("boom");
        assert_eq!(failed.stage, AnalysisStage::Failed);
        assert_eq!(failed.message, "boom");
    }

    #[test]
    fn test_closure_reporter() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let reporter = ClosureProgressReporter::new(move |u: ProgressUpdate| {
            sink.lock().unwrap().push(u.stage);
        });

        reporter.report(ProgressUpdate::new(AnalysisStage::Loading, 0.0, "load"));
        reporter.report(ProgressUpdate::complete("done"));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![AnalysisStage::Loading, AnalysisStage::Complete]
        );
    }

    #[test]
    fn test_stage_serializes_snake_case() {
        let json = serde_json::to_string(&AnalysisStage::Aggregating).unwrap();
        assert_eq!(json, "\"aggregating\"");
    }
}

//! Pipeline module.
//!
//! This module provides the end-to-end analysis run and its progress types.

mod builder;
pub mod progress;

pub use builder::{Analysis, AnalysisBuilder};
pub use progress::{AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate};

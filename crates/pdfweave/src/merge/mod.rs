//! Merge planning and execution.
//!
//! - [`planner`] decides, per set, which pages go where.
//! - [`pages`] copies pages from decoded sources into an output document.
//! - [`merger`] walks the sets and drives both.

pub mod merger;
pub mod pages;
pub mod planner;

pub use merger::{
    MergeResult, MergeStatistics, MergedDocument, Merger, NoProgress, ProgressObserver,
};
pub use pages::OutputDocument;
pub use planner::{CopyOp, SetShape, plan_set};

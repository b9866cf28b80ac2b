//! Merge run state machine.
//!
//! ```text
//! idle -> processing -> completed
//!              \------> error
//! ```
//!
//! A new run may start from any state except `processing`; resetting is
//! likewise refused while a run is in flight.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WeaveError};

/// Progress reported once the inputs have been checked.
pub const SETUP_PROGRESS: u8 = 10;

/// Progress of a finished run.
pub const COMPLETE_PROGRESS: u8 = 100;

/// Share of the progress range the per-set merge steps cover.
const MERGE_SPAN: usize = 80;

/// Phase of a merge run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Nothing has run yet, or the session was reset.
    #[default]
    Idle,
    /// A run is in flight.
    Processing,
    /// The last run delivered its output.
    Completed,
    /// The last run failed.
    Error,
}

/// Observable state of the current or last merge run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MergeRunState {
    /// Current phase.
    pub status: RunStatus,
    /// Progress in percent, `0..=100`.
    pub progress: u8,
    /// Human-readable failure reason, set only in [`RunStatus::Error`].
    pub error_message: Option<String>,
}

impl MergeRunState {
    /// Whether a run is in flight.
    pub fn is_processing(&self) -> bool {
        self.status == RunStatus::Processing
    }

    /// Enter `processing` with the setup progress.
    ///
    /// # Errors
    ///
    /// Returns [`WeaveError::RunInProgress`] if a run is already processing.
    pub fn begin(&mut self) -> Result<()> {
        if self.is_processing() {
            return Err(WeaveError::RunInProgress);
        }
        self.status = RunStatus::Processing;
        self.progress = SETUP_PROGRESS;
        self.error_message = None;
        Ok(())
    }

    /// Record progress reported during processing. Progress never moves back.
    pub fn advance(&mut self, progress: u8) {
        if self.is_processing() {
            self.progress = self.progress.max(progress.min(COMPLETE_PROGRESS));
        }
    }

    /// Enter `completed`.
    pub fn complete(&mut self) {
        self.status = RunStatus::Completed;
        self.progress = COMPLETE_PROGRESS;
        self.error_message = None;
    }

    /// Enter `error`, keeping the last reported progress.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = RunStatus::Error;
        self.error_message = Some(message.into());
    }

    /// Back to `idle` with zero progress.
    ///
    /// # Errors
    ///
    /// Returns [`WeaveError::RunInProgress`] while a run is processing.
    pub fn reset(&mut self) -> Result<()> {
        if self.is_processing() {
            return Err(WeaveError::RunInProgress);
        }
        *self = Self::default();
        Ok(())
    }
}

/// Progress after the set at zero-based `index` of `total` has been merged:
/// `10 + round((index + 1) / total * 80)`.
///
/// Returns [`SETUP_PROGRESS`] when `total` is zero.
pub fn set_progress(index: usize, total: usize) -> u8 {
    if total == 0 {
        return SETUP_PROGRESS;
    }
    let done = (index + 1).min(total);
    let scaled = (2 * MERGE_SPAN * done + total) / (2 * total);
    SETUP_PROGRESS + scaled as u8
}

//! Progress bar driven by merge run updates.

use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, IsTerminal};

use pdfweave::ProgressObserver;
use pdfweave::state::RunStatus;

const TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}";

/// Renders run progress on stderr.
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Progress bar on stderr, hidden when stderr is not a terminal.
    pub fn auto() -> Self {
        if io::stderr().is_terminal() {
            Self::visible()
        } else {
            Self::hidden()
        }
    }

    /// A progress bar that is always drawn.
    pub fn visible() -> Self {
        let style = ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        let bar = ProgressBar::new(100).with_style(style);
        Self { bar }
    }

    /// A progress bar that draws nothing.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Last reported progress in percent.
    #[cfg(test)]
    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl ProgressObserver for ProgressReporter {
    fn on_progress(&mut self, progress: u8, status: RunStatus) {
        self.bar.set_position(u64::from(progress));
        match status {
            RunStatus::Idle => {}
            RunStatus::Processing => self.bar.set_message("merging"),
            RunStatus::Completed => self.bar.finish_with_message("done"),
            RunStatus::Error => self.bar.abandon_with_message("failed"),
        }
    }
}

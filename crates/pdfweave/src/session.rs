//! A merge session: selections, destination and run state in one place.
//!
//! # Examples
//!
//! ```no_run
//! use pdfweave::{Config, NoProgress, Session, Slot};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = Session::new(Config::default())?;
//! session.select_paths(Slot::A, ["covers/*.pdf"])?;
//! session.select_paths(Slot::B, ["bodies/*.pdf"])?;
//! session.select_destination("out").await?;
//!
//! let outcome = session.run(&mut NoProgress).await?;
//! for file in &outcome.files {
//!     println!("{} ({} pages)", file.name, file.page_count);
//! }
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::merge::{MergeStatistics, Merger, ProgressObserver};
use crate::registry::{DocumentSource, Slot, SourceRegistry, SourceSlot};
use crate::sink::naming::{self, UniqueNames};
use crate::sink::{Delivery, DownloadsRetriever, OutputDestination, OutputSink, Retriever};
use crate::state::{COMPLETE_PROGRESS, MergeRunState, RunStatus, SETUP_PROGRESS};

/// Error message recorded when a run is dropped before it finishes.
pub const CANCELLED_MESSAGE: &str = "The merge run was cancelled.";

/// One delivered output file.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveredFile {
    /// Output file name.
    pub name: String,
    /// Set the file was built from; `None` for a combined output.
    pub set_index: Option<usize>,
    /// Number of pages in the file.
    pub page_count: usize,
    /// Size of the file in bytes.
    pub size: u64,
    /// Where the file went.
    pub delivery: Delivery,
}

/// Result of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    /// Delivered files, in set order.
    pub files: Vec<DeliveredFile>,
    /// Statistics about the merge.
    pub statistics: MergeStatistics,
}

/// Updates the run state before passing progress on.
struct Tracked<'a> {
    state: &'a mut MergeRunState,
    inner: &'a mut dyn ProgressObserver,
}

impl ProgressObserver for Tracked<'_> {
    fn on_progress(&mut self, progress: u8, status: RunStatus) {
        self.state.advance(progress);
        self.inner.on_progress(self.state.progress, status);
    }
}

/// Owns everything one merge front end works with.
#[derive(Debug)]
pub struct Session {
    config: Config,
    registry: SourceRegistry,
    destination: Option<OutputDestination>,
    retriever: Arc<dyn Retriever>,
    state: MergeRunState,
}

impl Session {
    /// Create a session that offers files through the downloads directory.
    ///
    /// # Errors
    ///
    /// Returns `WeaveError::InvalidConfig` if `config` does not validate.
    pub fn new(config: Config) -> Result<Self> {
        let retriever = match &config.downloads_dir {
            Some(dir) => DownloadsRetriever::new(dir),
            None => DownloadsRetriever::user_downloads(),
        };
        Self::with_retriever(config, Arc::new(retriever))
    }

    /// Create a session with a custom retrieval fallback.
    ///
    /// # Errors
    ///
    /// Returns `WeaveError::InvalidConfig` if `config` does not validate.
    pub fn with_retriever(config: Config, retriever: Arc<dyn Retriever>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry: SourceRegistry::new(),
            destination: None,
            retriever,
            state: MergeRunState::default(),
        })
    }

    /// Session configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The three slots.
    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Selected destination, if any.
    pub fn destination(&self) -> Option<&OutputDestination> {
        self.destination.as_ref()
    }

    /// Current run state.
    pub fn state(&self) -> &MergeRunState {
        &self.state
    }

    /// Change the label of a slot.
    pub fn set_label(&mut self, slot: Slot, label: impl Into<String>) {
        self.registry.set_label(slot, label);
    }

    /// Replace a slot's selection; see [`SourceRegistry::select_sources`].
    pub fn select_sources<I>(&mut self, slot: Slot, raw: I) -> &SourceSlot
    where
        I: IntoIterator<Item = DocumentSource>,
    {
        self.registry.select_sources(slot, raw)
    }

    /// Replace a slot's selection from glob patterns.
    ///
    /// # Errors
    ///
    /// Returns `WeaveError::InvalidConfig` for a malformed pattern.
    pub fn select_paths<T>(&mut self, slot: Slot, patterns: T) -> Result<&SourceSlot>
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        self.registry.select_paths(slot, patterns)
    }

    /// Pick a persistent destination directory.
    ///
    /// On failure the previous destination, if any, stays in place.
    ///
    /// # Errors
    ///
    /// Returns `WeaveError::CapabilityUnsupported` if the directory cannot
    /// be used; this does not affect merging.
    pub async fn select_destination(
        &mut self,
        dir: impl Into<PathBuf>,
    ) -> Result<&OutputDestination> {
        let destination = match OutputDestination::select(dir).await {
            Ok(destination) => destination,
            Err(err) => {
                tracing::warn!(error = %err, "destination unavailable, keeping previous choice");
                return Err(err);
            }
        };
        Ok(self.destination.insert(destination))
    }

    /// Whether a run could start now.
    pub fn can_run(&self) -> bool {
        !self.registry.is_empty() && !self.state.is_processing()
    }

    /// Merge every set and deliver the result.
    ///
    /// The observer sees progress 10 once the run starts, an update after
    /// each set, and 100 after delivery. On failure it sees the error status
    /// at the last reported progress. If one of several outputs cannot be
    /// delivered, the ones already delivered are withdrawn again. Dropping
    /// the returned future mid-run leaves the state as `error`.
    ///
    /// # Errors
    ///
    /// - `WeaveError::RunInProgress` if a run is already processing; the
    ///   state is left untouched.
    /// - `WeaveError::NoInput` if every slot is empty.
    /// - Any fatal merge or retrieval error. The state records the message.
    pub async fn run(&mut self, observer: &mut dyn ProgressObserver) -> Result<RunOutcome> {
        self.state.begin()?;
        observer.on_progress(SETUP_PROGRESS, RunStatus::Processing);
        tracing::info!(sets = self.registry.max_set_count(), "merge run started");

        let sink = OutputSink::new(self.destination.clone(), Arc::clone(&self.retriever));
        let mut guard = RunGuard {
            state: &mut self.state,
        };
        let result = execute(
            &self.config,
            &self.registry,
            &sink,
            &mut *guard.state,
            observer,
        )
        .await;

        match &result {
            Ok(outcome) => {
                guard.state.complete();
                observer.on_progress(COMPLETE_PROGRESS, RunStatus::Completed);
                tracing::info!(files = outcome.files.len(), "merge run completed");
            }
            Err(err) => {
                guard.state.fail(err.to_string());
                observer.on_progress(guard.state.progress, RunStatus::Error);
                tracing::error!(error = %err, "merge run failed");
            }
        }

        result
    }

    /// Clear every selection, the destination and the run state.
    ///
    /// # Errors
    ///
    /// Returns `WeaveError::RunInProgress` while a run is processing.
    pub fn reset(&mut self) -> Result<()> {
        self.state.reset()?;
        self.registry.clear();
        self.destination = None;
        tracing::debug!("session reset");
        Ok(())
    }
}

/// Fails the run if it is dropped while still processing.
struct RunGuard<'a> {
    state: &'a mut MergeRunState,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if self.state.is_processing() {
            self.state.fail(CANCELLED_MESSAGE);
            tracing::warn!("merge run cancelled");
        }
    }
}

async fn execute(
    config: &Config,
    registry: &SourceRegistry,
    sink: &OutputSink,
    state: &mut MergeRunState,
    observer: &mut dyn ProgressObserver,
) -> Result<RunOutcome> {
    let merger = Merger::with_mode(config.output_mode);
    let mut tracked = Tracked {
        state,
        inner: observer,
    };
    let merged = merger.merge(registry, &mut tracked).await?;

    let today = naming::today();
    let mut names = UniqueNames::new();
    let mut files = Vec::with_capacity(merged.documents.len());

    for document in merged.documents {
        let first = match document.set_index {
            Some(index) => registry.set(index).first(),
            None => registry.first_source(),
        };
        let name = names.claim(&naming::output_name(first, &config.naming, today));
        let size = document.bytes.len() as u64;

        let delivery = match sink.deliver(&name, document.bytes).await {
            Ok(delivery) => delivery,
            Err(err) => {
                withdraw_all(sink, &files).await;
                return Err(err);
            }
        };

        files.push(DeliveredFile {
            name,
            set_index: document.set_index,
            page_count: document.page_count,
            size,
            delivery,
        });
    }

    Ok(RunOutcome {
        files,
        statistics: merged.statistics,
    })
}

/// Take back files delivered earlier in a run that then failed.
async fn withdraw_all(sink: &OutputSink, files: &[DeliveredFile]) {
    for file in files {
        if let Err(err) = sink.withdraw(&file.name, &file.delivery).await {
            tracing::warn!(file = %file.name, error = %err, "could not withdraw delivered file");
        }
    }
}

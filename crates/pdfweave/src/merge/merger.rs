//! The merge executor.
//!
//! Walks the sets in ascending order, decodes the documents each set draws
//! from, asks the planner for the page order and copies the pages into the
//! output. Progress is reported after every set. The executor knows nothing
//! about where the bytes go.

use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task;

use crate::config::OutputMode;
use crate::error::{Result, WeaveError};
use crate::io::{DecodedDocument, PdfReader};
use crate::merge::pages::OutputDocument;
use crate::merge::planner::{SetShape, plan_set};
use crate::registry::{SetSources, Slot, SourceRegistry};
use crate::state::{RunStatus, set_progress};

/// Receives progress updates while a run is in flight.
pub trait ProgressObserver {
    /// Called with the new progress in percent and the current run status.
    fn on_progress(&mut self, progress: u8, status: RunStatus);
}

impl<F> ProgressObserver for F
where
    F: FnMut(u8, RunStatus),
{
    fn on_progress(&mut self, progress: u8, status: RunStatus) {
        self(progress, status)
    }
}

/// Observer that ignores every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _progress: u8, _status: RunStatus) {}
}

/// Statistics about a merge operation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeStatistics {
    /// Number of sets walked.
    pub sets: usize,

    /// Number of source documents decoded.
    pub documents_read: usize,

    /// Total number of pages written across all outputs.
    pub total_pages: usize,

    /// Total size of the decoded sources.
    pub input_size: u64,

    /// Total size of the produced documents.
    pub output_size: u64,

    /// Time spent reading and parsing sources.
    pub load_time: Duration,

    /// Total time taken for the merge.
    pub merge_time: Duration,
}

/// One serialized output document.
#[derive(Debug, Clone)]
pub struct MergedDocument {
    /// Set the document was built from; `None` for a combined output.
    pub set_index: Option<usize>,

    /// Number of pages in the document.
    pub page_count: usize,

    /// The serialized PDF.
    pub bytes: Arc<[u8]>,
}

/// Result of a merge operation.
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// Produced documents: exactly one in combined mode, one per non-empty
    /// set otherwise.
    pub documents: Vec<MergedDocument>,

    /// Statistics about the merge.
    pub statistics: MergeStatistics,
}

/// Decoded documents of one set, by slot.
#[derive(Default)]
struct DecodedSet {
    a: Option<DecodedDocument>,
    b: Option<DecodedDocument>,
    c: Option<DecodedDocument>,
}

impl DecodedSet {
    fn slot_mut(&mut self, slot: Slot) -> &mut Option<DecodedDocument> {
        match slot {
            Slot::A => &mut self.a,
            Slot::B => &mut self.b,
            Slot::C => &mut self.c,
        }
    }

    fn shape(&self) -> SetShape {
        SetShape {
            a: self.a.as_ref().map(DecodedDocument::page_count),
            b: self.b.as_ref().map(DecodedDocument::page_count),
            c: self.c.as_ref().map(DecodedDocument::page_count),
        }
    }
}

/// Combines the sets of a [`SourceRegistry`] into output documents.
#[derive(Debug, Clone, Default)]
pub struct Merger {
    reader: PdfReader,
    mode: OutputMode,
}

impl Merger {
    /// Create a merger producing one combined document.
    pub fn new() -> Self {
        Self::with_mode(OutputMode::Combined)
    }

    /// Create a merger with the given output mode.
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            reader: PdfReader::new(),
            mode,
        }
    }

    /// Merge every set of `registry`.
    ///
    /// The observer is told the progress after each set, always with
    /// [`RunStatus::Processing`]; terminal states are up to the caller.
    ///
    /// # Errors
    ///
    /// - [`WeaveError::NoInput`] if every slot is empty. Nothing is decoded
    ///   and no progress is reported.
    /// - [`WeaveError::EmptyOutput`] if the sources contain no pages at all.
    /// - Any decode, page copy or serialize error; the partial output is
    ///   dropped.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfweave::merge::{Merger, NoProgress};
    /// # use pdfweave::registry::{SourceRegistry, Slot};
    /// # async fn example(registry: SourceRegistry) -> Result<(), Box<dyn std::error::Error>> {
    /// let merger = Merger::new();
    /// let result = merger.merge(&registry, &mut NoProgress).await?;
    /// println!("Merged {} sets into {} pages",
    ///          result.statistics.sets,
    ///          result.statistics.total_pages);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn merge(
        &self,
        registry: &SourceRegistry,
        observer: &mut dyn ProgressObserver,
    ) -> Result<MergeResult> {
        let merge_start = Instant::now();
        let total = registry.max_set_count();
        if total == 0 {
            return Err(WeaveError::NoInput);
        }

        let mut statistics = MergeStatistics {
            sets: total,
            ..MergeStatistics::default()
        };
        let mut documents = Vec::new();
        let mut combined = OutputDocument::new();

        for index in 0..total {
            let set = registry.set(index);
            let mut decoded = self.decode_set(&set, &mut statistics).await?;

            let mut per_set = OutputDocument::new();
            let output = match self.mode {
                OutputMode::Combined => &mut combined,
                OutputMode::PerSet => &mut per_set,
            };

            let ops = plan_set(decoded.shape());
            for op in &ops {
                if let Some(source) = decoded.slot_mut(op.slot).as_mut() {
                    output.append_pages(source, &op.indices())?;
                }
            }

            tracing::debug!(
                set = index + 1,
                of = total,
                ops = ops.len(),
                pages = output.page_count(),
                "set merged"
            );

            if self.mode == OutputMode::PerSet {
                if per_set.is_empty() {
                    tracing::debug!(set = index + 1, "set has no pages, no output produced");
                } else {
                    documents.push(finish(per_set, Some(index)).await?);
                }
            }

            observer.on_progress(set_progress(index, total), RunStatus::Processing);
        }

        if self.mode == OutputMode::Combined && !combined.is_empty() {
            documents.push(finish(combined, None).await?);
        }

        if documents.is_empty() {
            return Err(WeaveError::EmptyOutput);
        }

        statistics.total_pages = documents.iter().map(|d| d.page_count).sum();
        statistics.output_size = documents.iter().map(|d| d.bytes.len() as u64).sum();
        statistics.merge_time = merge_start.elapsed();

        tracing::info!(
            sets = statistics.sets,
            documents = documents.len(),
            pages = statistics.total_pages,
            "merge finished"
        );

        Ok(MergeResult {
            documents,
            statistics,
        })
    }

    /// Decode every source that takes part in `set`, in A, B, C order.
    async fn decode_set(
        &self,
        set: &SetSources<'_>,
        statistics: &mut MergeStatistics,
    ) -> Result<DecodedSet> {
        let mut decoded = DecodedSet::default();

        for slot in Slot::ALL {
            if let Some(source) = set.get(slot) {
                let document = self.reader.decode(source, slot, set.index).await?;
                statistics.documents_read += 1;
                statistics.input_size += document.byte_len() as u64;
                statistics.load_time += document.load_time();
                *decoded.slot_mut(slot) = Some(document);
            }
        }

        Ok(decoded)
    }
}

/// Serialize an output document on a blocking task.
async fn finish(output: OutputDocument, set_index: Option<usize>) -> Result<MergedDocument> {
    let page_count = output.page_count();
    let bytes = task::spawn_blocking(move || output.finalize())
        .await
        .map_err(|e| WeaveError::other(format!("Serialize task failed: {e}")))??;

    Ok(MergedDocument {
        set_index,
        page_count,
        bytes: bytes.into(),
    })
}

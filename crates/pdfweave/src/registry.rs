//! Source registry: the three input slots and their selected documents.
//!
//! Slot A holds the two-page cover documents, slots B and C hold the body
//! sections that get bracketed by them. The i-th source of every slot belongs
//! to set `i`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Result, WeaveError};
use crate::utils::collect_paths_for_patterns;

/// Summary shown for a slot with nothing selected.
pub const EMPTY_SUMMARY: &str = "No files selected...";

/// One of the three input channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    /// Anchor documents (cover page + second cover page).
    A,
    /// First body section.
    B,
    /// Second body section.
    C,
}

impl Slot {
    /// All slots in priority order.
    pub const ALL: [Slot; 3] = [Slot::A, Slot::B, Slot::C];

    fn position(self) -> usize {
        match self {
            Slot::A => 0,
            Slot::B => 1,
            Slot::C => 2,
        }
    }

    /// Label used when the caller does not provide one.
    pub fn default_label(self) -> &'static str {
        match self {
            Slot::A => "File A (cover, 2 pages)",
            Slot::B => "File B (body, first section)",
            Slot::C => "File C (body, second section)",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Slot::A => "A",
            Slot::B => "B",
            Slot::C => "C",
        };
        f.write_str(letter)
    }
}

#[derive(Clone)]
enum SourceData {
    File(PathBuf),
    Memory(Arc<[u8]>),
}

/// Opaque handle to a document's raw bytes plus its display name.
#[derive(Clone)]
pub struct DocumentSource {
    name: String,
    data: SourceData,
}

impl DocumentSource {
    /// A source backed by a file; the bytes are read when the source is decoded.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            data: SourceData::File(path),
        }
    }

    /// A source backed by an in-memory buffer.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            data: SourceData::Memory(bytes.into()),
        }
    }

    /// Display name (file name for path-backed sources).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backing path, if this source lives on disk.
    pub fn path(&self) -> Option<&Path> {
        match &self.data {
            SourceData::File(path) => Some(path),
            SourceData::Memory(_) => None,
        }
    }

    /// Whether the name marks this source as a PDF.
    pub fn is_pdf(&self) -> bool {
        self.name.to_lowercase().ends_with(".pdf")
    }

    /// Read the raw bytes.
    pub async fn read(&self) -> Result<Arc<[u8]>> {
        match &self.data {
            SourceData::Memory(bytes) => Ok(Arc::clone(bytes)),
            SourceData::File(path) => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|source| WeaveError::SourceUnreadable {
                        name: self.name.clone(),
                        source,
                    })?;
                Ok(bytes.into())
            }
        }
    }
}

impl fmt::Debug for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("DocumentSource");
        s.field("name", &self.name);
        match &self.data {
            SourceData::File(path) => s.field("path", path),
            SourceData::Memory(bytes) => s.field("len", &bytes.len()),
        };
        s.finish()
    }
}

/// One named input channel.
#[derive(Debug, Clone)]
pub struct SourceSlot {
    /// Label shown next to the slot.
    pub label: String,
    sources: Vec<DocumentSource>,
    display_summary: String,
}

impl SourceSlot {
    fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            sources: Vec::new(),
            display_summary: EMPTY_SUMMARY.to_string(),
        }
    }

    /// Selected sources in set order.
    pub fn sources(&self) -> &[DocumentSource] {
        &self.sources
    }

    /// Human-readable summary of the selection.
    pub fn display_summary(&self) -> &str {
        &self.display_summary
    }

    /// Number of selected sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    fn replace(&mut self, sources: Vec<DocumentSource>) {
        self.display_summary = match sources.as_slice() {
            [] => EMPTY_SUMMARY.to_string(),
            [only] => only.name().to_string(),
            many => format!("{} files selected", many.len()),
        };
        self.sources = sources;
    }

    fn clear(&mut self) {
        self.replace(Vec::new());
    }
}

/// The sources that take part in one set.
#[derive(Debug, Clone, Copy)]
pub struct SetSources<'a> {
    /// Zero-based set index.
    pub index: usize,
    /// Anchor document, if slot A has an i-th source.
    pub a: Option<&'a DocumentSource>,
    /// First body section, if slot B has an i-th source.
    pub b: Option<&'a DocumentSource>,
    /// Second body section, if slot C has an i-th source.
    pub c: Option<&'a DocumentSource>,
}

impl<'a> SetSources<'a> {
    /// The source a given slot contributes to this set.
    pub fn get(&self, slot: Slot) -> Option<&'a DocumentSource> {
        match slot {
            Slot::A => self.a,
            Slot::B => self.b,
            Slot::C => self.c,
        }
    }

    /// First present source in A, B, C priority.
    pub fn first(&self) -> Option<&'a DocumentSource> {
        self.a.or(self.b).or(self.c)
    }
}

/// Holds the three slots A, B and C.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    slots: [SourceSlot; 3],
}

impl SourceRegistry {
    /// Create an empty registry with the default labels.
    pub fn new() -> Self {
        Self {
            slots: Slot::ALL.map(|slot| SourceSlot::new(slot.default_label())),
        }
    }

    /// Access one slot.
    pub fn slot(&self, slot: Slot) -> &SourceSlot {
        &self.slots[slot.position()]
    }

    /// Change the label of a slot.
    pub fn set_label(&mut self, slot: Slot, label: impl Into<String>) {
        self.slots[slot.position()].label = label.into();
    }

    /// Replace the selection of a slot.
    ///
    /// Items that are not PDFs are dropped first. A selection with no PDF in
    /// it leaves the slot as it was.
    pub fn select_sources<I>(&mut self, slot: Slot, raw: I) -> &SourceSlot
    where
        I: IntoIterator<Item = DocumentSource>,
    {
        let accepted: Vec<DocumentSource> =
            raw.into_iter().filter(DocumentSource::is_pdf).collect();

        if accepted.is_empty() {
            tracing::debug!(%slot, "selection contained no PDF, slot unchanged");
        } else {
            tracing::debug!(%slot, count = accepted.len(), "slot selection replaced");
            self.slots[slot.position()].replace(accepted);
        }

        self.slot(slot)
    }

    /// Expand glob patterns and select the matching files for a slot.
    ///
    /// Matches of each pattern are taken in lexical order; patterns are
    /// concatenated in the order given.
    pub fn select_paths<T>(&mut self, slot: Slot, patterns: T) -> Result<&SourceSlot>
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        let paths = collect_paths_for_patterns(patterns)?;
        Ok(self.select_sources(slot, paths.into_iter().map(DocumentSource::from_path)))
    }

    /// Number of sets: the length of the longest slot.
    pub fn max_set_count(&self) -> usize {
        self.slots.iter().map(SourceSlot::len).max().unwrap_or(0)
    }

    /// Whether all three slots are empty.
    pub fn is_empty(&self) -> bool {
        self.max_set_count() == 0
    }

    /// The sources participating in set `index`.
    pub fn set(&self, index: usize) -> SetSources<'_> {
        let pick = |slot: Slot| self.slot(slot).sources.get(index);
        SetSources {
            index,
            a: pick(Slot::A),
            b: pick(Slot::B),
            c: pick(Slot::C),
        }
    }

    /// First source across A, B, C in that priority order.
    pub fn first_source(&self) -> Option<&DocumentSource> {
        Slot::ALL
            .iter()
            .find_map(|&slot| self.slot(slot).sources.first())
    }

    /// Empty every slot, keeping labels.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(SourceSlot::clear);
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

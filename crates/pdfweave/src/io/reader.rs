//! Decoding document sources into page sequences.
//!
//! The reader pulls a source's bytes (asynchronously for file-backed
//! sources), hands them to `lopdf` on a blocking task, and records the page
//! order of the result.
//!
//! # Examples
//!
//! ```no_run
//! use pdfweave::io::PdfReader;
//! use pdfweave::registry::{DocumentSource, Slot};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let source = DocumentSource::from_path("cover.pdf");
//! let decoded = reader.decode(&source, Slot::A, 0).await?;
//! println!("{} has {} pages", decoded.name(), decoded.page_count());
//! # Ok(())
//! # }
//! ```

use lopdf::{Document, ObjectId};
use std::time::{Duration, Instant};
use tokio::task;

use crate::error::{Result, WeaveError};
use crate::registry::{DocumentSource, Slot};

/// A decoded source document, ready to have its pages copied.
#[derive(Debug)]
pub struct DecodedDocument {
    slot: Slot,
    name: String,
    pub(crate) document: Document,
    pub(crate) page_ids: Vec<ObjectId>,
    /// Whether object ids were already shifted into an output document's id space.
    pub(crate) rebased: bool,
    byte_len: usize,
    load_time: Duration,
}

impl DecodedDocument {
    /// Wrap an already parsed document.
    pub fn from_document(slot: Slot, name: impl Into<String>, document: Document) -> Self {
        let page_ids = document.get_pages().into_values().collect();
        Self {
            slot,
            name: name.into(),
            document,
            page_ids,
            rebased: false,
            byte_len: 0,
            load_time: Duration::ZERO,
        }
    }

    /// Slot this document was selected into.
    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// Display name of the source.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of pages, in page-tree order.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Size of the source bytes.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Time spent reading and parsing.
    pub fn load_time(&self) -> Duration {
        self.load_time
    }
}

/// Turns document sources into [`DecodedDocument`]s.
#[derive(Debug, Clone, Default)]
pub struct PdfReader;

impl PdfReader {
    /// Create a new reader.
    pub fn new() -> Self {
        Self
    }

    /// Read and parse one source.
    ///
    /// `slot` and `index` only label errors, so a failure names the set and
    /// slot the bad file was selected into.
    ///
    /// # Errors
    ///
    /// - [`WeaveError::SourceUnreadable`] if the bytes cannot be read.
    /// - [`WeaveError::Decode`] if the bytes are not a PDF `lopdf` can parse.
    pub async fn decode(
        &self,
        source: &DocumentSource,
        slot: Slot,
        index: usize,
    ) -> Result<DecodedDocument> {
        let start = Instant::now();
        let bytes = source.read().await?;
        let byte_len = bytes.len();

        let parsed = task::spawn_blocking(move || Document::load_mem(&bytes))
            .await
            .map_err(|e| WeaveError::other(format!("Decode task failed: {e}")))?;

        let document =
            parsed.map_err(|e| WeaveError::decode(slot, index, source.name(), e.to_string()))?;

        let mut decoded = DecodedDocument::from_document(slot, source.name(), document);
        decoded.byte_len = byte_len;
        decoded.load_time = start.elapsed();

        tracing::debug!(
            %slot,
            set = index + 1,
            name = source.name(),
            pages = decoded.page_count(),
            bytes = byte_len,
            "decoded source"
        );

        Ok(decoded)
    }
}

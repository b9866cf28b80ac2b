//! The output accumulator: a document that grows by copying pages in.
//!
//! Source documents are rebased into the output's object-id space the first
//! time one of their pages is copied. After that, every page copy inserts the
//! page dictionary (re-parented onto the output page tree, with inherited
//! attributes made explicit) plus everything it references. Nothing in the
//! output points back into a source document.

use lopdf::{Document, Object, ObjectId, dictionary};

use crate::error::{Result, WeaveError};
use crate::io::DecodedDocument;
use crate::utils::copy_references;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Bound on page-tree depth when resolving inherited attributes.
const MAX_TREE_DEPTH: usize = 64;

/// Accumulates copied pages in insertion order.
pub struct OutputDocument {
    document: Document,
    pages_id: ObjectId,
    page_count: usize,
}

impl OutputDocument {
    /// Create an empty output document.
    pub fn new() -> Self {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0,
            }),
        );
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        Self {
            document,
            pages_id,
            page_count: 0,
        }
    }

    /// Number of pages copied in so far.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Whether no page has been copied in yet.
    pub fn is_empty(&self) -> bool {
        self.page_count == 0
    }

    /// The document as built so far.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Append copies of `source`'s pages at the zero-based `indices`, in the
    /// order given.
    ///
    /// # Errors
    ///
    /// Returns [`WeaveError::PageCopy`] if an index is out of range or a page
    /// object is not a dictionary. Pages copied before the failing one stay in
    /// the output; callers discard the whole output on error.
    pub fn append_pages(&mut self, source: &mut DecodedDocument, indices: &[usize]) -> Result<()> {
        if indices.is_empty() {
            return Ok(());
        }

        self.rebase(source);

        for &index in indices {
            let page_id = *source.page_ids.get(index).ok_or_else(|| {
                WeaveError::page_copy(
                    source.name(),
                    format!("page {} out of range ({} pages)", index + 1, source.page_count()),
                )
            })?;

            let mut page = source
                .document
                .get_dictionary(page_id)
                .map_err(|e| WeaveError::page_copy(source.name(), e.to_string()))?
                .clone();

            for key in INHERITABLE {
                if !page.has(key)
                    && let Some(value) = inherited_attribute(&source.document, page_id, key)
                {
                    page.set(key, value);
                }
            }
            page.set("Parent", self.pages_id);

            let page = Object::Dictionary(page);
            self.document.objects.insert(page_id, page.clone());
            copy_references(&mut self.document, &source.document, &page);

            self.add_page_to_tree(page_id)?;
        }

        tracing::trace!(
            name = source.name(),
            copied = indices.len(),
            total = self.page_count,
            "pages appended"
        );

        Ok(())
    }

    /// Serialize the output into an immutable byte buffer.
    ///
    /// # Errors
    ///
    /// Returns [`WeaveError::Serialize`] if `lopdf` fails to write.
    pub fn finalize(mut self) -> Result<Vec<u8>> {
        self.document.renumber_objects();

        let mut buffer = Vec::new();
        self.document
            .save_to(&mut buffer)
            .map_err(|e| WeaveError::Serialize {
                reason: e.to_string(),
            })?;

        Ok(buffer)
    }

    /// Shift `source`'s object ids above everything already in the output.
    fn rebase(&mut self, source: &mut DecodedDocument) {
        if !source.rebased {
            source
                .document
                .renumber_objects_with(self.document.max_id + 1);
            source.page_ids = source.document.get_pages().into_values().collect();
            source.rebased = true;
        }
        self.document.max_id = self.document.max_id.max(source.document.max_id);
    }

    /// Add a page reference to the output page tree.
    fn add_page_to_tree(&mut self, page_id: ObjectId) -> Result<()> {
        let pages = self
            .document
            .get_dictionary_mut(self.pages_id)
            .map_err(|e| WeaveError::other(format!("Failed to get pages object: {e}")))?;

        match pages.get_mut(b"Kids") {
            Ok(Object::Array(kids)) => kids.push(Object::Reference(page_id)),
            _ => return Err(WeaveError::other("Pages dictionary missing Kids array")),
        }

        self.page_count += 1;
        pages.set("Count", Object::Integer(self.page_count as i64));

        Ok(())
    }
}

impl Default for OutputDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Look up `key` on the ancestors of a page.
fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;

    for _ in 0..MAX_TREE_DEPTH {
        let parent_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent_id).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
    }

    None
}

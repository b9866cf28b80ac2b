//! Helpers shared by the integration tests.
//!
//! PDFs are generated on the fly. Every page carries a `/Label` string
//! (`"<label>-<n>"`, one-based) so tests can read page order back.

#![allow(dead_code)]

use lopdf::{Document, Object, Stream, dictionary};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pdfweave::sink::MemoryRetriever;
use pdfweave::{Config, Session};

/// Serialize a PDF with `pages` labelled pages.
pub fn pdf_bytes(label: &str, pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::with_capacity(pages);
    for n in 1..=pages {
        let text = format!("BT /F1 24 Tf 72 720 Td ({label} page {n}) Tj ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, text.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Label" => Object::string_literal(format!("{label}-{n}")),
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("Failed to serialize test PDF");
    buffer
}

/// Write a labelled PDF into `dir`; the label is the file stem.
pub fn write_pdf(dir: &Path, name: &str, pages: usize) -> PathBuf {
    let path = dir.join(name);
    let label = name.trim_end_matches(".pdf");
    std::fs::write(&path, pdf_bytes(label, pages)).expect("Failed to write test PDF");
    path
}

/// Page labels of a serialized PDF, in page order.
pub fn page_labels(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).expect("Output is not a readable PDF");
    doc.get_pages()
        .into_values()
        .map(|id| {
            let page = doc.get_dictionary(id).expect("Page is not a dictionary");
            let label = page
                .get(b"Label")
                .and_then(Object::as_str)
                .expect("Page has no label");
            String::from_utf8_lossy(label).into_owned()
        })
        .collect()
}

/// A session whose downloads land in memory.
pub fn memory_session(config: Config) -> (Session, Arc<MemoryRetriever>) {
    let retriever = Arc::new(MemoryRetriever::new());
    let session =
        Session::with_retriever(config, retriever.clone()).expect("Failed to create session");
    (session, retriever)
}

/// Glob pattern matching every PDF in `dir`.
pub fn pdf_pattern(dir: &Path) -> String {
    format!("{}/*.pdf", dir.display())
}

//! In-memory PDFs for unit tests.
//!
//! Every page carries a `/Label` string (`"<label>-<n>"`, one-based) so tests
//! can read back page order after a merge. The media box lives on the page
//! tree root, so copying a page has to carry inherited attributes over.

use lopdf::{Document, Object, Stream, dictionary};

pub(crate) fn pdf_document(label: &str, pages: usize) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let resources_id = doc.add_object(dictionary! {
        "ProcSet" => vec![Object::Name(b"PDF".to_vec()), Object::Name(b"Text".to_vec())],
    });

    let mut kids = Vec::with_capacity(pages);
    for n in 1..=pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Resources" => resources_id,
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
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc
}

pub(crate) fn pdf_bytes(label: &str, pages: usize) -> Vec<u8> {
    let mut doc = pdf_document(label, pages);
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("serialize test pdf");
    buffer
}

pub(crate) fn page_labels(doc: &Document) -> Vec<String> {
    doc.get_pages()
        .into_values()
        .map(|id| {
            doc.get_dictionary(id)
                .and_then(|page| page.get(b"Label"))
                .and_then(Object::as_str)
                .map(|label| String::from_utf8_lossy(label).into_owned())
                .unwrap_or_default()
        })
        .collect()
}

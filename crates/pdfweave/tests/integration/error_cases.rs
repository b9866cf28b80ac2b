//! Integration tests for error handling and edge cases.

use pdfweave::merge::NoProgress;
use pdfweave::registry::DocumentSource;
use pdfweave::state::{MergeRunState, RunStatus};
use pdfweave::{Config, Slot, WeaveError};
use tempfile::TempDir;

use crate::common::{memory_session, pdf_bytes, write_pdf};

#[tokio::test]
async fn test_error_nothing_selected() {
    let (mut session, retriever) = memory_session(Config::default());

    let mut seen = Vec::new();
    let mut observer = |progress: u8, status: RunStatus| seen.push((progress, status));
    let err = session.run(&mut observer).await.unwrap_err();

    assert!(matches!(err, WeaveError::NoInput));
    assert_eq!(err.to_string(), "No PDF files selected.");
    assert_eq!(seen.last(), Some(&(10, RunStatus::Error)));
    assert!(retriever.offers().is_empty());
}

#[tokio::test]
async fn test_error_corrupted_pdf_in_second_set() {
    let dir = TempDir::new().unwrap();
    let good = write_pdf(dir.path(), "a1.pdf", 2);
    let bad = dir.path().join("a2.pdf");
    std::fs::write(&bad, b"this is not a pdf").unwrap();

    let (mut session, retriever) = memory_session(Config::default());
    session
        .select_paths(Slot::A, [good.to_string_lossy(), bad.to_string_lossy()])
        .unwrap();

    let err = session.run(&mut NoProgress).await.unwrap_err();

    match &err {
        WeaveError::Decode { slot, set, name, .. } => {
            assert_eq!(*slot, Slot::A);
            assert_eq!(*set, 2);
            assert_eq!(name, "a2.pdf");
        }
        other => panic!("Expected decode error, got {other:?}"),
    }
    assert_eq!(session.state().status, RunStatus::Error);
    assert_eq!(session.state().progress, 50);
    assert!(session.state().error_message.as_deref().unwrap().contains("a2.pdf"));
    assert!(retriever.offers().is_empty());
}

#[tokio::test]
async fn test_error_source_removed_after_selection() {
    let dir = TempDir::new().unwrap();
    let path = write_pdf(dir.path(), "gone.pdf", 1);

    let (mut session, _) = memory_session(Config::default());
    session.select_paths(Slot::B, [path.to_string_lossy()]).unwrap();
    std::fs::remove_file(&path).unwrap();

    let err = session.run(&mut NoProgress).await.unwrap_err();
    assert!(matches!(err, WeaveError::SourceUnreadable { .. }));
}

#[tokio::test]
async fn test_non_pdf_selection_is_ignored() {
    let (mut session, _) = memory_session(Config::default());
    session.select_sources(Slot::A, [DocumentSource::from_bytes("a.pdf", pdf_bytes("a", 2))]);

    let slot = session.select_sources(
        Slot::A,
        [DocumentSource::from_bytes("notes.txt", b"hello".to_vec())],
    );

    assert_eq!(slot.len(), 1);
    assert_eq!(slot.display_summary(), "a.pdf");
}

#[tokio::test]
async fn test_error_only_empty_documents() {
    let (mut session, _) = memory_session(Config::default());
    session.select_sources(Slot::C, [DocumentSource::from_bytes("empty.pdf", pdf_bytes("e", 0))]);

    let err = session.run(&mut NoProgress).await.unwrap_err();
    assert!(matches!(err, WeaveError::EmptyOutput));
    assert_eq!(session.state().progress, 90);
}

#[tokio::test]
async fn test_reset_after_error() {
    let (mut session, _) = memory_session(Config::default());
    session.select_sources(Slot::B, [DocumentSource::from_bytes("bad.pdf", b"junk".to_vec())]);
    assert!(session.run(&mut NoProgress).await.is_err());

    session.reset().unwrap();

    assert_eq!(*session.state(), MergeRunState::default());
    assert!(session.registry().is_empty());
    assert!(!session.can_run());
}

#[test]
fn test_error_invalid_pattern() {
    let (mut session, _) = memory_session(Config::default());
    let err = session.select_paths(Slot::A, ["[broken"]).unwrap_err();
    assert!(matches!(err, WeaveError::InvalidConfig { .. }));
}

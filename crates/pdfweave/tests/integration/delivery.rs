//! Delivery to a destination folder and the download fallback.

use pdfweave::merge::NoProgress;
use pdfweave::sink::{Delivery, DownloadsRetriever};
use pdfweave::state::RunStatus;
use pdfweave::{Config, OutputMode, Session, Slot, WeaveError};
use std::sync::Arc;
use tempfile::TempDir;

use crate::common::{memory_session, page_labels, write_pdf};

#[tokio::test]
async fn test_saves_into_destination() {
    let inputs = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let a = write_pdf(inputs.path(), "Report.pdf", 2);

    let (mut session, retriever) = memory_session(Config::default());
    session.select_paths(Slot::A, [a.to_string_lossy()]).unwrap();
    session.select_destination(out.path()).await.unwrap();

    let outcome = session.run(&mut NoProgress).await.unwrap();

    let expected = out.path().join("Report - Merged.pdf");
    assert_eq!(
        outcome.files[0].delivery,
        Delivery::Persisted {
            path: expected.clone()
        }
    );
    assert_eq!(
        page_labels(&std::fs::read(&expected).unwrap()),
        vec!["Report-1", "Report-2"]
    );
    assert!(retriever.offers().is_empty());
}

#[tokio::test]
async fn test_overwrites_previous_output() {
    let inputs = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let a = write_pdf(inputs.path(), "Report.pdf", 2);
    let target = out.path().join("Report - Merged.pdf");
    std::fs::write(&target, b"stale").unwrap();

    let (mut session, _) = memory_session(Config::default());
    session.select_paths(Slot::A, [a.to_string_lossy()]).unwrap();
    session.select_destination(out.path()).await.unwrap();
    session.run(&mut NoProgress).await.unwrap();

    assert_eq!(page_labels(&std::fs::read(&target).unwrap()).len(), 2);
}

#[tokio::test]
async fn test_blocked_write_falls_back_to_download() {
    let inputs = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let a = write_pdf(inputs.path(), "Report.pdf", 2);
    std::fs::create_dir(out.path().join("Report - Merged.pdf")).unwrap();

    let (mut session, retriever) = memory_session(Config::default());
    session.select_paths(Slot::A, [a.to_string_lossy()]).unwrap();
    session.select_destination(out.path()).await.unwrap();

    let outcome = session.run(&mut NoProgress).await.unwrap();

    assert!(outcome.files[0].delivery.fell_back());
    assert_eq!(session.state().status, RunStatus::Completed);

    let offers = retriever.offers();
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].name, "Report - Merged.pdf");
    assert_eq!(page_labels(&offers[0].bytes), vec!["Report-1", "Report-2"]);
}

#[tokio::test]
async fn test_vanished_destination_falls_back() {
    let inputs = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let dest = out.path().join("dest");
    std::fs::create_dir(&dest).unwrap();
    let a = write_pdf(inputs.path(), "Report.pdf", 2);

    let (mut session, retriever) = memory_session(Config::default());
    session.select_paths(Slot::A, [a.to_string_lossy()]).unwrap();
    session.select_destination(&dest).await.unwrap();
    std::fs::remove_dir(&dest).unwrap();

    session.run(&mut NoProgress).await.unwrap();

    assert_eq!(retriever.offers().len(), 1);
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_unusable_destination_does_not_block_merge() {
    let inputs = TempDir::new().unwrap();
    let a = write_pdf(inputs.path(), "Report.pdf", 2);

    let (mut session, retriever) = memory_session(Config::default());
    session.select_paths(Slot::A, [a.to_string_lossy()]).unwrap();

    let err = session
        .select_destination(inputs.path().join("missing"))
        .await
        .unwrap_err();
    assert!(matches!(err, WeaveError::CapabilityUnsupported { .. }));
    assert!(session.destination().is_none());

    session.run(&mut NoProgress).await.unwrap();
    assert_eq!(retriever.offers().len(), 1);
}

#[tokio::test]
async fn test_downloads_directory_from_config() {
    let inputs = TempDir::new().unwrap();
    let downloads = TempDir::new().unwrap();
    let a = write_pdf(inputs.path(), "Report.pdf", 2);

    let config = Config {
        downloads_dir: Some(downloads.path().to_path_buf()),
        ..Config::default()
    };
    let mut session = Session::new(config).unwrap();
    session.select_paths(Slot::A, [a.to_string_lossy()]).unwrap();

    let outcome = session.run(&mut NoProgress).await.unwrap();

    let expected = downloads.path().join("Report - Merged.pdf");
    assert_eq!(outcome.files[0].delivery.path(), Some(expected.as_path()));
    assert!(expected.exists());
}

#[tokio::test]
async fn test_download_failure_is_fatal() {
    let inputs = TempDir::new().unwrap();
    let blocker = inputs.path().join("not-a-dir");
    std::fs::write(&blocker, b"").unwrap();
    let a = write_pdf(inputs.path(), "Report.pdf", 2);

    let mut session =
        Session::with_retriever(Config::default(), Arc::new(DownloadsRetriever::new(&blocker)))
            .unwrap();
    session.select_paths(Slot::A, [a.to_string_lossy()]).unwrap();

    let err = session.run(&mut NoProgress).await.unwrap_err();

    assert!(matches!(err, WeaveError::RetrievalFailed { .. }));
    assert_eq!(session.state().status, RunStatus::Error);
    assert_eq!(session.state().progress, 90);
}

fn per_set_downloads(downloads: &TempDir) -> Config {
    Config {
        output_mode: OutputMode::PerSet,
        downloads_dir: Some(downloads.path().to_path_buf()),
        ..Config::default()
    }
}

#[tokio::test]
async fn test_failed_per_set_download_withdraws_earlier_files() {
    let inputs = TempDir::new().unwrap();
    let downloads = TempDir::new().unwrap();
    let north = write_pdf(inputs.path(), "North.pdf", 2);
    let south = write_pdf(inputs.path(), "South.pdf", 2);
    std::fs::create_dir(downloads.path().join("South - Merged.pdf")).unwrap();

    let mut session = Session::new(per_set_downloads(&downloads)).unwrap();
    session
        .select_paths(Slot::A, [north.to_string_lossy(), south.to_string_lossy()])
        .unwrap();

    let err = session.run(&mut NoProgress).await.unwrap_err();

    assert!(matches!(err, WeaveError::RetrievalFailed { .. }));
    assert_eq!(session.state().status, RunStatus::Error);
    assert!(!downloads.path().join("North - Merged.pdf").exists());
    assert_eq!(std::fs::read_dir(downloads.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_failed_per_set_delivery_withdraws_saved_files() {
    let inputs = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let downloads = TempDir::new().unwrap();
    let north = write_pdf(inputs.path(), "North.pdf", 2);
    let south = write_pdf(inputs.path(), "South.pdf", 2);
    std::fs::create_dir(out.path().join("South - Merged.pdf")).unwrap();
    std::fs::create_dir(downloads.path().join("South - Merged.pdf")).unwrap();

    let mut session = Session::new(per_set_downloads(&downloads)).unwrap();
    session
        .select_paths(Slot::A, [north.to_string_lossy(), south.to_string_lossy()])
        .unwrap();
    session.select_destination(out.path()).await.unwrap();

    let err = session.run(&mut NoProgress).await.unwrap_err();

    assert!(matches!(err, WeaveError::RetrievalFailed { .. }));
    assert!(!out.path().join("North - Merged.pdf").exists());
    assert!(out.path().join("South - Merged.pdf").is_dir());
}

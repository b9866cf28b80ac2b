//! End-to-end merges through a session.

use pdfweave::merge::NoProgress;
use pdfweave::state::RunStatus;
use pdfweave::{Config, OutputMode, Slot};
use tempfile::TempDir;

use crate::common::{memory_session, page_labels, pdf_pattern, write_pdf};

#[tokio::test]
async fn test_single_set_from_disk() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "Report.pdf", 2);
    let b = write_pdf(dir.path(), "Body.pdf", 3);
    let c = write_pdf(dir.path(), "Appendix.pdf", 3);

    let (mut session, retriever) = memory_session(Config::default());
    session.select_paths(Slot::A, [a.to_string_lossy()]).unwrap();
    session.select_paths(Slot::B, [b.to_string_lossy()]).unwrap();
    session.select_paths(Slot::C, [c.to_string_lossy()]).unwrap();

    let mut seen = Vec::new();
    let mut observer = |progress: u8, status: RunStatus| seen.push((progress, status));
    let outcome = session.run(&mut observer).await.unwrap();

    assert_eq!(outcome.files.len(), 1);
    assert_eq!(outcome.files[0].name, "Report - Merged.pdf");
    assert_eq!(outcome.statistics.total_pages, 8);

    let offers = retriever.offers();
    assert_eq!(offers.len(), 1);
    assert_eq!(
        page_labels(&offers[0].bytes),
        vec![
            "Report-1", "Body-1", "Body-2", "Body-3", "Report-2", "Appendix-1", "Appendix-2",
            "Appendix-3",
        ]
    );

    assert_eq!(
        seen,
        vec![
            (10, RunStatus::Processing),
            (90, RunStatus::Processing),
            (100, RunStatus::Completed),
        ]
    );
}

#[tokio::test]
async fn test_uneven_slots() {
    let dir = TempDir::new().unwrap();
    let covers = dir.path().join("covers");
    let bodies = dir.path().join("bodies");
    std::fs::create_dir_all(&covers).unwrap();
    std::fs::create_dir_all(&bodies).unwrap();

    write_pdf(&covers, "PMA Report_Acme - PMA Report.pdf", 2);
    write_pdf(&bodies, "b1.pdf", 1);
    write_pdf(&bodies, "b2.pdf", 2);
    write_pdf(&bodies, "b3.pdf", 1);

    let (mut session, retriever) = memory_session(Config::default());
    session.select_paths(Slot::A, [pdf_pattern(&covers)]).unwrap();
    let slot = session.select_paths(Slot::B, [pdf_pattern(&bodies)]).unwrap();
    assert_eq!(slot.display_summary(), "3 files selected");

    let mut seen = Vec::new();
    let mut observer = |progress: u8, _: RunStatus| seen.push(progress);
    let outcome = session.run(&mut observer).await.unwrap();

    assert_eq!(outcome.files[0].name, "Acme - Merged.pdf");
    assert_eq!(
        page_labels(&retriever.offers()[0].bytes),
        vec![
            "PMA Report_Acme - PMA Report-1",
            "b1-1",
            "PMA Report_Acme - PMA Report-2",
            "b2-1",
            "b2-2",
            "b3-1",
        ]
    );
    assert_eq!(seen, vec![10, 37, 63, 90, 100]);
}

#[tokio::test]
async fn test_single_page_anchor() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "cover.pdf", 1);
    let b = write_pdf(dir.path(), "body.pdf", 2);
    let c = write_pdf(dir.path(), "tail.pdf", 1);

    let (mut session, retriever) = memory_session(Config::default());
    session.select_paths(Slot::A, [a.to_string_lossy()]).unwrap();
    session.select_paths(Slot::B, [b.to_string_lossy()]).unwrap();
    session.select_paths(Slot::C, [c.to_string_lossy()]).unwrap();

    session.run(&mut NoProgress).await.unwrap();

    assert_eq!(
        page_labels(&retriever.offers()[0].bytes),
        vec!["cover-1", "body-1", "body-2", "tail-1"]
    );
}

#[tokio::test]
async fn test_per_set_mode_writes_one_file_per_set() {
    let dir = TempDir::new().unwrap();
    let covers = dir.path().join("covers");
    std::fs::create_dir_all(&covers).unwrap();
    write_pdf(&covers, "PMA Report_North.pdf", 2);
    write_pdf(&covers, "PMA Report_South.pdf", 2);
    let body = write_pdf(dir.path(), "body.pdf", 1);

    let config = Config {
        output_mode: OutputMode::PerSet,
        ..Config::default()
    };
    let (mut session, retriever) = memory_session(config);
    session.select_paths(Slot::A, [pdf_pattern(&covers)]).unwrap();
    session.select_paths(Slot::B, [body.to_string_lossy()]).unwrap();

    let outcome = session.run(&mut NoProgress).await.unwrap();

    let names: Vec<&str> = outcome.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["North - Merged.pdf", "South - Merged.pdf"]);

    let offers = retriever.offers();
    assert_eq!(
        page_labels(&offers[0].bytes),
        vec!["PMA Report_North-1", "body-1", "PMA Report_North-2"]
    );
    assert_eq!(
        page_labels(&offers[1].bytes),
        vec!["PMA Report_South-1", "PMA Report_South-2"]
    );
}

#[tokio::test]
async fn test_output_is_self_contained() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "a.pdf", 2);
    let b = write_pdf(dir.path(), "b.pdf", 2);

    let (mut session, retriever) = memory_session(Config::default());
    session.select_paths(Slot::A, [a.to_string_lossy()]).unwrap();
    session.select_paths(Slot::B, [b.to_string_lossy()]).unwrap();
    session.run(&mut NoProgress).await.unwrap();

    let bytes = retriever.offers()[0].bytes.clone();
    let doc = lopdf::Document::load_mem(&bytes).unwrap();

    for (_, page_id) in doc.get_pages() {
        let page = doc.get_dictionary(page_id).unwrap();
        assert!(page.has(b"MediaBox"));
        let resources = page.get(b"Resources").unwrap().as_reference().unwrap();
        assert!(doc.get_dictionary(resources).is_ok());
    }
}

//! User-facing output: messages, progress and run summaries.

pub mod formatter;
pub mod progress;

pub use formatter::OutputFormatter;
pub use progress::ProgressReporter;

use pdfweave::registry::{Slot, SourceRegistry};
use pdfweave::session::RunOutcome;
use pdfweave::sink::Delivery;

/// Show what each slot holds.
pub fn display_slots(formatter: &OutputFormatter, registry: &SourceRegistry) {
    for slot in Slot::ALL {
        let selected = registry.slot(slot);
        formatter.info(&format!("{}: {}", selected.label, selected.display_summary()));
        for source in selected.sources() {
            formatter.detail(&format!("  {slot}"), source.name());
        }
    }
}

/// Show where each output went and, in verbose mode, the statistics.
pub fn display_outcome(formatter: &OutputFormatter, outcome: &RunOutcome) {
    for (index, file) in outcome.files.iter().enumerate() {
        let size = format_file_size(file.size);
        match &file.delivery {
            Delivery::Persisted { path } => {
                formatter.success(&format!("Saved {} ({size})", path.display()));
            }
            Delivery::Offered {
                location,
                fallback_reason,
            } => {
                if let Some(reason) = fallback_reason {
                    formatter.warning(&format!(
                        "Could not save to folder, downloading instead: {reason}"
                    ));
                }
                match location {
                    Some(path) => {
                        formatter.success(&format!("Downloaded {} ({size})", path.display()));
                    }
                    None => {
                        formatter.success(&format!("Offered {} for download ({size})", file.name));
                    }
                }
            }
        }
        if outcome.files.len() > 1 {
            formatter.list_item(index + 1, &format!("{} pages", file.page_count));
        }
    }

    if formatter.is_verbose() {
        let stats = &outcome.statistics;
        formatter.section("Statistics");
        formatter.detail("Sets", &stats.sets.to_string());
        formatter.detail("Documents read", &stats.documents_read.to_string());
        formatter.detail("Total pages", &stats.total_pages.to_string());
        formatter.detail("Input size", &format_file_size(stats.input_size));
        formatter.detail("Output size", &format_file_size(stats.output_size));
        formatter.detail("Load time", &format!("{:.2}s", stats.load_time.as_secs_f64()));
        formatter.detail("Merge time", &format!("{:.2}s", stats.merge_time.as_secs_f64()));
    }
}

/// Format file size as human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}

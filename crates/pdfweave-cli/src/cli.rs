//! CLI argument parsing for pdfweave.
//!
//! This module is also compiled by `build.rs` to render the man page, so it
//! only depends on `clap` and the `pdfweave` library.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use pdfweave::config::{
    Config, DEFAULT_ANCHOR_PREFIX, DEFAULT_ANCHOR_SUFFIX, DEFAULT_FALLBACK_NAME, NamingRules,
    OutputMode,
};
use pdfweave::error::Result;
use pdfweave::registry::Slot;

/// Interleave cover, body and appendix PDFs set by set.
///
/// The i-th file of every slot forms set i. Each set is merged as: first
/// page of the slot A file, all of slot B, second page of slot A, all of
/// slot C. Sets are concatenated in order.
#[derive(Parser, Debug)]
#[command(name = "pdfweave")]
#[command(version)]
#[command(about = "Interleave cover, body and appendix PDFs set by set", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Cover documents for slot A (files or glob patterns)
    ///
    /// Only the first two pages of each cover are used: page one opens
    /// the set, page two separates slot B from slot C.
    ///
    /// Examples:
    ///   pdfweave -a "covers/*.pdf" -b "reports/*.pdf"
    #[arg(short = 'a', long = "anchor", value_name = "PATTERN", num_args = 1..)]
    pub anchor: Vec<String>,

    /// Documents for slot B, placed after the first cover page
    #[arg(short = 'b', long = "first", value_name = "PATTERN", num_args = 1..)]
    pub first: Vec<String>,

    /// Documents for slot C, placed after the second cover page
    #[arg(short = 'c', long = "second", value_name = "PATTERN", num_args = 1..)]
    pub second: Vec<String>,

    /// Directory to save the merged PDF into
    ///
    /// If the directory cannot be used or writing fails, the file is
    /// saved to the downloads directory instead.
    #[arg(short = 'd', long, value_name = "DIR", env = "PDFWEAVE_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Write one PDF per set instead of one combined PDF
    #[arg(long, env = "PDFWEAVE_PER_SET")]
    pub per_set: bool,

    /// Downloads directory used when no output directory is available
    ///
    /// Defaults to the user's downloads folder.
    #[arg(long, value_name = "DIR", env = "PDFWEAVE_DOWNLOADS_DIR")]
    pub downloads: Option<PathBuf>,

    /// Boilerplate removed from the start of the output name
    #[arg(
        long,
        value_name = "TEXT",
        env = "PDFWEAVE_PREFIX_MARKER",
        default_value = DEFAULT_ANCHOR_PREFIX
    )]
    pub prefix_marker: String,

    /// Boilerplate removed from the end of the output name
    #[arg(
        long,
        value_name = "TEXT",
        env = "PDFWEAVE_SUFFIX_MARKER",
        default_value = DEFAULT_ANCHOR_SUFFIX
    )]
    pub suffix_marker: String,

    /// Base name used when no file is selected; the date is appended
    #[arg(
        long,
        value_name = "TEXT",
        env = "PDFWEAVE_FALLBACK_NAME",
        default_value = DEFAULT_FALLBACK_NAME
    )]
    pub fallback_name: String,

    /// Verbose output (-v for details, -vv for debug logs)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print the run outcome as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        value_name = "FORMAT",
        env = "PDFWEAVE_LOG_FORMAT",
        default_value_t = LogFormatArg::Pretty
    )]
    pub log_format: LogFormatArg,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "FILE", env = "PDFWEAVE_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    /// Human-readable multi-line output
    Pretty,
    /// One line per event
    Compact,
    /// JSON lines
    Json,
}

impl Cli {
    /// Convert CLI arguments into a validated Config.
    ///
    /// # Errors
    ///
    /// Returns an error if the naming options or the downloads directory
    /// do not validate.
    pub fn to_config(&self) -> Result<Config> {
        let config = Config {
            output_mode: if self.per_set {
                OutputMode::PerSet
            } else {
                OutputMode::Combined
            },
            naming: NamingRules {
                anchor_prefix: self.prefix_marker.clone(),
                anchor_suffix: self.suffix_marker.clone(),
                fallback_name: self.fallback_name.clone(),
            },
            downloads_dir: self.downloads.clone(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Patterns given for each slot, in slot order.
    pub fn slot_patterns(&self) -> [(Slot, &[String]); 3] {
        [
            (Slot::A, self.anchor.as_slice()),
            (Slot::B, self.first.as_slice()),
            (Slot::C, self.second.as_slice()),
        ]
    }

    /// Whether any slot was given a pattern.
    pub fn has_inputs(&self) -> bool {
        self.slot_patterns()
            .iter()
            .any(|(_, patterns)| !patterns.is_empty())
    }
}

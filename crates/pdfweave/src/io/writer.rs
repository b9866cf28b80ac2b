//! Writing finished documents into a directory.
//!
//! Writes are atomic by default: the bytes go to a temporary sibling first,
//! which is then renamed over the target. An existing file with the same name
//! is overwritten; a failed write leaves nothing behind.
//!
//! # Examples
//!
//! ```no_run
//! use pdfweave::io::PdfWriter;
//! use std::path::Path;
//!
//! # async fn example(bytes: std::sync::Arc<[u8]>) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! let stats = writer.write(bytes, Path::new("out/Report - Merged.pdf")).await?;
//! println!("Wrote {} bytes in {:?}", stats.file_size, stats.write_time);
//! # Ok(())
//! # }
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task;

use crate::error::{Result, WeaveError};

/// Options for writing PDF files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Write to a temporary file, then rename.
    pub atomic: bool,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            buffer_size: 8192,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

/// Writes serialized PDFs to disk.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer without atomic writes.
    pub fn non_atomic() -> Self {
        Self {
            options: WriteOptions {
                atomic: false,
                ..Default::default()
            },
        }
    }

    /// Write `bytes` to `path`, creating or overwriting it.
    ///
    /// # Errors
    ///
    /// Returns [`WeaveError::Delivery`] if the file cannot be created,
    /// written or moved into place.
    pub async fn write(&self, bytes: Arc<[u8]>, path: &Path) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();
        let options = self.options.clone();

        task::spawn_blocking(move || write_blocking(&bytes, path_buf, &options))
            .await
            .map_err(|e| WeaveError::other(format!("Write task failed: {e}")))?
    }
}

fn write_blocking(bytes: &[u8], path: PathBuf, options: &WriteOptions) -> Result<WriteStatistics> {
    let start = Instant::now();

    let write_path = if options.atomic {
        path.with_extension("pdf.tmp")
    } else {
        path.clone()
    };

    let delivery_error = |path: &Path, source| WeaveError::Delivery {
        path: path.to_path_buf(),
        source,
    };

    let written = std::fs::File::create(&write_path).and_then(|file| {
        let mut writer = std::io::BufWriter::with_capacity(options.buffer_size, file);
        writer.write_all(bytes)?;
        writer.flush()
    });

    if let Err(e) = written {
        discard(&write_path);
        return Err(delivery_error(&write_path, e));
    }

    if options.atomic
        && let Err(e) = std::fs::rename(&write_path, &path)
    {
        discard(&write_path);
        return Err(delivery_error(&path, e));
    }

    let file_size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

    tracing::debug!(path = %path.display(), bytes = file_size, "document written");

    Ok(WriteStatistics {
        write_time: start.elapsed(),
        file_size,
        output_path: path,
    })
}

/// Remove a partially written file, if any.
fn discard(path: &Path) {
    if let Err(e) = std::fs::remove_file(path)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        tracing::warn!(path = %path.display(), error = %e, "could not remove partial file");
    }
}

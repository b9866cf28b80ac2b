//! Output sink: names the merged bytes and delivers them.
//!
//! Delivery goes to a persistent destination directory when one was
//! selected. If writing there fails, or no directory was selected, the bytes
//! are offered for manual retrieval instead. A failed persistent write is
//! never fatal on its own.

pub mod naming;
pub mod retrieval;

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task;

use crate::error::{Result, WeaveError};
use crate::io::PdfWriter;

pub use naming::{UniqueNames, output_name};
pub use retrieval::{DownloadsRetriever, MemoryRetriever, Offer, Retriever};

/// A directory the user picked for persistent output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDestination {
    dir: PathBuf,
}

impl OutputDestination {
    /// Probe `dir` and accept it as the destination.
    ///
    /// # Errors
    ///
    /// Returns [`WeaveError::CapabilityUnsupported`] if `dir` does not exist,
    /// is not a directory or is read-only.
    pub async fn select(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();

        let metadata = tokio::fs::metadata(&dir).await.map_err(|e| {
            WeaveError::capability_unsupported(format!("{}: {e}", dir.display()))
        })?;

        if !metadata.is_dir() {
            return Err(WeaveError::capability_unsupported(format!(
                "{} is not a directory",
                dir.display()
            )));
        }

        if metadata.permissions().readonly() {
            return Err(WeaveError::capability_unsupported(format!(
                "{} is not writable",
                dir.display()
            )));
        }

        tracing::debug!(dir = %dir.display(), "destination selected");
        Ok(Self { dir })
    }

    /// The destination directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Name to show for the destination: the directory's own name.
    pub fn display_name(&self) -> String {
        self.dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.dir.display().to_string())
    }
}

/// How a document reached the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Delivery {
    /// Written into the destination directory.
    Persisted {
        /// Full path of the written file.
        path: PathBuf,
    },
    /// Offered for manual retrieval.
    Offered {
        /// Where the file landed, if it is on disk.
        location: Option<PathBuf>,
        /// Why the persistent write was skipped, if one was attempted.
        fallback_reason: Option<String>,
    },
}

impl Delivery {
    /// Path of the delivered file, if known.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Persisted { path } => Some(path),
            Self::Offered { location, .. } => location.as_deref(),
        }
    }

    /// Whether a persistent write failed and retrieval took over.
    pub fn fell_back(&self) -> bool {
        matches!(
            self,
            Self::Offered {
                fallback_reason: Some(_),
                ..
            }
        )
    }
}

/// Delivers finished documents.
#[derive(Debug, Clone)]
pub struct OutputSink {
    destination: Option<OutputDestination>,
    retriever: Arc<dyn Retriever>,
    writer: PdfWriter,
}

impl OutputSink {
    /// Sink writing into `destination` when given, retrieving otherwise.
    pub fn new(destination: Option<OutputDestination>, retriever: Arc<dyn Retriever>) -> Self {
        Self {
            destination,
            retriever,
            writer: PdfWriter::new(),
        }
    }

    /// Deliver `bytes` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`WeaveError::RetrievalFailed`] only when manual retrieval
    /// fails too; a failed persistent write just falls back.
    pub async fn deliver(&self, name: &str, bytes: Arc<[u8]>) -> Result<Delivery> {
        let mut fallback_reason = None;

        if let Some(destination) = &self.destination {
            let path = destination.dir().join(name);
            match self.writer.write(Arc::clone(&bytes), &path).await {
                Ok(stats) => {
                    tracing::info!(
                        path = %stats.output_path.display(),
                        bytes = stats.file_size,
                        elapsed = ?stats.write_time,
                        "saved to destination"
                    );
                    return Ok(Delivery::Persisted {
                        path: stats.output_path,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        "saving to destination failed, falling back to download"
                    );
                    fallback_reason = Some(err.to_string());
                }
            }
        }

        let location = self.offer(name, bytes).await?;
        tracing::info!(file = name, location = ?location, "offered for download");

        Ok(Delivery::Offered {
            location,
            fallback_reason,
        })
    }

    /// Take back a file delivered earlier.
    ///
    /// # Errors
    ///
    /// Returns an error if the delivered file cannot be removed.
    pub async fn withdraw(&self, name: &str, delivery: &Delivery) -> Result<()> {
        match delivery {
            Delivery::Persisted { path } => match tokio::fs::remove_file(path).await {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "delivered file withdrawn");
                    Ok(())
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            },
            Delivery::Offered { location, .. } => {
                let retriever = Arc::clone(&self.retriever);
                let name = name.to_string();
                let location = location.clone();

                task::spawn_blocking(move || retriever.withdraw(&name, location.as_deref()))
                    .await
                    .map_err(|e| WeaveError::other(format!("Retrieval task failed: {e}")))?
            }
        }
    }

    async fn offer(&self, name: &str, bytes: Arc<[u8]>) -> Result<Option<PathBuf>> {
        let retriever = Arc::clone(&self.retriever);
        let name = name.to_string();

        task::spawn_blocking(move || retriever.offer(&name, &bytes))
            .await
            .map_err(|e| WeaveError::other(format!("Retrieval task failed: {e}")))?
    }
}

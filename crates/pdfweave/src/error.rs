//! Error types for pdfweave.
//!
//! Errors fall into two groups. Fatal errors abort a merge run and leave the
//! run in the `error` state: nothing selected, a source that cannot be read or
//! decoded, or a delivery that failed on every path. Non-fatal errors only
//! affect one optional capability: a destination directory that cannot be
//! used, or a persistent write that fails and falls back to manual retrieval.

use std::io;
use std::path::PathBuf;

use crate::registry::Slot;

/// Result type alias for pdfweave operations.
pub type Result<T> = std::result::Result<T, WeaveError>;

/// Main error type for pdfweave operations.
#[derive(Debug, thiserror::Error)]
pub enum WeaveError {
    /// All three slots were empty when the run started.
    #[error("No PDF files selected.")]
    NoInput,

    /// A source could not be read from its backing store.
    #[error("Cannot read {name}\n  Reason: {source}")]
    SourceUnreadable {
        /// Display name of the source.
        name: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A source's bytes could not be parsed as a PDF.
    #[error("Failed to load PDF {name} (slot {slot}, set {set})\n  Reason: {reason}")]
    Decode {
        /// Slot the source was selected into.
        slot: Slot,
        /// One-based set number the source belongs to.
        set: usize,
        /// Display name of the source.
        name: String,
        /// Parser message.
        reason: String,
    },

    /// Every selected document was empty, so there is nothing to write.
    #[error("The selected PDFs contain no pages.")]
    EmptyOutput,

    /// Copying pages into the output document failed.
    #[error("Failed to copy pages from {name}\n  Reason: {reason}")]
    PageCopy {
        /// Display name of the source.
        name: String,
        /// Details about the failure.
        reason: String,
    },

    /// Persistent-directory output is not available here.
    #[error("Folder selection for saving is not available: {reason}")]
    CapabilityUnsupported {
        /// Why the directory cannot be used.
        reason: String,
    },

    /// Writing into the persistent destination failed.
    #[error("Failed to save to folder: {}\n  Reason: {source}", path.display())]
    Delivery {
        /// Path that was being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Handing the bytes over for manual retrieval failed.
    #[error("Failed to offer {name} for download\n  Reason: {source}")]
    RetrievalFailed {
        /// Output name that was being offered.
        name: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Serializing the merged document failed.
    #[error("Failed to write merged PDF\n  Reason: {reason}")]
    Serialize {
        /// Serializer message.
        reason: String,
    },

    /// A merge run is already processing.
    #[error("A merge is already in progress")]
    RunInProgress,

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        message: String,
    },

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for WeaveError {
    fn from(err: lopdf::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl WeaveError {
    /// Create a Decode error.
    pub fn decode(
        slot: Slot,
        index: usize,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Decode {
            slot,
            set: index + 1,
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a PageCopy error.
    pub fn page_copy(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PageCopy {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a CapabilityUnsupported error.
    pub fn capability_unsupported(reason: impl Into<String>) -> Self {
        Self::CapabilityUnsupported {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error ends a merge run.
    ///
    /// Destination problems never do: they only push delivery onto the
    /// manual-retrieval path.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::CapabilityUnsupported { .. } | Self::Delivery { .. }
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoInput => 1,
            Self::EmptyOutput => 1,
            Self::SourceUnreadable { .. } => 2,
            Self::Decode { .. } => 3,
            Self::PageCopy { .. } => 3,
            Self::CapabilityUnsupported { .. } => 4,
            Self::Delivery { .. } => 5,
            Self::RetrievalFailed { .. } => 5,
            Self::Serialize { .. } => 6,
            Self::RunInProgress => 7,
            Self::InvalidConfig { .. } => 1,
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}

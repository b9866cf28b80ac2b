//! Manual retrieval: handing the bytes to the user without a chosen folder.
//!
//! [`DownloadsRetriever`] drops the file into the downloads directory, staged
//! through a transient file that is released as soon as the hand-off is done.
//! [`MemoryRetriever`] keeps offers in memory for embedding and tests.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tempfile::NamedTempFile;

use crate::error::{Result, WeaveError};

/// Offers bytes to the user under a suggested file name.
pub trait Retriever: fmt::Debug + Send + Sync {
    /// Hand `bytes` over as `name`.
    ///
    /// Returns where the file ended up, if it landed somewhere on disk.
    ///
    /// # Errors
    ///
    /// Returns [`WeaveError::RetrievalFailed`] if the hand-off fails.
    fn offer(&self, name: &str, bytes: &[u8]) -> Result<Option<PathBuf>>;

    /// Take back a file handed over by [`Retriever::offer`].
    ///
    /// `location` is what `offer` returned. The default does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    fn withdraw(&self, name: &str, location: Option<&Path>) -> Result<()> {
        let _ = (name, location);
        Ok(())
    }
}

/// Saves offered files into a downloads directory.
#[derive(Debug, Clone)]
pub struct DownloadsRetriever {
    dir: PathBuf,
}

impl DownloadsRetriever {
    /// Retriever that saves into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Retriever for the user's downloads directory, or the working
    /// directory when the platform has none.
    pub fn user_downloads() -> Self {
        let dir = dirs::download_dir()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir)
    }

    /// Directory files are saved into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Retriever for DownloadsRetriever {
    fn offer(&self, name: &str, bytes: &[u8]) -> Result<Option<PathBuf>> {
        let failed = |source| WeaveError::RetrievalFailed {
            name: name.to_string(),
            source,
        };

        std::fs::create_dir_all(&self.dir).map_err(failed)?;

        let mut staged = NamedTempFile::new_in(&self.dir).map_err(failed)?;
        staged.write_all(bytes).map_err(failed)?;
        staged.flush().map_err(failed)?;

        let target = self.dir.join(name);
        staged.persist(&target).map_err(|e| failed(e.error))?;

        tracing::debug!(path = %target.display(), "offered for download");
        Ok(Some(target))
    }

    fn withdraw(&self, _name: &str, location: Option<&Path>) -> Result<()> {
        let Some(path) = location else {
            return Ok(());
        };
        match std::fs::remove_file(path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "download withdrawn");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// One file handed to a [`MemoryRetriever`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    /// Suggested file name.
    pub name: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Keeps offered files in memory.
#[derive(Debug, Default)]
pub struct MemoryRetriever {
    offers: Mutex<Vec<Offer>>,
}

impl MemoryRetriever {
    /// Create an empty retriever.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything offered so far, oldest first.
    pub fn offers(&self) -> Vec<Offer> {
        self.offers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Retriever for MemoryRetriever {
    fn offer(&self, name: &str, bytes: &[u8]) -> Result<Option<PathBuf>> {
        self.offers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Offer {
                name: name.to_string(),
                bytes: bytes.to_vec(),
            });
        Ok(None)
    }

    fn withdraw(&self, name: &str, _location: Option<&Path>) -> Result<()> {
        let mut offers = self.offers.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(last) = offers.iter().rposition(|offer| offer.name == name) {
            offers.remove(last);
        }
        Ok(())
    }
}

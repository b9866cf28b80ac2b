//! Configuration for a pdfweave session.
//!
//! Front ends turn their arguments into a [`Config`]; the library validates it
//! and never reads the environment on its own.

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Result, WeaveError};

/// Marker the anchor documents' file names start with.
pub const DEFAULT_ANCHOR_PREFIX: &str = "PMA Report_";

/// Marker the anchor documents' file names end with.
pub const DEFAULT_ANCHOR_SUFFIX: &str = " - PMA Report";

/// Base name used when no source is selected.
pub const DEFAULT_FALLBACK_NAME: &str = "Merged_PDF";

/// How merged pages are split into output files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Every set goes into one combined document.
    #[default]
    Combined,
    /// One document per set.
    PerSet,
}

impl FromStr for OutputMode {
    type Err = WeaveError;

    /// Parse an output mode: "combined" or "per-set".
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "combined" => Ok(Self::Combined),
            "per-set" | "per_set" => Ok(Self::PerSet),
            _ => Err(WeaveError::invalid_config(format!(
                "Invalid output mode: {s}. Must be one of: combined, per-set"
            ))),
        }
    }
}

/// Rules for deriving output file names from source names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingRules {
    /// Boilerplate removed from the front of the base name.
    pub anchor_prefix: String,
    /// Boilerplate removed from the end of the base name.
    pub anchor_suffix: String,
    /// Base name used when nothing is selected; the date is appended.
    pub fallback_name: String,
}

impl Default for NamingRules {
    fn default() -> Self {
        Self {
            anchor_prefix: DEFAULT_ANCHOR_PREFIX.to_string(),
            anchor_suffix: DEFAULT_ANCHOR_SUFFIX.to_string(),
            fallback_name: DEFAULT_FALLBACK_NAME.to_string(),
        }
    }
}

/// Complete configuration for a merge session.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Combined or per-set output.
    pub output_mode: OutputMode,

    /// File naming rules.
    pub naming: NamingRules,

    /// Where manually retrieved files land. `None` means the user's
    /// downloads directory.
    pub downloads_dir: Option<PathBuf>,
}

impl Config {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The fallback name is empty or contains a path separator
    /// - A naming marker contains a path separator
    /// - The downloads directory is an empty path
    pub fn validate(&self) -> Result<()> {
        let fallback = self.naming.fallback_name.trim();
        if fallback.is_empty() {
            return Err(WeaveError::invalid_config("Fallback name cannot be empty"));
        }

        for (what, value) in [
            ("Fallback name", fallback),
            ("Prefix marker", self.naming.anchor_prefix.as_str()),
            ("Suffix marker", self.naming.anchor_suffix.as_str()),
        ] {
            if value.contains(['/', '\\']) {
                return Err(WeaveError::invalid_config(format!(
                    "{what} cannot contain a path separator: {value}"
                )));
            }
        }

        if let Some(dir) = &self.downloads_dir
            && dir.as_os_str().is_empty()
        {
            return Err(WeaveError::invalid_config("Downloads directory cannot be empty"));
        }

        Ok(())
    }
}

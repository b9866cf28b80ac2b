//! Output file names.
//!
//! The name comes from the first selected source: its extension is dropped,
//! the anchor boilerplate markers are cut out, and `" - Merged.pdf"` is
//! appended. With no source at all, a dated fallback is used instead.

use chrono::NaiveDate;
use std::collections::HashSet;

use crate::config::NamingRules;
use crate::registry::DocumentSource;

/// Appended to every derived base name.
pub const MERGED_SUFFIX: &str = " - Merged.pdf";

/// Drop a trailing `.ext`, where `ext` contains neither `.` nor `/`.
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) if dot + 1 < name.len() && !name[dot + 1..].contains('/') => &name[..dot],
        _ => name,
    }
}

/// Base name derived from a source name, before the suffix is added.
///
/// Only the first occurrence of each marker is removed.
pub fn base_name(source_name: &str, rules: &NamingRules) -> String {
    let mut base = strip_extension(source_name).to_string();
    for marker in [&rules.anchor_prefix, &rules.anchor_suffix] {
        if !marker.is_empty() {
            base = base.replacen(marker.as_str(), "", 1);
        }
    }
    base
}

/// Fallback base name for `today`: `<fallback>_<YYYY-MM-DD>`.
pub fn fallback_base(rules: &NamingRules, today: NaiveDate) -> String {
    format!("{}_{}", rules.fallback_name, today.format("%Y-%m-%d"))
}

/// Final output name for a merge whose first source is `first`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use pdfweave::config::NamingRules;
/// use pdfweave::registry::DocumentSource;
/// use pdfweave::sink::naming::output_name;
///
/// let first = DocumentSource::from_path("PMA Report_Acme Q3 - PMA Report.pdf");
/// let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
/// assert_eq!(
///     output_name(Some(&first), &NamingRules::default(), today),
///     "Acme Q3 - Merged.pdf"
/// );
/// ```
pub fn output_name(
    first: Option<&DocumentSource>,
    rules: &NamingRules,
    today: NaiveDate,
) -> String {
    let base = match first {
        Some(source) => base_name(source.name(), rules),
        None => fallback_base(rules, today),
    };
    format!("{base}{MERGED_SUFFIX}")
}

/// Today's date for fallback names, in UTC.
pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

/// Hands out names that are unique within one run.
///
/// A repeated name gets ` (2)`, ` (3)` and so on inserted before the
/// extension.
#[derive(Debug, Default)]
pub struct UniqueNames {
    taken: HashSet<String>,
}

impl UniqueNames {
    /// Create an empty name set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `name`, or the first numbered variant that is still free.
    pub fn claim(&mut self, name: &str) -> String {
        if self.taken.insert(name.to_string()) {
            return name.to_string();
        }

        let stem = strip_extension(name);
        let extension = &name[stem.len()..];
        let mut n = 2;
        loop {
            let candidate = format!("{stem} ({n}){extension}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

//! Utilities for path collection and PDF object-graph copying.

use crate::{Result, error::WeaveError};
use lopdf::{Document, Object};
use std::path::PathBuf;

/// Expand multiple glob patterns into file paths.
///
/// Accepts anything iterable with items that convert to `&str`, e.g.
/// `&[&str]`, `Vec<String>`, or `Vec<&str>`. Directories matched by a
/// pattern are skipped.
///
/// Errors:
/// - Propagates `glob` parse errors.
/// - Propagates filesystem errors from the glob iterator.
pub fn collect_paths_for_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for pattern in patterns.into_iter() {
        let paths = collect_paths_for_pattern(pattern)?;
        resolved_paths.extend(paths);
    }

    Ok(resolved_paths)
}

/// Expand a single glob pattern into file paths, in lexical order.
fn collect_paths_for_pattern<P: AsRef<str>>(pattern: P) -> Result<Vec<PathBuf>> {
    let mut resolved_paths = Vec::new();

    let paths = glob::glob(pattern.as_ref()).map_err(|err| {
        WeaveError::invalid_config(format!("Invalid pattern '{}': {err}", pattern.as_ref()))
    })?;

    for entry in paths {
        let path = entry.map_err(|err| WeaveError::other(err.to_string()))?;
        if path.is_file() {
            resolved_paths.push(path);
        }
    }

    Ok(resolved_paths)
}

/// Copy every object reachable from `obj` out of `source` into `target`.
///
/// Objects already present in `target` are not revisited, which also stops
/// cycles. The `/Parent` of page-tree nodes is never followed, so copying one
/// page does not drag the rest of its source page tree along.
///
/// Required when merging PDFs using `lopdf` to ensure that all referenced
/// objects exist in the final document.
pub fn copy_references(target: &mut Document, source: &Document, obj: &Object) {
    match obj {
        Object::Reference(ref_id) => {
            if !target.objects.contains_key(ref_id)
                && let Ok(referenced_obj) = source.get_object(*ref_id)
            {
                target.objects.insert(*ref_id, referenced_obj.clone());
                copy_references(target, source, referenced_obj);
            }
        }
        Object::Dictionary(dict) => {
            let page_node = dict
                .get(b"Type")
                .and_then(Object::as_name)
                .is_ok_and(|name| name == b"Page" || name == b"Pages");

            for (key, value) in dict.iter() {
                if page_node && key.as_slice() == b"Parent" {
                    continue;
                }
                copy_references(target, source, value);
            }
        }
        Object::Array(arr) => {
            for item in arr {
                copy_references(target, source, item);
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter() {
                copy_references(target, source, value);
            }
        }
        _ => {}
    }
}

//! The positional merge template.
//!
//! Within one set, the anchor document from slot A brackets the two body
//! sections: its first page, all of B, its second page, all of C. Without an
//! anchor there is nothing to bracket, so B and C are simply concatenated.
//!
//! ```text
//! A present:  [A.0] [B.0 .. B.p-1] [A.1] [C.0 .. C.q-1]
//! A absent:   [B.0 .. B.p-1] [C.0 .. C.q-1]
//! ```
//!
//! Planning is pure: it only needs to know which slots contribute a document
//! to the set and how many pages each has.

use std::ops::Range;

use crate::registry::Slot;

/// Presence and page count of each slot's document within one set.
///
/// `None` means the slot has no document at this set index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetShape {
    /// Page count of the anchor document.
    pub a: Option<usize>,
    /// Page count of the first body section.
    pub b: Option<usize>,
    /// Page count of the second body section.
    pub c: Option<usize>,
}

impl SetShape {
    /// Page count for one slot.
    pub fn get(&self, slot: Slot) -> Option<usize> {
        match slot {
            Slot::A => self.a,
            Slot::B => self.b,
            Slot::C => self.c,
        }
    }
}

/// Copy a contiguous run of pages from one slot's document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOp {
    /// Slot whose document the pages come from.
    pub slot: Slot,
    /// Zero-based page indices, never empty.
    pub pages: Range<usize>,
}

impl CopyOp {
    fn new(slot: Slot, pages: Range<usize>) -> Self {
        Self { slot, pages }
    }

    /// Page indices as a vector.
    pub fn indices(&self) -> Vec<usize> {
        self.pages.clone().collect()
    }
}

/// Compute the ordered copy operations for one set.
///
/// Documents with zero pages contribute nothing. An anchor with a single
/// page simply has no second bracket; pages of the anchor past the second
/// are never used.
pub fn plan_set(shape: SetShape) -> Vec<CopyOp> {
    let mut ops = Vec::with_capacity(4);
    let mut push = |slot: Slot, pages: Range<usize>| {
        if !pages.is_empty() {
            ops.push(CopyOp::new(slot, pages));
        }
    };

    match shape.a {
        Some(anchor_pages) => {
            push(Slot::A, 0..anchor_pages.min(1));
            if let Some(pages) = shape.b {
                push(Slot::B, 0..pages);
            }
            if anchor_pages > 1 {
                push(Slot::A, 1..2);
            }
            if let Some(pages) = shape.c {
                push(Slot::C, 0..pages);
            }
        }
        None => {
            if let Some(pages) = shape.b {
                push(Slot::B, 0..pages);
            }
            if let Some(pages) = shape.c {
                push(Slot::C, 0..pages);
            }
        }
    }

    ops
}

/// Total pages a plan emits.
pub fn planned_page_count(ops: &[CopyOp]) -> usize {
    ops.iter().map(|op| op.pages.len()).sum()
}

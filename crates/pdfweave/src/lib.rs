//! pdfweave - Interleave cover, body and appendix PDFs set by set.
//!
//! Documents are selected into three slots. The i-th document of every slot
//! forms set `i`, and each set is merged as: first page of the slot A
//! document, all of slot B, second page of slot A, all of slot C. Sets are
//! concatenated in order and the result is written to a chosen folder or,
//! failing that, offered for download.
//!
//! # Examples
//!
//! ## Session
//!
//! ```no_run
//! use pdfweave::{Config, Session, Slot};
//! use pdfweave::state::RunStatus;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = Session::new(Config::default())?;
//! session.select_paths(Slot::A, ["covers/*.pdf"])?;
//! session.select_paths(Slot::B, ["reports/*.pdf"])?;
//! session.select_paths(Slot::C, ["appendix/*.pdf"])?;
//!
//! let mut report = |progress: u8, status: RunStatus| println!("{status:?}: {progress}%");
//! let outcome = session.run(&mut report).await?;
//! println!("Created {} page document", outcome.statistics.total_pages);
//! # Ok(())
//! # }
//! ```
//!
//! ## Using Individual Components
//!
//! ```
//! use pdfweave::merge::{SetShape, plan_set};
//! use pdfweave::Slot;
//!
//! let plan = plan_set(SetShape { a: Some(2), b: Some(3), c: Some(1) });
//! let slots: Vec<Slot> = plan.iter().map(|op| op.slot).collect();
//! assert_eq!(slots, vec![Slot::A, Slot::B, Slot::A, Slot::C]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod io;
pub mod merge;
pub mod registry;
pub mod session;
pub mod sink;
pub mod state;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::{Config, OutputMode};
pub use error::{Result, WeaveError};
pub use merge::{NoProgress, ProgressObserver};
pub use registry::{DocumentSource, Slot, SourceRegistry};
pub use session::{RunOutcome, Session};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

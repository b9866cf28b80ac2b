//! Reading source documents and writing finished ones.

pub mod reader;
pub mod writer;

pub use reader::{DecodedDocument, PdfReader};
pub use writer::{PdfWriter, WriteOptions, WriteStatistics};

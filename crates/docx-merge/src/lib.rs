//! Keyword merge for WordprocessingML (`.docx`) templates
//!
//! Templates carry bracket keywords such as `[ClientName]` in their text.
//! `merge` replaces them with resolved text, even when Word has split a
//! keyword over several formatting runs, and turns multi-line replacements
//! into separate paragraphs with bullet or numbered list styling.
//!
//! All parsing happens before any mutation: a malformed package is rejected
//! with `MergeError::MalformedDocument` and never partially rewritten.

pub mod error;
pub mod merge;
pub mod model;
pub mod package;
pub mod xml;

pub use error::MergeError;
pub use merge::{merge, merge_with_options, MergeOptions, NumberingCounter};
pub use model::{outline, paragraph_texts, Block};
pub use package::Package;

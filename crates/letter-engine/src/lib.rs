//! Engagement letter generation
//!
//! Ties the rules engine to the document merge: a case's answers select a
//! template and resolve its keywords, the template is loaded through a
//! [`TemplateStore`] and merged into the finished letter.

pub mod error;
pub mod generator;
pub mod store;

pub use error::GenerationError;
pub use generator::{file_name, GeneratedLetter, LetterGenerator};
pub use store::{FsTemplateStore, MemoryTemplateStore, TemplateStore};

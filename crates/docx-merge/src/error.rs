use thiserror::Error;

#[derive(Error, Debug)]
pub enum MergeError {
    /// Bad ZIP container, unparsable XML, missing main part or body
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Failed to write package: {0}")]
    PackageWrite(String),
}

impl MergeError {
    pub(crate) fn malformed(context: &str, err: impl std::fmt::Display) -> Self {
        MergeError::MalformedDocument(format!("{}: {}", context, err))
    }
}

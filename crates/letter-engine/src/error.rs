use docx_merge::MergeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Questionnaire {0} is not active")]
    InactiveQuestionnaire(String),

    #[error("No template matched for questionnaire {questionnaire_id}")]
    NoTemplateMatched { questionnaire_id: String },

    #[error("Template file not found: {path}")]
    MissingTemplateFile { path: String },

    #[error("Template path leaves the template root: {0}")]
    InvalidTemplatePath(String),

    #[error("Failed to read template {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Merge(#[from] MergeError),
}

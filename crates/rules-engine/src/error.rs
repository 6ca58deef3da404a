use letter_types::AnswerDecodeError;
use thiserror::Error;

/// Why a single condition could not be evaluated.
///
/// Never fatal: the evaluator logs it and treats the condition as false.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("No answer for question {0}")]
    NoAnswer(String),

    #[error("Failed to decode {field} for question {question_id}: {source}")]
    DecodeFailure {
        question_id: String,
        field: &'static str,
        #[source]
        source: AnswerDecodeError,
    },
}

//! Answer storage and the JSON-array answer encoding
//!
//! Every stored answer is a JSON array of strings, even for single-valued
//! questions (`["Yes"]`). Multi-select answers carry one element per choice.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use crate::types::{QuestionType, Questionnaire};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnswerDecodeError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Expected a JSON array, found: {0}")]
    NotAnArray(String),

    #[error("Array element {0} is not a scalar value")]
    NonScalarElement(usize),
}

/// Decode a JSON-array encoded answer into its string elements.
///
/// Numbers and booleans are accepted and rendered as text; nested arrays,
/// objects and nulls are rejected.
pub fn decode_answer_list(raw: &str) -> Result<Vec<String>, AnswerDecodeError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| AnswerDecodeError::InvalidJson(e.to_string()))?;

    let Value::Array(items) = value else {
        return Err(AnswerDecodeError::NotAnArray(raw.chars().take(40).collect()));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            _ => Err(AnswerDecodeError::NonScalarElement(index)),
        })
        .collect()
}

/// Encode answer values into the stored JSON-array form
pub fn encode_answer_list<S: AsRef<str>>(values: &[S]) -> String {
    let values: Vec<&str> = values.iter().map(|v| v.as_ref()).collect();
    // Serializing a Vec<&str> cannot fail
    serde_json::to_string(&values).unwrap_or_else(|_| "[]".to_string())
}

/// Read access to one case's answers, keyed by question id
pub trait AnswerSource {
    /// Raw stored answer (JSON-array encoded), if the question was answered
    fn raw_answer(&self, question_id: &str) -> Option<&str>;

    /// Type of the referenced question, if known
    fn question_type(&self, question_id: &str) -> Option<QuestionType>;
}

/// In-memory answer set for one case
#[derive(Debug, Clone, Default)]
pub struct CaseAnswers {
    answers: HashMap<String, String>,
    question_types: HashMap<String, QuestionType>,
}

impl CaseAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty answer set that knows the question types of `questionnaire`
    pub fn for_questionnaire(questionnaire: &Questionnaire) -> Self {
        let question_types = questionnaire
            .questions
            .iter()
            .map(|q| (q.id.clone(), q.question_type))
            .collect();
        Self {
            answers: HashMap::new(),
            question_types,
        }
    }

    /// Store a raw (already encoded) answer
    pub fn insert_raw(&mut self, question_id: impl Into<String>, raw: impl Into<String>) {
        self.answers.insert(question_id.into(), raw.into());
    }

    /// Store answer values, encoding them as a JSON array
    pub fn insert_values<S: AsRef<str>>(&mut self, question_id: impl Into<String>, values: &[S]) {
        self.answers
            .insert(question_id.into(), encode_answer_list(values));
    }

    pub fn set_question_type(&mut self, question_id: impl Into<String>, kind: QuestionType) {
        self.question_types.insert(question_id.into(), kind);
    }

    pub fn with_values<S: AsRef<str>>(mut self, question_id: &str, values: &[S]) -> Self {
        self.insert_values(question_id, values);
        self
    }

    pub fn with_type(mut self, question_id: &str, kind: QuestionType) -> Self {
        self.set_question_type(question_id, kind);
        self
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.answers.contains_key(question_id)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

impl AnswerSource for CaseAnswers {
    fn raw_answer(&self, question_id: &str) -> Option<&str> {
        self.answers.get(question_id).map(String::as_str)
    }

    fn question_type(&self, question_id: &str) -> Option<QuestionType> {
        self.question_types.get(question_id).copied()
    }
}

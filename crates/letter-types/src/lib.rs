//! Shared data model for engagement letter generation
//!
//! Questionnaires, answers, condition sets and the records that hang
//! conditions off them (templates, replacement entries, conditional responses).

pub mod answers;
pub mod catalog;
pub mod condition;
pub mod substitution;
pub mod types;

pub use answers::{
    decode_answer_list, encode_answer_list, AnswerDecodeError, AnswerSource, CaseAnswers,
};
pub use catalog::{
    normalize_keyword, Catalog, ConditionalResponse, PriorityLevel, ReplacementContent,
    ReplacementEntry, Template,
};
pub use condition::{Condition, ConditionSet, ConditionType, LogicOperator, ParseError};
pub use substitution::SubstitutionMap;
pub use types::{Question, QuestionType, Questionnaire};

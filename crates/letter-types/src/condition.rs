//! Conditions and condition sets
//!
//! A condition compares one question's answer with an expected value. Its
//! `logic_operator` says how it combines with the *next* condition of the
//! set; the chain is folded strictly left to right.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid condition type: {0}")]
    InvalidConditionType(String),

    #[error("Invalid logic operator: {0}")]
    InvalidLogicOperator(String),
}

/// Comparison applied between an answer and the expected value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ConditionType {
    #[default]
    Equals,
    Contains,
    GreaterThan,
    LessThan,
    NotEquals,
}

impl ConditionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ConditionType::Equals => "Equals",
            ConditionType::Contains => "Contains",
            ConditionType::GreaterThan => "GreaterThan",
            ConditionType::LessThan => "LessThan",
            ConditionType::NotEquals => "NotEquals",
        }
    }
}

impl FromStr for ConditionType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equals" => Ok(ConditionType::Equals),
            "contains" => Ok(ConditionType::Contains),
            "greaterthan" => Ok(ConditionType::GreaterThan),
            "lessthan" => Ok(ConditionType::LessThan),
            "notequals" => Ok(ConditionType::NotEquals),
            _ => Err(ParseError::InvalidConditionType(s.to_string())),
        }
    }
}

impl TryFrom<String> for ConditionType {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ConditionType> for String {
    fn from(value: ConditionType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a condition combines with its successor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LogicOperator {
    #[default]
    And,
    Or,
}

impl LogicOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            LogicOperator::And => "AND",
            LogicOperator::Or => "OR",
        }
    }

    /// Fold `next` into the running result
    pub fn combine(self, acc: bool, next: bool) -> bool {
        match self {
            LogicOperator::And => acc && next,
            LogicOperator::Or => acc || next,
        }
    }
}

impl FromStr for LogicOperator {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" => Ok(LogicOperator::And),
            "OR" => Ok(LogicOperator::Or),
            _ => Err(ParseError::InvalidLogicOperator(s.to_string())),
        }
    }
}

impl TryFrom<String> for LogicOperator {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LogicOperator> for String {
    fn from(value: LogicOperator) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for LogicOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub question_id: String,
    /// JSON-array encoded expected answer; one element for Radio/Text,
    /// one or more for CheckBox
    #[serde(default = "empty_list", alias = "expectedAnswer", alias = "textResponse")]
    pub expected_value: String,
    #[serde(default)]
    pub condition_type: ConditionType,
    #[serde(default)]
    pub logic_operator: LogicOperator,
    #[serde(default)]
    pub order_index: i32,
}

impl Condition {
    /// `Equals` condition joined to its successor with AND
    pub fn new(question_id: impl Into<String>, expected_value: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            expected_value: expected_value.into(),
            condition_type: ConditionType::Equals,
            logic_operator: LogicOperator::And,
            order_index: 0,
        }
    }

    pub fn with_type(mut self, condition_type: ConditionType) -> Self {
        self.condition_type = condition_type;
        self
    }

    pub fn with_logic(mut self, logic_operator: LogicOperator) -> Self {
        self.logic_operator = logic_operator;
        self
    }

    pub fn with_order(mut self, order_index: i32) -> Self {
        self.order_index = order_index;
        self
    }
}

fn empty_list() -> String {
    "[]".to_string()
}

/// Ordered conditions owned by one template, replacement entry or
/// conditional response. Replaced wholesale on edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionSet(Vec<Condition>);

impl ConditionSet {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self(conditions)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Conditions in evaluation order: by `order_index`, insertion order on ties
    pub fn ordered(&self) -> Vec<&Condition> {
        let mut ordered: Vec<&Condition> = self.0.iter().collect();
        ordered.sort_by_key(|c| c.order_index);
        ordered
    }

    pub fn first_ordered(&self) -> Option<&Condition> {
        self.0.iter().min_by_key(|c| c.order_index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.0.iter()
    }
}

impl From<Vec<Condition>> for ConditionSet {
    fn from(conditions: Vec<Condition>) -> Self {
        Self(conditions)
    }
}

impl FromIterator<Condition> for ConditionSet {
    fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn condition_type_parse_ignores_case(
            kind in prop::sample::select(vec!["Equals", "NotEquals", "Contains", "GreaterThan", "LessThan"]),
            flips in prop::collection::vec(any::<bool>(), 11),
        ) {
            let mixed: String = kind
                .chars()
                .zip(flips.iter().cycle())
                .map(|(c, upper)| if *upper { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() })
                .collect();
            let parsed: ConditionType = mixed.parse().unwrap();
            prop_assert_eq!(parsed.as_str(), kind);
        }

        #[test]
        fn unknown_operator_is_rejected(word in "[a-z]{1,8}") {
            prop_assume!(word != "and" && word != "or");
            prop_assert!(word.parse::<LogicOperator>().is_err());
        }
    }
}

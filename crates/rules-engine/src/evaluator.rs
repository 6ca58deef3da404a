//! Condition set evaluation
//!
//! The set is folded strictly left to right: the result of condition 0 seeds
//! the accumulator, and each following condition is merged in with the
//! *previous* condition's logic operator. There is no AND-over-OR precedence,
//! so `[A OR, B AND, C]` means `(A || B) && C`.

use letter_types::{
    decode_answer_list, AnswerSource, Condition, ConditionSet, ConditionType, QuestionType,
};
use tracing::{debug, trace};

use crate::error::EvaluationError;

/// Comparison strategy, keyed by the referenced question's type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerShape {
    /// Radio / Text: compare the first answer element against one expected value
    SingleValue,
    /// CheckBox: every expected option must be among the selected options
    MultiSelect,
}

impl AnswerShape {
    /// Questions of unknown type are treated as single-valued
    pub fn of(question_type: Option<QuestionType>) -> Self {
        match question_type {
            Some(QuestionType::CheckBox) => AnswerShape::MultiSelect,
            _ => AnswerShape::SingleValue,
        }
    }

    fn evaluate(self, condition: &Condition, raw_answer: &str) -> Result<bool, EvaluationError> {
        let actual = decode_answer_list(raw_answer).map_err(|source| {
            EvaluationError::DecodeFailure {
                question_id: condition.question_id.clone(),
                field: "answer",
                source,
            }
        })?;
        if actual.is_empty() {
            return Err(EvaluationError::NoAnswer(condition.question_id.clone()));
        }

        match self {
            AnswerShape::MultiSelect => {
                let expected = decode_answer_list(&condition.expected_value).map_err(|source| {
                    EvaluationError::DecodeFailure {
                        question_id: condition.question_id.clone(),
                        field: "expected value",
                        source,
                    }
                })?;
                Ok(match condition.condition_type {
                    ConditionType::Equals | ConditionType::Contains => {
                        expected.iter().all(|option| actual.contains(option))
                    }
                    // Ordering and negation have no meaning for option sets
                    ConditionType::GreaterThan
                    | ConditionType::LessThan
                    | ConditionType::NotEquals => false,
                })
            }
            AnswerShape::SingleValue => {
                let expected = expected_scalar(&condition.expected_value);
                Ok(compare_scalar(condition.condition_type, &actual[0], &expected))
            }
        }
    }
}

/// True when the condition set holds for `answers`. Empty sets always hold.
pub fn is_satisfied<A>(conditions: &ConditionSet, answers: &A) -> bool
where
    A: AnswerSource + ?Sized,
{
    let ordered = conditions.ordered();
    let Some((first, rest)) = ordered.split_first() else {
        return true;
    };

    let mut result = condition_holds(first, answers);
    let mut previous = *first;
    for &condition in rest {
        let next = condition_holds(condition, answers);
        result = previous.logic_operator.combine(result, next);
        previous = condition;
    }

    trace!(conditions = ordered.len(), result, "condition set evaluated");
    result
}

/// Evaluate one condition, reporting why it could not be evaluated
pub fn evaluate_condition<A>(condition: &Condition, answers: &A) -> Result<bool, EvaluationError>
where
    A: AnswerSource + ?Sized,
{
    let raw = answers
        .raw_answer(&condition.question_id)
        .ok_or_else(|| EvaluationError::NoAnswer(condition.question_id.clone()))?;

    AnswerShape::of(answers.question_type(&condition.question_id)).evaluate(condition, raw)
}

fn condition_holds<A>(condition: &Condition, answers: &A) -> bool
where
    A: AnswerSource + ?Sized,
{
    match evaluate_condition(condition, answers) {
        Ok(result) => result,
        Err(e) => {
            debug!(
                question_id = %condition.question_id,
                condition_type = %condition.condition_type,
                "condition treated as false: {}",
                e
            );
            false
        }
    }
}

/// First element of a JSON-array expected value, or the raw text when it is
/// not an array (or an empty one)
fn expected_scalar(expected_value: &str) -> String {
    match decode_answer_list(expected_value) {
        Ok(values) if !values.is_empty() => values.into_iter().next().unwrap_or_default(),
        _ => expected_value.to_string(),
    }
}

fn compare_scalar(condition_type: ConditionType, actual: &str, expected: &str) -> bool {
    match condition_type {
        ConditionType::Equals => actual.to_lowercase() == expected.to_lowercase(),
        ConditionType::NotEquals => actual.to_lowercase() != expected.to_lowercase(),
        ConditionType::Contains => actual.to_lowercase().contains(&expected.to_lowercase()),
        ConditionType::GreaterThan => match (parse_decimal(actual), parse_decimal(expected)) {
            (Some(a), Some(e)) => a > e,
            _ => false,
        },
        ConditionType::LessThan => match (parse_decimal(actual), parse_decimal(expected)) {
            (Some(a), Some(e)) => a < e,
            _ => false,
        },
    }
}

/// Parse a plain decimal number: optional sign, digits, optional fraction,
/// `,` group separators allowed. Exponents, NaN and infinities are rejected.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    let unsigned = cleaned
        .strip_prefix(&['+', '-'][..])
        .unwrap_or(cleaned.as_str());

    if !unsigned.chars().any(|c| c.is_ascii_digit())
        || !unsigned.chars().all(|c| c.is_ascii_digit() || c == '.')
        || unsigned.matches('.').count() > 1
    {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use letter_types::{CaseAnswers, LogicOperator};
    use proptest::prelude::*;

    proptest! {
        /// Property: comparisons against non-numeric text never hold
        #[test]
        fn ordering_against_words_is_false(word in "[a-zA-Z ]{1,20}", n in -1000i32..1000) {
            let answers = CaseAnswers::new().with_values("q", &[word.as_str()]);
            for condition_type in [ConditionType::GreaterThan, ConditionType::LessThan] {
                let condition = Condition::new("q", format!("[\"{}\"]", n)).with_type(condition_type);
                prop_assert_eq!(evaluate_condition(&condition, &answers), Ok(false));
            }
        }

        /// Property: an OR chain holds iff any condition holds
        #[test]
        fn or_chain_is_any(outcomes in prop::collection::vec(any::<bool>(), 1..8)) {
            let mut answers = CaseAnswers::new();
            let conditions: Vec<Condition> = outcomes
                .iter()
                .enumerate()
                .map(|(i, hit)| {
                    let id = format!("q{}", i);
                    answers.insert_values(id.clone(), &["yes"]);
                    let expected = if *hit { r#"["yes"]"# } else { r#"["no"]"# };
                    Condition::new(id, expected)
                        .with_logic(LogicOperator::Or)
                        .with_order(i as i32)
                })
                .collect();
            let set = ConditionSet::new(conditions);
            prop_assert_eq!(is_satisfied(&set, &answers), outcomes.iter().any(|b| *b));
        }

        /// Property: an AND chain holds iff every condition holds
        #[test]
        fn and_chain_is_all(outcomes in prop::collection::vec(any::<bool>(), 1..8)) {
            let mut answers = CaseAnswers::new();
            let conditions: Vec<Condition> = outcomes
                .iter()
                .enumerate()
                .map(|(i, hit)| {
                    let id = format!("q{}", i);
                    answers.insert_values(id.clone(), &["yes"]);
                    let expected = if *hit { r#"["yes"]"# } else { r#"["no"]"# };
                    Condition::new(id, expected).with_order(i as i32)
                })
                .collect();
            let set = ConditionSet::new(conditions);
            prop_assert_eq!(is_satisfied(&set, &answers), outcomes.iter().all(|b| *b));
        }

        /// Property: evaluation never panics on arbitrary stored answers
        #[test]
        fn arbitrary_answers_never_panic(raw in "\\PC*", expected in "\\PC*") {
            let mut answers = CaseAnswers::new().with_type("q", QuestionType::CheckBox);
            answers.insert_raw("q", raw.clone());
            let set = ConditionSet::new(vec![Condition::new("q", expected.clone())]);
            let _ = is_satisfied(&set, &answers);

            let mut answers = CaseAnswers::new();
            answers.insert_raw("q", raw);
            let _ = is_satisfied(&set, &answers);
        }
    }
}

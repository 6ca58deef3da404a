//! Conditional responses: answers derived from other answers

use letter_types::{decode_answer_list, CaseAnswers, ConditionalResponse};
use tracing::{debug, warn};

use crate::evaluator::is_satisfied;

/// Fill unanswered questions from the conditional responses that hold.
///
/// Responses are applied in input order and each filled answer is visible
/// to later responses. Questions the case already answered are never
/// overwritten. A response that is not a valid answer list is skipped.
pub fn derive_answers(
    responses: &[ConditionalResponse],
    questionnaire_id: &str,
    answers: &CaseAnswers,
) -> CaseAnswers {
    let mut derived = answers.clone();

    for response in responses
        .iter()
        .filter(|r| r.questionnaire_id == questionnaire_id)
    {
        if derived.contains(&response.question_id) {
            continue;
        }
        if !is_satisfied(&response.conditions, &derived) {
            continue;
        }
        if let Err(err) = decode_answer_list(&response.response) {
            warn!(
                response_id = %response.id,
                question_id = %response.question_id,
                error = %err,
                "conditional response is not a valid answer list"
            );
            continue;
        }

        debug!(question_id = %response.question_id, "answer derived from conditional response");
        derived.insert_raw(response.question_id.clone(), response.response.clone());
    }

    derived
}

#[cfg(test)]
mod tests {
    use super::*;
    use letter_types::{AnswerSource, Condition, ConditionSet};
    use pretty_assertions::assert_eq;

    fn response(question_id: &str, value: &str, conditions: Vec<Condition>) -> ConditionalResponse {
        ConditionalResponse {
            id: format!("cr-{}", question_id),
            questionnaire_id: "qn1".to_string(),
            question_id: question_id.to_string(),
            response: value.to_string(),
            conditions: ConditionSet::new(conditions),
        }
    }

    #[test]
    fn test_fills_unanswered_question_when_conditions_hold() {
        let answers = CaseAnswers::new().with_values("entity", &["Listed"]);
        let responses = vec![response(
            "audit",
            r#"["Yes"]"#,
            vec![Condition::new("entity", r#"["Listed"]"#)],
        )];
        let derived = derive_answers(&responses, "qn1", &answers);
        assert_eq!(derived.raw_answer("audit"), Some(r#"["Yes"]"#));
        assert!(!answers.contains("audit"));
    }

    #[test]
    fn test_existing_answer_is_not_overwritten() {
        let answers = CaseAnswers::new().with_values("audit", &["No"]);
        let responses = vec![response("audit", r#"["Yes"]"#, vec![])];
        let derived = derive_answers(&responses, "qn1", &answers);
        assert_eq!(derived.raw_answer("audit"), Some(r#"["No"]"#));
    }

    #[test]
    fn test_later_responses_see_earlier_derivations() {
        let responses = vec![
            response("a", r#"["1"]"#, vec![]),
            response("b", r#"["2"]"#, vec![Condition::new("a", r#"["1"]"#)]),
        ];
        let derived = derive_answers(&responses, "qn1", &CaseAnswers::new());
        assert_eq!(derived.raw_answer("b"), Some(r#"["2"]"#));
    }

    #[test]
    fn test_first_matching_response_wins() {
        let responses = vec![
            response("a", r#"["first"]"#, vec![]),
            response("a", r#"["second"]"#, vec![]),
        ];
        let derived = derive_answers(&responses, "qn1", &CaseAnswers::new());
        assert_eq!(derived.raw_answer("a"), Some(r#"["first"]"#));
    }

    #[test]
    fn test_undecodable_response_is_skipped() {
        let responses = vec![
            response("a", "not json", vec![]),
            response("a", r#"["ok"]"#, vec![]),
        ];
        let derived = derive_answers(&responses, "qn1", &CaseAnswers::new());
        assert_eq!(derived.raw_answer("a"), Some(r#"["ok"]"#));
    }

    #[test]
    fn test_unsatisfied_response_leaves_answers_untouched() {
        let responses = vec![response(
            "a",
            r#"["x"]"#,
            vec![Condition::new("missing", r#"["y"]"#)],
        )];
        let derived = derive_answers(&responses, "qn1", &CaseAnswers::new());
        assert!(derived.is_empty());
    }
}

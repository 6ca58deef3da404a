//! Template selection: highest-priority template whose conditions hold

use letter_types::{AnswerSource, Template};
use tracing::debug;

use crate::evaluator::is_satisfied;

/// Pick the template for a case.
///
/// Templates of other questionnaires and disabled templates (priority 0)
/// are skipped. Candidates are tried by descending priority; equal
/// priorities keep their input order. `None` means no template matched,
/// which callers report rather than treat as a failure.
pub fn select_template<'a, A>(
    templates: &'a [Template],
    questionnaire_id: &str,
    answers: &A,
) -> Option<&'a Template>
where
    A: AnswerSource + ?Sized,
{
    let mut candidates: Vec<&Template> = templates
        .iter()
        .filter(|t| t.questionnaire_id == questionnaire_id && !t.is_disabled())
        .collect();
    candidates.sort_by(|a, b| b.priority.cmp(&a.priority));

    let selected = candidates
        .into_iter()
        .find(|t| is_satisfied(&t.conditions, answers));

    match selected {
        Some(template) => debug!(
            template_id = %template.id,
            priority = template.priority,
            "template selected"
        ),
        None => debug!(questionnaire_id, "no template matched"),
    }

    selected
}

//! Replacement resolution: every satisfied entry contributes its keyword

use letter_types::{
    decode_answer_list, AnswerSource, ReplacementContent, ReplacementEntry, SubstitutionMap,
};
use tracing::debug;

use crate::evaluator::is_satisfied;

/// Build the keyword → text map for a case.
///
/// Entries are visited in input order. When two satisfied entries share a
/// keyword the later one overwrites the earlier text.
pub fn resolve_substitutions<A>(
    entries: &[ReplacementEntry],
    questionnaire_id: &str,
    answers: &A,
) -> SubstitutionMap
where
    A: AnswerSource + ?Sized,
{
    let mut substitutions = SubstitutionMap::new();

    for entry in entries
        .iter()
        .filter(|e| e.questionnaire_id == questionnaire_id)
    {
        if !is_satisfied(&entry.conditions, answers) {
            continue;
        }

        let Some(text) = replacement_text(entry, answers) else {
            debug!(keyword = %entry.keyword, "bound answer missing, entry skipped");
            continue;
        };

        if substitutions.insert(entry.keyword.clone(), text).is_some() {
            debug!(keyword = %entry.keyword, entry_id = %entry.id, "keyword text overwritten");
        }
    }

    substitutions
}

/// Text an entry contributes, if any
pub fn replacement_text<A>(entry: &ReplacementEntry, answers: &A) -> Option<String>
where
    A: AnswerSource + ?Sized,
{
    match &entry.content {
        ReplacementContent::Static { text } => Some(text.clone()),
        ReplacementContent::BoundAnswer => {
            let question_id = &entry.conditions.first_ordered()?.question_id;
            let values = decode_answer_list(answers.raw_answer(question_id)?).ok()?;
            if values.is_empty() {
                None
            } else {
                Some(values.join("\n"))
            }
        }
    }
}

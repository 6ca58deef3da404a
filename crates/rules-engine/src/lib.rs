pub mod conditional;
pub mod error;
pub mod evaluator;
pub mod resolver;
pub mod selector;

pub use conditional::derive_answers;
pub use error::EvaluationError;
pub use evaluator::{evaluate_condition, is_satisfied, parse_decimal, AnswerShape};
pub use resolver::{replacement_text, resolve_substitutions};
pub use selector::select_template;

use letter_types::{CaseAnswers, Catalog, SubstitutionMap, Template};

/// Everything the rules decide for one case
#[derive(Debug, Clone)]
pub struct RuleOutcome<'a> {
    /// Case answers after conditional responses were applied
    pub answers: CaseAnswers,
    pub template: Option<&'a Template>,
    pub substitutions: SubstitutionMap,
}

/// RulesEngine entry point
pub struct RulesEngine;

impl RulesEngine {
    pub fn new() -> Self {
        Self
    }

    /// Derive answers, then select the template and resolve replacements
    /// against the derived answers.
    pub fn evaluate<'a>(
        &self,
        catalog: &'a Catalog,
        questionnaire_id: &str,
        answers: &CaseAnswers,
    ) -> RuleOutcome<'a> {
        let answers = derive_answers(&catalog.conditional_responses, questionnaire_id, answers);
        let template = select_template(&catalog.templates, questionnaire_id, &answers);
        let substitutions = resolve_substitutions(&catalog.replacements, questionnaire_id, &answers);

        RuleOutcome {
            answers,
            template,
            substitutions,
        }
    }
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::new()
    }
}

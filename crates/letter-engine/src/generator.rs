//! Case answers to merged engagement letter

use docx_merge::{merge_with_options, MergeOptions};
use letter_types::{AnswerSource, CaseAnswers, Catalog, Questionnaire, SubstitutionMap};
use rules_engine::RulesEngine;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::GenerationError;
use crate::store::TemplateStore;

/// A merged letter and how it was produced
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedLetter {
    pub template_id: String,
    pub template_name: String,
    pub file_name: String,
    pub substitutions: SubstitutionMap,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

pub struct LetterGenerator<S> {
    store: S,
    engine: RulesEngine,
    options: MergeOptions,
}

impl<S: TemplateStore> LetterGenerator<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            engine: RulesEngine::new(),
            options: MergeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: MergeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Generate the letter for one case.
    ///
    /// Conditional responses are applied first, then the template is chosen
    /// and the keywords resolved against the completed answers.
    pub fn generate(
        &self,
        questionnaire: &Questionnaire,
        catalog: &Catalog,
        answers: &CaseAnswers,
    ) -> Result<GeneratedLetter, GenerationError> {
        if !questionnaire.is_active {
            return Err(GenerationError::InactiveQuestionnaire(
                questionnaire.id.clone(),
            ));
        }

        let answers = typed_answers(questionnaire, answers);
        let outcome = self.engine.evaluate(catalog, &questionnaire.id, &answers);

        let template = outcome
            .template
            .ok_or_else(|| GenerationError::NoTemplateMatched {
                questionnaire_id: questionnaire.id.clone(),
            })?;

        debug!(
            store = self.store.name(),
            path = %template.template_path,
            "loading template"
        );
        let template_bytes = self.store.load(&template.template_path)?.ok_or_else(|| {
            GenerationError::MissingTemplateFile {
                path: template.template_path.clone(),
            }
        })?;

        let bytes = merge_with_options(&template_bytes, &outcome.substitutions, &self.options)?;

        info!(
            questionnaire_id = %questionnaire.id,
            template_id = %template.id,
            keywords = outcome.substitutions.len(),
            size = bytes.len(),
            "letter generated"
        );

        Ok(GeneratedLetter {
            template_id: template.id.clone(),
            template_name: template.name.clone(),
            file_name: file_name(&template.name),
            substitutions: outcome.substitutions,
            bytes,
        })
    }
}

/// Answers that know the type of every question in the questionnaire
fn typed_answers(questionnaire: &Questionnaire, answers: &CaseAnswers) -> CaseAnswers {
    let mut typed = answers.clone();
    for question in &questionnaire.questions {
        if typed.question_type(&question.id).is_none() {
            typed.set_question_type(question.id.clone(), question.question_type);
        }
    }
    typed
}

/// `{template name}.docx` with path separators and reserved characters replaced
pub fn file_name(template_name: &str) -> String {
    let stem: String = template_name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = if stem.is_empty() { "letter" } else { stem.as_str() };
    format!("{}.docx", stem)
}

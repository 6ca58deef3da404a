//! Catalog and case files

use anyhow::{bail, Context};
use letter_types::{CaseAnswers, Catalog, Questionnaire};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// One answer in a case file: a list of values, or an already encoded string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Values(Vec<String>),
    Raw(String),
}

/// A case to generate a letter for
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseFile {
    pub questionnaire_id: String,
    #[serde(default)]
    pub answers: BTreeMap<String, AnswerValue>,
}

impl CaseFile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read case file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid case file: {}", path.display()))
    }

    /// Answers typed by the questionnaire's questions.
    ///
    /// Answers to questions the questionnaire does not have are an error.
    pub fn answers_for(&self, questionnaire: &Questionnaire) -> anyhow::Result<CaseAnswers> {
        let mut answers = CaseAnswers::for_questionnaire(questionnaire);
        for (question_id, value) in &self.answers {
            if questionnaire.question(question_id).is_none() {
                bail!(
                    "Question {} is not part of questionnaire {}",
                    question_id,
                    questionnaire.id
                );
            }
            match value {
                AnswerValue::Values(values) => answers.insert_values(question_id.clone(), values),
                AnswerValue::Raw(raw) => answers.insert_raw(question_id.clone(), raw.clone()),
            }
        }
        Ok(answers)
    }
}

/// Load a JSON catalog with keywords normalized
pub fn load_catalog<P: AsRef<Path>>(path: P) -> anyhow::Result<Catalog> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
    let catalog: Catalog = serde_json::from_str(&content)
        .with_context(|| format!("Invalid catalog: {}", path.display()))?;
    Ok(catalog.normalized())
}

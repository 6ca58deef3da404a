//! Records that carry condition sets: templates, replacement entries and
//! conditional responses, plus the per-questionnaire catalog grouping them.

use serde::{Deserialize, Serialize};

use crate::condition::ConditionSet;
use crate::types::Questionnaire;

/// A candidate document for a questionnaire
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub questionnaire_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Location of the .docx file, relative to the template store
    pub template_path: String,
    /// 0-100, higher wins; 0 disables the template
    #[serde(default = "default_priority")]
    pub priority: u8,
    #[serde(default)]
    pub conditions: ConditionSet,
}

impl Template {
    pub fn is_disabled(&self) -> bool {
        self.priority == 0
    }

    pub fn priority_level(&self) -> PriorityLevel {
        PriorityLevel::from_priority(self.priority)
    }
}

fn default_priority() -> u8 {
    50
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityLevel {
    Disabled,
    Lowest,
    Low,
    Medium,
    High,
    Highest,
}

impl PriorityLevel {
    pub fn from_priority(priority: u8) -> Self {
        match priority {
            0 => PriorityLevel::Disabled,
            90.. => PriorityLevel::Highest,
            75..=89 => PriorityLevel::High,
            50..=74 => PriorityLevel::Medium,
            25..=49 => PriorityLevel::Low,
            _ => PriorityLevel::Lowest,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PriorityLevel::Disabled => "Disabled",
            PriorityLevel::Lowest => "Lowest",
            PriorityLevel::Low => "Low",
            PriorityLevel::Medium => "Medium",
            PriorityLevel::High => "High",
            PriorityLevel::Highest => "Highest",
        }
    }
}

/// Where a replacement entry's text comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplacementContent {
    /// Fixed text written by the template author
    Static { text: String },
    /// The case's answer to the first condition's question, one line per value
    BoundAnswer,
}

impl ReplacementContent {
    pub fn text(text: impl Into<String>) -> Self {
        ReplacementContent::Static { text: text.into() }
    }
}

/// Keyword substitution, applied when its conditions hold
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementEntry {
    #[serde(default)]
    pub id: String,
    pub questionnaire_id: String,
    pub keyword: String,
    #[serde(default)]
    pub description: Option<String>,
    pub content: ReplacementContent,
    #[serde(default)]
    pub conditions: ConditionSet,
}

impl ReplacementEntry {
    pub fn new(
        questionnaire_id: impl Into<String>,
        keyword: &str,
        content: ReplacementContent,
        conditions: ConditionSet,
    ) -> Self {
        Self {
            id: String::new(),
            questionnaire_id: questionnaire_id.into(),
            keyword: normalize_keyword(keyword),
            description: None,
            content,
            conditions,
        }
    }
}

/// Answer that is filled in for a question when its conditions hold
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalResponse {
    #[serde(default)]
    pub id: String,
    pub questionnaire_id: String,
    pub question_id: String,
    /// JSON-array encoded answer
    pub response: String,
    #[serde(default)]
    pub conditions: ConditionSet,
}

/// Wrap a bare keyword in brackets: `ClientName` becomes `[ClientName]`.
///
/// Keywords that already start with `[` or end with `]` are only trimmed.
pub fn normalize_keyword(keyword: &str) -> String {
    let key = keyword.trim();
    if !key.is_empty() && !key.starts_with('[') && !key.ends_with(']') {
        format!("[{}]", key)
    } else {
        key.to_string()
    }
}

/// Everything the persistence layer knows about a set of questionnaires
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub questionnaires: Vec<Questionnaire>,
    #[serde(default)]
    pub templates: Vec<Template>,
    #[serde(default)]
    pub replacements: Vec<ReplacementEntry>,
    #[serde(default)]
    pub conditional_responses: Vec<ConditionalResponse>,
}

impl Catalog {
    /// Normalize every replacement keyword in place
    pub fn normalized(mut self) -> Self {
        for entry in &mut self.replacements {
            entry.keyword = normalize_keyword(&entry.keyword);
        }
        self
    }

    pub fn questionnaire(&self, questionnaire_id: &str) -> Option<&Questionnaire> {
        self.questionnaires.iter().find(|q| q.id == questionnaire_id)
    }

    pub fn templates_for<'a>(&'a self, questionnaire_id: &'a str) -> impl Iterator<Item = &'a Template> {
        self.templates
            .iter()
            .filter(move |t| t.questionnaire_id == questionnaire_id)
    }

    pub fn replacements_for<'a>(
        &'a self,
        questionnaire_id: &'a str,
    ) -> impl Iterator<Item = &'a ReplacementEntry> {
        self.replacements
            .iter()
            .filter(move |r| r.questionnaire_id == questionnaire_id)
    }
}

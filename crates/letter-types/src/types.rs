use serde::{Deserialize, Serialize};

/// How a question collects its answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QuestionType {
    /// Single choice out of `options`
    #[default]
    Radio,
    /// Multi-select; answers may hold several options
    CheckBox,
    /// Free text
    Text,
}

impl QuestionType {
    pub fn is_multi_select(self) -> bool {
        matches!(self, QuestionType::CheckBox)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub questionnaire_id: String,
    pub content: String,
    #[serde(rename = "type", default)]
    pub question_type: QuestionType,
    #[serde(default)]
    pub sort_order: i32,
    /// Choices for Radio / CheckBox questions
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Questionnaire {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Questionnaire {
    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    /// Questions in display order (stable on equal `sort_order`)
    pub fn ordered_questions(&self) -> Vec<&Question> {
        let mut questions: Vec<&Question> = self.questions.iter().collect();
        questions.sort_by_key(|q| q.sort_order);
        questions
    }
}

fn default_true() -> bool {
    true
}

use serde::{Deserialize, Serialize};

use crate::Question;

/// An ordered group of questions presented together as one navigation step.
///
/// Question order is significant: it defines both the on-screen order and
/// the validation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Unique id within the questionnaire.
    pub id: String,

    /// Heading shown above the section.
    pub title: String,

    /// Optional introductory text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub questions: Vec<Question>,
}

impl Section {
    /// Create a new section.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        questions: Vec<Question>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            questions,
        }
    }

    /// Set the introductory text.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Look up a question by id.
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{AnswerValue, Answers, Question, QuestionKind, SchemaError, Section};

/// The top-level, declarative description of one questionnaire.
///
/// Immutable once loaded; the engine treats it as read-only for the lifetime
/// of a response session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Questionnaire {
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub version: String,

    /// The organization running the survey.
    #[serde(default)]
    pub organize: String,

    pub sections: Vec<Section>,

    /// Rules that force submission before the schema's last section.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub early_exits: Vec<EarlyExitRule>,
}

/// A schema-level rule that ends the flow early: once the user advances past
/// `after_section` with every condition in `when_all` satisfied, the session
/// goes straight to submission, bypassing any remaining sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarlyExitRule {
    pub after_section: String,

    pub when_all: Vec<AnswerCondition>,
}

/// One predicate of an early-exit rule, evaluated against the live answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerCondition {
    pub question: String,

    pub matches: Matcher,
}

impl AnswerCondition {
    /// Require equality with a single value.
    pub fn equals(question: impl Into<String>, value: impl Into<AnswerValue>) -> Self {
        Self {
            question: question.into(),
            matches: Matcher::Equals(value.into()),
        }
    }

    /// Require a non-empty answer.
    pub fn answered(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            matches: Matcher::Answered,
        }
    }

    /// Check this condition against the current answers. A missing or
    /// empty answer (e.g. one removed by the visibility sweep) never
    /// satisfies any matcher.
    pub fn is_satisfied(&self, answers: &Answers) -> bool {
        let Some(answer) = answers.get(&self.question) else {
            return false;
        };
        if answer.is_empty_value() {
            return false;
        }
        match &self.matches {
            Matcher::Equals(expected) => answer.matches(expected),
            Matcher::OneOf(expected) => expected.iter().any(|value| answer.matches(value)),
            Matcher::Answered => true,
        }
    }
}

/// How an early-exit condition compares the stored answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Matcher {
    /// The answer equals this value.
    Equals(AnswerValue),

    /// The answer equals one of these values.
    OneOf(Vec<AnswerValue>),

    /// Any non-empty answer.
    Answered,
}

impl Questionnaire {
    /// Create a questionnaire with the given sections and no early exits.
    pub fn new(id: impl Into<String>, title: impl Into<String>, sections: Vec<Section>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            version: String::new(),
            organize: String::new(),
            sections,
            early_exits: Vec::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the schema version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the organization name.
    pub fn with_organize(mut self, organize: impl Into<String>) -> Self {
        self.organize = organize.into();
        self
    }

    /// Add an early-exit rule.
    pub fn with_early_exit(mut self, rule: EarlyExitRule) -> Self {
        self.early_exits.push(rule);
        self
    }

    /// Load a questionnaire from its JSON definition, failing fast on both
    /// parse errors and structural problems.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let questionnaire: Self = serde_json::from_str(json)?;
        questionnaire.validate()?;
        Ok(questionnaire)
    }

    /// Index of a section by id.
    pub fn section_index(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }

    /// Look up a question anywhere in the questionnaire.
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions().find(|q| q.id == id)
    }

    /// Iterate over every question in schema order.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.sections.iter().flat_map(|s| s.questions.iter())
    }

    /// Structural validation of the schema's own shape.
    ///
    /// The first problem found aborts the load; there is no partially-valid
    /// questionnaire.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.id.is_empty() {
            return Err(SchemaError::MissingQuestionnaireField("id"));
        }
        if self.title.is_empty() {
            return Err(SchemaError::MissingQuestionnaireField("title"));
        }
        if self.sections.is_empty() {
            return Err(SchemaError::MissingQuestionnaireField("sections"));
        }

        let mut seen = HashSet::new();
        for (index, section) in self.sections.iter().enumerate() {
            if section.id.is_empty() {
                return Err(SchemaError::MissingSectionField { index, field: "id" });
            }
            if section.title.is_empty() {
                return Err(SchemaError::MissingSectionField {
                    index,
                    field: "title",
                });
            }
            for question in &section.questions {
                if question.id.is_empty() {
                    return Err(SchemaError::MissingQuestionField {
                        section: section.id.clone(),
                        field: "id",
                    });
                }
                if question.label.is_empty() {
                    return Err(SchemaError::MissingQuestionField {
                        section: section.id.clone(),
                        field: "label",
                    });
                }
                if !seen.insert(question.id.clone()) {
                    return Err(SchemaError::DuplicateQuestionId(question.id.clone()));
                }
                if let Some(rules) = &question.validation
                    && let Some(pattern) = &rules.pattern
                    && let Err(error) = regex::Regex::new(pattern)
                {
                    return Err(SchemaError::InvalidPattern {
                        id: question.id.clone(),
                        error: error.to_string(),
                    });
                }
                self.validate_payload(question)?;
            }
        }

        // Reference checks after all ids are known.
        for question in self.questions() {
            if let Some(rule) = &question.conditional
                && self.question(&rule.depends_on).is_none()
            {
                return Err(SchemaError::UnknownDependency {
                    id: question.id.clone(),
                    depends_on: rule.depends_on.clone(),
                });
            }
        }
        for rule in &self.early_exits {
            if self.section_index(&rule.after_section).is_none() {
                return Err(SchemaError::UnknownExitSection(rule.after_section.clone()));
            }
            for condition in &rule.when_all {
                if self.question(&condition.question).is_none() {
                    return Err(SchemaError::UnknownExitQuestion {
                        section: rule.after_section.clone(),
                        question: condition.question.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    fn validate_payload(&self, question: &Question) -> Result<(), SchemaError> {
        let invalid = |reason: &str| SchemaError::InvalidPayload {
            id: question.id.clone(),
            reason: reason.to_string(),
        };

        match &question.kind {
            QuestionKind::Select { options }
            | QuestionKind::Radio { options }
            | QuestionKind::Checkbox { options } => {
                if options.is_empty() {
                    return Err(invalid("choice questions need at least one option"));
                }
            }
            QuestionKind::SelectWithOther {
                options,
                other_label,
            }
            | QuestionKind::CheckboxWithOther {
                options,
                other_label,
            } => {
                if options.is_empty() {
                    return Err(invalid("choice questions need at least one option"));
                }
                if other_label.is_empty() {
                    return Err(invalid("`otherLabel` must not be empty"));
                }
            }
            QuestionKind::RadioWithNumber { options } | QuestionKind::RadioWithText { options } => {
                if options.is_empty() {
                    return Err(invalid("choice questions need at least one option"));
                }
            }
            QuestionKind::Matrix { rows, scale } => {
                if rows.is_empty() {
                    return Err(invalid("matrix questions need at least one row"));
                }
                if scale.is_empty() {
                    return Err(invalid("matrix questions need a non-empty scale"));
                }
            }
            QuestionKind::RegionBlocks {
                regions,
                min_blocks,
                max_blocks,
            } => {
                if regions.is_empty() {
                    return Err(invalid("region-blocks questions need at least one region"));
                }
                if min_blocks > max_blocks {
                    return Err(invalid("`minBlocks` must not exceed `maxBlocks`"));
                }
            }
            QuestionKind::Text
            | QuestionKind::Email
            | QuestionKind::Number
            | QuestionKind::Textarea
            | QuestionKind::MapSelection
            | QuestionKind::Datetime { .. }
            | QuestionKind::ScheduledRequest => {}
        }

        Ok(())
    }
}

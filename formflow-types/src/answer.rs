use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One block in a `region-blocks` answer: a stretch of a route the
/// respondent is reporting on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RegionBlock {
    /// Administrative region, e.g. "台北市".
    pub region: String,

    /// Free-text location within the region.
    pub location: String,

    /// Why this block was selected.
    pub reason: String,
}

impl RegionBlock {
    /// Create a complete block.
    pub fn new(
        region: impl Into<String>,
        location: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// A block is complete when all three fields are filled in.
    pub fn is_complete(&self) -> bool {
        !self.region.is_empty() && !self.location.is_empty() && !self.reason.is_empty()
    }
}

/// Answer to a `radio-with-number` / `radio-with-text` question: a selected
/// option plus the sub-field the option may require.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetailAnswer {
    pub selected: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl DetailAnswer {
    /// Create an answer with only a selection.
    pub fn selected(selected: impl Into<String>) -> Self {
        Self {
            selected: selected.into(),
            number: None,
            text: None,
        }
    }

    /// Attach the numeric sub-field.
    pub fn with_number(mut self, number: f64) -> Self {
        self.number = Some(number);
        self
    }

    /// Attach the text sub-field.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Answer to a `select-with-other` question: a single selection plus the
/// free text accompanying the "other" sentinel option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OtherAnswer {
    pub selected: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Answer to a `checkbox-with-other` question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OtherMultiAnswer {
    pub selected: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A single answer value held in `Answers` for one answered question.
///
/// The shapes mirror what the rendering collaborator reports back while
/// editing; the canonical submission shape is produced separately by the
/// normalizer. Engine code constructs variants directly; deserialization
/// (schema `show_when` values, draft restore) is untagged, so an object with
/// only `selected`/`text` resolves to `OtherChoice` rather than `Detail`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// A numeric value (from `number` questions).
    Number(f64),

    /// A string value (text, email, textarea, datetime, map-selection).
    Text(String),

    /// Multiple selections (from `checkbox` questions).
    Choices(Vec<String>),

    /// Row label -> selected scale value (from `matrix` questions).
    Matrix(BTreeMap<String, String>),

    /// Ordered route blocks (from `region-blocks` questions).
    Blocks(Vec<RegionBlock>),

    /// Multi-selection with "other" free text (from `checkbox-with-other`).
    OtherChoices(OtherMultiAnswer),

    /// Selection with "other" free text (from `select-with-other`).
    OtherChoice(OtherAnswer),

    /// Selection with a numeric or text sub-field
    /// (from `radio-with-number` / `radio-with-text`).
    Detail(DetailAnswer),

    /// A single selection (from `select` and `radio` questions).
    Choice(String),
}

/// A scalar view of an answer, used for conditional-rule comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    Text(&'a str),
    Number(f64),
}

impl AnswerValue {
    /// A value that counts as "not answered" for required-field checks:
    /// empty strings, empty selections, empty maps and empty block lists.
    pub fn is_empty_value(&self) -> bool {
        match self {
            Self::Number(_) => false,
            Self::Text(s) | Self::Choice(s) => s.is_empty(),
            Self::Choices(items) => items.is_empty(),
            Self::Matrix(rows) => rows.is_empty(),
            Self::Blocks(blocks) => blocks.is_empty(),
            Self::OtherChoices(answer) => answer.selected.is_empty(),
            Self::OtherChoice(answer) => answer.selected.is_empty(),
            Self::Detail(answer) => answer.selected.is_empty(),
        }
    }

    /// The scalar this answer compares as in conditional rules.
    ///
    /// Schema JSON expresses comparison values as bare strings or numbers,
    /// while the live answer to a choice question is a `Choice` (or carries
    /// its selection in a `selected` field). Reducing both sides to a common
    /// scalar keeps schema authoring natural.
    pub fn as_scalar(&self) -> Option<Scalar<'_>> {
        match self {
            Self::Number(n) => Some(Scalar::Number(*n)),
            Self::Text(s) | Self::Choice(s) => Some(Scalar::Text(s)),
            Self::Detail(answer) => Some(Scalar::Text(&answer.selected)),
            Self::OtherChoice(answer) => Some(Scalar::Text(&answer.selected)),
            _ => None,
        }
    }

    /// Compare two answers for conditional-rule purposes: scalar views when
    /// both sides have one, structural equality otherwise.
    pub fn matches(&self, other: &AnswerValue) -> bool {
        match (self.as_scalar(), other.as_scalar()) {
            (Some(a), Some(b)) => a == b,
            _ => self == other,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Choice(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the type name of this value for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "Number",
            Self::Text(_) => "Text",
            Self::Choices(_) => "Choices",
            Self::Matrix(_) => "Matrix",
            Self::Blocks(_) => "Blocks",
            Self::OtherChoices(_) => "OtherChoices",
            Self::OtherChoice(_) => "OtherChoice",
            Self::Detail(_) => "Detail",
            Self::Choice(_) => "Choice",
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for AnswerValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for AnswerValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(items: Vec<String>) -> Self {
        Self::Choices(items)
    }
}

impl From<Vec<RegionBlock>> for AnswerValue {
    fn from(blocks: Vec<RegionBlock>) -> Self {
        Self::Blocks(blocks)
    }
}

impl From<DetailAnswer> for AnswerValue {
    fn from(answer: DetailAnswer) -> Self {
        Self::Detail(answer)
    }
}

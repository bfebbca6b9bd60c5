use serde::{Deserialize, Serialize};

use crate::AnswerValue;

/// A single question in a questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique id within the questionnaire.
    pub id: String,

    /// The prompt text shown to the user.
    pub label: String,

    /// Whether an answer is mandatory (only enforced while visible).
    #[serde(default)]
    pub required: bool,

    /// Placeholder text for input widgets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    /// Generic bounds and pattern rules. For string answers `min`/`max`
    /// are length bounds; for numeric answers they are magnitude bounds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRules>,

    /// Visibility rule tying this question to another question's answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<ConditionalRule>,

    /// The kind of question, with its type-specific payload.
    #[serde(flatten)]
    pub kind: QuestionKind,
}

impl Question {
    /// Create a new optional question.
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            required: false,
            placeholder: None,
            validation: None,
            conditional: None,
            kind,
        }
    }

    /// Mark this question as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set placeholder text.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Set bounds/pattern rules.
    pub fn with_validation(mut self, rules: ValidationRules) -> Self {
        self.validation = Some(rules);
        self
    }

    /// Make this question conditional on another question's answer.
    pub fn show_when(
        mut self,
        depends_on: impl Into<String>,
        show_when: impl Into<ShowWhen>,
    ) -> Self {
        self.conditional = Some(ConditionalRule {
            depends_on: depends_on.into(),
            show_when: show_when.into(),
        });
        self
    }
}

/// Generic validation rules shared across question kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    /// Regex the (string) answer must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl ValidationRules {
    /// Bounds-only rules.
    pub fn bounds(min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            min,
            max,
            pattern: None,
        }
    }

    /// Pattern-only rules.
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self {
            min: None,
            max: None,
            pattern: Some(pattern.into()),
        }
    }
}

/// A visibility rule: the question is shown only while the answer to
/// `depends_on` matches `show_when`. An unanswered dependency always hides
/// the question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalRule {
    pub depends_on: String,
    pub show_when: ShowWhen,
}

/// The accepted value(s) of a conditional rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShowWhen {
    /// Membership in a set of values.
    AnyOf(Vec<AnswerValue>),

    /// Equality with a single value.
    Value(AnswerValue),
}

impl ShowWhen {
    /// Check whether an answer satisfies this rule.
    pub fn accepts(&self, answer: &AnswerValue) -> bool {
        match self {
            Self::Value(expected) => answer.matches(expected),
            Self::AnyOf(expected) => expected.iter().any(|value| answer.matches(value)),
        }
    }
}

impl From<AnswerValue> for ShowWhen {
    fn from(value: AnswerValue) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for ShowWhen {
    fn from(value: &str) -> Self {
        Self::Value(AnswerValue::Text(value.to_string()))
    }
}

impl From<f64> for ShowWhen {
    fn from(value: f64) -> Self {
        Self::Value(AnswerValue::Number(value))
    }
}

impl From<Vec<AnswerValue>> for ShowWhen {
    fn from(values: Vec<AnswerValue>) -> Self {
        Self::AnyOf(values)
    }
}

impl From<Vec<&str>> for ShowWhen {
    fn from(values: Vec<&str>) -> Self {
        Self::AnyOf(
            values
                .into_iter()
                .map(|v| AnswerValue::Text(v.to_string()))
                .collect(),
        )
    }
}

/// An option of a `radio-with-number` / `radio-with-text` question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailOption {
    pub label: String,

    /// Selecting this option requires a numeric sub-field.
    #[serde(default)]
    pub has_number_input: bool,

    /// Selecting this option requires a text sub-field.
    #[serde(default)]
    pub has_text_input: bool,

    /// Minimum length of the text sub-field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_min: Option<usize>,

    /// Maximum length of the text sub-field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_max: Option<usize>,
}

impl DetailOption {
    /// A plain option with no sub-field.
    pub fn plain(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            has_number_input: false,
            has_text_input: false,
            text_min: None,
            text_max: None,
        }
    }

    /// An option requiring a numeric sub-field.
    pub fn with_number(label: impl Into<String>) -> Self {
        Self {
            has_number_input: true,
            ..Self::plain(label)
        }
    }

    /// An option requiring a text sub-field with optional length bounds.
    pub fn with_text(
        label: impl Into<String>,
        text_min: Option<usize>,
        text_max: Option<usize>,
    ) -> Self {
        Self {
            has_text_input: true,
            text_min,
            text_max,
            ..Self::plain(label)
        }
    }
}

/// Accepted string shapes for `datetime` answers.
///
/// Validation checks the shape only; out-of-calendar values like `2024-13`
/// pass the `YYYY-MM` shape and are range-checked solely against
/// `min_date`/`max_date`. All shapes are lexicographically order-preserving,
/// which is what makes the string comparison against those bounds sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeFormat {
    #[serde(rename = "YYYY")]
    Year,

    #[serde(rename = "YYYY-MM")]
    YearMonth,

    #[serde(rename = "YYYY-MM-DD")]
    Date,

    #[serde(rename = "MM-DD")]
    MonthDay,

    #[serde(rename = "HH:mm")]
    Time,

    /// Full date plus time; a space or a single `T` separator are accepted
    /// as equivalent.
    #[serde(rename = "YYYY-MM-DD HH:mm")]
    DateTime,
}

impl TimeFormat {
    /// The schema spelling of this format, used in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Year => "YYYY",
            Self::YearMonth => "YYYY-MM",
            Self::Date => "YYYY-MM-DD",
            Self::MonthDay => "MM-DD",
            Self::Time => "HH:mm",
            Self::DateTime => "YYYY-MM-DD HH:mm",
        }
    }
}

/// The kind of question, with exactly one type-specific payload.
///
/// Serialized with an internal `type` tag and the payload flattened into the
/// question object, so a malformed payload fails at parse time rather than
/// producing a half-usable question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum QuestionKind {
    /// Single-line text input.
    Text,

    /// Email address input (shape-checked by the validation engine).
    Email,

    /// Numeric input.
    Number,

    /// Multi-line text input.
    Textarea,

    /// Dropdown selection of one option.
    Select { options: Vec<String> },

    /// Radio selection of one option.
    Radio { options: Vec<String> },

    /// Checkbox selection of any number of options.
    Checkbox { options: Vec<String> },

    /// One scale rating per row.
    Matrix { rows: Vec<String>, scale: Vec<String> },

    /// A location picked on a map, reported as a string.
    MapSelection,

    /// Date/time string in a fixed format.
    Datetime {
        time_format: TimeFormat,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_date: Option<String>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_date: Option<String>,
    },

    /// Radio selection where options may require a numeric sub-field.
    RadioWithNumber { options: Vec<DetailOption> },

    /// Radio selection where options may require a text sub-field.
    RadioWithText { options: Vec<DetailOption> },

    /// Dropdown selection with an "other" sentinel option and free text.
    SelectWithOther {
        options: Vec<String>,
        other_label: String,
    },

    /// Checkbox selection with an "other" sentinel option and free text.
    CheckboxWithOther {
        options: Vec<String>,
        other_label: String,
    },

    /// Ordered list of route blocks, each with region, location and reason.
    RegionBlocks {
        regions: Vec<String>,
        min_blocks: usize,
        max_blocks: usize,
    },

    /// A requested pickup/service schedule.
    ScheduledRequest,
}

impl QuestionKind {
    /// The schema `type` tag for this kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Number => "number",
            Self::Textarea => "textarea",
            Self::Select { .. } => "select",
            Self::Radio { .. } => "radio",
            Self::Checkbox { .. } => "checkbox",
            Self::Matrix { .. } => "matrix",
            Self::MapSelection => "map-selection",
            Self::Datetime { .. } => "datetime",
            Self::RadioWithNumber { .. } => "radio-with-number",
            Self::RadioWithText { .. } => "radio-with-text",
            Self::SelectWithOther { .. } => "select-with-other",
            Self::CheckboxWithOther { .. } => "checkbox-with-other",
            Self::RegionBlocks { .. } => "region-blocks",
            Self::ScheduledRequest => "scheduled-request",
        }
    }
}

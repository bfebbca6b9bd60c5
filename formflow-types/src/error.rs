/// Error type for questionnaire schema loading and structural validation.
///
/// Schema errors are fatal at load time: a malformed questionnaire never
/// produces a partially-usable engine instance.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The JSON definition could not be parsed at all.
    #[error("failed to parse questionnaire definition: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("questionnaire is missing a non-empty `{0}`")]
    MissingQuestionnaireField(&'static str),

    #[error("section {index} is missing a non-empty `{field}`")]
    MissingSectionField { index: usize, field: &'static str },

    #[error("a question in section '{section}' is missing a non-empty `{field}`")]
    MissingQuestionField {
        section: String,
        field: &'static str,
    },

    #[error("duplicate question id '{0}'")]
    DuplicateQuestionId(String),

    #[error("question '{id}' depends on unknown question '{depends_on}'")]
    UnknownDependency { id: String, depends_on: String },

    #[error("question '{id}': {reason}")]
    InvalidPayload { id: String, reason: String },

    #[error("question '{id}' has an unparseable validation pattern: {error}")]
    InvalidPattern { id: String, error: String },

    #[error("early-exit rule references unknown section '{0}'")]
    UnknownExitSection(String),

    #[error("early-exit rule after section '{section}' references unknown question '{question}'")]
    UnknownExitQuestion { section: String, question: String },
}

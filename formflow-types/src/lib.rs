//! Core types for the formflow crate.
//!
//! This crate provides the foundational types for schema-driven questionnaires:
//! - `Questionnaire` and `Section` - The declarative survey structure
//! - `Question` and `QuestionKind` - Individual questions and their types
//! - `ConditionalRule` and `EarlyExitRule` - Data-driven visibility and flow rules
//! - `Answers` and `AnswerValue` - The live, session-scoped answer set
//!
//! Schemas are plain data: they deserialize from JSON and are structurally
//! validated at load time. All behavior (visibility, validation, navigation,
//! normalization) lives in the `formflow` engine crate.

mod answer;
pub use answer::{AnswerValue, DetailAnswer, OtherAnswer, OtherMultiAnswer, RegionBlock, Scalar};

mod answers;
pub use answers::{AnswerError, Answers};

mod question;
pub use question::{
    ConditionalRule, DetailOption, Question, QuestionKind, ShowWhen, TimeFormat, ValidationRules,
};

mod section;
pub use section::Section;

mod questionnaire;
pub use questionnaire::{AnswerCondition, EarlyExitRule, Matcher, Questionnaire};

mod error;
pub use error::SchemaError;

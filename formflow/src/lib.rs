//! # formflow
//!
//! A schema-driven questionnaire response engine. Presentation-agnostic.
//!
//! A declarative [`Questionnaire`] schema describes sections, questions,
//! conditional visibility, validation rules and early-exit rules; a
//! [`Session`] owns the live answer set and walks the user through the
//! visible sections, validating each one before it is left.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use formflow::{Questionnaire, Session, Advance, TestBackend};
//!
//! let questionnaire = Questionnaire::from_json(schema_json)?;
//! let mut session = Session::new(&questionnaire);
//!
//! session.answer("used", "no")?;
//! session.answer("reason", "service too infrequent")?;
//!
//! match session.advance() {
//!     Advance::Stayed => { /* render session.errors() */ }
//!     Advance::Moved(_) => { /* render the next section */ }
//!     Advance::Finish => {
//!         let id = session.submit_with(&TestBackend::new())?;
//!     }
//! }
//! ```
//!
//! The engine performs no I/O itself: persistence is a collaborator behind
//! the [`SubmitBackend`] trait, and rendering is whatever consumes
//! [`visible_questions`](visibility::visible_questions) and reports edits
//! back through [`Session::answer`].

pub use formflow_types::*;

pub mod visibility;
pub use visibility::{
    is_question_visible, is_section_visible, sweep_hidden_answers, visible_questions,
};

pub mod validation;
pub use validation::validate_section;

pub mod session;
pub use session::{
    Advance, Phase, ResponseState, Session, SessionError, SubmissionMetadata, SubmissionRequest,
    SubmitError,
};

pub mod normalize;
pub use normalize::{CanonicalPayload, build_payload, normalize_answer};

mod backend;
pub use backend::{SubmissionId, SubmitBackend, TestBackend, TestBackendError};

//! The persistence collaborator seam, plus a test backend.
//!
//! `TestBackend` lets response flows run end to end without any real
//! storage: it records every submission it receives and can be configured
//! to fail, for exercising the submit-failure recovery path.

use std::cell::RefCell;
use std::fmt;

use crate::normalize::CanonicalPayload;
use crate::session::SubmissionMetadata;

/// Identifier assigned by the persistence collaborator to a stored response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionId(String);

impl SubmissionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trait for persistence collaborators that store canonical payloads.
///
/// The engine calls `submit` exactly once per submission attempt and never
/// retries on its own; a failed attempt is surfaced to the caller, who may
/// invoke submit again.
pub trait SubmitBackend {
    /// The error type for this backend.
    type Error: Into<anyhow::Error>;

    /// Store one submission and return its id.
    fn submit(
        &self,
        payload: &CanonicalPayload,
        metadata: &SubmissionMetadata,
    ) -> Result<SubmissionId, Self::Error>;
}

/// Error type for `TestBackend`.
#[derive(Debug, thiserror::Error)]
pub enum TestBackendError {
    #[error("simulated persistence failure: {0}")]
    Simulated(String),
}

/// A submit backend that records payloads in memory.
#[derive(Debug, Default)]
pub struct TestBackend {
    fail_with: Option<String>,
    submissions: RefCell<Vec<(CanonicalPayload, SubmissionMetadata)>>,
}

impl TestBackend {
    /// Create a backend that accepts every submission.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that rejects every submission with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            submissions: RefCell::new(Vec::new()),
        }
    }

    /// Number of submissions accepted so far.
    pub fn submission_count(&self) -> usize {
        self.submissions.borrow().len()
    }

    /// The most recently accepted submission, if any.
    pub fn last_submission(&self) -> Option<(CanonicalPayload, SubmissionMetadata)> {
        self.submissions.borrow().last().cloned()
    }
}

impl SubmitBackend for TestBackend {
    type Error = TestBackendError;

    fn submit(
        &self,
        payload: &CanonicalPayload,
        metadata: &SubmissionMetadata,
    ) -> Result<SubmissionId, Self::Error> {
        if let Some(message) = &self.fail_with {
            return Err(TestBackendError::Simulated(message.clone()));
        }
        let mut submissions = self.submissions.borrow_mut();
        submissions.push((payload.clone(), metadata.clone()));
        Ok(SubmissionId::new(format!("submission-{}", submissions.len())))
    }
}

//! The section-navigation state machine.
//!
//! A [`Session`] borrows an immutable, validated [`Questionnaire`] and owns
//! the mutable, session-scoped [`ResponseState`]. Every user edit and every
//! navigation step is one synchronous transition; the only suspension point
//! is the handoff to the persistence collaborator, modeled as the
//! split-phase `begin_submit` / `resolve_submit` pair.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use formflow_types::{AnswerValue, Answers, Questionnaire, Section};
use tracing::{debug, warn};

use crate::backend::{SubmissionId, SubmitBackend};
use crate::normalize::{CanonicalPayload, build_payload};
use crate::validation::validate_section;
use crate::visibility::{is_section_visible, sweep_hidden_answers, visible_questions};

/// Where the session is in its lifecycle. `Submitted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Answers may be edited and sections navigated.
    Editing,

    /// A submission has been handed to the persistence collaborator and is
    /// outstanding. No edits are accepted until it resolves.
    Submitting,

    /// The response was stored. No further transitions.
    Submitted,
}

/// The mutable state of one response session.
///
/// Created when the user begins a questionnaire, mutated by every edit and
/// navigation transition, discarded on submission or abandonment. The
/// timing counters exist for submission telemetry only.
#[derive(Debug, Clone)]
pub struct ResponseState {
    pub answers: Answers,
    pub current_section: usize,
    pub errors: HashMap<String, String>,
    pub started_at: Instant,
    pub section_started_at: Instant,
    pub revisit_count: u32,
}

impl ResponseState {
    fn new(current_section: usize) -> Self {
        let now = Instant::now();
        Self {
            answers: Answers::new(),
            current_section,
            errors: HashMap::new(),
            started_at: now,
            section_started_at: now,
            revisit_count: 0,
        }
    }
}

/// Outcome of an [`Session::advance`] attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Validation failed; the session stays put and `errors()` holds the
    /// per-question messages.
    Stayed,

    /// Moved to the visible section at this index.
    Moved(usize),

    /// This was the last visible section, or an early-exit rule fired:
    /// the caller should submit.
    Finish,
}

/// Error type for session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("unknown question id '{0}'")]
    UnknownQuestion(String),

    #[error("validation failed for {failures} question(s)")]
    Validation { failures: usize },

    #[error("a submission is already in progress")]
    SubmitPending,

    #[error("the response has already been submitted")]
    AlreadySubmitted,
}

/// Error type for the submission handoff.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("no submission is in progress")]
    NotSubmitting,

    /// Collaborator failure. The session is back in `Editing` with all
    /// answers preserved; the user may retry by submitting again.
    #[error("submission failed: {0}")]
    Backend(#[source] anyhow::Error),
}

/// Everything the caller needs to perform the (possibly asynchronous)
/// persistence call: the canonical payload and the session telemetry.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub payload: CanonicalPayload,
    pub metadata: SubmissionMetadata,
}

/// Derived session metadata handed to the persistence and statistics
/// collaborators alongside the payload.
#[derive(Debug, Clone)]
pub struct SubmissionMetadata {
    pub questionnaire_id: String,
    pub version: String,
    pub elapsed: Duration,
    pub answered_count: usize,
    pub total_visible_count: usize,
    pub revisit_count: u32,
    pub device_class: String,
}

/// One user's pass through a questionnaire.
///
/// The questionnaire must have passed [`Questionnaire::validate`]; the
/// session treats it as read-only for its whole lifetime.
#[derive(Debug)]
pub struct Session<'a> {
    questionnaire: &'a Questionnaire,
    state: ResponseState,
    phase: Phase,
    device_class: String,
}

impl<'a> Session<'a> {
    /// Start a session at the first visible section.
    ///
    /// Panics (debug builds) on a questionnaire with no sections; such a
    /// schema is rejected by [`Questionnaire::validate`] and has no first
    /// section to start at.
    pub fn new(questionnaire: &'a Questionnaire) -> Self {
        debug_assert!(
            !questionnaire.sections.is_empty(),
            "questionnaire must pass validate() before a session is started"
        );
        let answers = Answers::new();
        let start = questionnaire
            .sections
            .iter()
            .position(|s| is_section_visible(s, &answers))
            .unwrap_or(0);
        Self {
            questionnaire,
            state: ResponseState::new(start),
            phase: Phase::Editing,
            device_class: String::new(),
        }
    }

    /// Record the device class reported in submission telemetry.
    pub fn with_device_class(mut self, device_class: impl Into<String>) -> Self {
        self.device_class = device_class.into();
        self
    }

    /// The questionnaire this session is answering.
    pub fn questionnaire(&self) -> &Questionnaire {
        self.questionnaire
    }

    /// The live answer set.
    pub fn answers(&self) -> &Answers {
        &self.state.answers
    }

    /// Validation errors from the last advance/submit attempt, minus any
    /// cleared by subsequent edits.
    pub fn errors(&self) -> &HashMap<String, String> {
        &self.state.errors
    }

    /// The full mutable-state snapshot (telemetry counters included).
    pub fn state(&self) -> &ResponseState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True while a submission is outstanding. The caller must use this to
    /// disable repeat submission; the engine rejects re-entrant
    /// `begin_submit` calls but performs no other de-duplication.
    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }

    pub fn is_submitted(&self) -> bool {
        self.phase == Phase::Submitted
    }

    /// Index of the current section in the schema.
    pub fn current_index(&self) -> usize {
        self.state.current_section
    }

    /// The current section.
    pub fn current_section(&self) -> &Section {
        &self.questionnaire.sections[self.state.current_section]
    }

    /// Store an answer reported by the rendering collaborator.
    ///
    /// Clears any standing error for the question and sweeps answers that
    /// the edit just hid, across the whole questionnaire.
    pub fn answer(
        &mut self,
        id: &str,
        value: impl Into<AnswerValue>,
    ) -> Result<(), SessionError> {
        self.ensure_editing()?;
        if self.questionnaire.question(id).is_none() {
            return Err(SessionError::UnknownQuestion(id.to_string()));
        }
        self.state.answers.insert(id, value);
        self.state.errors.remove(id);
        self.sweep();
        Ok(())
    }

    /// Remove an answer, returning the previous value if any.
    pub fn clear_answer(&mut self, id: &str) -> Result<Option<AnswerValue>, SessionError> {
        self.ensure_editing()?;
        if self.questionnaire.question(id).is_none() {
            return Err(SessionError::UnknownQuestion(id.to_string()));
        }
        let previous = self.state.answers.remove(id);
        self.state.errors.remove(id);
        self.sweep();
        Ok(previous)
    }

    /// Try to leave the current section forward.
    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        self.ensure_editing()?;
        let errors = validate_section(self.current_section(), &self.state.answers);
        if !errors.is_empty() {
            debug!(
                section = %self.current_section().id,
                failures = errors.len(),
                "advance blocked by validation"
            );
            self.state.errors = errors;
            return Ok(Advance::Stayed);
        }
        self.state.errors.clear();

        let section_id = self.current_section().id.clone();
        if self.early_exit_satisfied(&section_id) {
            debug!(section = %section_id, "early-exit rule satisfied");
            return Ok(Advance::Finish);
        }

        let next = self
            .questionnaire
            .sections
            .iter()
            .enumerate()
            .skip(self.state.current_section + 1)
            .find(|(_, s)| is_section_visible(s, &self.state.answers))
            .map(|(index, _)| index);

        match next {
            Some(index) => {
                debug!(from = self.state.current_section, to = index, "advanced");
                self.state.current_section = index;
                self.state.section_started_at = Instant::now();
                Ok(Advance::Moved(index))
            }
            None => Ok(Advance::Finish),
        }
    }

    /// Move back to the nearest earlier visible section. Returns `false`
    /// (and does nothing) when already at the first one.
    pub fn retreat(&mut self) -> Result<bool, SessionError> {
        self.ensure_editing()?;
        let target = self.questionnaire.sections[..self.state.current_section]
            .iter()
            .enumerate()
            .rev()
            .find(|(_, s)| is_section_visible(s, &self.state.answers))
            .map(|(index, _)| index);

        let Some(index) = target else {
            return Ok(false);
        };
        debug!(from = self.state.current_section, to = index, "retreated");
        self.state.current_section = index;
        self.state.revisit_count += 1;
        self.state.section_started_at = Instant::now();
        Ok(true)
    }

    /// The answer-dependent section count used for progress display.
    ///
    /// Counts only currently visible sections, and shrinks to the position
    /// of the earliest early-exit rule whose condition is already satisfied.
    pub fn effective_total_sections(&self) -> usize {
        let answers = &self.state.answers;
        let visible: Vec<bool> = self
            .questionnaire
            .sections
            .iter()
            .map(|s| is_section_visible(s, answers))
            .collect();
        let mut total = visible.iter().filter(|v| **v).count();

        for rule in &self.questionnaire.early_exits {
            if rule.when_all.iter().all(|c| c.is_satisfied(answers))
                && let Some(index) = self.questionnaire.section_index(&rule.after_section)
            {
                let up_to = visible[..=index].iter().filter(|v| **v).count();
                total = total.min(up_to);
            }
        }
        total
    }

    /// 1-based position among visible sections, and the effective total.
    pub fn progress(&self) -> (usize, usize) {
        let answers = &self.state.answers;
        let position = self.questionnaire.sections[..=self.state.current_section]
            .iter()
            .filter(|s| is_section_visible(s, answers))
            .count()
            .max(1);
        (position, self.effective_total_sections().max(1))
    }

    /// Validate once more, build the canonical payload and telemetry, and
    /// enter the `Submitting` phase. The caller performs the actual
    /// persistence call and reports back through [`Session::resolve_submit`].
    pub fn begin_submit(&mut self) -> Result<SubmissionRequest, SessionError> {
        self.ensure_editing()?;
        let section = self.current_section();
        let errors = validate_section(section, &self.state.answers);
        if !errors.is_empty() {
            let failures = errors.len();
            self.state.errors = errors;
            return Err(SessionError::Validation { failures });
        }
        self.state.errors.clear();

        let request = SubmissionRequest {
            payload: build_payload(self.questionnaire, &self.state.answers),
            metadata: self.submission_metadata(),
        };
        self.phase = Phase::Submitting;
        debug!(questionnaire = %self.questionnaire.id, "submission started");
        Ok(request)
    }

    /// Report the outcome of the persistence call started by
    /// [`Session::begin_submit`].
    ///
    /// Success makes the session terminal; failure returns it to `Editing`
    /// at the same section with all answers preserved, and the error is
    /// handed back for a user-facing, retryable notification.
    pub fn resolve_submit(
        &mut self,
        outcome: Result<SubmissionId, anyhow::Error>,
    ) -> Result<SubmissionId, SubmitError> {
        if self.phase != Phase::Submitting {
            return Err(SubmitError::NotSubmitting);
        }
        match outcome {
            Ok(id) => {
                self.phase = Phase::Submitted;
                debug!(submission = %id, "submission stored");
                Ok(id)
            }
            Err(error) => {
                self.phase = Phase::Editing;
                warn!(%error, "submission failed; session back to editing");
                Err(SubmitError::Backend(error))
            }
        }
    }

    /// Run both submission phases against a synchronous backend.
    pub fn submit_with<B: SubmitBackend>(
        &mut self,
        backend: &B,
    ) -> Result<SubmissionId, SubmitError> {
        let request = self.begin_submit()?;
        let outcome = backend
            .submit(&request.payload, &request.metadata)
            .map_err(Into::into);
        self.resolve_submit(outcome)
    }

    fn ensure_editing(&self) -> Result<(), SessionError> {
        match self.phase {
            Phase::Editing => Ok(()),
            Phase::Submitting => Err(SessionError::SubmitPending),
            Phase::Submitted => Err(SessionError::AlreadySubmitted),
        }
    }

    fn sweep(&mut self) {
        for id in sweep_hidden_answers(self.questionnaire, &mut self.state.answers) {
            self.state.errors.remove(&id);
        }
    }

    /// Early-exit rules are always evaluated against the post-sweep answer
    /// map, so a predicate referencing an answer that was just hidden sees
    /// it as absent, never stale.
    fn early_exit_satisfied(&self, section_id: &str) -> bool {
        self.questionnaire
            .early_exits
            .iter()
            .filter(|rule| rule.after_section == section_id)
            .any(|rule| {
                rule.when_all
                    .iter()
                    .all(|condition| condition.is_satisfied(&self.state.answers))
            })
    }

    fn submission_metadata(&self) -> SubmissionMetadata {
        let answers = &self.state.answers;
        let mut total = 0;
        let mut answered = 0;
        for section in &self.questionnaire.sections {
            for question in visible_questions(section, answers) {
                total += 1;
                if answers.is_answered(&question.id) {
                    answered += 1;
                }
            }
        }
        SubmissionMetadata {
            questionnaire_id: self.questionnaire.id.clone(),
            version: self.questionnaire.version.clone(),
            elapsed: self.state.started_at.elapsed(),
            answered_count: answered,
            total_visible_count: total,
            revisit_count: self.state.revisit_count,
            device_class: self.device_class.clone(),
        }
    }
}

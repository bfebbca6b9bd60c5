use std::collections::BTreeMap;
use std::collections::HashMap;

use crate::{AnswerValue, RegionBlock};

/// Error type for typed answer access.
#[derive(Debug, thiserror::Error)]
pub enum AnswerError {
    #[error("no answer for question '{0}'")]
    Missing(String),

    #[error("type mismatch for question '{id}': expected {expected}, got {actual}")]
    TypeMismatch {
        id: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// The live answer set of one response session.
///
/// One entry per answered question, keyed by question id; an absent entry
/// means the question is unanswered. Insertion order is irrelevant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Answers {
    values: HashMap<String, AnswerValue>,
}

impl Answers {
    /// Create an empty answer set.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Store an answer for a question, replacing any previous one.
    pub fn insert(&mut self, id: impl Into<String>, value: impl Into<AnswerValue>) {
        self.values.insert(id.into(), value.into());
    }

    /// Get the answer for a question.
    pub fn get(&self, id: &str) -> Option<&AnswerValue> {
        self.values.get(id)
    }

    /// Check if any answer is stored for a question.
    pub fn contains(&self, id: &str) -> bool {
        self.values.contains_key(id)
    }

    /// A question counts as answered when a non-empty value is stored.
    pub fn is_answered(&self, id: &str) -> bool {
        self.values.get(id).is_some_and(|v| !v.is_empty_value())
    }

    /// Remove the answer for a question.
    pub fn remove(&mut self, id: &str) -> Option<AnswerValue> {
        self.values.remove(id)
    }

    /// Iterate over all id-value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &AnswerValue)> {
        self.values.iter()
    }

    /// Number of stored answers.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no answers are stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    // === Typed accessors ===

    /// Get a text answer.
    pub fn get_text(&self, id: &str) -> Result<&str, AnswerError> {
        match self.get(id) {
            Some(AnswerValue::Text(s)) => Ok(s),
            Some(other) => Err(self.mismatch(id, "Text", other)),
            None => Err(AnswerError::Missing(id.to_string())),
        }
    }

    /// Get a numeric answer.
    pub fn get_number(&self, id: &str) -> Result<f64, AnswerError> {
        match self.get(id) {
            Some(AnswerValue::Number(n)) => Ok(*n),
            Some(other) => Err(self.mismatch(id, "Number", other)),
            None => Err(AnswerError::Missing(id.to_string())),
        }
    }

    /// Get a single-choice answer.
    pub fn get_choice(&self, id: &str) -> Result<&str, AnswerError> {
        match self.get(id) {
            Some(AnswerValue::Choice(s)) => Ok(s),
            Some(other) => Err(self.mismatch(id, "Choice", other)),
            None => Err(AnswerError::Missing(id.to_string())),
        }
    }

    /// Get a multi-choice answer.
    pub fn get_choices(&self, id: &str) -> Result<&[String], AnswerError> {
        match self.get(id) {
            Some(AnswerValue::Choices(items)) => Ok(items),
            Some(other) => Err(self.mismatch(id, "Choices", other)),
            None => Err(AnswerError::Missing(id.to_string())),
        }
    }

    /// Get a matrix answer (row label -> scale value).
    pub fn get_matrix(&self, id: &str) -> Result<&BTreeMap<String, String>, AnswerError> {
        match self.get(id) {
            Some(AnswerValue::Matrix(rows)) => Ok(rows),
            Some(other) => Err(self.mismatch(id, "Matrix", other)),
            None => Err(AnswerError::Missing(id.to_string())),
        }
    }

    /// Get a region-blocks answer.
    pub fn get_blocks(&self, id: &str) -> Result<&[RegionBlock], AnswerError> {
        match self.get(id) {
            Some(AnswerValue::Blocks(blocks)) => Ok(blocks),
            Some(other) => Err(self.mismatch(id, "Blocks", other)),
            None => Err(AnswerError::Missing(id.to_string())),
        }
    }

    fn mismatch(&self, id: &str, expected: &'static str, actual: &AnswerValue) -> AnswerError {
        AnswerError::TypeMismatch {
            id: id.to_string(),
            expected,
            actual: actual.type_name(),
        }
    }
}

impl IntoIterator for Answers {
    type Item = (String, AnswerValue);
    type IntoIter = std::collections::hash_map::IntoIter<String, AnswerValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Answers {
    type Item = (&'a String, &'a AnswerValue);
    type IntoIter = std::collections::hash_map::Iter<'a, String, AnswerValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut answers = Answers::new();
        answers.insert("name", "Alice");
        answers.insert("trips", 3i64);

        assert_eq!(answers.get_text("name").unwrap(), "Alice");
        assert_eq!(answers.get_number("trips").unwrap(), 3.0);
    }

    #[test]
    fn missing_answer() {
        let answers = Answers::new();
        assert!(matches!(
            answers.get_text("name"),
            Err(AnswerError::Missing(_))
        ));
    }

    #[test]
    fn type_mismatch() {
        let mut answers = Answers::new();
        answers.insert("trips", 3i64);
        assert!(matches!(
            answers.get_text("trips"),
            Err(AnswerError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn empty_string_is_not_answered() {
        let mut answers = Answers::new();
        answers.insert("name", "");
        assert!(answers.contains("name"));
        assert!(!answers.is_answered("name"));
    }
}

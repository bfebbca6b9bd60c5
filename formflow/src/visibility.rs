//! Conditional-visibility evaluation.
//!
//! Visibility is the single source of truth for what the user sees, what the
//! validation engine checks, and which sections the navigator visits. The
//! policy is strict: a conditional question is hidden until its dependency
//! is answered, even if the rule's value set would otherwise accept an
//! absent answer.

use formflow_types::{Answers, Question, Questionnaire, Section};
use tracing::debug;

/// Whether a question is currently shown.
///
/// A question with no conditional rule is always visible. With a rule, the
/// dependency must be answered (non-empty) and the answer must satisfy the
/// rule's value or value set.
pub fn is_question_visible(question: &Question, answers: &Answers) -> bool {
    let Some(rule) = &question.conditional else {
        return true;
    };
    match answers.get(&rule.depends_on) {
        Some(answer) if !answer.is_empty_value() => rule.show_when.accepts(answer),
        _ => false,
    }
}

/// Whether a section is currently shown: at least one of its questions is
/// visible. A section with zero visible questions is skipped entirely by
/// navigation and never validated.
pub fn is_section_visible(section: &Section, answers: &Answers) -> bool {
    section
        .questions
        .iter()
        .any(|q| is_question_visible(q, answers))
}

/// The currently visible questions of a section, in schema order.
pub fn visible_questions<'a>(section: &'a Section, answers: &Answers) -> Vec<&'a Question> {
    section
        .questions
        .iter()
        .filter(|q| is_question_visible(q, answers))
        .collect()
}

/// Remove every stored answer whose question is no longer visible, across
/// the whole questionnaire, and return the removed question ids.
///
/// Runs after every answer edit so stale, hidden answers can never reach
/// validation, early-exit evaluation or submission. Removing one answer can
/// hide a question further down a dependency chain, so the sweep iterates
/// until nothing more is removed; that also makes it idempotent.
pub fn sweep_hidden_answers(questionnaire: &Questionnaire, answers: &mut Answers) -> Vec<String> {
    let mut removed = Vec::new();
    loop {
        let stale: Vec<String> = questionnaire
            .questions()
            .filter(|q| answers.contains(&q.id) && !is_question_visible(q, answers))
            .map(|q| q.id.clone())
            .collect();
        if stale.is_empty() {
            break;
        }
        for id in stale {
            answers.remove(&id);
            debug!(question = %id, "removed answer hidden by visibility sweep");
            removed.push(id);
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use formflow_types::{AnswerValue, QuestionKind, Questionnaire, Section};

    fn radio(id: &str, options: &[&str]) -> Question {
        Question::new(
            id,
            format!("{id}?"),
            QuestionKind::Radio {
                options: options.iter().map(|o| o.to_string()).collect(),
            },
        )
    }

    fn text(id: &str) -> Question {
        Question::new(id, format!("{id}?"), QuestionKind::Text)
    }

    #[test]
    fn unconditional_question_is_always_visible() {
        let question = text("name");
        assert!(is_question_visible(&question, &Answers::new()));
    }

    #[test]
    fn hidden_until_dependency_answered() {
        let question = text("reason").show_when("used", "no");
        let mut answers = Answers::new();

        assert!(!is_question_visible(&question, &answers));

        answers.insert("used", AnswerValue::Choice("yes".into()));
        assert!(!is_question_visible(&question, &answers));

        answers.insert("used", AnswerValue::Choice("no".into()));
        assert!(is_question_visible(&question, &answers));
    }

    #[test]
    fn set_membership_rule() {
        let question = text("line").show_when("mode", vec!["bus", "metro"]);
        let mut answers = Answers::new();

        answers.insert("mode", AnswerValue::Choice("metro".into()));
        assert!(is_question_visible(&question, &answers));

        answers.insert("mode", AnswerValue::Choice("walk".into()));
        assert!(!is_question_visible(&question, &answers));
    }

    #[test]
    fn section_hidden_when_every_question_is() {
        let section = Section::new(
            "follow-up",
            "Follow-up",
            vec![
                text("reason").show_when("used", "no"),
                text("alternative").show_when("used", "no"),
            ],
        );
        let mut answers = Answers::new();
        assert!(!is_section_visible(&section, &answers));

        answers.insert("used", AnswerValue::Choice("no".into()));
        assert!(is_section_visible(&section, &answers));
        assert_eq!(visible_questions(&section, &answers).len(), 2);
    }

    #[test]
    fn sweep_removes_stale_answers() {
        let questionnaire = Questionnaire::new(
            "q",
            "Q",
            vec![Section::new(
                "s1",
                "Usage",
                vec![radio("used", &["yes", "no"]), text("reason").show_when("used", "no")],
            )],
        );

        let mut answers = Answers::new();
        answers.insert("used", AnswerValue::Choice("no".into()));
        answers.insert("reason", "too slow");

        // Flipping the dependency hides `reason`; its answer must go.
        answers.insert("used", AnswerValue::Choice("yes".into()));
        let removed = sweep_hidden_answers(&questionnaire, &mut answers);
        assert_eq!(removed, vec!["reason".to_string()]);
        assert!(!answers.contains("reason"));
    }

    #[test]
    fn sweep_cascades_through_dependency_chains() {
        let questionnaire = Questionnaire::new(
            "q",
            "Q",
            vec![Section::new(
                "s1",
                "Usage",
                vec![
                    radio("used", &["yes", "no"]),
                    radio("why", &["cost", "other"]).show_when("used", "no"),
                    text("details").show_when("why", "other"),
                ],
            )],
        );

        let mut answers = Answers::new();
        answers.insert("used", AnswerValue::Choice("no".into()));
        answers.insert("why", AnswerValue::Choice("other".into()));
        answers.insert("details", "moved away");

        answers.insert("used", AnswerValue::Choice("yes".into()));
        let mut removed = sweep_hidden_answers(&questionnaire, &mut answers);
        removed.sort();
        assert_eq!(removed, vec!["details".to_string(), "why".to_string()]);
        assert_eq!(answers.len(), 1);
    }

    #[test]
    fn sweep_is_idempotent() {
        let questionnaire = Questionnaire::new(
            "q",
            "Q",
            vec![Section::new(
                "s1",
                "Usage",
                vec![radio("used", &["yes", "no"]), text("reason").show_when("used", "no")],
            )],
        );

        let mut answers = Answers::new();
        answers.insert("used", AnswerValue::Choice("yes".into()));
        answers.insert("reason", "stale");

        sweep_hidden_answers(&questionnaire, &mut answers);
        let after_first = answers.clone();
        let removed_again = sweep_hidden_answers(&questionnaire, &mut answers);
        assert!(removed_again.is_empty());
        assert_eq!(answers, after_first);
    }
}

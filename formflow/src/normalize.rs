//! Response normalization.
//!
//! The live answer shapes are UI-friendly; the canonical payload is what
//! crosses the boundary to the persistence collaborator. Normalization runs
//! once, at submission time, and is intentionally lossy in the "other"
//! cases: an "other" selection with no accompanying text collapses to the
//! bare selection, and an empty `text` field is never emitted.

use std::collections::BTreeMap;

use formflow_types::{AnswerValue, Answers, Question, QuestionKind, Questionnaire, RegionBlock};
use serde_json::{Value, json};

use crate::visibility::is_question_visible;

/// The normalized answer map handed to the persistence collaborator.
/// Downstream consumers must tolerate the union shape per question type.
pub type CanonicalPayload = BTreeMap<String, Value>;

/// Build the canonical payload for a whole questionnaire. Only questions
/// that are currently visible and answered contribute an entry; the
/// visibility sweep guarantees nothing hidden is still stored, but
/// visibility is re-checked here as the last line of defense.
pub fn build_payload(questionnaire: &Questionnaire, answers: &Answers) -> CanonicalPayload {
    let mut payload = CanonicalPayload::new();
    for question in questionnaire.questions() {
        if !is_question_visible(question, answers) {
            continue;
        }
        if let Some(answer) = answers.get(&question.id).filter(|a| !a.is_empty_value()) {
            payload.insert(question.id.clone(), normalize_answer(question, answer));
        }
    }
    payload
}

/// Map one live answer to its canonical persistence shape.
pub fn normalize_answer(question: &Question, answer: &AnswerValue) -> Value {
    match (&question.kind, answer) {
        // External payload contract: capitalized block field names.
        (QuestionKind::RegionBlocks { .. }, AnswerValue::Blocks(blocks)) => Value::Array(
            blocks.iter().map(normalize_block).collect(),
        ),

        (QuestionKind::SelectWithOther { other_label, .. }, AnswerValue::OtherChoice(choice)) => {
            let text = choice.text.as_deref().unwrap_or("");
            if choice.selected == *other_label && !text.is_empty() {
                json!({ "selected": choice.selected, "text": text })
            } else {
                json!(choice.selected)
            }
        }

        (
            QuestionKind::CheckboxWithOther { other_label, .. },
            AnswerValue::OtherChoices(choices),
        ) => {
            let text = choices.text.as_deref().unwrap_or("");
            if choices.selected.iter().any(|s| s == other_label) && !text.is_empty() {
                json!({ "selected": choices.selected, "text": text })
            } else {
                json!(choices.selected)
            }
        }

        // Everything else passes through in its natural JSON shape.
        _ => serde_json::to_value(answer).unwrap_or(Value::Null),
    }
}

fn normalize_block(block: &RegionBlock) -> Value {
    json!({
        "Region": block.region,
        "Location": block.location,
        "Reason": block.reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use formflow_types::{OtherAnswer, OtherMultiAnswer};

    fn other_select(id: &str) -> Question {
        Question::new(
            id,
            "Main mode?",
            QuestionKind::SelectWithOther {
                options: vec!["公車".into(), "捷運".into(), "其他".into()],
                other_label: "其他".into(),
            },
        )
    }

    #[test]
    fn other_selected_with_text() {
        let question = other_select("mode");
        let answer = AnswerValue::OtherChoice(OtherAnswer {
            selected: "其他".into(),
            text: Some("custom".into()),
        });
        assert_eq!(
            normalize_answer(&question, &answer),
            json!({ "selected": "其他", "text": "custom" })
        );
    }

    #[test]
    fn non_other_selection_collapses_to_scalar() {
        let question = other_select("mode");
        let answer = AnswerValue::OtherChoice(OtherAnswer {
            selected: "公車".into(),
            text: Some("leftover text".into()),
        });
        assert_eq!(normalize_answer(&question, &answer), json!("公車"));
    }

    #[test]
    fn other_selected_without_text_collapses() {
        let question = other_select("mode");
        let answer = AnswerValue::OtherChoice(OtherAnswer {
            selected: "其他".into(),
            text: None,
        });
        // Never emit an empty text field.
        assert_eq!(normalize_answer(&question, &answer), json!("其他"));
    }

    #[test]
    fn multichoice_other_keeps_full_selection() {
        let question = Question::new(
            "issues",
            "Issues?",
            QuestionKind::CheckboxWithOther {
                options: vec!["delay".into(), "crowding".into(), "其他".into()],
                other_label: "其他".into(),
            },
        );
        let answer = AnswerValue::OtherChoices(OtherMultiAnswer {
            selected: vec!["delay".into(), "其他".into()],
            text: Some("no shelter".into()),
        });
        assert_eq!(
            normalize_answer(&question, &answer),
            json!({ "selected": ["delay", "其他"], "text": "no shelter" })
        );
    }

    #[test]
    fn blocks_are_capitalized() {
        let question = Question::new(
            "segments",
            "Segments",
            QuestionKind::RegionBlocks {
                regions: vec!["台北市".into()],
                min_blocks: 1,
                max_blocks: 5,
            },
        );
        let answer = AnswerValue::Blocks(vec![RegionBlock::new("台北市", "信義路", "壅塞")]);
        assert_eq!(
            normalize_answer(&question, &answer),
            json!([{ "Region": "台北市", "Location": "信義路", "Reason": "壅塞" }])
        );
    }

    #[test]
    fn pass_through_types_are_unchanged() {
        let question = Question::new("trips", "Trips", QuestionKind::Number);
        assert_eq!(
            normalize_answer(&question, &AnswerValue::Number(4.0)),
            json!(4.0)
        );

        let question = Question::new("comment", "Comment", QuestionKind::Textarea);
        assert_eq!(
            normalize_answer(&question, &AnswerValue::Text("fine".into())),
            json!("fine")
        );
    }

    #[test]
    fn payload_skips_hidden_and_unanswered() {
        use formflow_types::Section;

        let questionnaire = Questionnaire::new(
            "q",
            "Q",
            vec![Section::new(
                "s1",
                "Usage",
                vec![
                    Question::new(
                        "used",
                        "Used?",
                        QuestionKind::Radio {
                            options: vec!["yes".into(), "no".into()],
                        },
                    ),
                    Question::new("reason", "Why not?", QuestionKind::Textarea)
                        .show_when("used", "no"),
                    Question::new("comment", "Comment", QuestionKind::Textarea),
                ],
            )],
        );

        let mut answers = Answers::new();
        answers.insert("used", AnswerValue::Choice("yes".into()));

        let payload = build_payload(&questionnaire, &answers);
        assert_eq!(payload.len(), 1);
        assert_eq!(payload.get("used").unwrap(), &json!("yes"));
    }
}

//! Per-question-type validation.
//!
//! `validate_section` is a pure function over the schema and the current
//! answers: it never mutates the answer set, and only questions the
//! visibility evaluator marks visible participate, so a hidden `required`
//! question can never block the user. The navigator runs it on every
//! advance/submit attempt and stores the resulting error map.

use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, PoisonError};

use formflow_types::{
    AnswerValue, Answers, DetailOption, Question, QuestionKind, Section, TimeFormat,
    ValidationRules,
};
use regex::Regex;
use tracing::warn;

use crate::visibility::visible_questions;

const REQUIRED: &str = "This question is required";
const INVALID_ANSWER: &str = "Invalid answer for this question";
const INVALID_FORMAT: &str = "Invalid format";
const INVALID_EMAIL: &str = "Please enter a valid email address";

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"));

static YEAR_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}$").expect("valid regex"));
static YEAR_MONTH_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}$").expect("valid regex"));
static DATE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid regex"));
static MONTH_DAY_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2}-[0-9]{2}$").expect("valid regex"));
static TIME_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2}:[0-9]{2}$").expect("valid regex"));
static DATE_TIME_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}[ T][0-9]{2}:[0-9]{2}$").expect("valid regex")
});

// Schema-supplied patterns, compiled once per distinct pattern string.
// Unparseable patterns are rejected at schema load; an unvalidated schema
// reaching this point gets the pattern skipped (with a warning) rather than
// locking the user out. `Regex` is internally reference-counted, so handing
// out clones is cheap.
static USER_PATTERNS: LazyLock<Mutex<HashMap<String, Option<Regex>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn compiled_pattern(pattern: &str) -> Option<Regex> {
    let mut cache = USER_PATTERNS
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    cache
        .entry(pattern.to_string())
        .or_insert_with(|| match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(error) => {
                warn!(%pattern, %error, "skipping unparseable validation pattern");
                None
            }
        })
        .clone()
}

fn shape_regex(format: TimeFormat) -> &'static Regex {
    match format {
        TimeFormat::Year => &YEAR_SHAPE,
        TimeFormat::YearMonth => &YEAR_MONTH_SHAPE,
        TimeFormat::Date => &DATE_SHAPE,
        TimeFormat::MonthDay => &MONTH_DAY_SHAPE,
        TimeFormat::Time => &TIME_SHAPE,
        TimeFormat::DateTime => &DATE_TIME_SHAPE,
    }
}

/// Validate one section against the current answers.
///
/// Returns a map of question id to error message for every visible question
/// that fails its rules. An empty map means the section may be left.
pub fn validate_section(section: &Section, answers: &Answers) -> HashMap<String, String> {
    let mut errors = HashMap::new();
    for question in visible_questions(section, answers) {
        if let Some(message) = validate_question(question, answers.get(&question.id)) {
            errors.insert(question.id.clone(), message);
        }
    }
    errors
}

/// Validate a single question. `None` means the answer is acceptable.
fn validate_question(question: &Question, answer: Option<&AnswerValue>) -> Option<String> {
    // Absent and empty values are the same thing: unanswered. Unanswered
    // optional questions are never inspected further.
    let Some(answer) = answer.filter(|a| !a.is_empty_value()) else {
        return question.required.then(|| REQUIRED.to_string());
    };

    match &question.kind {
        QuestionKind::Text | QuestionKind::Textarea | QuestionKind::MapSelection => {
            let AnswerValue::Text(s) = answer else {
                return Some(INVALID_ANSWER.to_string());
            };
            string_rules(question.validation.as_ref(), s)
        }

        QuestionKind::Email => {
            let AnswerValue::Text(s) = answer else {
                return Some(INVALID_ANSWER.to_string());
            };
            if !EMAIL_SHAPE.is_match(s) {
                return Some(INVALID_EMAIL.to_string());
            }
            string_rules(question.validation.as_ref(), s)
        }

        QuestionKind::Number => {
            let AnswerValue::Number(n) = answer else {
                return Some(INVALID_ANSWER.to_string());
            };
            let rules = question.validation.as_ref()?;
            if let Some(min) = rules.min
                && *n < min
            {
                return Some(format!("Must be at least {min}"));
            }
            if let Some(max) = rules.max
                && *n > max
            {
                return Some(format!("Must be at most {max}"));
            }
            None
        }

        // Plain selections have nothing beyond the required check; option
        // membership is the rendering collaborator's contract.
        QuestionKind::Select { .. }
        | QuestionKind::Radio { .. }
        | QuestionKind::Checkbox { .. }
        | QuestionKind::ScheduledRequest => None,

        // "Other" free text is optional at validation time; the normalizer
        // collapses an other-selection with no text to the bare selection.
        QuestionKind::SelectWithOther { .. } | QuestionKind::CheckboxWithOther { .. } => None,

        QuestionKind::Matrix { rows, .. } => {
            let AnswerValue::Matrix(filled) = answer else {
                return Some(INVALID_ANSWER.to_string());
            };
            let missing: Vec<&str> = rows
                .iter()
                .filter(|row| !filled.get(*row).is_some_and(|v| !v.is_empty()))
                .map(String::as_str)
                .collect();
            if missing.is_empty() {
                None
            } else {
                Some(format!("Please rate: {}", missing.join(", ")))
            }
        }

        QuestionKind::RegionBlocks { min_blocks, .. } => {
            let AnswerValue::Blocks(blocks) = answer else {
                return Some(INVALID_ANSWER.to_string());
            };
            if blocks.len() < *min_blocks {
                return Some(format!("Please provide at least {min_blocks} route block(s)"));
            }
            let incomplete: Vec<String> = blocks
                .iter()
                .enumerate()
                .filter(|(_, block)| !block.is_complete())
                .map(|(index, _)| (index + 1).to_string())
                .collect();
            if incomplete.is_empty() {
                None
            } else {
                Some(format!("Incomplete blocks: {}", incomplete.join(", ")))
            }
        }

        QuestionKind::RadioWithNumber { options } | QuestionKind::RadioWithText { options } => {
            let AnswerValue::Detail(detail) = answer else {
                return Some(INVALID_ANSWER.to_string());
            };
            let Some(option) = options.iter().find(|o| o.label == detail.selected) else {
                return Some(INVALID_ANSWER.to_string());
            };
            detail_rules(option, detail.number, detail.text.as_deref())
        }

        QuestionKind::Datetime {
            time_format,
            min_date,
            max_date,
        } => {
            let AnswerValue::Text(raw) = answer else {
                return Some(INVALID_ANSWER.to_string());
            };
            datetime_rules(*time_format, min_date.as_deref(), max_date.as_deref(), raw)
        }
    }
}

/// Length bounds and pattern for string answers. `min`/`max` are reused as
/// length bounds here, not magnitudes.
fn string_rules(rules: Option<&ValidationRules>, s: &str) -> Option<String> {
    let rules = rules?;
    let length = s.chars().count() as f64;
    if let Some(min) = rules.min
        && length < min
    {
        return Some(format!("Must be at least {min} characters"));
    }
    if let Some(max) = rules.max
        && length > max
    {
        return Some(format!("Must be at most {max} characters"));
    }
    if let Some(pattern) = &rules.pattern
        && let Some(re) = compiled_pattern(pattern)
        && !re.is_match(s)
    {
        return Some(INVALID_FORMAT.to_string());
    }
    None
}

/// Sub-field requirements of a selected detail option.
fn detail_rules(option: &DetailOption, number: Option<f64>, text: Option<&str>) -> Option<String> {
    if option.has_number_input && number.is_none() {
        return Some(format!("Please enter a number for \"{}\"", option.label));
    }
    if option.has_text_input {
        let text = text.unwrap_or("");
        if text.is_empty() {
            return Some(format!("Please provide details for \"{}\"", option.label));
        }
        let length = text.chars().count();
        if let Some(min) = option.text_min
            && length < min
        {
            return Some(format!("Details must be at least {min} characters"));
        }
        if let Some(max) = option.text_max
            && length > max
        {
            return Some(format!("Details must be at most {max} characters"));
        }
    }
    None
}

/// Shape check, then lexicographic range check against the configured
/// bounds. The formats are lexicographically order-preserving, so no
/// calendar arithmetic is needed; `T` and space separators are equivalent.
fn datetime_rules(
    format: TimeFormat,
    min_date: Option<&str>,
    max_date: Option<&str>,
    raw: &str,
) -> Option<String> {
    if !shape_regex(format).is_match(raw) {
        return Some(format!("Expected format {}", format.as_str()));
    }
    let value = raw.replace('T', " ");
    if let Some(min) = min_date
        && value.as_str() < min.replace('T', " ").as_str()
    {
        return Some(format!("Must not be earlier than {min}"));
    }
    if let Some(max) = max_date
        && value.as_str() > max.replace('T', " ").as_str()
    {
        return Some(format!("Must not be later than {max}"));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use formflow_types::{DetailAnswer, RegionBlock, Section};
    use std::collections::BTreeMap;

    fn section(questions: Vec<Question>) -> Section {
        Section::new("s", "Section", questions)
    }

    #[test]
    fn required_question_without_answer() {
        let s = section(vec![Question::new("name", "Name?", QuestionKind::Text).required()]);
        let errors = validate_section(&s, &Answers::new());
        assert_eq!(errors.get("name").unwrap(), REQUIRED);
    }

    #[test]
    fn required_empty_array_counts_as_unanswered() {
        let s = section(vec![
            Question::new(
                "modes",
                "Modes?",
                QuestionKind::Checkbox {
                    options: vec!["bus".into(), "metro".into()],
                },
            )
            .required(),
        ]);
        let mut answers = Answers::new();
        answers.insert("modes", AnswerValue::Choices(vec![]));
        assert!(validate_section(&s, &answers).contains_key("modes"));
    }

    #[test]
    fn hidden_required_question_is_skipped() {
        let s = section(vec![
            Question::new(
                "used",
                "Used?",
                QuestionKind::Radio {
                    options: vec!["yes".into(), "no".into()],
                },
            )
            .required(),
            Question::new("reason", "Why not?", QuestionKind::Textarea)
                .required()
                .show_when("used", "no"),
        ]);
        let mut answers = Answers::new();
        answers.insert("used", AnswerValue::Choice("yes".into()));

        let errors = validate_section(&s, &answers);
        assert!(errors.is_empty());
    }

    #[test]
    fn matrix_lists_missing_rows() {
        let s = section(vec![
            Question::new(
                "rating",
                "Rate each",
                QuestionKind::Matrix {
                    rows: vec!["A".into(), "B".into()],
                    scale: vec!["1".into(), "2".into()],
                },
            )
            .required(),
        ]);

        let mut answers = Answers::new();
        let mut filled = BTreeMap::new();
        filled.insert("A".to_string(), "1".to_string());
        answers.insert("rating", AnswerValue::Matrix(filled.clone()));

        let errors = validate_section(&s, &answers);
        assert_eq!(errors.get("rating").unwrap(), "Please rate: B");

        filled.insert("B".to_string(), "2".to_string());
        answers.insert("rating", AnswerValue::Matrix(filled));
        assert!(validate_section(&s, &answers).is_empty());
    }

    #[test]
    fn region_blocks_incomplete_indices_are_one_based() {
        let s = section(vec![
            Question::new(
                "segments",
                "Problem segments",
                QuestionKind::RegionBlocks {
                    regions: vec!["台北市".into(), "新北市".into()],
                    min_blocks: 1,
                    max_blocks: 5,
                },
            )
            .required(),
        ]);

        let mut answers = Answers::new();
        answers.insert(
            "segments",
            AnswerValue::Blocks(vec![RegionBlock {
                region: "台北市".into(),
                location: String::new(),
                reason: "test".into(),
            }]),
        );
        let errors = validate_section(&s, &answers);
        assert_eq!(errors.get("segments").unwrap(), "Incomplete blocks: 1");

        answers.insert(
            "segments",
            AnswerValue::Blocks(vec![RegionBlock::new("台北市", "信義路", "壅塞")]),
        );
        assert!(validate_section(&s, &answers).is_empty());
    }

    #[test]
    fn region_blocks_below_minimum() {
        let s = section(vec![Question::new(
            "segments",
            "Problem segments",
            QuestionKind::RegionBlocks {
                regions: vec!["台北市".into()],
                min_blocks: 2,
                max_blocks: 5,
            },
        )]);

        let mut answers = Answers::new();
        answers.insert(
            "segments",
            AnswerValue::Blocks(vec![RegionBlock::new("台北市", "信義路", "壅塞")]),
        );
        let errors = validate_section(&s, &answers);
        assert!(errors.get("segments").unwrap().contains("at least 2"));
    }

    #[test]
    fn detail_option_requires_its_subfield() {
        let s = section(vec![Question::new(
            "frequency",
            "How often?",
            QuestionKind::RadioWithNumber {
                options: vec![
                    DetailOption::plain("Never"),
                    DetailOption::with_number("Times per week"),
                ],
            },
        )]);

        let mut answers = Answers::new();
        answers.insert(
            "frequency",
            AnswerValue::Detail(DetailAnswer::selected("Times per week")),
        );
        let errors = validate_section(&s, &answers);
        assert!(errors.get("frequency").unwrap().contains("Times per week"));

        answers.insert(
            "frequency",
            AnswerValue::Detail(DetailAnswer::selected("Times per week").with_number(3.0)),
        );
        assert!(validate_section(&s, &answers).is_empty());
    }

    #[test]
    fn detail_text_length_bounds_have_distinct_messages() {
        let option = DetailOption::with_text("Other", Some(3), Some(5));
        assert!(
            detail_rules(&option, None, Some("ab"))
                .unwrap()
                .contains("at least 3")
        );
        assert!(
            detail_rules(&option, None, Some("abcdef"))
                .unwrap()
                .contains("at most 5")
        );
        assert!(detail_rules(&option, None, Some("abcd")).is_none());
    }

    #[test]
    fn number_bounds() {
        let s = section(vec![
            Question::new("trips", "Trips?", QuestionKind::Number)
                .with_validation(ValidationRules::bounds(Some(0.0), Some(31.0))),
        ]);
        let mut answers = Answers::new();
        answers.insert("trips", 40i64);
        assert!(validate_section(&s, &answers).contains_key("trips"));

        answers.insert("trips", 12i64);
        assert!(validate_section(&s, &answers).is_empty());
    }

    #[test]
    fn string_bounds_are_lengths() {
        let s = section(vec![
            Question::new("nickname", "Nickname?", QuestionKind::Text)
                .with_validation(ValidationRules::bounds(Some(2.0), Some(4.0))),
        ]);
        let mut answers = Answers::new();
        answers.insert("nickname", "x");
        assert!(
            validate_section(&s, &answers)
                .get("nickname")
                .unwrap()
                .contains("at least 2")
        );

        answers.insert("nickname", "xyz");
        assert!(validate_section(&s, &answers).is_empty());
    }

    #[test]
    fn pattern_mismatch_is_invalid_format() {
        let s = section(vec![
            Question::new("card", "Card number?", QuestionKind::Text)
                .with_validation(ValidationRules::pattern("^[0-9]{4}$")),
        ]);
        let mut answers = Answers::new();
        answers.insert("card", "12ab");
        assert_eq!(
            validate_section(&s, &answers).get("card").unwrap(),
            INVALID_FORMAT
        );

        // A second pass hits the compiled-pattern cache and must agree.
        assert_eq!(
            validate_section(&s, &answers).get("card").unwrap(),
            INVALID_FORMAT
        );
        answers.insert("card", "1234");
        assert!(validate_section(&s, &answers).is_empty());
    }

    #[test]
    fn unparseable_pattern_is_skipped() {
        // Load-time validation rejects this; if it slips through anyway,
        // the pattern check is skipped instead of failing every answer.
        let s = section(vec![
            Question::new("card", "Card number?", QuestionKind::Text)
                .with_validation(ValidationRules::pattern("([")),
        ]);
        let mut answers = Answers::new();
        answers.insert("card", "anything");
        assert!(validate_section(&s, &answers).is_empty());
        assert!(validate_section(&s, &answers).is_empty());
    }

    #[test]
    fn email_shape() {
        let s = section(vec![Question::new("email", "Email?", QuestionKind::Email)]);
        let mut answers = Answers::new();
        answers.insert("email", "not-an-email");
        assert_eq!(
            validate_section(&s, &answers).get("email").unwrap(),
            INVALID_EMAIL
        );

        answers.insert("email", "rider@example.com");
        assert!(validate_section(&s, &answers).is_empty());
    }

    #[test]
    fn year_month_shape_accepts_out_of_calendar_month() {
        // Only the [0-9]{4}-[0-9]{2} shape is enforced; "2024-13" passes and
        // is range-checked solely against minDate/maxDate.
        assert!(datetime_rules(TimeFormat::YearMonth, None, None, "2024-13").is_none());
        assert!(datetime_rules(TimeFormat::YearMonth, None, None, "2024-1").is_some());
        assert!(
            datetime_rules(TimeFormat::YearMonth, None, Some("2024-12"), "2024-13")
                .unwrap()
                .contains("not be later")
        );
    }

    #[test]
    fn datetime_separator_is_normalized_for_comparison() {
        assert!(
            datetime_rules(
                TimeFormat::DateTime,
                Some("2024-06-01 08:00"),
                None,
                "2024-06-01T09:30",
            )
            .is_none()
        );
        assert!(
            datetime_rules(
                TimeFormat::DateTime,
                Some("2024-06-01T10:00"),
                None,
                "2024-06-01 09:30",
            )
            .is_some()
        );
    }

    #[test]
    fn datetime_bounds() {
        let below = datetime_rules(TimeFormat::Date, Some("2024-01-01"), None, "2023-12-31");
        assert!(below.unwrap().contains("not be earlier"));

        let inside = datetime_rules(
            TimeFormat::Date,
            Some("2024-01-01"),
            Some("2024-12-31"),
            "2024-06-15",
        );
        assert!(inside.is_none());
    }

    #[test]
    fn wrong_answer_shape_is_rejected() {
        let s = section(vec![Question::new(
            "rating",
            "Rate each",
            QuestionKind::Matrix {
                rows: vec!["A".into()],
                scale: vec!["1".into()],
            },
        )]);
        let mut answers = Answers::new();
        answers.insert("rating", "free text");
        assert_eq!(
            validate_section(&s, &answers).get("rating").unwrap(),
            INVALID_ANSWER
        );
    }
}

//! A city public-transit satisfaction questionnaire, built with the schema
//! builders. Exercises every question type, conditional visibility across
//! sections and the early-exit rule for non-riders.

use formflow_types::{
    AnswerCondition, DetailOption, EarlyExitRule, Question, QuestionKind, Questionnaire, Section,
    TimeFormat, ValidationRules,
};

/// Labels reused across questions.
pub const OTHER_LABEL: &str = "其他";

fn usage_section() -> Section {
    Section::new(
        "usage",
        "Transit usage",
        vec![
            Question::new(
                "used-transit",
                "Did you ride public transit in the past month?",
                QuestionKind::Radio {
                    options: vec!["yes".into(), "no".into()],
                },
            )
            .required(),
            Question::new(
                "non-rider-reason",
                "Why not?",
                QuestionKind::CheckboxWithOther {
                    options: vec![
                        "No stop near me".into(),
                        "Too slow".into(),
                        "Too expensive".into(),
                        "I prefer driving".into(),
                        OTHER_LABEL.into(),
                    ],
                    other_label: OTHER_LABEL.into(),
                },
            )
            .required()
            .show_when("used-transit", "no"),
            Question::new(
                "might-return",
                "What would bring you back?",
                QuestionKind::Textarea,
            )
            .with_placeholder("Optional")
            .with_validation(ValidationRules::bounds(None, Some(500.0)))
            .show_when("used-transit", "no"),
        ],
    )
    .with_description("Tell us how often you ride, if at all.")
}

fn trips_section() -> Section {
    Section::new(
        "trips",
        "Your trips",
        vec![
            Question::new(
                "main-mode",
                "Which mode do you use most?",
                QuestionKind::SelectWithOther {
                    options: vec![
                        "Bus".into(),
                        "Metro".into(),
                        "Light rail".into(),
                        "Ferry".into(),
                        OTHER_LABEL.into(),
                    ],
                    other_label: OTHER_LABEL.into(),
                },
            )
            .required(),
            Question::new(
                "weekly-trips",
                "Trips per week",
                QuestionKind::Number,
            )
            .required()
            .with_validation(ValidationRules::bounds(Some(1.0), Some(100.0))),
            Question::new(
                "commute-frequency",
                "How do you pay?",
                QuestionKind::RadioWithNumber {
                    options: vec![
                        DetailOption::plain("Single tickets"),
                        DetailOption::with_number("Monthly pass (cost per month)"),
                        DetailOption::plain("Employer-sponsored"),
                    ],
                },
            )
            .required(),
            Question::new(
                "last-ride",
                "Date of your most recent ride",
                QuestionKind::Datetime {
                    time_format: TimeFormat::Date,
                    min_date: Some("2024-01-01".into()),
                    max_date: None,
                },
            ),
            Question::new(
                "usual-departure",
                "Usual departure time",
                QuestionKind::Datetime {
                    time_format: TimeFormat::Time,
                    min_date: None,
                    max_date: None,
                },
            ),
        ],
    )
}

fn experience_section() -> Section {
    Section::new(
        "experience",
        "Service experience",
        vec![
            Question::new(
                "service-ratings",
                "Rate each aspect of the service",
                QuestionKind::Matrix {
                    rows: vec![
                        "Punctuality".into(),
                        "Cleanliness".into(),
                        "Crowding".into(),
                        "Staff courtesy".into(),
                    ],
                    scale: vec![
                        "Very poor".into(),
                        "Poor".into(),
                        "Fair".into(),
                        "Good".into(),
                        "Excellent".into(),
                    ],
                },
            )
            .required(),
            Question::new(
                "pain-points",
                "Which problems have you run into?",
                QuestionKind::Checkbox {
                    options: vec![
                        "Delays".into(),
                        "Overcrowding".into(),
                        "Broken ticket machines".into(),
                        "Poor signage".into(),
                    ],
                },
            ),
            Question::new(
                "worst-incident",
                "Describe the worst incident, if any",
                QuestionKind::RadioWithText {
                    options: vec![
                        DetailOption::plain("Nothing worth reporting"),
                        DetailOption::with_text("Something happened", Some(10), Some(300)),
                    ],
                },
            ),
            Question::new(
                "boarding-station",
                "Which station do you usually board at?",
                QuestionKind::MapSelection,
            ),
        ],
    )
}

fn congestion_section() -> Section {
    Section::new(
        "congestion",
        "Congested segments",
        vec![
            Question::new(
                "congested-segments",
                "Mark the route segments where you experience congestion",
                QuestionKind::RegionBlocks {
                    regions: vec!["台北市".into(), "新北市".into(), "基隆市".into()],
                    min_blocks: 1,
                    max_blocks: 5,
                },
            )
            .required(),
            Question::new(
                "congestion-window",
                "When is it worst?",
                QuestionKind::Datetime {
                    time_format: TimeFormat::DateTime,
                    min_date: Some("2024-01-01 00:00".into()),
                    max_date: Some("2026-12-31 23:59".into()),
                },
            ),
        ],
    )
    .with_description("Only segments you ride regularly.")
}

fn contact_section() -> Section {
    Section::new(
        "contact",
        "Stay in touch",
        vec![
            Question::new(
                "preferred-line",
                "Favorite line",
                QuestionKind::Select {
                    options: vec!["Red".into(), "Blue".into(), "Green".into(), "Orange".into()],
                },
            ),
            Question::new("rider-name", "Your name", QuestionKind::Text)
                .with_validation(ValidationRules::bounds(Some(2.0), Some(50.0))),
            Question::new("rider-email", "Email for the prize draw", QuestionKind::Email),
            Question::new(
                "zip-code",
                "Postal code",
                QuestionKind::Text,
            )
            .with_validation(ValidationRules::pattern(r"^\d{3,6}$")),
            Question::new(
                "pickup-request",
                "Request a paratransit pickup slot",
                QuestionKind::ScheduledRequest,
            ),
            Question::new("final-comment", "Anything else?", QuestionKind::Textarea)
                .with_placeholder("Optional"),
        ],
    )
}

/// The full transit-satisfaction questionnaire.
///
/// Non-riders answer only the usage section: once `used-transit` is "no" and
/// a reason is given, the early-exit rule sends them straight to submission.
pub fn transit_satisfaction() -> Questionnaire {
    Questionnaire::new(
        "transit-satisfaction",
        "Public Transit Satisfaction Survey",
        vec![
            usage_section(),
            trips_section(),
            experience_section(),
            congestion_section(),
            contact_section(),
        ],
    )
    .with_description("Help us improve bus and metro service in your city.")
    .with_version("3")
    .with_organize("City Department of Transportation")
    .with_early_exit(EarlyExitRule {
        after_section: "usage".into(),
        when_all: vec![
            AnswerCondition::equals("used-transit", "no"),
            AnswerCondition::answered("non-rider-reason"),
        ],
    })
}

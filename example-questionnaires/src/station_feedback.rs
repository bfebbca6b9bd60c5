//! A short station-feedback questionnaire defined as raw JSON, the way a
//! survey team would author one without touching Rust.

use formflow_types::{Questionnaire, SchemaError};

/// The JSON schema as it would ship from a content pipeline.
pub const STATION_FEEDBACK_JSON: &str = r#"{
    "id": "station-feedback",
    "title": "Station Feedback",
    "description": "Two minutes of your time after today's trip.",
    "version": "1",
    "organize": "Metro Operations",
    "sections": [
        {
            "id": "visit",
            "title": "Your visit",
            "questions": [
                {
                    "id": "visited-today",
                    "type": "radio",
                    "label": "Did you pass through a station today?",
                    "required": true,
                    "options": ["yes", "no"]
                },
                {
                    "id": "station-name",
                    "type": "text",
                    "label": "Which station?",
                    "required": true,
                    "conditional": { "dependsOn": "visited-today", "showWhen": "yes" }
                }
            ]
        },
        {
            "id": "details",
            "title": "Details",
            "questions": [
                {
                    "id": "cleanliness",
                    "type": "radio",
                    "label": "How clean was the station?",
                    "required": true,
                    "options": ["dirty", "acceptable", "spotless"]
                },
                {
                    "id": "accessibility-issues",
                    "type": "checkbox-with-other",
                    "label": "Any accessibility problems?",
                    "options": ["Broken elevator", "Broken escalator", "Blocked ramp", "其他"],
                    "otherLabel": "其他"
                },
                {
                    "id": "comment",
                    "type": "textarea",
                    "label": "Anything else?",
                    "validation": { "max": 500 }
                }
            ]
        }
    ],
    "earlyExits": [
        {
            "afterSection": "visit",
            "whenAll": [
                { "question": "visited-today", "matches": { "equals": "no" } }
            ]
        }
    ]
}"#;

/// Load the station-feedback questionnaire from its JSON definition.
pub fn station_feedback() -> Result<Questionnaire, SchemaError> {
    Questionnaire::from_json(STATION_FEEDBACK_JSON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_definition_loads() {
        let questionnaire = station_feedback().unwrap();
        assert_eq!(questionnaire.sections.len(), 2);
        assert_eq!(questionnaire.early_exits.len(), 1);
    }
}

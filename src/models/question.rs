// src/models/question.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

/// Localized text for a single answer choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceText {
    pub en: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ar: Option<String>,
}

/// Represents the 'questions' table in the database.
///
/// The answer key (`correct_choice`) never leaves the server; clients
/// only ever see the `PublicQuestion` projection.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    /// Opaque identifier, assigned by the question-bank tooling.
    pub id: String,

    /// Category the question belongs to (e.g. "1", "2", "3").
    pub category: String,

    pub prompt_en: String,
    pub prompt_ar: Option<String>,

    /// Choice key (e.g. "A".."D") to localized choice text.
    /// Stored as a JSON object in the database.
    pub choices: Json<BTreeMap<String, ChoiceText>>,

    /// Key of the correct choice. Must be present in `choices`.
    pub correct_choice: String,
}

impl Question {
    /// True when the answer key points at one of the question's own choices.
    pub fn has_valid_answer_key(&self) -> bool {
        self.choices.contains_key(&self.correct_choice)
    }
}

/// DTO for sending a question to exam takers (excludes the answer key).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: String,
    pub category: String,
    pub prompt_en: String,
    pub prompt_ar: Option<String>,
    pub choices: Json<BTreeMap<String, ChoiceText>>,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        PublicQuestion {
            id: q.id,
            category: q.category,
            prompt_en: q.prompt_en,
            prompt_ar: q.prompt_ar,
            choices: q.choices,
        }
    }
}

/// DTO for creating a question (also used by the bulk load).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 64))]
    pub id: String,
    #[validate(length(min = 1, max = 20))]
    pub category: String,
    #[validate(length(min = 1, max = 2000))]
    pub prompt_en: String,
    #[validate(length(max = 2000))]
    pub prompt_ar: Option<String>,
    #[validate(custom(function = validate_choices))]
    pub choices: BTreeMap<String, ChoiceText>,
    #[validate(length(min = 1, max = 8))]
    pub correct_choice: String,
}

impl CreateQuestionRequest {
    /// Cross-field invariant the derive cannot express: the answer key
    /// must name one of the submitted choices.
    pub fn answer_key_matches_choices(&self) -> bool {
        self.choices.contains_key(&self.correct_choice)
    }
}

/// DTO for updating a question. Fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateQuestionRequest {
    pub category: Option<String>,
    pub prompt_en: Option<String>,
    pub prompt_ar: Option<String>,
    pub choices: Option<BTreeMap<String, ChoiceText>>,
    pub correct_choice: Option<String>,
}

fn validate_choices(
    choices: &BTreeMap<String, ChoiceText>,
) -> Result<(), validator::ValidationError> {
    if choices.is_empty() {
        return Err(validator::ValidationError::new("choices_cannot_be_empty"));
    }
    for (key, text) in choices {
        if key.is_empty() || key.len() > 8 {
            return Err(validator::ValidationError::new("invalid_choice_key"));
        }
        if text.en.is_empty() || text.en.len() > 1000 {
            return Err(validator::ValidationError::new("invalid_choice_text"));
        }
    }
    Ok(())
}

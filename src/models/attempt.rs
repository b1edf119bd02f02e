// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};

/// One scored answer inside an attempt.
///
/// `is_correct` is always computed server-side from the authoritative
/// question; a correctness flag supplied by the client is never read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: String,

    /// The choice key the student picked, or None when left blank.
    pub selected_choice: Option<String>,

    pub is_correct: bool,
}

/// Represents the 'attempts' table in the database.
/// Rows are append-only; the engine never updates or deletes them.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Attempt {
    pub id: i64,
    pub user_id: i64,
    pub score: i64,
    pub total: i64,
    pub answers: Json<Vec<AnswerRecord>>,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

/// A scored attempt before persistence. The store assigns the row ID
/// and the server-side timestamp at write time.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptDraft {
    pub score: i64,
    pub total: i64,
    pub answers: Vec<AnswerRecord>,
}

/// Attempt row joined with the student's email for admin review.
/// The email is NULL when the account has since been deleted.
#[derive(Debug, Serialize, FromRow)]
pub struct AttemptSummary {
    pub id: i64,
    pub user_id: i64,
    pub email: Option<String>,
    pub score: i64,
    pub total: i64,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

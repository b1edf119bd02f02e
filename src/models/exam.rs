// src/models/exam.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::attempt::AnswerRecord;
use crate::models::question::PublicQuestion;

/// The question set bound to a user for the duration of one exam.
///
/// Holds identifiers only — never prompts or answer keys — so nothing
/// sensitive ever sits in session state. The order is the order the
/// paper was issued in, and it must not change between issue and
/// scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExamSession {
    pub question_ids: Vec<String>,
}

impl ExamSession {
    pub fn new(question_ids: Vec<String>) -> Self {
        Self { question_ids }
    }

    /// An empty binding means "no active exam", never a zero-question
    /// attempt.
    pub fn is_empty(&self) -> bool {
        self.question_ids.is_empty()
    }
}

/// DTO for the issued exam paper.
#[derive(Debug, Serialize)]
pub struct ExamPaper {
    pub total: usize,
    pub questions: Vec<PublicQuestion>,
}

/// DTO for submitting exam answers.
///
/// Keys are question IDs; a question left blank is simply absent.
/// Question identity is never trusted from here — scoring walks the
/// server-side binding instead.
#[derive(Debug, Deserialize)]
pub struct SubmitExamRequest {
    pub answers: HashMap<String, String>,
}

/// DTO for the scored result returned right after submission.
#[derive(Debug, Serialize)]
pub struct ExamResult {
    pub attempt_id: i64,
    pub score: i64,
    pub total: i64,
    pub answers: Vec<AnswerRecord>,
}

// src/engine/mod.rs

pub mod scorer;
pub mod selector;

use std::collections::HashMap;

use crate::error::AppError;
use crate::models::exam::{ExamResult, ExamSession};
use crate::models::question::Question;
use crate::store::{AttemptStore, QuestionRepository, SessionStore};

/// Issues a new exam for the user.
///
/// Selects a stratified random question set, binds its IDs to the user's
/// session (replacing any unsubmitted binding), and returns the bound
/// questions for presentation. Only the binding decides what gets scored
/// later; the returned questions are a courtesy copy for rendering.
pub async fn start_exam<R, S>(
    repo: &R,
    sessions: &S,
    user_id: i64,
    categories: &[String],
    quota: usize,
) -> Result<Vec<Question>, AppError>
where
    R: QuestionRepository + ?Sized,
    S: SessionStore + ?Sized,
{
    let ids = selector::select_exam_questions(repo, categories, quota).await?;
    let session = ExamSession::new(ids);
    sessions.bind(user_id, &session).await?;

    // Resolve the bound IDs back into questions. An ID that vanished
    // between selection and here is simply skipped, mirroring how the
    // scorer treats it at submission time.
    let mut questions = Vec::with_capacity(session.question_ids.len());
    for id in &session.question_ids {
        if let Some(question) = repo.get(id).await? {
            questions.push(question);
        }
    }

    Ok(questions)
}

/// Scores and records a submission, then consumes the session binding.
///
/// The bound question IDs are read server-side; the client only supplies
/// choice keys. An empty binding means there is no exam to submit
/// (`NoActiveExam`) and writes nothing. The binding is cleared only after
/// the attempt is durably recorded, so a failed write leaves the exam
/// submittable rather than silently lost.
pub async fn submit_exam<R, S, A>(
    repo: &R,
    sessions: &S,
    attempts: &A,
    user_id: i64,
    submitted: &HashMap<String, String>,
) -> Result<ExamResult, AppError>
where
    R: QuestionRepository + ?Sized,
    S: SessionStore + ?Sized,
    A: AttemptStore + ?Sized,
{
    let session = sessions.read(user_id).await?;
    if session.is_empty() {
        return Err(AppError::NoActiveExam);
    }

    let draft = scorer::score_submission(repo, &session.question_ids, submitted).await?;
    let attempt_id = attempts.create(user_id, &draft).await?;
    sessions.clear(user_id).await?;

    Ok(ExamResult {
        attempt_id,
        score: draft.score,
        total: draft.total,
        answers: draft.answers,
    })
}

// src/handlers/exam.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};

use crate::{
    engine,
    error::AppError,
    models::exam::{ExamPaper, SubmitExamRequest},
    models::question::PublicQuestion,
    state::AppState,
    store::postgres::{PgAttemptStore, PgQuestionRepository, PgSessionStore},
    utils::jwt::Claims,
};

/// Issues a new exam paper for the authenticated student.
///
/// The selected question IDs are bound to the user server-side; the
/// response carries the questions without their answer keys. Calling
/// this again abandons the previous unsubmitted paper.
pub async fn start_exam(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let repo = PgQuestionRepository::new(state.pool.clone());
    let sessions = PgSessionStore::new(state.pool.clone());

    let questions = engine::start_exam(
        &repo,
        &sessions,
        claims.user_id(),
        &state.config.exam_categories,
        state.config.questions_per_category,
    )
    .await?;

    tracing::info!(
        "Issued exam with {} questions to user {}",
        questions.len(),
        claims.user_id()
    );

    let questions: Vec<PublicQuestion> = questions.into_iter().map(Into::into).collect();

    Ok(Json(ExamPaper {
        total: questions.len(),
        questions,
    }))
}

/// Scores the authenticated student's submission and records the attempt.
///
/// Question identity comes from the server-side binding, never from the
/// request body. Submitting without an active exam is a 409.
pub async fn submit_exam(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SubmitExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    let repo = PgQuestionRepository::new(state.pool.clone());
    let sessions = PgSessionStore::new(state.pool.clone());
    let attempts = PgAttemptStore::new(state.pool.clone());

    let result = engine::submit_exam(
        &repo,
        &sessions,
        &attempts,
        claims.user_id(),
        &req.answers,
    )
    .await?;

    tracing::info!(
        "User {} scored {}/{} (attempt {})",
        claims.user_id(),
        result.score,
        result.total,
        result.attempt_id
    );

    Ok(Json(result))
}

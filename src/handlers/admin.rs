// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use sqlx::types::Json as SqlJson;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        attempt::AttemptSummary,
        question::{CreateQuestionRequest, Question, UpdateQuestionRequest},
        user::{AdminCreateUserRequest, BulkUserEntry, ROLE_ADMIN, ROLE_STUDENT, User},
    },
    state::AppState,
    store::AttemptStore,
    store::postgres::PgAttemptStore,
    utils::{hash::hash_password, jwt::Claims},
};

// ---------------------------------------------------------------------
// Attempt review & export
// ---------------------------------------------------------------------

/// Lists all recorded attempts, newest first, with the student's email.
/// Admin only.
pub async fn list_attempts(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let attempts = sqlx::query_as::<_, AttemptSummary>(
        r#"
        SELECT a.id, a.user_id, u.email, a.score, a.total, a.submitted_at
        FROM attempts a
        LEFT JOIN users u ON u.id = a.user_id
        ORDER BY a.submitted_at DESC
        "#,
    )
    .fetch_all(&state.pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list attempts: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(attempts))
}

/// Fetches one attempt with its full answer breakdown.
/// Admin only.
pub async fn get_attempt(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = PgAttemptStore::new(state.pool.clone());

    let attempt = attempts
        .get(id)
        .await?
        .ok_or(AppError::NotFound("Attempt not found".to_string()))?;

    Ok(Json(attempt))
}

/// Exports all attempts as CSV.
/// Admin only.
pub async fn export_attempts(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let attempts = sqlx::query_as::<_, AttemptSummary>(
        r#"
        SELECT a.id, a.user_id, u.email, a.score, a.total, a.submitted_at
        FROM attempts a
        LEFT JOIN users u ON u.id = a.user_id
        ORDER BY a.submitted_at DESC
        "#,
    )
    .fetch_all(&state.pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to export attempts: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["attempt_id", "email", "score", "total", "submitted_at"])
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    for attempt in &attempts {
        writer
            .write_record([
                attempt.id.to_string(),
                attempt.email.clone().unwrap_or_else(|| "deleted".to_string()),
                attempt.score.to_string(),
                attempt.total.to_string(),
                attempt.submitted_at.to_rfc3339(),
            ])
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    }

    let body = writer
        .into_inner()
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"attempts.csv\"",
            ),
        ],
        body,
    ))
}

// ---------------------------------------------------------------------
// Question bank management
// ---------------------------------------------------------------------

/// Lists the full question bank, answer keys included.
/// Admin only.
pub async fn list_questions(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, category, prompt_en, prompt_ar, choices, correct_choice
        FROM questions
        ORDER BY category, id
        "#,
    )
    .fetch_all(&state.pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list questions: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(questions))
}

/// Creates a new quiz question.
/// Admin only.
pub async fn create_question(
    State(state): State<AppState>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    if !payload.answer_key_matches_choices() {
        return Err(AppError::BadRequest(format!(
            "Correct choice '{}' is not one of the provided choices",
            payload.correct_choice
        )));
    }

    sqlx::query(
        r#"
        INSERT INTO questions (id, category, prompt_en, prompt_ar, choices, correct_choice)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(&payload.id)
    .bind(&payload.category)
    .bind(&payload.prompt_en)
    .bind(&payload.prompt_ar)
    .bind(SqlJson(&payload.choices))
    .bind(&payload.correct_choice)
    .execute(&state.pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("unique constraint") || e.to_string().contains("23505") {
            AppError::Conflict(format!("Question '{}' already exists", payload.id))
        } else {
            tracing::error!("Failed to create question: {:?}", e);
            AppError::InternalServerError(e.to_string())
        }
    })?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": payload.id })),
    ))
}

/// Updates a question by ID. Fields are optional; the merged result
/// must still have an answer key that names one of its choices.
/// Admin only.
pub async fn update_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut question = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, category, prompt_en, prompt_ar, choices, correct_choice
        FROM questions
        WHERE id = $1
        "#,
    )
    .bind(&id)
    .fetch_optional(&state.pool)
    .await
    .map_err(|e| AppError::InternalServerError(e.to_string()))?
    .ok_or(AppError::NotFound("Question not found".to_string()))?;

    if let Some(category) = payload.category {
        question.category = category;
    }
    if let Some(prompt_en) = payload.prompt_en {
        question.prompt_en = prompt_en;
    }
    if let Some(prompt_ar) = payload.prompt_ar {
        question.prompt_ar = Some(prompt_ar);
    }
    if let Some(choices) = payload.choices {
        question.choices = SqlJson(choices);
    }
    if let Some(correct_choice) = payload.correct_choice {
        question.correct_choice = correct_choice;
    }

    if !question.has_valid_answer_key() {
        return Err(AppError::BadRequest(format!(
            "Correct choice '{}' is not one of the question's choices",
            question.correct_choice
        )));
    }

    sqlx::query(
        r#"
        UPDATE questions
        SET category = $1, prompt_en = $2, prompt_ar = $3, choices = $4, correct_choice = $5
        WHERE id = $6
        "#,
    )
    .bind(&question.category)
    .bind(&question.prompt_en)
    .bind(&question.prompt_ar)
    .bind(SqlJson(&question.choices.0))
    .bind(&question.correct_choice)
    .bind(&id)
    .execute(&state.pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update question: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(StatusCode::OK)
}

/// Deletes a quiz question by ID.
/// Admin only.
pub async fn delete_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM questions WHERE id = $1")
        .bind(&id)
        .execute(&state.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete question: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Replaces the entire question bank in one transaction: existing
/// questions are wiped, then the payload is loaded. This is the API
/// counterpart of the original bulk-upload spreadsheet tooling.
/// Admin only.
pub async fn bulk_replace_questions(
    State(state): State<AppState>,
    Json(payload): Json<Vec<CreateQuestionRequest>>,
) -> Result<impl IntoResponse, AppError> {
    // Validate everything up front; a bad row must not wipe the bank.
    for question in &payload {
        if let Err(validation_errors) = question.validate() {
            return Err(AppError::BadRequest(format!(
                "Question '{}': {}",
                question.id, validation_errors
            )));
        }
        if !question.answer_key_matches_choices() {
            return Err(AppError::BadRequest(format!(
                "Question '{}': correct choice '{}' is not one of its choices",
                question.id, question.correct_choice
            )));
        }
    }

    let mut tx = state.pool.begin().await.map_err(|e| {
        tracing::error!("Failed to open bulk-load transaction: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    sqlx::query("DELETE FROM questions")
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    for question in &payload {
        sqlx::query(
            r#"
            INSERT INTO questions (id, category, prompt_en, prompt_ar, choices, correct_choice)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&question.id)
        .bind(&question.category)
        .bind(&question.prompt_en)
        .bind(&question.prompt_ar)
        .bind(SqlJson(&question.choices))
        .bind(&question.correct_choice)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if e.to_string().contains("unique constraint") || e.to_string().contains("23505") {
                AppError::Conflict(format!("Duplicate question ID '{}'", question.id))
            } else {
                tracing::error!("Failed to load question '{}': {:?}", question.id, e);
                AppError::InternalServerError(e.to_string())
            }
        })?;
    }

    tx.commit().await.map_err(|e| {
        tracing::error!("Failed to commit bulk load: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    tracing::info!("Question bank replaced with {} questions", payload.len());

    Ok(Json(serde_json::json!({ "loaded": payload.len() })))
}

// ---------------------------------------------------------------------
// User management
// ---------------------------------------------------------------------

/// Lists all users in the system.
/// Admin only.
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, password, role, active, created_at
        FROM users
        ORDER BY id DESC
        "#,
    )
    .fetch_all(&state.pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list users: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(users))
}

/// Creates a new user with a specific role.
/// Admin only.
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<AdminCreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    if payload.role != ROLE_STUDENT && payload.role != ROLE_ADMIN {
        return Err(AppError::BadRequest(format!(
            "Unknown role '{}'",
            payload.role
        )));
    }

    let email = payload.email.trim().to_lowercase();
    let hashed_password = hash_password(&payload.password)?;

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO users (email, password, role)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(&email)
    .bind(&hashed_password)
    .bind(&payload.role)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("unique constraint") || e.to_string().contains("23505") {
            AppError::Conflict(format!("Email '{}' already exists", email))
        } else {
            tracing::error!("Failed to create user: {:?}", e);
            AppError::InternalServerError(e.to_string())
        }
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// Bulk-upserts users, the API counterpart of the original user
/// provisioning spreadsheet. Existing emails are overwritten with the
/// new password, role, and active flag; unknown roles coerce to
/// 'student'; rows with an empty email are skipped.
/// Admin only.
pub async fn bulk_upsert_users(
    State(state): State<AppState>,
    Json(payload): Json<Vec<BulkUserEntry>>,
) -> Result<impl IntoResponse, AppError> {
    let mut loaded = 0usize;

    for entry in &payload {
        let email = entry.normalized_email();
        if email.is_empty() {
            continue;
        }

        let hashed_password = hash_password(&entry.password)?;

        sqlx::query(
            r#"
            INSERT INTO users (email, password, role, active)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE SET
                password = EXCLUDED.password,
                role = EXCLUDED.role,
                active = EXCLUDED.active
            "#,
        )
        .bind(&email)
        .bind(&hashed_password)
        .bind(entry.effective_role())
        .bind(entry.active.unwrap_or(true))
        .execute(&state.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to upsert user '{}': {:?}", email, e);
            AppError::InternalServerError(e.to_string())
        })?;

        loaded += 1;
    }

    tracing::info!("Bulk user load upserted {} accounts", loaded);

    Ok(Json(serde_json::json!({ "loaded": loaded })))
}

/// Deletes a user by ID.
/// Admin only. Prevents deleting self.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if id == claims.user_id() {
        return Err(AppError::BadRequest("Cannot delete yourself".to_string()));
    }

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete user: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;

use crate::error::AppError;
use crate::models::attempt::{Attempt, AttemptDraft};
use crate::models::exam::ExamSession;
use crate::models::question::Question;
use crate::store::{AttemptStore, QuestionRepository, SessionStore};

/// Question bank backed by the 'questions' table.
#[derive(Clone)]
pub struct PgQuestionRepository {
    pool: PgPool,
}

impl PgQuestionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuestionRepository for PgQuestionRepository {
    async fn get(&self, id: &str) -> Result<Option<Question>, AppError> {
        let question = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, category, prompt_en, prompt_ar, choices, correct_choice
            FROM questions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch question {}: {:?}", id, e);
            AppError::InternalServerError(e.to_string())
        })?;

        Ok(question)
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<Question>, AppError> {
        let questions = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, category, prompt_en, prompt_ar, choices, correct_choice
            FROM questions
            WHERE category = $1
            ORDER BY id
            "#,
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list questions in category {}: {:?}", category, e);
            AppError::InternalServerError(e.to_string())
        })?;

        Ok(questions)
    }
}

/// Exam session bindings backed by the 'exam_sessions' table, one row
/// per user.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn bind(&self, user_id: i64, session: &ExamSession) -> Result<(), AppError> {
        // Upsert: a new exam start replaces any unsubmitted binding.
        sqlx::query(
            r#"
            INSERT INTO exam_sessions (user_id, question_ids)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET
                question_ids = EXCLUDED.question_ids,
                created_at = now()
            "#,
        )
        .bind(user_id)
        .bind(Json(&session.question_ids))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to bind exam session for user {}: {:?}", user_id, e);
            AppError::InternalServerError(e.to_string())
        })?;

        Ok(())
    }

    async fn read(&self, user_id: i64) -> Result<ExamSession, AppError> {
        let bound = sqlx::query_scalar::<_, Json<Vec<String>>>(
            "SELECT question_ids FROM exam_sessions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to read exam session for user {}: {:?}", user_id, e);
            AppError::InternalServerError(e.to_string())
        })?;

        Ok(bound
            .map(|ids| ExamSession::new(ids.0))
            .unwrap_or_default())
    }

    async fn clear(&self, user_id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM exam_sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to clear exam session for user {}: {:?}", user_id, e);
                AppError::InternalServerError(e.to_string())
            })?;

        Ok(())
    }
}

/// Attempt records backed by the 'attempts' table. Insert-only.
#[derive(Clone)]
pub struct PgAttemptStore {
    pool: PgPool,
}

impl PgAttemptStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttemptStore for PgAttemptStore {
    async fn create(&self, user_id: i64, draft: &AttemptDraft) -> Result<i64, AppError> {
        // submitted_at comes from the database clock, never the client.
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO attempts (user_id, score, total, answers)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(draft.score)
        .bind(draft.total)
        .bind(Json(&draft.answers))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to record attempt for user {}: {:?}", user_id, e);
            AppError::InternalServerError(e.to_string())
        })?;

        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Option<Attempt>, AppError> {
        let attempt = sqlx::query_as::<_, Attempt>(
            r#"
            SELECT id, user_id, score, total, answers, submitted_at
            FROM attempts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch attempt {}: {:?}", id, e);
            AppError::InternalServerError(e.to_string())
        })?;

        Ok(attempt)
    }
}

// src/store/mod.rs

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::attempt::{Attempt, AttemptDraft};
use crate::models::exam::ExamSession;
use crate::models::question::Question;

/// Read-only access to the question bank.
///
/// The engine re-fetches questions through `get` at scoring time rather
/// than trusting anything cached or client-supplied; implementations
/// must always answer from the source of truth.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Question>, AppError>;
    async fn list_by_category(&self, category: &str) -> Result<Vec<Question>, AppError>;
}

/// Per-user binding of an issued exam's question IDs.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Overwrites any prior binding for this user. An abandoned unsubmitted
    /// exam leaves no trace.
    async fn bind(&self, user_id: i64, session: &ExamSession) -> Result<(), AppError>;

    /// Returns the bound session, empty when nothing is bound.
    async fn read(&self, user_id: i64) -> Result<ExamSession, AppError>;

    async fn clear(&self, user_id: i64) -> Result<(), AppError>;
}

/// Append-only store of scored attempts.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Persists one attempt, assigning the ID and the server-side
    /// submission timestamp. A failed write must surface as an error;
    /// a score that was not durably recorded is worthless.
    async fn create(&self, user_id: i64, draft: &AttemptDraft) -> Result<i64, AppError>;

    async fn get(&self, id: i64) -> Result<Option<Attempt>, AppError>;
}

// src/store/memory.rs

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::attempt::{Attempt, AttemptDraft};
use crate::models::exam::ExamSession;
use crate::models::question::Question;
use crate::store::{AttemptStore, QuestionRepository, SessionStore};

/// In-memory question bank. Used by the engine tests and handy for
/// local experiments without a database.
#[derive(Default)]
pub struct MemoryQuestionRepository {
    questions: RwLock<BTreeMap<String, Question>>,
}

impl MemoryQuestionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, question: Question) {
        self.questions
            .write()
            .expect("question lock poisoned")
            .insert(question.id.clone(), question);
    }

    /// Simulates the bank mutating underneath a bound session.
    pub fn remove(&self, id: &str) {
        self.questions
            .write()
            .expect("question lock poisoned")
            .remove(id);
    }
}

#[async_trait]
impl QuestionRepository for MemoryQuestionRepository {
    async fn get(&self, id: &str) -> Result<Option<Question>, AppError> {
        let questions = self.questions.read().expect("question lock poisoned");
        Ok(questions.get(id).cloned())
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<Question>, AppError> {
        let questions = self.questions.read().expect("question lock poisoned");
        Ok(questions
            .values()
            .filter(|q| q.category == category)
            .cloned()
            .collect())
    }
}

/// In-memory session bindings.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<i64, Vec<String>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn bind(&self, user_id: i64, session: &ExamSession) -> Result<(), AppError> {
        self.sessions
            .write()
            .expect("session lock poisoned")
            .insert(user_id, session.question_ids.clone());
        Ok(())
    }

    async fn read(&self, user_id: i64) -> Result<ExamSession, AppError> {
        let sessions = self.sessions.read().expect("session lock poisoned");
        Ok(sessions
            .get(&user_id)
            .map(|ids| ExamSession::new(ids.clone()))
            .unwrap_or_default())
    }

    async fn clear(&self, user_id: i64) -> Result<(), AppError> {
        self.sessions
            .write()
            .expect("session lock poisoned")
            .remove(&user_id);
        Ok(())
    }
}

/// In-memory attempt log with sequential IDs.
#[derive(Default)]
pub struct MemoryAttemptStore {
    attempts: RwLock<Vec<Attempt>>,
}

impl MemoryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.attempts.read().expect("attempt lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AttemptStore for MemoryAttemptStore {
    async fn create(&self, user_id: i64, draft: &AttemptDraft) -> Result<i64, AppError> {
        let mut attempts = self.attempts.write().expect("attempt lock poisoned");
        let id = attempts.len() as i64 + 1;
        attempts.push(Attempt {
            id,
            user_id,
            score: draft.score,
            total: draft.total,
            answers: sqlx::types::Json(draft.answers.clone()),
            submitted_at: chrono::Utc::now(),
        });
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Option<Attempt>, AppError> {
        let attempts = self.attempts.read().expect("attempt lock poisoned");
        Ok(attempts.iter().find(|a| a.id == id).cloned())
    }
}

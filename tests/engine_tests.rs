// tests/engine_tests.rs
//
// Exercises the exam engine end-to-end against the in-memory stores:
// selection, session binding, scoring, and attempt recording, without
// needing a database.

use std::collections::{BTreeMap, HashMap};

use examhall::engine;
use examhall::engine::selector::select_exam_questions;
use examhall::error::AppError;
use examhall::models::exam::ExamSession;
use examhall::models::question::{ChoiceText, Question};
use examhall::store::memory::{MemoryAttemptStore, MemoryQuestionRepository, MemorySessionStore};
use examhall::store::{AttemptStore, SessionStore};

const USER: i64 = 7;

fn question(id: &str, category: &str, correct: &str) -> Question {
    let choice = |en: &str| ChoiceText {
        en: en.to_string(),
        ar: Some(format!("{} (ar)", en)),
    };
    Question {
        id: id.to_string(),
        category: category.to_string(),
        prompt_en: format!("Prompt for {}", id),
        prompt_ar: Some(format!("Prompt for {} (ar)", id)),
        choices: sqlx::types::Json(BTreeMap::from([
            ("A".to_string(), choice("First")),
            ("B".to_string(), choice("Second")),
            ("C".to_string(), choice("Third")),
            ("D".to_string(), choice("Fourth")),
        ])),
        correct_choice: correct.to_string(),
    }
}

fn categories() -> Vec<String> {
    vec!["1".to_string(), "2".to_string(), "3".to_string()]
}

/// The worked example: categories {"1": [q1, q2], "2": [q3], "3": []},
/// quota 10. The paper is [q1, q2, q3]; answering q1 correctly, q2
/// wrongly, and leaving q3 blank scores 1/3.
#[tokio::test]
async fn full_exam_flow() {
    let repo = MemoryQuestionRepository::new();
    repo.insert(question("q1", "1", "A"));
    repo.insert(question("q2", "1", "A"));
    repo.insert(question("q3", "2", "B"));
    let sessions = MemorySessionStore::new();
    let attempts = MemoryAttemptStore::new();

    let paper = engine::start_exam(&repo, &sessions, USER, &categories(), 10)
        .await
        .unwrap();

    let ids: Vec<&str> = paper.iter().map(|q| q.id.as_str()).collect();
    assert_eq!(ids.len(), 3);
    assert!(ids[..2].contains(&"q1") && ids[..2].contains(&"q2"));
    assert_eq!(ids[2], "q3");

    let submitted = HashMap::from([
        ("q1".to_string(), "A".to_string()),
        ("q2".to_string(), "B".to_string()),
    ]);

    let result = engine::submit_exam(&repo, &sessions, &attempts, USER, &submitted)
        .await
        .unwrap();

    assert_eq!(result.score, 1);
    assert_eq!(result.total, 3);
    assert_eq!(result.answers.len(), 3);

    let q3_answer = result
        .answers
        .iter()
        .find(|a| a.question_id == "q3")
        .unwrap();
    assert_eq!(q3_answer.selected_choice, None);
    assert!(!q3_answer.is_correct);

    // The attempt is durably recorded...
    let stored = attempts.get(result.attempt_id).await.unwrap().unwrap();
    assert_eq!(stored.user_id, USER);
    assert_eq!(stored.score, 1);
    assert_eq!(stored.total, 3);
    assert_eq!(stored.answers.0, result.answers);

    // ...and the binding is consumed.
    assert!(sessions.read(USER).await.unwrap().is_empty());
}

#[tokio::test]
async fn binding_is_stable_until_overwritten() {
    let sessions = MemorySessionStore::new();

    let first = ExamSession::new(vec!["a".to_string(), "b".to_string()]);
    sessions.bind(USER, &first).await.unwrap();

    // Repeated reads return the same IDs in the same order.
    assert_eq!(sessions.read(USER).await.unwrap(), first);
    assert_eq!(sessions.read(USER).await.unwrap(), first);

    // Rebinding replaces the set wholesale.
    let second = ExamSession::new(vec!["c".to_string()]);
    sessions.bind(USER, &second).await.unwrap();
    assert_eq!(sessions.read(USER).await.unwrap(), second);

    // Another user's binding is untouched.
    assert!(sessions.read(USER + 1).await.unwrap().is_empty());
}

#[tokio::test]
async fn submitting_without_a_session_writes_nothing() {
    let repo = MemoryQuestionRepository::new();
    repo.insert(question("q1", "1", "A"));
    let sessions = MemorySessionStore::new();
    let attempts = MemoryAttemptStore::new();

    let submitted = HashMap::from([("q1".to_string(), "A".to_string())]);
    let err = engine::submit_exam(&repo, &sessions, &attempts, USER, &submitted)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NoActiveExam));
    assert!(attempts.is_empty());
}

#[tokio::test]
async fn resubmission_after_success_is_rejected() {
    let repo = MemoryQuestionRepository::new();
    repo.insert(question("q1", "1", "A"));
    let sessions = MemorySessionStore::new();
    let attempts = MemoryAttemptStore::new();

    engine::start_exam(&repo, &sessions, USER, &categories(), 10)
        .await
        .unwrap();

    let submitted = HashMap::from([("q1".to_string(), "A".to_string())]);
    engine::submit_exam(&repo, &sessions, &attempts, USER, &submitted)
        .await
        .unwrap();

    // A stale replay (browser back-button) finds no binding and
    // records nothing further.
    let err = engine::submit_exam(&repo, &sessions, &attempts, USER, &submitted)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NoActiveExam));
    assert_eq!(attempts.len(), 1);
}

#[tokio::test]
async fn question_deleted_mid_exam_does_not_count_against_student() {
    let repo = MemoryQuestionRepository::new();
    repo.insert(question("q1", "1", "A"));
    repo.insert(question("q2", "1", "B"));
    repo.insert(question("q3", "2", "C"));
    let sessions = MemorySessionStore::new();
    let attempts = MemoryAttemptStore::new();

    let paper = engine::start_exam(&repo, &sessions, USER, &categories(), 10)
        .await
        .unwrap();
    assert_eq!(paper.len(), 3);

    // The bank mutates between issue and submission.
    repo.remove("q2");

    let submitted = HashMap::from([
        ("q1".to_string(), "A".to_string()),
        ("q2".to_string(), "B".to_string()),
        ("q3".to_string(), "D".to_string()),
    ]);

    let result = engine::submit_exam(&repo, &sessions, &attempts, USER, &submitted)
        .await
        .unwrap();

    assert_eq!(result.total, 2);
    assert_eq!(result.score, 1);
    assert!(result.answers.iter().all(|a| a.question_id != "q2"));
}

#[tokio::test]
async fn empty_bank_issues_a_degenerate_paper() {
    let repo = MemoryQuestionRepository::new();
    let sessions = MemorySessionStore::new();
    let attempts = MemoryAttemptStore::new();

    let paper = engine::start_exam(&repo, &sessions, USER, &categories(), 10)
        .await
        .unwrap();
    assert!(paper.is_empty());

    // An empty binding is indistinguishable from no exam at all.
    let err = engine::submit_exam(&repo, &sessions, &attempts, USER, &HashMap::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NoActiveExam));
    assert!(attempts.is_empty());
}

#[tokio::test]
async fn selection_is_stratified_over_a_large_bank() {
    let repo = MemoryQuestionRepository::new();
    let mut by_category: HashMap<String, Vec<String>> = HashMap::new();
    for (category, count) in [("1", 25), ("2", 10), ("3", 4)] {
        for _ in 0..count {
            let id = format!("c{}-{}", category, uuid::Uuid::new_v4());
            repo.insert(question(&id, category, "A"));
            by_category
                .entry(category.to_string())
                .or_default()
                .push(id);
        }
    }

    let ids = select_exam_questions(&repo, &categories(), 10)
        .await
        .unwrap();

    // min(25,10) + min(10,10) + min(4,10)
    assert_eq!(ids.len(), 24);
    assert!(ids[..10]
        .iter()
        .all(|id| by_category["1"].contains(id)));
    assert!(ids[10..20]
        .iter()
        .all(|id| by_category["2"].contains(id)));
    assert!(ids[20..]
        .iter()
        .all(|id| by_category["3"].contains(id)));
}

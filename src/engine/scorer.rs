// src/engine/scorer.rs

use std::collections::HashMap;

use crate::error::AppError;
use crate::models::attempt::{AnswerRecord, AttemptDraft};
use crate::store::QuestionRepository;

/// Scores a submission against the bound question set.
///
/// Every bound ID is re-resolved from the question repository so that
/// correctness is always computed from the authoritative answer key.
/// A bound ID that no longer resolves is dropped from both the total
/// and the answer list — a mutable question bank may shrink between
/// issue and submission, and that must not count against the student.
pub async fn score_submission<R>(
    repo: &R,
    bound_ids: &[String],
    submitted: &HashMap<String, String>,
) -> Result<AttemptDraft, AppError>
where
    R: QuestionRepository + ?Sized,
{
    let mut answers = Vec::with_capacity(bound_ids.len());
    let mut score = 0i64;

    for id in bound_ids {
        let Some(question) = repo.get(id).await? else {
            continue;
        };

        let selected = submitted.get(id).cloned();
        let is_correct = selected.as_deref() == Some(question.correct_choice.as_str());
        if is_correct {
            score += 1;
        }

        answers.push(AnswerRecord {
            question_id: id.clone(),
            selected_choice: selected,
            is_correct,
        });
    }

    Ok(AttemptDraft {
        score,
        total: answers.len() as i64,
        answers,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::models::question::{ChoiceText, Question};
    use crate::store::memory::MemoryQuestionRepository;

    fn question(id: &str, correct: &str) -> Question {
        let choice = |en: &str| ChoiceText {
            en: en.to_string(),
            ar: None,
        };
        Question {
            id: id.to_string(),
            category: "1".to_string(),
            prompt_en: format!("Prompt for {}", id),
            prompt_ar: None,
            choices: sqlx::types::Json(BTreeMap::from([
                ("A".to_string(), choice("First")),
                ("B".to_string(), choice("Second")),
                ("C".to_string(), choice("Third")),
                ("D".to_string(), choice("Fourth")),
            ])),
            correct_choice: correct.to_string(),
        }
    }

    fn bound(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[tokio::test]
    async fn counts_exact_matches_only() {
        let repo = MemoryQuestionRepository::new();
        repo.insert(question("q1", "A"));
        repo.insert(question("q2", "B"));
        repo.insert(question("q3", "C"));

        let submitted = HashMap::from([
            ("q1".to_string(), "A".to_string()),
            ("q2".to_string(), "C".to_string()),
            ("q3".to_string(), "C".to_string()),
        ]);

        let draft = score_submission(&repo, &bound(&["q1", "q2", "q3"]), &submitted)
            .await
            .unwrap();

        assert_eq!(draft.score, 2);
        assert_eq!(draft.total, 3);
        assert!(draft.answers[0].is_correct);
        assert!(!draft.answers[1].is_correct);
        assert!(draft.answers[2].is_correct);
    }

    #[tokio::test]
    async fn blank_answers_score_incorrect_not_error() {
        let repo = MemoryQuestionRepository::new();
        repo.insert(question("q1", "A"));
        repo.insert(question("q2", "B"));

        let submitted = HashMap::from([("q1".to_string(), "A".to_string())]);

        let draft = score_submission(&repo, &bound(&["q1", "q2"]), &submitted)
            .await
            .unwrap();

        assert_eq!(draft.score, 1);
        assert_eq!(draft.total, 2);
        assert_eq!(draft.answers[1].selected_choice, None);
        assert!(!draft.answers[1].is_correct);
    }

    #[tokio::test]
    async fn deleted_question_is_dropped_from_total() {
        let repo = MemoryQuestionRepository::new();
        repo.insert(question("q1", "A"));
        repo.insert(question("q2", "B"));
        repo.remove("q2");

        let submitted = HashMap::from([
            ("q1".to_string(), "A".to_string()),
            ("q2".to_string(), "B".to_string()),
        ]);

        let draft = score_submission(&repo, &bound(&["q1", "q2"]), &submitted)
            .await
            .unwrap();

        assert_eq!(draft.score, 1);
        assert_eq!(draft.total, 1);
        assert_eq!(draft.answers.len(), 1);
        assert_eq!(draft.answers[0].question_id, "q1");
    }

    #[tokio::test]
    async fn answers_follow_bound_order_not_submission_order() {
        let repo = MemoryQuestionRepository::new();
        repo.insert(question("q1", "A"));
        repo.insert(question("q2", "B"));
        repo.insert(question("q3", "C"));

        // Submitting extra, unbound question IDs has no effect.
        let submitted = HashMap::from([
            ("q3".to_string(), "C".to_string()),
            ("q1".to_string(), "A".to_string()),
            ("intruder".to_string(), "A".to_string()),
        ]);

        let draft = score_submission(&repo, &bound(&["q2", "q1", "q3"]), &submitted)
            .await
            .unwrap();

        let order: Vec<&str> = draft
            .answers
            .iter()
            .map(|a| a.question_id.as_str())
            .collect();
        assert_eq!(order, vec!["q2", "q1", "q3"]);
        assert_eq!(draft.score, 2);
        assert_eq!(draft.total, 3);
    }
}

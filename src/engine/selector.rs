// src/engine/selector.rs

use rand::seq::SliceRandom;

use crate::error::AppError;
use crate::store::QuestionRepository;

/// Draws the question set for a new exam.
///
/// For each category, in the configured category order, a uniform random
/// sample without replacement of `min(quota, available)` question IDs is
/// taken; the per-category slices are concatenated. A category with too
/// few questions contributes what it has, an empty category contributes
/// nothing, and an entirely empty bank yields an empty paper rather than
/// an error.
pub async fn select_exam_questions<R>(
    repo: &R,
    categories: &[String],
    quota: usize,
) -> Result<Vec<String>, AppError>
where
    R: QuestionRepository + ?Sized,
{
    let mut selected = Vec::new();

    for category in categories {
        let available = repo.list_by_category(category).await?;
        let ids: Vec<String> = available.into_iter().map(|q| q.id).collect();
        let take = quota.min(ids.len());

        // ThreadRng is not Send, so keep it scoped between awaits.
        let sample: Vec<String> = {
            let mut rng = rand::thread_rng();
            ids.choose_multiple(&mut rng, take).cloned().collect()
        };

        selected.extend(sample);
    }

    Ok(selected)
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashSet};

    use super::*;
    use crate::models::question::{ChoiceText, Question};
    use crate::store::memory::MemoryQuestionRepository;

    fn question(id: &str, category: &str) -> Question {
        Question {
            id: id.to_string(),
            category: category.to_string(),
            prompt_en: format!("Prompt for {}", id),
            prompt_ar: None,
            choices: sqlx::types::Json(BTreeMap::from([
                (
                    "A".to_string(),
                    ChoiceText {
                        en: "Yes".to_string(),
                        ar: None,
                    },
                ),
                (
                    "B".to_string(),
                    ChoiceText {
                        en: "No".to_string(),
                        ar: None,
                    },
                ),
            ])),
            correct_choice: "A".to_string(),
        }
    }

    fn seeded_repo(counts: &[(&str, usize)]) -> MemoryQuestionRepository {
        let repo = MemoryQuestionRepository::new();
        for (category, count) in counts {
            for i in 0..*count {
                repo.insert(question(&format!("c{}-q{}", category, i), category));
            }
        }
        repo
    }

    fn categories() -> Vec<String> {
        vec!["1".to_string(), "2".to_string(), "3".to_string()]
    }

    #[tokio::test]
    async fn selects_quota_per_category() {
        let repo = seeded_repo(&[("1", 15), ("2", 12), ("3", 10)]);

        let ids = select_exam_questions(&repo, &categories(), 10).await.unwrap();

        assert_eq!(ids.len(), 30);
        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), 30, "no duplicates within a paper");
    }

    #[tokio::test]
    async fn short_category_contributes_what_it_has() {
        let repo = seeded_repo(&[("1", 15), ("2", 4), ("3", 0)]);

        let ids = select_exam_questions(&repo, &categories(), 10).await.unwrap();

        assert_eq!(ids.len(), 14);
        // Category slices appear in configured order.
        assert!(ids[..10].iter().all(|id| id.starts_with("c1-")));
        assert!(ids[10..].iter().all(|id| id.starts_with("c2-")));
    }

    #[tokio::test]
    async fn empty_bank_yields_empty_paper() {
        let repo = MemoryQuestionRepository::new();

        let ids = select_exam_questions(&repo, &categories(), 10).await.unwrap();

        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn sample_is_drawn_from_own_category() {
        let repo = seeded_repo(&[("1", 3), ("2", 3)]);

        let ids =
            select_exam_questions(&repo, &["2".to_string()], 10).await.unwrap();

        assert_eq!(ids.len(), 3);
        assert!(ids.iter().all(|id| id.starts_with("c2-")));
    }
}

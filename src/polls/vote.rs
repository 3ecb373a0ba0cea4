use crate::errors::AppError;
use crate::models::poll::Question;
use crate::models::store::PollStore;

/// Shown when a vote is submitted without a valid choice.
pub const NO_CHOICE_SELECTED: &str = "You didn't select a choice.";

/// Result of a vote submission. Both arms hand the question back for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    Recorded(Question),
    Rejected {
        question: Question,
        message: &'static str,
    },
}

impl VoteOutcome {
    fn rejected(question: Question) -> Self {
        VoteOutcome::Rejected {
            question,
            message: NO_CHOICE_SELECTED,
        }
    }
}

/// Record one vote for `choice_id` on `question`.
///
/// The selection must be present and belong to `question`; otherwise nothing is
/// written and the outcome is `Rejected`. The tally change is delegated to a
/// single atomic store increment.
pub async fn cast_vote(
    store: &dyn PollStore,
    question: Question,
    choice_id: Option<i64>,
) -> Result<VoteOutcome, AppError> {
    let Some(choice_id) = choice_id else {
        return Ok(VoteOutcome::rejected(question));
    };
    if question.choice_count() == 0 || !question.has_choice(choice_id) {
        log::debug!("Rejected vote for choice {choice_id} on question {}", question.id);
        return Ok(VoteOutcome::rejected(question));
    }

    if !store.increment_choice_votes(choice_id).await? {
        // deleted between lookup and increment
        log::warn!("Choice {choice_id} vanished before its vote was recorded");
        return Ok(VoteOutcome::rejected(question));
    }

    log::info!("Recorded vote for choice {choice_id} on question {}", question.id);
    Ok(VoteOutcome::Recorded(question))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MemoryStore;
    use chrono::{Duration, Utc};

    async fn question_with_choices(store: &MemoryStore, text: &str, choices: &[&str]) -> Question {
        let id = store
            .create_question(text, Utc::now() - Duration::days(1))
            .await
            .unwrap();
        for c in choices {
            store.add_choice(id, c).await.unwrap();
        }
        store.find_question_by_id(id).await.unwrap().unwrap()
    }

    async fn tallies(store: &MemoryStore) -> Vec<i64> {
        store
            .list_all_questions()
            .await
            .unwrap()
            .iter()
            .flat_map(|q| q.choices.iter().map(|c| c.votes))
            .collect()
    }

    #[tokio::test]
    async fn test_missing_choice_is_rejected() {
        let store = MemoryStore::new();
        let q = question_with_choices(&store, "What's new?", &["Not much", "The sky"]).await;

        let outcome = cast_vote(&store, q.clone(), None).await.unwrap();
        assert_eq!(
            outcome,
            VoteOutcome::Rejected { question: q, message: "You didn't select a choice." }
        );
        assert_eq!(tallies(&store).await, vec![0, 0]);
    }

    #[tokio::test]
    async fn test_foreign_choice_is_rejected() {
        let store = MemoryStore::new();
        let q1 = question_with_choices(&store, "First?", &["a"]).await;
        let q2 = question_with_choices(&store, "Second?", &["b"]).await;
        let foreign = q2.choices[0].id;

        let outcome = cast_vote(&store, q1, Some(foreign)).await.unwrap();
        assert!(matches!(outcome, VoteOutcome::Rejected { message, .. } if message == NO_CHOICE_SELECTED));
        assert_eq!(tallies(&store).await, vec![0, 0]);
    }

    #[tokio::test]
    async fn test_question_without_choices_is_rejected() {
        let store = MemoryStore::new();
        let q = question_with_choices(&store, "Empty?", &[]).await;
        let outcome = cast_vote(&store, q, Some(1)).await.unwrap();
        assert!(matches!(outcome, VoteOutcome::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_valid_vote_increments_only_that_choice() {
        let store = MemoryStore::new();
        let q = question_with_choices(&store, "Pick one", &["a", "b", "c"]).await;
        let target = q.choices[1].id;

        let outcome = cast_vote(&store, q, Some(target)).await.unwrap();
        assert!(matches!(outcome, VoteOutcome::Recorded(_)));
        assert_eq!(tallies(&store).await, vec![0, 1, 0]);
    }

    #[tokio::test]
    async fn test_vote_after_choice_deleted_is_rejected() {
        let store = MemoryStore::new();
        let q = question_with_choices(&store, "Going away", &["a"]).await;
        let choice = q.choices[0].id;
        store.delete_question(q.id).await.unwrap();

        let outcome = cast_vote(&store, q, Some(choice)).await.unwrap();
        assert!(matches!(outcome, VoteOutcome::Rejected { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_votes_are_not_lost() {
        let store = MemoryStore::new();
        let q = question_with_choices(&store, "Race?", &["yes", "no"]).await;
        let target = q.choices[0].id;

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let store = store.clone();
                let q = q.clone();
                tokio::spawn(async move { cast_vote(&store, q, Some(target)).await })
            })
            .collect();
        for handle in handles {
            let outcome = handle.await.unwrap().unwrap();
            assert!(matches!(outcome, VoteOutcome::Recorded(_)));
        }

        assert_eq!(tallies(&store).await, vec![64, 0]);
    }
}

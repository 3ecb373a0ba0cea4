//! In-memory store, used when no `DATABASE_URL` is configured and by the HTTP tests.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::AppError;
use crate::models::poll::{Choice, Question};
use crate::models::store::{PollStore, UserStore};
use crate::models::user::{NewUser, User};

/// All state lives behind one mutex, so every operation (including the vote
/// increment) is atomic with respect to the others.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    questions: Vec<Question>,
    users: Vec<User>,
    next_question_id: i64,
    next_choice_id: i64,
    next_user_id: i64,
}

impl MemoryState {
    fn choice_mut(&mut self, choice_id: i64) -> Option<&mut Choice> {
        self.questions
            .iter_mut()
            .flat_map(|q| q.choices.iter_mut())
            .find(|c| c.id == choice_id)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl PollStore for MemoryStore {
    async fn find_question_by_id(&self, id: i64) -> Result<Option<Question>, AppError> {
        Ok(self.lock().questions.iter().find(|q| q.id == id).cloned())
    }

    async fn list_all_questions(&self) -> Result<Vec<Question>, AppError> {
        Ok(self.lock().questions.clone())
    }

    async fn increment_choice_votes(&self, choice_id: i64) -> Result<bool, AppError> {
        let mut state = self.lock();
        match state.choice_mut(choice_id) {
            Some(choice) => {
                choice.votes += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create_question(&self, question_text: &str, pub_date: DateTime<Utc>) -> Result<i64, AppError> {
        let mut state = self.lock();
        state.next_question_id += 1;
        let id = state.next_question_id;
        state.questions.push(Question {
            id,
            question_text: question_text.to_string(),
            pub_date,
            choices: Vec::new(),
        });
        Ok(id)
    }

    async fn create_question_with_choices(
        &self,
        question_text: &str,
        pub_date: DateTime<Utc>,
        choices: &[&str],
    ) -> Result<i64, AppError> {
        let mut state = self.lock();
        state.next_question_id += 1;
        let id = state.next_question_id;
        let first_choice = state.next_choice_id + 1;
        state.next_choice_id += choices.len() as i64;
        state.questions.push(Question {
            id,
            question_text: question_text.to_string(),
            pub_date,
            choices: choices
                .iter()
                .zip(first_choice..)
                .map(|(text, choice_id)| Choice {
                    id: choice_id,
                    question_id: id,
                    choice_text: text.to_string(),
                    votes: 0,
                })
                .collect(),
        });
        Ok(id)
    }

    async fn add_choice(&self, question_id: i64, choice_text: &str) -> Result<i64, AppError> {
        let mut state = self.lock();
        let id = state.next_choice_id + 1;
        let question = state
            .questions
            .iter_mut()
            .find(|q| q.id == question_id)
            .ok_or(AppError::NotFound)?;
        question.choices.push(Choice {
            id,
            question_id,
            choice_text: choice_text.to_string(),
            votes: 0,
        });
        state.next_choice_id = id;
        Ok(id)
    }

    async fn delete_question(&self, id: i64) -> Result<bool, AppError> {
        let mut state = self.lock();
        let before = state.questions.len();
        state.questions.retain(|q| q.id != id);
        Ok(state.questions.len() < before)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.lock().users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, new: &NewUser) -> Result<i64, AppError> {
        let mut state = self.lock();
        if state.users.iter().any(|u| u.username == new.username) {
            return Err(AppError::Conflict(format!(
                "Username '{}' is already taken",
                new.username
            )));
        }
        state.next_user_id += 1;
        let id = state.next_user_id;
        state.users.push(User {
            id,
            username: new.username.clone(),
            password: new.password.clone(),
            email: new.email.clone(),
            is_superuser: new.is_superuser,
        });
        Ok(id)
    }
}

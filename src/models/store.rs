//! Storage seams consumed by the poll rules and the HTTP handlers.
//!
//! Handlers receive these as `web::Data<dyn PollStore>` / `web::Data<dyn UserStore>`,
//! so the same routes run against PostgreSQL ([`PgStore`]) or the in-memory
//! [`MemoryStore`](super::memory::MemoryStore).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::poll::{self, Question};
use crate::models::user::{self, NewUser, User};

#[async_trait]
pub trait PollStore: Send + Sync {
    async fn find_question_by_id(&self, id: i64) -> Result<Option<Question>, AppError>;

    /// Every question with its choices, in creation order.
    async fn list_all_questions(&self) -> Result<Vec<Question>, AppError>;

    /// Atomically add one vote to `choice_id`. Returns false if the choice does not exist.
    async fn increment_choice_votes(&self, choice_id: i64) -> Result<bool, AppError>;

    async fn create_question(&self, question_text: &str, pub_date: DateTime<Utc>) -> Result<i64, AppError>;

    /// Create a question together with its choices. Either everything is stored or nothing is.
    async fn create_question_with_choices(
        &self,
        question_text: &str,
        pub_date: DateTime<Utc>,
        choices: &[&str],
    ) -> Result<i64, AppError>;

    /// `AppError::NotFound` when the question does not exist.
    async fn add_choice(&self, question_id: i64, choice_text: &str) -> Result<i64, AppError>;

    /// Removes the question and all of its choices.
    async fn delete_question(&self, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// `AppError::Conflict` when the username is taken.
    async fn create_user(&self, new: &NewUser) -> Result<i64, AppError>;
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PollStore for PgStore {
    async fn find_question_by_id(&self, id: i64) -> Result<Option<Question>, AppError> {
        poll::find_by_id(&self.pool, id).await
    }

    async fn list_all_questions(&self) -> Result<Vec<Question>, AppError> {
        poll::find_all(&self.pool).await
    }

    async fn increment_choice_votes(&self, choice_id: i64) -> Result<bool, AppError> {
        poll::increment_votes(&self.pool, choice_id).await
    }

    async fn create_question(&self, question_text: &str, pub_date: DateTime<Utc>) -> Result<i64, AppError> {
        poll::create(&self.pool, question_text, pub_date).await
    }

    async fn create_question_with_choices(
        &self,
        question_text: &str,
        pub_date: DateTime<Utc>,
        choices: &[&str],
    ) -> Result<i64, AppError> {
        poll::create_with_choices(&self.pool, question_text, pub_date, choices).await
    }

    async fn add_choice(&self, question_id: i64, choice_text: &str) -> Result<i64, AppError> {
        poll::add_choice(&self.pool, question_id, choice_text).await
    }

    async fn delete_question(&self, id: i64) -> Result<bool, AppError> {
        poll::delete(&self.pool, id).await
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        user::find_by_username(&self.pool, username).await
    }

    async fn create_user(&self, new: &NewUser) -> Result<i64, AppError> {
        user::create(&self.pool, new).await
    }
}

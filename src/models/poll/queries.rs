use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::errors::AppError;
use super::types::*;

#[derive(sqlx::FromRow)]
struct QuestionRow {
    id: i64,
    question_text: String,
    pub_date: DateTime<Utc>,
}

impl QuestionRow {
    fn into_question(self, choices: Vec<Choice>) -> Question {
        Question {
            id: self.id,
            question_text: self.question_text,
            pub_date: self.pub_date,
            choices,
        }
    }
}

/// Find a question by id, with its choices.
pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Question>, AppError> {
    let row = sqlx::query_as::<_, QuestionRow>(
        "SELECT id, question_text, pub_date FROM questions WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let choices = sqlx::query_as::<_, Choice>(
        "SELECT id, question_id, choice_text, votes FROM choices \
         WHERE question_id = $1 ORDER BY id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Some(row.into_question(choices)))
}

/// All questions in creation order, each with its choices.
pub async fn find_all(pool: &PgPool) -> Result<Vec<Question>, AppError> {
    let rows = sqlx::query_as::<_, QuestionRow>(
        "SELECT id, question_text, pub_date FROM questions ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    let choices = sqlx::query_as::<_, Choice>(
        "SELECT id, question_id, choice_text, votes FROM choices ORDER BY question_id, id",
    )
    .fetch_all(pool)
    .await?;

    let mut by_question: HashMap<i64, Vec<Choice>> = HashMap::new();
    for choice in choices {
        by_question.entry(choice.question_id).or_default().push(choice);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let choices = by_question.remove(&row.id).unwrap_or_default();
            row.into_question(choices)
        })
        .collect())
}

/// Add one vote to a choice in a single statement.
/// Returns false when no such choice exists.
pub async fn increment_votes(pool: &PgPool, choice_id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("UPDATE choices SET votes = votes + 1 WHERE id = $1")
        .bind(choice_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn create(pool: &PgPool, question_text: &str, pub_date: DateTime<Utc>) -> Result<i64, AppError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO questions (question_text, pub_date) VALUES ($1, $2) RETURNING id",
    )
    .bind(question_text)
    .bind(pub_date)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Insert a question and its choices in one transaction.
pub async fn create_with_choices(
    pool: &PgPool,
    question_text: &str,
    pub_date: DateTime<Utc>,
    choices: &[&str],
) -> Result<i64, AppError> {
    let mut tx = pool.begin().await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO questions (question_text, pub_date) VALUES ($1, $2) RETURNING id",
    )
    .bind(question_text)
    .bind(pub_date)
    .fetch_one(&mut *tx)
    .await?;

    for choice in choices {
        sqlx::query("INSERT INTO choices (question_id, choice_text) VALUES ($1, $2)")
            .bind(id)
            .bind(*choice)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(id)
}

/// Add a choice to an existing question. `NotFound` if the question is gone.
pub async fn add_choice(pool: &PgPool, question_id: i64, choice_text: &str) -> Result<i64, AppError> {
    let id: Option<i64> = sqlx::query_scalar(
        "INSERT INTO choices (question_id, choice_text) \
         SELECT id, $2 FROM questions WHERE id = $1 \
         RETURNING id",
    )
    .bind(question_id)
    .bind(choice_text)
    .fetch_optional(pool)
    .await?;
    id.ok_or(AppError::NotFound)
}

/// Delete a question; its choices go with it via ON DELETE CASCADE.
pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM questions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

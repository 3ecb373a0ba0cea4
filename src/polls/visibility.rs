//! Question visibility rules.
//!
//! Every path that shows a question (index, detail, vote form, results) goes
//! through [`is_visible`], so the index can never hide a question the detail
//! page still serves, or the other way round.
//!
//! | viewer     | no choices | future pub_date | past pub_date |
//! |------------|------------|-----------------|---------------|
//! | Privileged | hidden     | visible         | visible       |
//! | Ordinary   | hidden     | hidden          | visible       |

use actix_session::Session;
use chrono::{DateTime, Utc};

use crate::auth::session::is_superuser;
use crate::errors::AppError;
use crate::models::poll::Question;
use crate::models::store::PollStore;

/// Who is looking. Anonymous and regular logged-in users are both `Ordinary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Privileged,
    Ordinary,
}

impl Viewer {
    pub fn from_superuser(is_superuser: bool) -> Self {
        if is_superuser { Viewer::Privileged } else { Viewer::Ordinary }
    }

    pub fn from_session(session: &Session) -> Self {
        Self::from_superuser(is_superuser(session))
    }
}

pub fn is_visible(question: &Question, now: DateTime<Utc>, viewer: Viewer) -> bool {
    if question.choice_count() == 0 {
        return false;
    }
    match viewer {
        Viewer::Privileged => true,
        Viewer::Ordinary => question.is_published(now),
    }
}

/// Visible questions, newest `pub_date` first. Ties keep their input order.
pub fn list_visible(questions: Vec<Question>, now: DateTime<Utc>, viewer: Viewer) -> Vec<Question> {
    let mut visible: Vec<Question> = questions
        .into_iter()
        .filter(|q| is_visible(q, now, viewer))
        .collect();
    // sort_by is stable
    visible.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
    visible
}

/// Load every question from the store and keep the visible ones.
pub async fn load_visible(
    store: &dyn PollStore,
    now: DateTime<Utc>,
    viewer: Viewer,
) -> Result<Vec<Question>, AppError> {
    let all = store.list_all_questions().await?;
    Ok(list_visible(all, now, viewer))
}

/// Look up a question the viewer may see.
///
/// A missing question and a hidden one both come back as `AppError::NotFound`.
pub async fn resolve(
    store: &dyn PollStore,
    id: i64,
    now: DateTime<Utc>,
    viewer: Viewer,
) -> Result<Question, AppError> {
    match store.find_question_by_id(id).await? {
        Some(question) if is_visible(&question, now, viewer) => Ok(question),
        Some(_) => {
            log::debug!("Question {id} hidden from {viewer:?} viewer");
            Err(AppError::NotFound)
        }
        None => Err(AppError::NotFound),
    }
}

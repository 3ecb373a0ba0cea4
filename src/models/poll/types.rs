use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Maximum length of question and choice text.
pub const TEXT_MAX_LEN: usize = 200;

/// A poll question together with its choices, in creation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: i64,
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
    pub choices: Vec<Choice>,
}

impl Question {
    pub fn choice_count(&self) -> usize {
        self.choices.len()
    }

    /// A question is published once its publication time has been reached.
    pub fn is_published(&self, now: DateTime<Utc>) -> bool {
        self.pub_date <= now
    }

    pub fn has_choice(&self, choice_id: i64) -> bool {
        self.choices.iter().any(|c| c.id == choice_id)
    }

    pub fn total_votes(&self) -> i64 {
        self.choices.iter().map(|c| c.votes).sum()
    }

    /// Publication time formatted for templates.
    pub fn pub_date_display(&self) -> String {
        self.pub_date.format("%Y-%m-%d %H:%M UTC").to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Choice {
    pub id: i64,
    pub question_id: i64,
    pub choice_text: String,
    pub votes: i64,
}

impl Choice {
    /// "vote" / "votes" for the results page.
    pub fn votes_label(&self) -> &'static str {
        if self.votes == 1 { "vote" } else { "votes" }
    }
}

/// Form input for a vote submission. Both fields may be absent on a bare POST.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoteForm {
    pub choice: Option<String>,
    #[serde(default)]
    pub csrf_token: String,
}

impl VoteForm {
    /// The submitted choice id, if one was sent and parses as an id.
    pub fn choice_id(&self) -> Option<i64> {
        self.choice
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
    }
}

/// Admin form for creating a question. `choices` holds one choice per line.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionForm {
    pub question_text: String,
    pub pub_date: String,
    #[serde(default)]
    pub choices: String,
    pub csrf_token: String,
}

/// Admin form for adding a single choice to a question.
#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceForm {
    pub choice_text: String,
    pub csrf_token: String,
}

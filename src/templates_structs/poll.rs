use askama::Template;

use crate::models::poll::Question;
use super::PageContext;

#[derive(Template)]
#[template(path = "polls/index.html")]
pub struct IndexTemplate {
    pub ctx: PageContext,
    pub latest_question_list: Vec<Question>,
}

/// Question page with the vote form. `error_message` is set on a rejected vote.
#[derive(Template)]
#[template(path = "polls/detail.html")]
pub struct DetailTemplate {
    pub ctx: PageContext,
    pub question: Question,
    pub error_message: Option<String>,
}

#[derive(Template)]
#[template(path = "polls/results.html")]
pub struct ResultsTemplate {
    pub ctx: PageContext,
    pub question: Question,
}

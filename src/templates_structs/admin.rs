use askama::Template;

use crate::models::poll::Question;
use super::PageContext;

/// Admin landing page: every question, unfiltered, plus the new-question form.
#[derive(Template)]
#[template(path = "admin/index.html")]
pub struct AdminIndexTemplate {
    pub ctx: PageContext,
    pub questions: Vec<Question>,
    pub errors: Vec<String>,
    pub form_question_text: String,
    pub form_pub_date: String,
    pub form_choices: String,
}

#[derive(Template)]
#[template(path = "admin/question.html")]
pub struct QuestionAdminTemplate {
    pub ctx: PageContext,
    pub question: Question,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "admin/user_form.html")]
pub struct UserFormTemplate {
    pub ctx: PageContext,
    pub errors: Vec<String>,
    pub form_username: String,
    pub form_email: String,
}

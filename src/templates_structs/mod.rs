// Template context structures for Askama templates, organized by area.

use actix_session::Session;

use crate::auth::csrf;
use crate::auth::session::{get_username, is_superuser, take_flash};
use crate::config::PollSettings;

/// Common context shared by all pages.
/// Templates access these as `ctx.username`, `ctx.csrf_token`, etc.
pub struct PageContext {
    pub username: Option<String>,
    pub is_superuser: bool,
    pub flash: Option<String>,
    pub app_name: String,
    pub csrf_token: String,
}

impl PageContext {
    pub fn build(session: &Session, settings: &PollSettings) -> Self {
        Self {
            username: get_username(session),
            is_superuser: is_superuser(session),
            flash: take_flash(session),
            app_name: settings.app_name.clone(),
            csrf_token: csrf::get_or_create_token(session),
        }
    }
}

mod admin;
mod common;
mod poll;

pub use self::admin::{AdminIndexTemplate, QuestionAdminTemplate, UserFormTemplate};
pub use self::common::LoginTemplate;
pub use self::poll::{DetailTemplate, IndexTemplate, ResultsTemplate};

use actix_session::Session;

use crate::errors::AppError;
use crate::models::user::User;

pub fn get_user_id(session: &Session) -> Option<i64> {
    session.get::<i64>("user_id").unwrap_or(None)
}

pub fn get_username(session: &Session) -> Option<String> {
    session.get::<String>("username").unwrap_or(None)
}

/// True only for a logged-in superuser; anonymous sessions are never superusers.
pub fn is_superuser(session: &Session) -> bool {
    get_user_id(session).is_some()
        && session.get::<bool>("is_superuser").unwrap_or(None).unwrap_or(false)
}

/// Store the authenticated user in the session.
pub fn log_in(session: &Session, user: &User) -> Result<(), AppError> {
    session.renew();
    session
        .insert("user_id", user.id)
        .and_then(|_| session.insert("username", &user.username))
        .and_then(|_| session.insert("is_superuser", user.is_superuser))
        .map_err(|e| AppError::Session(format!("Failed to store login: {e}")))
}

pub fn take_flash(session: &Session) -> Option<String> {
    let flash = session.get::<String>("flash").unwrap_or(None);
    if flash.is_some() {
        session.remove("flash");
    }
    flash
}

pub fn set_flash(session: &Session, message: &str) {
    let _ = session.insert("flash", message);
}

/// Superuser guard for handlers; the admin scope middleware does the same check up front.
pub fn require_superuser(session: &Session) -> Result<(), AppError> {
    if get_user_id(session).is_none() {
        return Err(AppError::PermissionDenied("login required".to_string()));
    }
    if is_superuser(session) {
        Ok(())
    } else {
        Err(AppError::PermissionDenied("superuser".to_string()))
    }
}

use actix_session::Session;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::auth::{csrf, password, rate_limit::RateLimiter, session};
use crate::config::PollSettings;
use crate::errors::{AppError, render};
use crate::models::store::UserStore;
use crate::templates_structs::LoginTemplate;

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

pub async fn login_page(
    settings: web::Data<PollSettings>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    // If already logged in, go straight to the polls
    if session::get_user_id(&session).is_some() {
        return Ok(HttpResponse::SeeOther()
            .insert_header(("Location", "/polls/"))
            .finish());
    }

    login_form(&settings, &session, None)
}

pub async fn login_submit(
    req: HttpRequest,
    users: web::Data<dyn UserStore>,
    settings: web::Data<PollSettings>,
    session: Session,
    form: web::Form<LoginForm>,
    limiter: web::Data<RateLimiter>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    // Rate-limit check BEFORE any store access
    let ip = req.peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED));

    if limiter.is_blocked(ip) {
        log::warn!("Login blocked for {ip}: too many failed attempts");
        return login_form(
            &settings,
            &session,
            Some("Too many failed login attempts. Please try again later."),
        );
    }

    let found = users.find_user_by_username(form.username.trim()).await?;

    if let Some(user) = found {
        if password::verify_password(&form.password, &user.password)? {
            limiter.clear(ip);
            session::log_in(&session, &user)?;
            log::info!("User '{}' logged in", user.username);
            return Ok(HttpResponse::SeeOther()
                .insert_header(("Location", "/polls/"))
                .finish());
        }
    }

    limiter.record_failure(ip);
    login_form(&settings, &session, Some("Invalid username or password"))
}

pub async fn logout(
    session: Session,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    session.purge();
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/polls/"))
        .finish())
}

fn login_form(
    settings: &PollSettings,
    session: &Session,
    error: Option<&str>,
) -> Result<HttpResponse, AppError> {
    let tmpl = LoginTemplate {
        error: error.map(String::from),
        app_name: settings.app_name.clone(),
        csrf_token: csrf::get_or_create_token(session),
    };
    render(tmpl)
}

//! Shared test infrastructure for the HTTP and store tests.
//!
//! # App setup
//! - `init_app(store)` - full route table over a `MemoryStore`, with cookie sessions
//! - `init_app_with(polls, users)` - same, over arbitrary store implementations
//! - `Client` - carries the session cookie between requests, scrapes CSRF tokens
//!
//! # Fixtures
//! - `create_question` / `create_question_without_choices` - days offset from now
//! - `set_up_user` / `set_up_super_user` - create an account and log the client in

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{
    App, Error,
    body::MessageBody,
    cookie::{Cookie, Key},
    dev::{Service, ServiceResponse},
    http::StatusCode,
    test, web,
};
use actix_http::Request;
use chrono::{Duration, Utc};
use regex::Regex;

use polls_app::auth::password;
use polls_app::auth::rate_limit::RateLimiter;
use polls_app::config::PollSettings;
use polls_app::models::user::NewUser;
use polls_app::models::{MemoryStore, PollStore, UserStore};
use polls_app::routes;

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const USER_NAME: &str = "dummy";
pub const SUPERUSER_NAME: &str = "admin";
pub const PASSWORD: &str = "secret123";
pub const NO_POLLS: &str = "No polls are available.";
pub const NO_CHOICE: &str = "You didn't select a choice.";

// ============================================================================
// APP SETUP
// ============================================================================

pub fn settings() -> PollSettings {
    PollSettings {
        app_name: "Polls".to_string(),
        index_limit: 5,
    }
}

/// Build the full app over `store`, the same way `main` wires it.
pub async fn init_app(
    store: MemoryStore,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = Error> {
    let polls: Arc<dyn PollStore> = Arc::new(store.clone());
    let users: Arc<dyn UserStore> = Arc::new(store);
    init_app_with(polls, users).await
}

pub async fn init_app_with(
    polls: Arc<dyn PollStore>,
    users: Arc<dyn UserStore>,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = Error> {
    test::init_service(
        App::new()
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                    .cookie_secure(false)
                    .build(),
            )
            .app_data(web::Data::from(polls))
            .app_data(web::Data::from(users))
            .app_data(web::Data::new(settings()))
            .app_data(web::Data::new(RateLimiter::new()))
            .configure(routes::configure)
            .default_service(web::to(routes::not_found)),
    )
    .await
}

// ============================================================================
// CLIENT
// ============================================================================

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestResponse {
    /// Substring check on the body with askama's apostrophe escaping undone.
    pub fn contains(&self, needle: &str) -> bool {
        self.body
            .replace("&#x27;", "'")
            .replace("&#39;", "'")
            .contains(needle)
    }
}

/// Minimal browser: remembers cookies and the last CSRF token it saw.
#[derive(Default)]
pub struct Client {
    cookies: HashMap<String, Cookie<'static>>,
    csrf_token: Option<String>,
}

impl Client {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get<S, B>(&mut self, app: &S, path: &str) -> TestResponse
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
        B: MessageBody,
    {
        let req = self.with_cookies(test::TestRequest::get().uri(path));
        self.send(app, req).await
    }

    /// POST a form. The current CSRF token is added unless `fields` already sets one.
    pub async fn post<S, B>(&mut self, app: &S, path: &str, fields: &[(&str, &str)]) -> TestResponse
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
        B: MessageBody,
    {
        let mut form: Vec<(String, String)> = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        if !fields.iter().any(|(k, _)| *k == "csrf_token") {
            let token = self.csrf_token(app).await;
            form.push(("csrf_token".to_string(), token));
        }
        let body = serde_urlencoded::to_string(&form).expect("encode form");

        let req = self.with_cookies(
            test::TestRequest::post()
                .uri(path)
                .insert_header(("content-type", "application/x-www-form-urlencoded"))
                .set_payload(body),
        );
        self.send(app, req).await
    }

    /// CSRF token for this session, fetched from the login page if not yet seen.
    pub async fn csrf_token<S, B>(&mut self, app: &S) -> String
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
        B: MessageBody,
    {
        if let Some(token) = &self.csrf_token {
            return token.clone();
        }
        let page = self.get(app, "/login").await;
        assert_eq!(page.status, StatusCode::OK, "login page should render");
        self.csrf_token.clone().expect("login page carries a CSRF token")
    }

    pub async fn login<S, B>(&mut self, app: &S, username: &str, password: &str) -> TestResponse
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
        B: MessageBody,
    {
        self.post(app, "/login", &[("username", username), ("password", password)]).await
    }

    fn with_cookies(&self, mut req: test::TestRequest) -> test::TestRequest {
        for cookie in self.cookies.values() {
            req = req.cookie(cookie.clone());
        }
        req
    }

    async fn send<S, B>(&mut self, app: &S, req: test::TestRequest) -> TestResponse
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
        B: MessageBody,
    {
        let resp = test::call_service(app, req.to_request()).await;

        for cookie in resp.response().cookies() {
            self.cookies.insert(cookie.name().to_string(), cookie.into_owned());
        }
        let status = resp.status();
        let location = resp
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = test::read_body(resp).await;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        if let Some(token) = scrape_csrf(&body) {
            self.csrf_token = Some(token);
        }
        TestResponse { status, location, body }
    }
}

fn scrape_csrf(body: &str) -> Option<String> {
    let re = Regex::new(r#"name="csrf_token" value="([0-9a-f]{64})""#).expect("valid regex");
    re.captures(body).map(|c| c[1].to_string())
}

/// Question texts linked from the index page, in page order.
pub fn listed_questions(body: &str) -> Vec<String> {
    let re = Regex::new(r#"<a href="/polls/\d+/">([^<]*)</a>"#).expect("valid regex");
    re.captures_iter(body).map(|c| c[1].to_string()).collect()
}

// ============================================================================
// FIXTURES
// ============================================================================

/// Create a question published `days` from now (negative = past) with one choice.
pub async fn create_question(store: &MemoryStore, question_text: &str, days: i64) -> i64 {
    let id = create_question_without_choices(store, question_text, days).await;
    create_choice(store, id, "dummy Choice").await;
    id
}

/// Create a question published `days` from now with no choices.
pub async fn create_question_without_choices(store: &MemoryStore, question_text: &str, days: i64) -> i64 {
    store
        .create_question(question_text, Utc::now() + Duration::days(days))
        .await
        .expect("create question")
}

pub async fn create_choice(store: &MemoryStore, question_id: i64, choice_text: &str) -> i64 {
    store
        .add_choice(question_id, choice_text)
        .await
        .expect("create choice")
}

/// Argon2 is slow in debug builds; hash the shared test password once.
fn password_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| password::hash_password(PASSWORD).expect("hash"))
}

pub async fn create_user(store: &MemoryStore, username: &str, is_superuser: bool) -> i64 {
    store
        .create_user(&NewUser {
            username: username.to_string(),
            password: password_hash().to_string(),
            email: format!("{username}@example.com"),
            is_superuser,
        })
        .await
        .expect("create user")
}

/// Create an ordinary user and log `client` in as them.
pub async fn set_up_user<S, B>(store: &MemoryStore, app: &S, client: &mut Client)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    create_user(store, USER_NAME, false).await;
    let resp = client.login(app, USER_NAME, PASSWORD).await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER, "user login should redirect");
}

/// Create a superuser and log `client` in as them.
pub async fn set_up_super_user<S, B>(store: &MemoryStore, app: &S, client: &mut Client)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    create_user(store, SUPERUSER_NAME, true).await;
    let resp = client.login(app, SUPERUSER_NAME, PASSWORD).await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER, "superuser login should redirect");
}

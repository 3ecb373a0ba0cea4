use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use polls_app::auth::rate_limit::RateLimiter;
use polls_app::config::{AppConfig, PollSettings};
use polls_app::{db, routes};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let config = AppConfig::from_env();

    let stores = db::connect(&config)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to initialise storage: {e}")))?;

    db::seed_admin(stores.users.as_ref(), &config)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to seed superuser: {e}")))?;
    if config.seed_demo {
        db::seed_demo(stores.polls.as_ref())
            .await
            .map_err(|e| std::io::Error::other(format!("Failed to seed demo polls: {e}")))?;
    }

    // Session encryption key: SESSION_KEY keeps sessions valid across restarts
    let secret_key = match &config.session_key {
        Some(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Some(val) => {
            log::warn!("SESSION_KEY too short ({} bytes, need 64+), generating random key", val.len());
            Key::generate()
        }
        None => {
            log::warn!("No SESSION_KEY set, generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    let poll_store = web::Data::from(stores.polls);
    let user_store = web::Data::from(stores.users);
    let settings = web::Data::new(PollSettings::from(&config));
    let limiter = web::Data::new(RateLimiter::new());

    log::info!("Starting server at http://{}", config.bind_addr);

    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(
            CookieSessionStore::default(),
            secret_key.clone(),
        )
        .cookie_secure(false)
        .cookie_http_only(true)
        .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(poll_store.clone())
            .app_data(user_store.clone())
            .app_data(settings.clone())
            .app_data(limiter.clone())
            // Static files
            .service(actix_files::Files::new("/static", "./static"))
            .configure(routes::configure)
            // Default 404 handler (must be registered last)
            .default_service(web::to(routes::not_found))
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}

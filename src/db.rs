use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use crate::auth::password;
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::user::NewUser;
use crate::models::{MemoryStore, PgStore, PollStore, UserStore};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// The two storage handles the app is wired with.
pub struct Stores {
    pub polls: Arc<dyn PollStore>,
    pub users: Arc<dyn UserStore>,
}

impl Stores {
    pub fn memory() -> Self {
        let store = MemoryStore::new();
        Self {
            polls: Arc::new(store.clone()),
            users: Arc::new(store),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        let store = PgStore::new(pool);
        Self {
            polls: Arc::new(store.clone()),
            users: Arc::new(store),
        }
    }
}

pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    MIGRATOR.run(pool).await?;
    log::info!("Database migrations complete");
    Ok(())
}

/// Connect to PostgreSQL when configured, otherwise fall back to the in-memory store.
pub async fn connect(config: &AppConfig) -> Result<Stores, AppError> {
    match &config.database_url {
        Some(url) => {
            let pool = init_pool(url, config.db_max_connections).await?;
            run_migrations(&pool).await?;
            Ok(Stores::postgres(pool))
        }
        None => {
            log::warn!("No DATABASE_URL set, using in-memory store (data lost on restart)");
            Ok(Stores::memory())
        }
    }
}

/// Create the configured superuser if it does not exist yet.
pub async fn seed_admin(users: &dyn UserStore, config: &AppConfig) -> Result<(), AppError> {
    if users.find_user_by_username(&config.admin_username).await?.is_some() {
        log::info!("Superuser '{}' already present, skipping seed", config.admin_username);
        return Ok(());
    }

    let hash = password::hash_password(&config.admin_password)?;
    users
        .create_user(&NewUser {
            username: config.admin_username.clone(),
            password: hash,
            email: String::new(),
            is_superuser: true,
        })
        .await?;
    log::info!("Seeded superuser '{}'", config.admin_username);
    Ok(())
}

/// Seed a couple of demo questions into an empty store.
pub async fn seed_demo(polls: &dyn PollStore) -> Result<(), AppError> {
    let existing = polls.list_all_questions().await?.len();
    if existing > 0 {
        log::info!("Store already holds {existing} questions, skipping demo seed");
        return Ok(());
    }

    let now = Utc::now();
    let demo: [(&str, i64, &[&str]); 2] = [
        ("What's new?", -2, &["Not much", "The sky", "Just hacking again"]),
        ("Which editor do you use?", -1, &["Vim", "Emacs", "Something else"]),
    ];
    for (text, days, choices) in demo {
        polls
            .create_question_with_choices(text, now + Duration::days(days), choices)
            .await?;
    }
    log::info!("Demo seed complete");
    Ok(())
}

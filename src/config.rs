use std::{env, fmt::Display, str::FromStr};

/// Runtime configuration, read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection string. `None` runs on the in-memory store.
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub session_key: Option<String>,
    pub app_name: String,
    pub index_limit: usize,
    pub admin_username: String,
    pub admin_password: String,
    pub seed_demo: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        if dotenvy::dotenv().is_ok() {
            log::info!("Loaded environment from .env");
        }

        Self {
            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty()),
            bind_addr: try_load("BIND_ADDR", "127.0.0.1:8080"),
            db_max_connections: try_load("DB_MAX_CONNECTIONS", "8"),
            session_key: env::var("SESSION_KEY").ok(),
            app_name: try_load("APP_NAME", "Polls"),
            index_limit: try_load("POLLS_INDEX_LIMIT", "5"),
            admin_username: try_load("ADMIN_USERNAME", "admin"),
            admin_password: try_load("ADMIN_PASSWORD", "admin123"),
            seed_demo: try_load("SEED_DEMO", "false"),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            bind_addr: "127.0.0.1:8080".to_string(),
            db_max_connections: 8,
            session_key: None,
            app_name: "Polls".to_string(),
            index_limit: 5,
            admin_username: "admin".to_string(),
            admin_password: "admin123".to_string(),
            seed_demo: false,
        }
    }
}

/// Settings the poll handlers read on every request.
#[derive(Debug, Clone)]
pub struct PollSettings {
    pub app_name: String,
    pub index_limit: usize,
}

impl From<&AppConfig> for PollSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            app_name: config.app_name.clone(),
            index_limit: config.index_limit,
        }
    }
}

/// Parse `key` from the environment, falling back to `default` when unset or invalid.
fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        log::debug!("{key} not set, using default: {default}");
        default.to_string()
    });
    match raw.parse() {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Invalid {key} value {raw:?} ({e}), using default: {default}");
            default
                .parse()
                .unwrap_or_else(|_| unreachable!("default for {key} must parse"))
        }
    }
}

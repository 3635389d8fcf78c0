use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

/// Origins the original site served; overridable with `ALLOWED_ORIGINS`.
const DEFAULT_ORIGINS: &str = "http://localhost:3000,http://localhost:3001,\
http://127.0.0.1:3000,http://127.0.0.1:3001,\
https://aldenaire.com,https://www.aldenaire.com";

pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("RUST_PORT", "8080"),
            database_url: try_load("DATABASE_URL", "sqlite://aldenaire.db"),
            allowed_origins: load_origins(),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

fn load_origins() -> Vec<String> {
    var("ALLOWED_ORIGINS")
        .unwrap_or_else(|_| {
            info!("ALLOWED_ORIGINS not set, using defaults");
            DEFAULT_ORIGINS.to_string()
        })
        .split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

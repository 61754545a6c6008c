use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};
use dotenvy::dotenv;

#[derive(Clone, Debug)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub api_prefix: String,
    pub db_max_connections: u32,

    // Rate limiting
    pub rate_protected_per_min: u32,

    /// Percentage used by the analytics summary when the caller gives none.
    pub low_attendance_threshold: f64,

    pub log_level: tracing::Level,

    /// `None` sends notifications to the log instead of SMTP.
    pub smtp: Option<SmtpSettings>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10)?,
            rate_protected_per_min: parse_or("RATE_PROTECTED_PER_MIN", 1000)?,
            low_attendance_threshold: parse_or("LOW_ATTENDANCE_THRESHOLD", 75.0)?,
            log_level: parse_or("LOG_LEVEL", tracing::Level::DEBUG)?,
            smtp: smtp_from_env()?,
        })
    }
}

fn smtp_from_env() -> Result<Option<SmtpSettings>> {
    let (Ok(host), Ok(user)) = (env::var("SMTP_HOST"), env::var("SMTP_USER")) else {
        return Ok(None);
    };

    Ok(Some(SmtpSettings {
        port: parse_or("SMTP_PORT", 587)?,
        password: env::var("SMTP_PASSWORD").unwrap_or_default(),
        from: env::var("SMTP_FROM").unwrap_or_else(|_| user.clone()),
        host,
        user,
    }))
}

/// Reads `key`, falling back to `default` when unset; a malformed value is an error.
fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_value(key, env::var(key).ok(), default)
}

fn parse_value<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value `{raw}`")),
        None => Ok(default),
    }
}

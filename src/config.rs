use std::str::FromStr;

use anyhow::{anyhow, ensure, Context};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub session_inactivity_minutes: i64,
    pub secure_cookies: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://chatrooms.db".to_owned(),
            bind_addr: "0.0.0.0:8080".to_owned(),
            db_max_connections: 16,
            session_inactivity_minutes: 60,
            secure_cookies: false,
        }
    }
}

impl Config {
    /// Reads the process environment, after loading `.env` if there is one.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            db_max_connections: parse_positive(&lookup, "DB_MAX_CONNECTIONS")?.unwrap_or(defaults.db_max_connections),
            session_inactivity_minutes: parse_positive(&lookup, "SESSION_INACTIVITY_MINUTES")?
                .unwrap_or(defaults.session_inactivity_minutes),
            secure_cookies: match lookup("SECURE_COOKIES") {
                Some(value) => parse_bool(&value).ok_or(anyhow!("SECURE_COOKIES: expected a boolean, got {value:?}"))?,
                None => defaults.secure_cookies,
            },
        })
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|value| value.trim().parse::<T>().with_context(|| format!("{key}: invalid value {value:?}")))
        .transpose()
}

fn parse_positive<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr + PartialOrd + From<u8> + std::fmt::Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = parse::<T>(lookup, key)?;
    if let Some(value) = &value {
        ensure!(*value >= T::from(1), "{key}: must be at least 1, got {value}");
    }
    Ok(value)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

//! SQLite access: pool setup, migrations and per-entity queries.

pub mod messages;
pub mod rooms;
pub mod topics;
pub mod users;

use std::{str::FromStr, time::Duration};

use anyhow::Context;
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, SqlitePool};
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

pub use messages::MessageRow;
pub use rooms::{RoomFilter, RoomRow};
pub use topics::TopicRow;
pub use users::User;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Opens the pool, creating the database file when missing, and applies migrations.
pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("invalid database url {database_url}"))?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let db_pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .with_context(|| format!("failed to connect to database {database_url}"))?;

    MIGRATOR
        .run(&db_pool)
        .await
        .context("database migrations failed")?;

    info!(url = %database_url, "database ready");
    Ok(db_pool)
}

pub(crate) fn new_id() -> String {
    Uuid::now_v7().to_string()
}

pub(crate) fn now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// `LIKE` pattern matching `term` anywhere, with wildcards in the term taken literally.
/// Pair with `ESCAPE '\'`.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

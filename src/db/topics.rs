use sqlx::SqlitePool;

use super::{contains_pattern, new_id};

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Topic {
    pub id: String,
    pub name: String,
}

/// A topic together with how many rooms reference it.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TopicRow {
    pub id: String,
    pub name: String,
    pub room_count: i64,
}

const TOPIC_SELECT: &str = r#"
    SELECT t.id, t.name, (SELECT COUNT(*) FROM rooms r WHERE r.topic_id = t.id) AS room_count
    FROM topics t"#;

pub async fn get_or_create(db_pool: &SqlitePool, name: &str) -> sqlx::Result<Topic> {
    sqlx::query("INSERT INTO topics (id,name) VALUES (?,?) ON CONFLICT(name) DO NOTHING")
        .bind(new_id())
        .bind(name)
        .execute(db_pool)
        .await?;

    sqlx::query_as("SELECT id,name FROM topics WHERE name=?")
        .bind(name)
        .fetch_one(db_pool)
        .await
}

/// Topics in insertion order, optionally filtered by a case-insensitive name match.
pub async fn list(db_pool: &SqlitePool, search: Option<&str>, limit: Option<i64>) -> sqlx::Result<Vec<TopicRow>> {
    let filter = if search.is_some() { r#" WHERE t.name LIKE ? ESCAPE '\'"# } else { "" };
    let sql = format!("{TOPIC_SELECT}{filter} ORDER BY t.rowid LIMIT ?");

    let mut query = sqlx::query_as::<sqlx::Sqlite, TopicRow>(&sql);
    if let Some(search) = search {
        query = query.bind(contains_pattern(search));
    }
    query
        .bind(limit.unwrap_or(-1))
        .fetch_all(db_pool)
        .await
}

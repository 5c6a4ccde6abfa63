use sqlx::SqlitePool;

use super::{contains_pattern, new_id, now, User};

/// A room joined with its host and topic, as the listing pages show it.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RoomRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub host_id: String,
    pub host_username: String,
    pub topic_id: String,
    pub topic_name: String,
    pub participant_count: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Which rooms the home page lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomFilter {
    All,
    /// Topic name, room name or description contains the term.
    Search(String),
    /// Topic name contains the term.
    Topic(String),
}

impl RoomFilter {
    /// A non-empty `search` wins over a non-empty `topic`; empty strings count as absent.
    pub fn from_query(search: Option<String>, topic: Option<String>) -> Self {
        match (search.filter(|s| !s.is_empty()), topic.filter(|t| !t.is_empty())) {
            (Some(search), _) => RoomFilter::Search(search),
            (None, Some(topic)) => RoomFilter::Topic(topic),
            (None, None) => RoomFilter::All,
        }
    }
}

const ROOM_SELECT: &str = r#"
    SELECT r.id, r.name, r.description,
           r.host_id, u.username AS host_username,
           r.topic_id, t.name AS topic_name,
           (SELECT COUNT(*) FROM room_participants p WHERE p.room_id = r.id) AS participant_count,
           r.created_at, r.updated_at
    FROM rooms r
    JOIN users u ON u.id = r.host_id
    JOIN topics t ON t.id = r.topic_id"#;

const ROOM_ORDER: &str = " ORDER BY r.updated_at DESC, r.created_at DESC, r.id DESC";

pub async fn find(db_pool: &SqlitePool, id: &str) -> sqlx::Result<Option<RoomRow>> {
    sqlx::query_as(&format!("{ROOM_SELECT} WHERE r.id=?"))
        .bind(id)
        .fetch_optional(db_pool)
        .await
}

pub async fn list(db_pool: &SqlitePool, filter: &RoomFilter) -> sqlx::Result<Vec<RoomRow>> {
    match filter {
        RoomFilter::All => {
            sqlx::query_as(&format!("{ROOM_SELECT}{ROOM_ORDER}"))
                .fetch_all(db_pool)
                .await
        }
        RoomFilter::Search(term) => {
            let pattern = contains_pattern(term);
            sqlx::query_as(&format!(
                r#"{ROOM_SELECT} WHERE t.name LIKE ? ESCAPE '\' OR r.name LIKE ? ESCAPE '\' OR r.description LIKE ? ESCAPE '\'{ROOM_ORDER}"#
            ))
                .bind(&pattern)
                .bind(&pattern)
                .bind(&pattern)
                .fetch_all(db_pool)
                .await
        }
        RoomFilter::Topic(term) => {
            sqlx::query_as(&format!(r#"{ROOM_SELECT} WHERE t.name LIKE ? ESCAPE '\'{ROOM_ORDER}"#))
                .bind(contains_pattern(term))
                .fetch_all(db_pool)
                .await
        }
    }
}

pub async fn list_hosted_by(db_pool: &SqlitePool, host_id: &str) -> sqlx::Result<Vec<RoomRow>> {
    sqlx::query_as(&format!("{ROOM_SELECT} WHERE r.host_id=?{ROOM_ORDER}"))
        .bind(host_id)
        .fetch_all(db_pool)
        .await
}

pub async fn count(db_pool: &SqlitePool) -> sqlx::Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM rooms")
        .fetch_one(db_pool)
        .await?;
    Ok(count)
}

/// Inserts the room and enrolls the host as its first participant.
pub async fn create(db_pool: &SqlitePool, host_id: &str, topic_id: &str, name: &str, description: &str) -> sqlx::Result<String> {
    let id = new_id();
    let now = now();

    let mut tx = db_pool.begin().await?;
    sqlx::query("INSERT INTO rooms (id,host_id,topic_id,name,description,created_at,updated_at) VALUES (?,?,?,?,?,?,?)")
        .bind(&id)
        .bind(host_id)
        .bind(topic_id)
        .bind(name)
        .bind(description)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    sqlx::query("INSERT INTO room_participants (room_id,user_id) VALUES (?,?)")
        .bind(&id)
        .bind(host_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(id)
}

pub async fn update(db_pool: &SqlitePool, id: &str, topic_id: &str, name: &str, description: &str) -> sqlx::Result<()> {
    sqlx::query("UPDATE rooms SET topic_id=?, name=?, description=?, updated_at=? WHERE id=?")
        .bind(topic_id)
        .bind(name)
        .bind(description)
        .bind(now())
        .bind(id)
        .execute(db_pool)
        .await?;
    Ok(())
}

/// Messages and participant rows go with the room.
pub async fn delete(db_pool: &SqlitePool, id: &str) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM rooms WHERE id=?")
        .bind(id)
        .execute(db_pool)
        .await?;
    Ok(())
}

pub async fn add_participant(db_pool: &SqlitePool, room_id: &str, user_id: &str) -> sqlx::Result<()> {
    sqlx::query("INSERT OR IGNORE INTO room_participants (room_id,user_id) VALUES (?,?)")
        .bind(room_id)
        .bind(user_id)
        .execute(db_pool)
        .await?;
    Ok(())
}

pub async fn participants(db_pool: &SqlitePool, room_id: &str) -> sqlx::Result<Vec<User>> {
    sqlx::query_as(
        "SELECT u.id,u.username,u.email,u.password_hash,u.created_at
         FROM room_participants p JOIN users u ON u.id = p.user_id
         WHERE p.room_id=? ORDER BY u.username",
    )
        .bind(room_id)
        .fetch_all(db_pool)
        .await
}

use sqlx::SqlitePool;

use super::{new_id, now};

/// A message joined with its author and room.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct MessageRow {
    pub id: String,
    pub body: String,
    pub user_id: String,
    pub username: String,
    pub room_id: String,
    pub room_name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

const MESSAGE_SELECT: &str = r#"
    SELECT m.id, m.body,
           m.user_id, u.username,
           m.room_id, r.name AS room_name,
           m.created_at, m.updated_at
    FROM messages m
    JOIN users u ON u.id = m.user_id
    JOIN rooms r ON r.id = m.room_id"#;

const MESSAGE_ORDER: &str = " ORDER BY m.updated_at DESC, m.created_at DESC, m.id DESC";

pub async fn find(db_pool: &SqlitePool, id: &str) -> sqlx::Result<Option<MessageRow>> {
    sqlx::query_as(&format!("{MESSAGE_SELECT} WHERE m.id=?"))
        .bind(id)
        .fetch_optional(db_pool)
        .await
}

pub async fn list_all(db_pool: &SqlitePool) -> sqlx::Result<Vec<MessageRow>> {
    sqlx::query_as(&format!("{MESSAGE_SELECT}{MESSAGE_ORDER}"))
        .fetch_all(db_pool)
        .await
}

pub async fn list_in_room(db_pool: &SqlitePool, room_id: &str) -> sqlx::Result<Vec<MessageRow>> {
    sqlx::query_as(&format!("{MESSAGE_SELECT} WHERE m.room_id=?{MESSAGE_ORDER}"))
        .bind(room_id)
        .fetch_all(db_pool)
        .await
}

pub async fn list_by_user(db_pool: &SqlitePool, user_id: &str) -> sqlx::Result<Vec<MessageRow>> {
    sqlx::query_as(&format!("{MESSAGE_SELECT} WHERE m.user_id=?{MESSAGE_ORDER}"))
        .bind(user_id)
        .fetch_all(db_pool)
        .await
}

/// Messages posted in any of `room_ids`, newest first.
pub async fn list_in_rooms(db_pool: &SqlitePool, room_ids: &[&str]) -> sqlx::Result<Vec<MessageRow>> {
    if room_ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; room_ids.len()].join(",");
    let sql = format!("{MESSAGE_SELECT} WHERE m.room_id IN ({placeholders}){MESSAGE_ORDER}");
    let mut query = sqlx::query_as::<sqlx::Sqlite, MessageRow>(&sql);
    for room_id in room_ids {
        query = query.bind(*room_id);
    }
    query.fetch_all(db_pool).await
}

pub async fn create(db_pool: &SqlitePool, user_id: &str, room_id: &str, body: &str) -> sqlx::Result<String> {
    let id = new_id();
    let now = now();
    sqlx::query("INSERT INTO messages (id,user_id,room_id,body,created_at,updated_at) VALUES (?,?,?,?,?,?)")
        .bind(&id)
        .bind(user_id)
        .bind(room_id)
        .bind(body)
        .bind(now)
        .bind(now)
        .execute(db_pool)
        .await?;
    Ok(id)
}

pub async fn delete(db_pool: &SqlitePool, id: &str) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM messages WHERE id=?")
        .bind(id)
        .execute(db_pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing;

    #[tokio::test]
    async fn lists_by_room_user_and_room_set() {
        let db_pool = testing::pool().await;
        let alice = testing::user(&db_pool, "alice").await;
        let bob = testing::user(&db_pool, "bob").await;
        let rust = testing::room(&db_pool, &alice, "Rust", "Axum", "").await;
        let python = testing::room(&db_pool, &bob, "Python", "Django", "").await;
        let go = testing::room(&db_pool, &bob, "Go", "Gin", "").await;

        let first = create(&db_pool, &alice.id, &rust, "first").await.unwrap();
        let second = create(&db_pool, &bob.id, &rust, "second").await.unwrap();
        create(&db_pool, &bob.id, &python, "third").await.unwrap();
        create(&db_pool, &alice.id, &go, "fourth").await.unwrap();

        let in_rust = list_in_room(&db_pool, &rust).await.unwrap();
        let ids: Vec<_> = in_rust.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, [second.as_str(), first.as_str()]);
        assert_eq!(in_rust[0].username, "bob");
        assert_eq!(in_rust[0].room_name, "Axum");

        assert_eq!(list_by_user(&db_pool, &alice.id).await.unwrap().len(), 2);
        assert_eq!(list_all(&db_pool).await.unwrap().len(), 4);
        assert_eq!(list_in_rooms(&db_pool, &[&rust, &python]).await.unwrap().len(), 3);
        assert!(list_in_rooms(&db_pool, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_only_that_message() {
        let db_pool = testing::pool().await;
        let alice = testing::user(&db_pool, "alice").await;
        let room = testing::room(&db_pool, &alice, "Rust", "Axum", "").await;
        let keep = create(&db_pool, &alice.id, &room, "keep").await.unwrap();
        let gone = create(&db_pool, &alice.id, &room, "drop").await.unwrap();

        delete(&db_pool, &gone).await.unwrap();

        assert_eq!(find(&db_pool, &gone).await.unwrap(), None);
        assert_eq!(find(&db_pool, &keep).await.unwrap().unwrap().body, "keep");
    }
}

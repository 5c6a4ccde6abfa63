use sqlx::SqlitePool;

use super::{new_id, now};

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: i64,
}

const USER_COLUMNS: &str = "id,username,email,password_hash,created_at";

pub async fn find(db_pool: &SqlitePool, id: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id=?"))
        .bind(id)
        .fetch_optional(db_pool)
        .await
}

pub async fn find_by_username(db_pool: &SqlitePool, username: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE username=?"))
        .bind(username)
        .fetch_optional(db_pool)
        .await
}

/// True when some user other than `except_id` already holds `username`.
pub async fn username_taken(db_pool: &SqlitePool, username: &str, except_id: Option<&str>) -> sqlx::Result<bool> {
    let taken = sqlx::query("SELECT 1 FROM users WHERE username=? AND id IS NOT ?")
        .bind(username)
        .bind(except_id)
        .fetch_optional(db_pool)
        .await?
        .is_some();
    Ok(taken)
}

pub async fn create(db_pool: &SqlitePool, username: &str, password_hash: &str) -> sqlx::Result<User> {
    let user = User {
        id: new_id(),
        username: username.to_owned(),
        email: String::new(),
        password_hash: password_hash.to_owned(),
        created_at: now(),
    };

    sqlx::query("INSERT INTO users (id,username,email,password_hash,created_at) VALUES (?,?,?,?,?)")
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(db_pool)
        .await?;

    Ok(user)
}

pub async fn update_details(db_pool: &SqlitePool, id: &str, username: &str, email: &str) -> sqlx::Result<()> {
    sqlx::query("UPDATE users SET username=?, email=? WHERE id=?")
        .bind(username)
        .bind(email)
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
    async fn create_and_look_up() {
        let db_pool = testing::pool().await;
        let user = create(&db_pool, "alice", "hash").await.unwrap();

        assert_eq!(find(&db_pool, &user.id).await.unwrap(), Some(user.clone()));
        assert_eq!(find_by_username(&db_pool, "alice").await.unwrap(), Some(user));
        assert_eq!(find_by_username(&db_pool, "bob").await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let db_pool = testing::pool().await;
        create(&db_pool, "alice", "hash").await.unwrap();
        assert!(create(&db_pool, "alice", "hash").await.is_err());
    }

    #[tokio::test]
    async fn username_taken_ignores_self() {
        let db_pool = testing::pool().await;
        let alice = create(&db_pool, "alice", "hash").await.unwrap();

        assert!(username_taken(&db_pool, "alice", None).await.unwrap());
        assert!(!username_taken(&db_pool, "alice", Some(&alice.id)).await.unwrap());
        assert!(!username_taken(&db_pool, "carol", None).await.unwrap());
    }

    #[tokio::test]
    async fn update_details_changes_username_and_email() {
        let db_pool = testing::pool().await;
        let alice = create(&db_pool, "alice", "hash").await.unwrap();
        update_details(&db_pool, &alice.id, "alicia", "alicia@example.com").await.unwrap();

        let alicia = find(&db_pool, &alice.id).await.unwrap().unwrap();
        assert_eq!(alicia.username, "alicia");
        assert_eq!(alicia.email, "alicia@example.com");
    }
}

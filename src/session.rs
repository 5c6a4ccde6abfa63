use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db::{self, User}, AppResult};

pub const USER_ID: &str = "user_id";
pub const FLASH: &str = "flash";

/// The logged-in user, if any. A session pointing at a vanished user is treated as anonymous.
pub async fn current_user(session: &Session, db_pool: &SqlitePool) -> AppResult<Option<User>> {
    let Some(user_id) = session.get::<String>(USER_ID).await? else {
        return Ok(None);
    };

    let user = db::users::find(db_pool, &user_id).await?;
    if user.is_none() {
        session.remove::<String>(USER_ID).await?;
    }
    Ok(user)
}

pub async fn log_in(session: &Session, user: &User) -> AppResult<()> {
    session.cycle_id().await?;
    session.insert(USER_ID, &user.id).await?;
    tracing::info!(user = %user.username, "logged in");
    Ok(())
}

pub async fn flash(session: &Session, message: impl Into<String>) -> AppResult<()> {
    let mut pending = session.get::<Vec<String>>(FLASH).await?.unwrap_or_default();
    pending.push(message.into());
    session.insert(FLASH, pending).await?;
    Ok(())
}

/// Pending flash messages; reading them clears them.
pub async fn take_flashes(session: &Session) -> AppResult<Vec<String>> {
    Ok(session.remove::<Vec<String>>(FLASH).await?.unwrap_or_default())
}

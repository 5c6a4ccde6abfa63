use axum::{debug_handler, response::Redirect};
use tower_sessions::Session;

use crate::{session::USER_ID, AppResult};

#[debug_handler]
pub(crate) async fn logout(
    session: Session
) -> AppResult<Redirect> {
    if let Some(user_id) = session.get::<String>(USER_ID).await? {
        tracing::info!(%user_id, "logged out");
    }
    session.flush().await?;
    Ok(Redirect::to("/"))
}

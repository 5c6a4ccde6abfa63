use axum::{debug_handler, extract::State, response::{IntoResponse, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db::{self, MessageRow, User}, include_res, res, session, AppResult};

/// The "recent activity" column: each message with its author and room.
/// Authors viewing their own messages get a delete link.
pub(crate) fn feed(messages: &[MessageRow], viewer: Option<&User>) -> String {
    messages
        .iter()
        .map(|message| res::fill(include_res!(str, "/pages/feed_item.html"), &[
            ("user_id", &res::escape(&message.user_id)),
            ("username", &res::escape(&message.username)),
            ("when", &res::timesince(message.created_at)),
            ("delete", &delete_link(message, viewer)),
            ("room_id", &res::escape(&message.room_id)),
            ("room_name", &res::escape(&message.room_name)),
            ("body", &res::markdown(&message.body)),
        ]))
        .collect()
}

pub(crate) fn delete_link(message: &MessageRow, viewer: Option<&User>) -> String {
    match viewer {
        Some(viewer) if viewer.id == message.user_id => {
            format!(r#"<a class="delete" href="/m/{}/delete">Delete</a>"#, res::escape(&message.id))
        }
        _ => String::new(),
    }
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn activity(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let user = session::current_user(&session, &db_pool).await?;
    let messages = db::messages::list_all(&db_pool).await?;

    let content = res::fill(include_res!(str, "/pages/activity.html"), &[
        ("activity", &feed(&messages, user.as_ref())),
    ]);

    Ok(res::page("Activity", user.as_ref(), &session::take_flashes(&session).await?, &content).into_response())
}

use axum::{debug_handler, extract::{Path, State}, response::{IntoResponse, Redirect, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{activity, db::{self, MessageRow, User}, include_res, res, session, AppResult};

use super::delete::confirm_page;

/// Stores the message and makes the author a participant of the room.
pub(crate) async fn send_msg(
    db_pool: &SqlitePool,
    author: &User,
    room_id: &str,
    body: &str,
) -> AppResult<String> {
    let id = db::messages::create(db_pool, &author.id, room_id, body).await?;
    db::rooms::add_participant(db_pool, room_id, &author.id).await?;
    tracing::info!(message = %id, room = %room_id, author = %author.username, "message posted");
    Ok(id)
}

pub(crate) fn msg_to_html(message: &MessageRow, viewer: Option<&User>) -> String {
    res::fill(include_res!(str, "/pages/rooms/message.html"), &[
        ("id", &res::escape(&message.id)),
        ("user_id", &res::escape(&message.user_id)),
        ("username", &res::escape(&message.username)),
        ("when", &res::timesince(message.created_at)),
        ("delete", &activity::delete_link(message, viewer)),
        ("body", &res::markdown(&message.body)),
    ])
}

enum AuthorCheck {
    Missing,
    NotAuthor,
    Author(MessageRow),
}

async fn check_author(db_pool: &SqlitePool, message_id: &str, user: &User) -> AppResult<AuthorCheck> {
    Ok(match db::messages::find(db_pool, message_id).await? {
        None => AuthorCheck::Missing,
        Some(message) if message.user_id != user.id => {
            tracing::warn!(message = %message.id, user = %user.username, "non-author tried to delete message");
            AuthorCheck::NotAuthor
        }
        Some(message) => AuthorCheck::Author(message),
    })
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn delete_message_page(
    Path(message_id): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user) = session::current_user(&session, &db_pool).await? else {
        return res::login_redirect(&format!("/m/{message_id}/delete"));
    };

    match check_author(&db_pool, &message_id, &user).await? {
        AuthorCheck::Missing => res::sorry("message"),
        AuthorCheck::NotAuthor => res::denied(),
        AuthorCheck::Author(message) => {
            confirm_page(&session, &user, &message.body, &format!("/m/{}/delete", message.id), &format!("/r/{}", message.room_id)).await
        }
    }
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn delete_message(
    Path(message_id): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user) = session::current_user(&session, &db_pool).await? else {
        return res::login_redirect(&format!("/m/{message_id}/delete"));
    };

    match check_author(&db_pool, &message_id, &user).await? {
        AuthorCheck::Missing => res::sorry("message"),
        AuthorCheck::NotAuthor => res::denied(),
        AuthorCheck::Author(message) => {
            db::messages::delete(&db_pool, &message.id).await?;
            tracing::info!(message = %message.id, author = %user.username, "message deleted");
            Ok(Redirect::to("/").into_response())
        }
    }
}

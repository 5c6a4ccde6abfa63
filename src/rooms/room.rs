use axum::{debug_handler, extract::{Path, State}, response::{IntoResponse, Redirect, Response}, Form};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db, forms::MessageForm, include_res, res, session, AppResult};

use super::msg;

#[debug_handler(state = crate::AppState)]
pub(crate) async fn room(
    Path(room_id): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let user = session::current_user(&session, &db_pool).await?;

    let Some(room) = db::rooms::find(&db_pool, &room_id).await? else {
        return res::sorry("room");
    };

    let messages: String = db::messages::list_in_room(&db_pool, &room.id)
        .await?
        .iter()
        .map(|message| msg::msg_to_html(message, user.as_ref()))
        .collect();

    let participants = db::rooms::participants(&db_pool, &room.id).await?;
    let participant_items: String = participants
        .iter()
        .map(|p| format!(r#"<li><a href="/p/{}">@{}</a></li>"#, res::escape(&p.id), res::escape(&p.username)))
        .collect();

    let host_actions = match &user {
        Some(user) if user.id == room.host_id => {
            res::fill(include_res!(str, "/pages/rooms/host_actions.html"), &[("id", &res::escape(&room.id))])
        }
        _ => String::new(),
    };

    let compose = match &user {
        Some(_) => res::fill(include_res!(str, "/pages/rooms/compose.html"), &[("id", &res::escape(&room.id))]),
        None => format!(
            r#"<p><a href="/login?return_url={}">Log in</a> to join the conversation.</p>"#,
            urlencoding::encode(&format!("/r/{}", room.id)),
        ),
    };

    let body = res::fill(include_res!(str, "/pages/rooms/room.html"), &[
        ("name", &res::escape(&room.name)),
        ("host_actions", &host_actions),
        ("host_id", &res::escape(&room.host_id)),
        ("host", &res::escape(&room.host_username)),
        ("when", &res::timesince(room.created_at)),
        ("description", &res::escape(&room.description)),
        ("topic", &res::escape(&room.topic_name)),
        ("topic_query", &urlencoding::encode(&room.topic_name)),
        ("messages", &messages),
        ("compose", &compose),
        ("participant_count", &participants.len().to_string()),
        ("participants", &participant_items),
    ]);

    let flashes = session::take_flashes(&session).await?;
    Ok(res::page(&room.name, user.as_ref(), &flashes, &body).into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn post_message(
    Path(room_id): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,

    Form(MessageForm { body }): Form<MessageForm>,
) -> AppResult<Response> {
    let Some(user) = session::current_user(&session, &db_pool).await? else {
        return res::login_redirect(&format!("/r/{room_id}"));
    };

    let Some(room) = db::rooms::find(&db_pool, &room_id).await? else {
        return res::sorry("room");
    };

    let body = body.as_deref().map(str::trim).unwrap_or_default();
    if body.is_empty() {
        session::flash(&session, "Message can't be empty.").await?;
    } else {
        msg::send_msg(&db_pool, &user, &room.id, body).await?;
    }

    Ok(Redirect::to(&format!("/r/{}", room.id)).into_response())
}

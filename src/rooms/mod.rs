mod delete;
mod edit;
mod msg;
mod new;
mod room;

use axum::{response::{IntoResponse, Response}, routing::get, Router};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db::{self, RoomRow, User}, forms::FormError, include_res, res, session, AppResult, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/new", get(new::new_room_page).post(new::new_room))
        .route("/{id}", get(room::room).post(room::post_message))
        .route("/{id}/edit", get(edit::edit_room_page).post(edit::edit_room))
        .route("/{id}/delete", get(delete::delete_room_page).post(delete::delete_room))
}

pub fn message_router() -> Router<AppState> {
    Router::new()
        .route("/{id}/delete", get(msg::delete_message_page).post(msg::delete_message))
}

pub(crate) fn room_items(rooms: &[RoomRow]) -> String {
    rooms
        .iter()
        .map(|room| res::fill(include_res!(str, "/pages/rooms/room_item.html"), &[
            ("id", &res::escape(&room.id)),
            ("name", &res::escape(&room.name)),
            ("host_id", &res::escape(&room.host_id)),
            ("host", &res::escape(&room.host_username)),
            ("when", &res::timesince(room.created_at)),
            ("participant_count", &room.participant_count.to_string()),
            ("topic", &res::escape(&room.topic_name)),
            ("topic_query", &urlencoding::encode(&room.topic_name)),
        ]))
        .collect()
}

/// What the create and edit forms show.
pub(crate) struct RoomFormView<'a> {
    heading: &'a str,
    action: &'a str,
    back: &'a str,
    topic: &'a str,
    name: &'a str,
    description: &'a str,
}

pub(crate) async fn render_room_form(
    db_pool: &SqlitePool,
    session: &Session,
    user: &User,
    view: RoomFormView<'_>,
) -> AppResult<Response> {
    let topics = db::topics::list(db_pool, None, None).await?;
    let topic_options: String = topics
        .iter()
        .map(|topic| format!(r#"<option value="{}">"#, res::escape(&topic.name)))
        .collect();
    let content = res::fill(include_res!(str, "/pages/rooms/room_form.html"), &[
        ("heading", &res::escape(view.heading)),
        ("action", &res::escape(view.action)),
        ("back", &res::escape(view.back)),
        ("topic", &res::escape(view.topic)),
        ("name", &res::escape(view.name)),
        ("description", &res::escape(view.description)),
        ("topic_options", &topic_options),
    ]);

    let flashes = session::take_flashes(session).await?;
    Ok(res::page(view.heading, Some(user), &flashes, &content).into_response())
}

/// Loads the room and checks that `user` hosts it.
pub(crate) enum HostCheck {
    Missing,
    NotHost,
    Host(RoomRow),
}

pub(crate) async fn check_host(db_pool: &SqlitePool, room_id: &str, user: &User) -> AppResult<HostCheck> {
    Ok(match db::rooms::find(db_pool, room_id).await? {
        None => HostCheck::Missing,
        Some(room) if room.host_id != user.id => {
            tracing::warn!(room = %room.id, user = %user.username, "non-host tried to modify room");
            HostCheck::NotHost
        }
        Some(room) => HostCheck::Host(room),
    })
}

pub(crate) async fn flash_errors(session: &Session, errors: &[FormError]) -> AppResult<()> {
    for error in errors {
        session::flash(session, error.to_string()).await?;
    }
    Ok(())
}

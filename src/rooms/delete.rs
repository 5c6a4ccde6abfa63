use axum::{debug_handler, extract::{Path, State}, response::{IntoResponse, Redirect, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db::{self, User}, include_res, res, session, AppResult};

use super::{check_host, HostCheck};

/// The "are you sure" page shared by room and message deletion.
pub(crate) async fn confirm_page(session: &Session, user: &User, obj: &str, action: &str, back: &str) -> AppResult<Response> {
    let content = res::fill(include_res!(str, "/pages/delete.html"), &[
        ("obj", &res::escape(obj)),
        ("action", &res::escape(action)),
        ("back", &res::escape(back)),
    ]);

    let flashes = session::take_flashes(session).await?;
    Ok(res::page("Delete", Some(user), &flashes, &content).into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn delete_room_page(
    Path(room_id): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user) = session::current_user(&session, &db_pool).await? else {
        return res::login_redirect(&format!("/r/{room_id}/delete"));
    };

    match check_host(&db_pool, &room_id, &user).await? {
        HostCheck::Missing => res::sorry("room"),
        HostCheck::NotHost => res::denied(),
        HostCheck::Host(room) => {
            confirm_page(&session, &user, &room.name, &format!("/r/{}/delete", room.id), &format!("/r/{}", room.id)).await
        }
    }
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn delete_room(
    Path(room_id): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user) = session::current_user(&session, &db_pool).await? else {
        return res::login_redirect(&format!("/r/{room_id}/delete"));
    };

    match check_host(&db_pool, &room_id, &user).await? {
        HostCheck::Missing => res::sorry("room"),
        HostCheck::NotHost => res::denied(),
        HostCheck::Host(room) => {
            db::rooms::delete(&db_pool, &room.id).await?;
            tracing::info!(room = %room.id, host = %user.username, "room deleted");
            Ok(Redirect::to("/").into_response())
        }
    }
}

use axum::{debug_handler, extract::{Path, State}, response::{IntoResponse, Redirect, Response}, Form};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db, forms::RoomForm, res, session, AppResult};

use super::{check_host, flash_errors, render_room_form, HostCheck, RoomFormView};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn edit_room_page(
    Path(room_id): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user) = session::current_user(&session, &db_pool).await? else {
        return res::login_redirect(&format!("/r/{room_id}/edit"));
    };

    let room = match check_host(&db_pool, &room_id, &user).await? {
        HostCheck::Missing => return res::sorry("room"),
        HostCheck::NotHost => return res::denied(),
        HostCheck::Host(room) => room,
    };

    let action = format!("/r/{}/edit", room.id);
    let back = format!("/r/{}", room.id);
    render_room_form(&db_pool, &session, &user, RoomFormView {
        heading: "Update room",
        action: &action,
        back: &back,
        topic: &room.topic_name,
        name: &room.name,
        description: &room.description,
    }).await
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn edit_room(
    Path(room_id): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,

    Form(form): Form<RoomForm>,
) -> AppResult<Response> {
    let Some(user) = session::current_user(&session, &db_pool).await? else {
        return res::login_redirect(&format!("/r/{room_id}/edit"));
    };

    let room = match check_host(&db_pool, &room_id, &user).await? {
        HostCheck::Missing => return res::sorry("room"),
        HostCheck::NotHost => return res::denied(),
        HostCheck::Host(room) => room,
    };

    let valid = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => {
            flash_errors(&session, &errors).await?;
            let action = format!("/r/{}/edit", room.id);
            let back = format!("/r/{}", room.id);
            return render_room_form(&db_pool, &session, &user, RoomFormView {
                heading: "Update room",
                action: &action,
                back: &back,
                topic: form.topic.as_deref().unwrap_or_default(),
                name: form.name.as_deref().unwrap_or_default(),
                description: form.description.as_deref().unwrap_or_default(),
            }).await;
        }
    };

    let topic = db::topics::get_or_create(&db_pool, &valid.topic).await?;
    db::rooms::update(&db_pool, &room.id, &topic.id, &valid.name, &valid.description).await?;
    tracing::info!(room = %room.id, topic = %topic.name, "room updated");

    Ok(Redirect::to("/").into_response())
}

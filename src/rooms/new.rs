use axum::{debug_handler, extract::State, response::{IntoResponse, Redirect, Response}, Form};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db, forms::RoomForm, res, session, AppResult};

use super::{flash_errors, render_room_form, RoomFormView};

const NEW_ROOM: RoomFormView<'static> = RoomFormView {
    heading: "Create room",
    action: "/r/new",
    back: "/",
    topic: "",
    name: "",
    description: "",
};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn new_room_page(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user) = session::current_user(&session, &db_pool).await? else {
        return res::login_redirect("/r/new");
    };

    render_room_form(&db_pool, &session, &user, NEW_ROOM).await
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn new_room(
    State(db_pool): State<SqlitePool>,
    session: Session,

    Form(form): Form<RoomForm>,
) -> AppResult<Response> {
    let Some(user) = session::current_user(&session, &db_pool).await? else {
        return res::login_redirect("/r/new");
    };

    let valid = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => {
            flash_errors(&session, &errors).await?;
            let view = RoomFormView {
                topic: form.topic.as_deref().unwrap_or_default(),
                name: form.name.as_deref().unwrap_or_default(),
                description: form.description.as_deref().unwrap_or_default(),
                ..NEW_ROOM
            };
            return render_room_form(&db_pool, &session, &user, view).await;
        }
    };

    let topic = db::topics::get_or_create(&db_pool, &valid.topic).await?;
    let room_id = db::rooms::create(&db_pool, &user.id, &topic.id, &valid.name, &valid.description).await?;
    tracing::info!(room = %room_id, host = %user.username, topic = %topic.name, "room created");

    Ok(Redirect::to("/").into_response())
}

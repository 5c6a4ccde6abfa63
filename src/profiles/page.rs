use axum::{debug_handler, extract::{Path, State}, response::{IntoResponse, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{activity, db, include_res, res, rooms, session, topics, AppResult};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn profile(
    Path(profile_id): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let viewer = session::current_user(&session, &db_pool).await?;

    let Some(user) = db::users::find(&db_pool, &profile_id).await? else {
        return res::sorry("profile");
    };

    let hosted = db::rooms::list_hosted_by(&db_pool, &user.id).await?;
    let all_topics = db::topics::list(&db_pool, None, None).await?;
    let total_room_count = db::rooms::count(&db_pool).await?;
    let room_messages = db::messages::list_by_user(&db_pool, &user.id).await?;

    let edit = match &viewer {
        Some(viewer) if viewer.id == user.id => r#"<a class="button" href="/p/edit">Edit profile</a>"#,
        _ => "",
    };

    let content = res::fill(include_res!(str, "/pages/profiles/profile.html"), &[
        ("topics", &topics::topic_items(&all_topics)),
        ("total_room_count", &total_room_count.to_string()),
        ("username", &res::escape(&user.username)),
        ("joined", &res::timesince(user.created_at)),
        ("edit", edit),
        ("rooms", &rooms::room_items(&hosted)),
        ("activity", &activity::feed(&room_messages, viewer.as_ref())),
    ]);

    let flashes = session::take_flashes(&session).await?;
    Ok(res::page(&user.username, viewer.as_ref(), &flashes, &content).into_response())
}

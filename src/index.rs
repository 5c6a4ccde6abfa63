use axum::{debug_handler, extract::{Query, State}, response::{IntoResponse, Response}};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{activity, db::{self, RoomFilter}, include_res, res, rooms, session, topics, AppResult};

pub const SIDEBAR_TOPICS: i64 = 5;

#[derive(Deserialize)]
pub(crate) struct HomeQuery {
    search: Option<String>,
    topic: Option<String>,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn home(
    Query(HomeQuery { search, topic }): Query<HomeQuery>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let user = session::current_user(&session, &db_pool).await?;

    let filter = RoomFilter::from_query(search, topic);
    let matching = db::rooms::list(&db_pool, &filter).await?;
    let sidebar = db::topics::list(&db_pool, None, Some(SIDEBAR_TOPICS)).await?;
    let total_room_count = db::rooms::count(&db_pool).await?;

    let room_ids: Vec<&str> = matching.iter().map(|room| room.id.as_str()).collect();
    let room_messages = db::messages::list_in_rooms(&db_pool, &room_ids).await?;

    let content = res::fill(include_res!(str, "/pages/home.html"), &[
        ("topics", &topics::topic_items(&sidebar)),
        ("total_room_count", &total_room_count.to_string()),
        ("room_count", &matching.len().to_string()),
        ("rooms", &rooms::room_items(&matching)),
        ("activity", &activity::feed(&room_messages, user.as_ref())),
    ]);

    Ok(res::page("Home", user.as_ref(), &session::take_flashes(&session).await?, &content).into_response())
}

use axum::{debug_handler, extract::{Query, State}, response::{IntoResponse, Response}};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db::{self, TopicRow}, include_res, res, session, AppResult};

#[derive(Deserialize)]
pub(crate) struct TopicsQuery {
    search: Option<String>,
}

pub(crate) fn topic_items(topics: &[TopicRow]) -> String {
    topics
        .iter()
        .map(|topic| res::fill(include_res!(str, "/pages/topic_item.html"), &[
            ("query", &urlencoding::encode(&topic.name)),
            ("name", &res::escape(&topic.name)),
            ("room_count", &topic.room_count.to_string()),
        ]))
        .collect()
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn topics(
    Query(TopicsQuery { search }): Query<TopicsQuery>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let user = session::current_user(&session, &db_pool).await?;
    let search = search.filter(|s| !s.is_empty());
    let topics = db::topics::list(&db_pool, search.as_deref(), None).await?;

    let content = res::fill(include_res!(str, "/pages/topics.html"), &[
        ("search", &res::escape(search.as_deref().unwrap_or_default())),
        ("topics", &topic_items(&topics)),
    ]);

    Ok(res::page("Topics", user.as_ref(), &session::take_flashes(&session).await?, &content).into_response())
}

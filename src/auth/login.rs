use axum::{debug_handler, extract::{Query, State}, response::{IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db, forms::{normalize_username, LoginForm}, include_res, res, session, AppResult};

use super::verify_password;

#[derive(Deserialize)]
pub(crate) struct LoginQuery {
    pub(crate) return_url: Option<String>,
}

fn login_form(username: &str, return_url: Option<&str>) -> String {
    res::fill(include_res!(str, "/pages/login.html"), &[
        ("username", &res::escape(username)),
        ("return_url", &res::escape(&urlencoding::encode(res::safe_return_url(return_url)))),
    ])
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn login_page(
    Query(LoginQuery { return_url }): Query<LoginQuery>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    if session::current_user(&session, &db_pool).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let flashes = session::take_flashes(&session).await?;
    Ok(res::page("Login", None, &flashes, &login_form("", return_url.as_deref())).into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn login(
    Query(LoginQuery { return_url }): Query<LoginQuery>,
    State(db_pool): State<SqlitePool>,
    session: Session,

    Form(LoginForm { username, password }): Form<LoginForm>,
) -> AppResult<Response> {
    if session::current_user(&session, &db_pool).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let username = normalize_username(username.as_deref().unwrap_or_default());
    let password = password.unwrap_or_default();

    match db::users::find_by_username(&db_pool, &username).await? {
        None => {
            tracing::info!(%username, "login for unknown user");
            session::flash(&session, "User does not exist.").await?;
        }
        Some(user) => {
            if verify_password(&password, &user.password_hash)? {
                session::log_in(&session, &user).await?;
                return Ok(Redirect::to(res::safe_return_url(return_url.as_deref())).into_response());
            }
            tracing::info!(%username, "login with wrong password");
            session::flash(&session, "Password is invalid.").await?;
        }
    }

    let flashes = session::take_flashes(&session).await?;
    Ok(res::page("Login", None, &flashes, &login_form(&username, return_url.as_deref())).into_response())
}

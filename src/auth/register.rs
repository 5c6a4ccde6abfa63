use axum::{debug_handler, extract::State, response::{IntoResponse, Redirect, Response}, Form};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db, forms::{FormError, RegisterForm}, include_res, res, session, AppResult};

use super::hash_password;

async fn register_form(session: &Session, username: &str, errors: &[FormError]) -> AppResult<Response> {
    let errors: Vec<String> = errors.iter().map(ToString::to_string).collect();
    let content = res::fill(include_res!(str, "/pages/register.html"), &[
        ("username", &res::escape(username)),
        ("errors", &res::error_list(&errors)),
    ]);

    let flashes = session::take_flashes(session).await?;
    Ok(res::page("Register", None, &flashes, &content).into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn register_page(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    if session::current_user(&session, &db_pool).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    register_form(&session, "", &[]).await
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn register(
    State(db_pool): State<SqlitePool>,
    session: Session,

    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    if let Some(user) = session::current_user(&session, &db_pool).await? {
        tracing::info!(username = %user.username, "register attempt while logged in");
        return Ok(Redirect::to("/").into_response());
    }

    let checked = match form.validate() {
        Ok(valid) => {
            if db::users::username_taken(&db_pool, &valid.username, None).await? {
                Err(vec![FormError::UsernameTaken])
            } else {
                Ok(valid)
            }
        }
        Err(errors) => Err(errors),
    };

    let valid = match checked {
        Ok(valid) => valid,
        Err(errors) => {
            session::flash(&session, "An error occurred during registration").await?;
            return register_form(&session, form.username.as_deref().unwrap_or_default(), &errors).await;
        }
    };

    let password_hash = hash_password(&valid.password)?;
    let user = db::users::create(&db_pool, &valid.username, &password_hash).await?;
    tracing::info!(username = %user.username, "registered");

    session::log_in(&session, &user).await?;
    Ok(Redirect::to("/").into_response())
}

use axum::{debug_handler, extract::State, response::{IntoResponse, Redirect, Response}, Form};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db::{self, User}, forms::{FormError, UserForm}, include_res, res, session, AppResult};

async fn edit_form(session: &Session, user: &User, username: &str, email: &str, errors: &[FormError]) -> AppResult<Response> {
    let errors: Vec<String> = errors.iter().map(ToString::to_string).collect();
    let content = res::fill(include_res!(str, "/pages/profiles/edit.html"), &[
        ("errors", &res::error_list(&errors)),
        ("user_id", &res::escape(&user.id)),
        ("username", &res::escape(username)),
        ("email", &res::escape(email)),
    ]);

    let flashes = session::take_flashes(session).await?;
    Ok(res::page("Edit profile", Some(user), &flashes, &content).into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn edit_profile_page(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user) = session::current_user(&session, &db_pool).await? else {
        return res::login_redirect("/p/edit");
    };

    edit_form(&session, &user, &user.username, &user.email, &[]).await
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn edit_profile(
    State(db_pool): State<SqlitePool>,
    session: Session,

    Form(form): Form<UserForm>,
) -> AppResult<Response> {
    let Some(user) = session::current_user(&session, &db_pool).await? else {
        return res::login_redirect("/p/edit");
    };

    let checked = match form.validate() {
        Ok(valid) => {
            if db::users::username_taken(&db_pool, &valid.username, Some(&user.id)).await? {
                Err(vec![FormError::UsernameTaken])
            } else {
                Ok(valid)
            }
        }
        Err(errors) => Err(errors),
    };

    match checked {
        Ok(valid) => {
            db::users::update_details(&db_pool, &user.id, &valid.username, &valid.email).await?;
            tracing::info!(user = %user.id, username = %valid.username, "profile updated");
            Ok(Redirect::to(&format!("/p/{}", user.id)).into_response())
        }
        Err(errors) => {
            session::flash(&session, "An error occurred during updating User details").await?;
            edit_form(
                &session,
                &user,
                form.username.as_deref().unwrap_or_default(),
                form.email.as_deref().unwrap_or_default(),
                &errors,
            ).await
        }
    }
}

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chatrooms::{app, db, AppState, Config};
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

pub const PASSWORD: &str = "correct horse battery";

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub text: String,
}

/// The server and its database; each `browser()` is an independent cookie jar against it.
pub struct TestApp {
    router: Router,
    pub db_pool: SqlitePool,
    _db_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_dir = TempDir::new().expect("create temp dir");
        let db_path = db_dir.path().join("chatrooms-test.db");
        let config = Config {
            database_url: format!("sqlite://{}", db_path.to_string_lossy()),
            db_max_connections: 4,
            ..Config::default()
        };

        let db_pool = db::connect(&config.database_url, config.db_max_connections)
            .await
            .expect("connect test database");
        let router = app(AppState { db_pool: db_pool.clone() }, &config);

        Self {
            router,
            db_pool,
            _db_dir: db_dir,
        }
    }

    pub fn browser(&self) -> Browser {
        Browser { router: self.router.clone(), cookie: None }
    }

    pub async fn room_id(&self, name: &str) -> String {
        let (id,): (String,) = sqlx::query_as("SELECT id FROM rooms WHERE name=?")
            .bind(name)
            .fetch_one(&self.db_pool)
            .await
            .expect("room exists");
        id
    }

    pub async fn user_id(&self, username: &str) -> String {
        let (id,): (String,) = sqlx::query_as("SELECT id FROM users WHERE username=?")
            .bind(username)
            .fetch_one(&self.db_pool)
            .await
            .expect("user exists");
        id
    }

    pub async fn count(&self, table: &str) -> i64 {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.db_pool)
            .await
            .expect("count rows");
        count
    }
}

pub struct Browser {
    router: Router,
    cookie: Option<String>,
}

impl Browser {
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        send(&self.router, &mut self.cookie, Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, form: &[(&str, &str)]) -> TestResponse {
        send(&self.router, &mut self.cookie, Method::POST, uri, Some(form)).await
    }

    pub async fn register(&mut self, username: &str) -> TestResponse {
        self.post("/register", &[("username", username), ("password1", PASSWORD), ("password2", PASSWORD)]).await
    }

    /// Posts the create form and expects the redirect home.
    pub async fn create_room(&mut self, topic: &str, name: &str, description: &str) {
        let response = self.post("/r/new", &[("topic", topic), ("name", name), ("description", description)]).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", response.text);
        assert_eq!(response.location.as_deref(), Some("/"));
    }
}

async fn send(
    router: &Router,
    cookie: &mut Option<String>,
    method: Method,
    uri: &str,
    form: Option<&[(&str, &str)]>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie.as_deref() {
        builder = builder.header(header::COOKIE, cookie);
    }

    let body = match form {
        Some(form) => {
            builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(form)
                .finish();
            Body::from(encoded)
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(builder.body(body).expect("build request"))
        .await
        .expect("dispatch request");

    if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
        let set_cookie = set_cookie.to_str().expect("ascii cookie");
        let pair = set_cookie.split(';').next().unwrap_or_default().trim();
        let removed = set_cookie.contains("Max-Age=0") || pair.ends_with('=');
        *cookie = if removed { None } else { Some(pair.to_owned()) };
    }

    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|value| value.to_str().expect("ascii location").to_owned());
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect response body")
        .to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap_or_default();

    TestResponse { status, location, text }
}

//! Shared fixtures: an in-process backend double and the app wired to it.

#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing,
};
use axum_extra::extract::cookie::Cookie;
use docrag::{
    AppState, Config,
    config::{ApiConfig, Environment, LoggingConfig, ServerConfig, SessionConfig},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};

pub const TOKEN: &str = "token-123";
/// Makes the profile endpoint fail with a 500.
pub const FLAKY_TOKEN: &str = "token-flaky";
pub const EMAIL: &str = "user@example.com";
pub const PASSWORD: &str = "pw1234";
pub const TAKEN_EMAIL: &str = "taken@example.com";

/// Number of calls the backend received, per endpoint.
#[derive(Default)]
pub struct Calls {
    pub login: AtomicUsize,
    pub register: AtomicUsize,
    pub me: AtomicUsize,
}

impl Calls {
    pub fn login(&self) -> usize {
        self.login.load(Ordering::SeqCst)
    }

    pub fn register(&self) -> usize {
        self.register.load(Ordering::SeqCst)
    }

    pub fn me(&self) -> usize {
        self.me.load(Ordering::SeqCst)
    }
}

pub struct TestApp {
    pub app: Router,
    pub calls: Arc<Calls>,
}

pub fn profile_json() -> Value {
    json!({
        "id": "u1",
        "email": EMAIL,
        "name": "Jo Tester",
        "major": "ptik",
        "role": "STUDENT",
        "createdAt": "2025-01-01T00:00:00.000Z",
        "updatedAt": "2025-01-02T00:00:00.000Z"
    })
}

/// The cached profile as the app writes it into the `user` cookie.
pub fn profile_cookie_value() -> String {
    json!({
        "id": "u1",
        "email": EMAIL,
        "name": "Jo Tester",
        "role": "STUDENT",
        "major": "ptik"
    })
    .to_string()
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

async fn login(State(calls): State<Arc<Calls>>, Json(body): Json<Value>) -> Response {
    calls.login.fetch_add(1, Ordering::SeqCst);

    if body["email"] == EMAIL && body["password"] == PASSWORD {
        return Json(json!({
            "access_token": TOKEN,
            "user": {"id": "u1", "email": EMAIL, "name": "Jo Tester", "role": "STUDENT", "major": "ptik"}
        }))
        .into_response();
    }

    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"statusCode": 401, "message": "Invalid credentials", "error": "Unauthorized"})),
    )
        .into_response()
}

async fn register(State(calls): State<Arc<Calls>>, Json(body): Json<Value>) -> Response {
    calls.register.fetch_add(1, Ordering::SeqCst);

    if body["email"] == TAKEN_EMAIL {
        return (
            StatusCode::CONFLICT,
            Json(json!({
                "statusCode": 409,
                "message": "Email already registered",
                "errors": {"email": ["Email is taken"]}
            })),
        )
            .into_response();
    }

    let mut user = profile_json();
    user["email"] = body["email"].clone();
    user["name"] = body["name"].clone();

    (StatusCode::CREATED, Json(user)).into_response()
}

async fn me(State(calls): State<Arc<Calls>>, headers: HeaderMap) -> Response {
    calls.me.fetch_add(1, Ordering::SeqCst);

    match bearer(&headers) {
        Some(TOKEN) => Json(profile_json()).into_response(),
        Some(FLAKY_TOKEN) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"statusCode": 500, "message": "Internal server error"})),
        )
            .into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"statusCode": 401, "message": "Unauthorized"})),
        )
            .into_response(),
    }
}

async fn spawn_backend() -> (String, Arc<Calls>) {
    let calls = Arc::new(Calls::default());
    let router = Router::new()
        .route("/api", routing::get(|| async { "Hello World!" }))
        .route("/api/auth/login", routing::post(login))
        .route("/api/auth/register", routing::post(register))
        .route("/api/users/me", routing::get(me))
        .with_state(calls.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{addr}"), calls)
}

pub fn test_config(base_url: String) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            environment: Environment::Development,
        },
        api: ApiConfig {
            base_url,
            timeout_secs: Some(5),
        },
        session: SessionConfig::default(),
        logging: LoggingConfig::default(),
    }
}

pub async fn spawn_app() -> TestApp {
    let (base_url, calls) = spawn_backend().await;
    let state = AppState::new(test_config(base_url)).unwrap();

    TestApp {
        app: docrag::app(state),
        calls,
    }
}

/// `Cookie` request header for the given pairs.
pub fn cookie_header(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(name, value)| {
            Cookie::new(name.to_string(), value.to_string())
                .encoded()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn get(uri: &str, cookies: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);

    if !cookies.is_empty() {
        builder = builder.header(header::COOKIE, cookie_header(cookies));
    }

    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, fields: &[(&str, &str)], cookies: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");

    if !cookies.is_empty() {
        builder = builder.header(header::COOKIE, cookie_header(cookies));
    }

    builder
        .body(Body::from(serde_urlencoded::to_string(fields).unwrap()))
        .unwrap()
}

pub fn set_cookies(response: &Response) -> Vec<Cookie<'static>> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| Cookie::parse_encoded(v.to_str().unwrap().to_owned()).unwrap())
        .collect()
}

pub fn find_cookie<'a>(cookies: &'a [Cookie<'static>], name: &str) -> Option<&'a Cookie<'static>> {
    cookies.iter().find(|c| c.name() == name)
}

pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

pub async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

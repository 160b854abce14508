use axum::{
    Router,
    http::StatusCode,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post},
};

use crate::{
    config::Config,
    cookie::CookieSettings,
    middleware::{Session, session_middleware},
    template::{NotFoundTemplate, render_with_status},
};

mod assets;
mod auth;
mod health;
mod index;

pub use assets::AssetsService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub api: docrag_api::Client,
    pub cookies: CookieSettings,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, docrag_api::Error> {
        let api = docrag_api::Client::new(&config.api.client_config())?;
        let cookies = CookieSettings::from_config(&config);

        Ok(Self {
            config,
            api,
            cookies,
        })
    }
}

pub async fn fallback(session: Session) -> impl IntoResponse {
    render_with_status(
        StatusCode::NOT_FOUND,
        NotFoundTemplate { user: session.user },
    )
}

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(index::page))
        .route(
            "/auth/login",
            get(auth::login::page).post(auth::login::action),
        )
        .route(
            "/auth/register",
            get(auth::register::page).post(auth::register::action),
        )
        .route("/auth/logout", post(auth::logout::action))
        .fallback(fallback)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            session_middleware,
        ))
        // Registered after the session layer so they never touch cookies
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .nest_service("/static", AssetsService::new())
        .with_state(app_state)
}

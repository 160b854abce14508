use axum::{extract::State, response::IntoResponse};
use axum_extra::extract::CookieJar;

use crate::{
    cookie::{AUTH_COOKIE, USER_COOKIE},
    form::PageRedirect,
    routes::AppState,
};

/// POST /auth/logout - Drops both session cookies
pub async fn action(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = jar
        .add(state.cookies.removal(AUTH_COOKIE))
        .add(state.cookies.removal(USER_COOKIE));

    tracing::info!("User logged out");

    (jar, PageRedirect::see_other("/auth/login"))
}

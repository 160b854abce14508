//! Per-request session resolution.
//!
//! The session is built by folding an ordered list of [`Stage`]s over a
//! [`Context`]. Handlers read the result through the [`Session`] extractor.

use std::{collections::HashSet, convert::Infallible};

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderValue, header::SET_COOKIE, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::{CookieJar, cookie::Cookie};
use docrag_api::{RequestParams, UserData};

use crate::{
    cookie::{AUTH_COOKIE, USER_COOKIE},
    routes::AppState,
};

/// Auth state of the current request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<UserData>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Session>().cloned().unwrap_or_default())
    }
}

/// Request-scoped scratch space threaded through the stages.
#[derive(Debug)]
pub struct Context {
    /// Cookies sent by the browser.
    pub cookies: CookieJar,
    pub session: Session,
    /// Cookies to set on the response.
    pub writes: Vec<Cookie<'static>>,
}

impl Context {
    pub fn new(cookies: CookieJar) -> Self {
        Self {
            cookies,
            session: Session::default(),
            writes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Copies the token and cached profile from cookies.
    ReadCookies,
    /// Fetches the profile when a token has no cached copy.
    LoadUser,
}

pub const STAGES: &[Stage] = &[Stage::ReadCookies, Stage::LoadUser];

impl Stage {
    pub async fn apply(self, mut ctx: Context, state: &AppState) -> Context {
        match self {
            Stage::ReadCookies => {
                let token = ctx
                    .cookies
                    .get(AUTH_COOKIE)
                    .map(|c| c.value().to_owned())
                    .filter(|t| !t.is_empty());

                let mut user = ctx.cookies.get(USER_COOKIE).and_then(|c| {
                    serde_json::from_str::<UserData>(c.value())
                        .inspect_err(|e| tracing::warn!(error = %e, "Ignoring unreadable user cookie"))
                        .ok()
                });

                if token.is_none() && ctx.cookies.get(USER_COOKIE).is_some() {
                    tracing::debug!("Dropping user cookie without auth token");
                    ctx.writes.push(state.cookies.removal(USER_COOKIE));
                    user = None;
                }

                ctx.session = Session { token, user };
            }
            Stage::LoadUser => {
                let Some(token) = ctx.session.token.clone() else {
                    return ctx;
                };

                if ctx.session.user.is_some() {
                    return ctx;
                }

                match state.api.current_user(&token, RequestParams::default()).await {
                    Ok(user) => {
                        let user = UserData::from(user);

                        match serde_json::to_string(&user) {
                            Ok(value) => ctx.writes.push(state.cookies.build(USER_COOKIE, value)),
                            Err(e) => tracing::error!(error = %e, "Failed to serialize user"),
                        }

                        tracing::debug!(user_id = %user.id, "Cached current user");
                        ctx.session.user = Some(user);
                    }
                    Err(e) if e.is_unauthorized() => {
                        tracing::warn!(error = %e, "Auth token rejected, clearing session");
                        ctx.writes.push(state.cookies.removal(AUTH_COOKIE));
                        ctx.writes.push(state.cookies.removal(USER_COOKIE));
                        ctx.session = Session::default();
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to load current user");
                    }
                }
            }
        }

        ctx
    }
}

pub async fn resolve(stages: &[Stage], mut ctx: Context, state: &AppState) -> Context {
    for stage in stages {
        ctx = stage.apply(ctx, state).await;
    }

    ctx
}

/// Resolves the [`Session`] before the handler runs.
///
/// Cookies the handler sets itself take precedence over the ones written
/// here.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let ctx = resolve(STAGES, Context::new(jar), &state).await;

    req.extensions_mut().insert(ctx.session);

    let mut response = next.run(req).await;
    apply_writes(&mut response, ctx.writes);

    response
}

fn apply_writes(response: &mut Response, writes: Vec<Cookie<'static>>) {
    let handled: HashSet<String> = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| Cookie::parse_encoded(v.to_owned()).ok())
        .map(|c| c.name().to_owned())
        .collect();

    for cookie in writes {
        if handled.contains(cookie.name()) {
            continue;
        }

        match HeaderValue::from_str(&cookie.encoded().to_string()) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::error!(cookie = cookie.name(), error = %e, "Invalid cookie header"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, Config, Environment, LoggingConfig, ServerConfig, SessionConfig};
    use axum::response::IntoResponse;

    fn state() -> AppState {
        AppState::new(Config {
            server: ServerConfig {
                host: "127.0.0.1".to_owned(),
                port: 8080,
                environment: Environment::Development,
            },
            // Nothing listens here; these tests never reach the backend.
            api: ApiConfig {
                base_url: "http://127.0.0.1:9".to_owned(),
                timeout_secs: Some(1),
            },
            session: SessionConfig::default(),
            logging: LoggingConfig::default(),
        })
        .unwrap()
    }

    fn profile() -> UserData {
        UserData {
            id: "u1".to_owned(),
            email: "user@example.com".to_owned(),
            name: "Jo".to_owned(),
            role: docrag_api::Role::Student,
            major: "ptik".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_no_cookies_is_anonymous() {
        let ctx = resolve(STAGES, Context::new(CookieJar::new()), &state()).await;

        assert_eq!(ctx.session, Session::default());
        assert!(ctx.writes.is_empty());
    }

    #[tokio::test]
    async fn test_cached_profile_is_trusted() {
        let jar = CookieJar::new()
            .add(Cookie::new(AUTH_COOKIE, "tok"))
            .add(Cookie::new(
                USER_COOKIE,
                serde_json::to_string(&profile()).unwrap(),
            ));

        let ctx = resolve(STAGES, Context::new(jar), &state()).await;

        assert_eq!(ctx.session.token.as_deref(), Some("tok"));
        assert_eq!(ctx.session.user, Some(profile()));
        assert!(ctx.writes.is_empty());
    }

    #[tokio::test]
    async fn test_orphan_profile_is_dropped() {
        let jar = CookieJar::new().add(Cookie::new(
            USER_COOKIE,
            serde_json::to_string(&profile()).unwrap(),
        ));

        let ctx = Stage::ReadCookies
            .apply(Context::new(jar), &state())
            .await;

        assert_eq!(ctx.session, Session::default());
        assert_eq!(ctx.writes.len(), 1);
        assert_eq!(ctx.writes[0].name(), USER_COOKIE);
        assert_eq!(ctx.writes[0].value(), "");
    }

    #[tokio::test]
    async fn test_unreadable_profile_is_absent() {
        let jar = CookieJar::new()
            .add(Cookie::new(AUTH_COOKIE, "tok"))
            .add(Cookie::new(USER_COOKIE, "not json"));

        let ctx = Stage::ReadCookies
            .apply(Context::new(jar), &state())
            .await;

        assert_eq!(ctx.session.token.as_deref(), Some("tok"));
        assert_eq!(ctx.session.user, None);
    }

    #[tokio::test]
    async fn test_load_user_passes_through_without_token() {
        let ctx = Stage::LoadUser
            .apply(Context::new(CookieJar::new()), &state())
            .await;

        assert_eq!(ctx.session, Session::default());
        assert!(ctx.writes.is_empty());
    }

    #[test]
    fn test_handler_cookies_win() {
        let settings = crate::cookie::CookieSettings::default();
        let mut response = (
            [(SET_COOKIE, settings.removal(USER_COOKIE).encoded().to_string())],
            "",
        )
            .into_response();

        apply_writes(
            &mut response,
            vec![
                settings.build(USER_COOKIE, "{}".to_owned()),
                settings.build(AUTH_COOKIE, "tok".to_owned()),
            ],
        );

        let cookies: Vec<_> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| Cookie::parse_encoded(v.to_str().unwrap().to_owned()).unwrap())
            .collect();

        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0].name(), USER_COOKIE);
        assert_eq!(cookies[0].value(), "");
        assert_eq!(cookies[1].name(), AUTH_COOKIE);
    }
}

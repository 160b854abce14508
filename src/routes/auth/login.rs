use askama::Template;
use axum::{
    Form,
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use docrag_api::{LoginDto, RequestParams, UserData};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{RedirectQuery, safe_redirect, with_redirect};
use crate::{
    cookie::{AUTH_COOKIE, USER_COOKIE},
    form::{FormErrors, FormState, Outcome, PageRedirect, validate},
    middleware::Session,
    routes::AppState,
    template::render,
};

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginForm {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 5, message = "Password must be at least 5 characters"))]
    pub password: String,
}

/// Fields echoed back into the form.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoginData {
    pub email: String,
}

#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub form: FormState<LoginData>,
    pub redirect: Option<String>,
}

impl LoginTemplate {
    fn action_url(&self) -> String {
        with_redirect("/auth/login", self.redirect.as_deref())
    }

    fn register_url(&self) -> String {
        with_redirect("/auth/register", self.redirect.as_deref())
    }
}

/// GET /auth/login - Show login form
pub async fn page(session: Session, Query(query): Query<RedirectQuery>) -> Response {
    if session.is_authenticated() {
        return PageRedirect::see_other(query.target()).into_response();
    }

    render(LoginTemplate {
        form: FormState::empty(LoginData::default()),
        redirect: query.redirect.as_deref().and_then(safe_redirect).map(str::to_owned),
    })
}

/// POST /auth/login - Sign in and store the session cookies
pub async fn action(
    State(state): State<AppState>,
    Query(query): Query<RedirectQuery>,
    headers: HeaderMap,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let (jar, outcome) = login(&state, jar, form, query.target()).await;
    let redirect = query.redirect.as_deref().and_then(safe_redirect).map(str::to_owned);

    let response = outcome.respond(&headers, |form| render(LoginTemplate { form, redirect }));

    (jar, response).into_response()
}

async fn login(
    state: &AppState,
    jar: CookieJar,
    form: LoginForm,
    target: String,
) -> (CookieJar, Outcome<LoginData>) {
    let data = LoginData {
        email: form.email.to_owned(),
    };

    if let Err(errors) = validate(&form) {
        return (jar, Outcome::ValidationFailed(FormState::invalid(data, errors)));
    }

    let dto = LoginDto {
        email: form.email,
        password: form.password,
    };

    let auth = match state.api.login(&dto, RequestParams::default()).await {
        Ok(auth) => auth,
        Err(e) => {
            tracing::warn!(email = %data.email, error = %e, "Login failed");

            return (
                jar,
                Outcome::BackendFailed(FormState::backend(data, FormErrors::default(), &e)),
            );
        }
    };

    let mut jar = jar.add(state.cookies.build(AUTH_COOKIE, auth.access_token.to_owned()));

    // The profile is cached on a best-effort basis; the session middleware
    // fetches it on the next request otherwise.
    let user = match state
        .api
        .current_user(&auth.access_token, RequestParams::default())
        .await
    {
        Ok(user) => Some(UserData::from(user)),
        Err(e) => {
            tracing::warn!(email = %data.email, error = %e, "Failed to fetch profile after login");
            None
        }
    };

    match user.map(|user| serde_json::to_string(&user)) {
        Some(Ok(value)) => jar = jar.add(state.cookies.build(USER_COOKIE, value)),
        Some(Err(e)) => {
            tracing::error!(error = %e, "Failed to serialize user");
            jar = jar.add(state.cookies.removal(USER_COOKIE));
        }
        None => jar = jar.add(state.cookies.removal(USER_COOKIE)),
    }

    tracing::info!(email = %data.email, "User logged in");

    (jar, Outcome::Success(PageRedirect::found(target)))
}

use askama::Template;
use axum::{
    Form,
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use docrag_api::{RegisterDto, RequestParams};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{RedirectQuery, safe_redirect, with_redirect};
use crate::{
    form::{FormErrors, FormState, Outcome, PageRedirect, validate},
    middleware::Session,
    routes::AppState,
    template::render,
};

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterForm {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(length(min = 5, message = "Password must be at least 5 characters"))]
    pub password: String,
    #[validate(length(min = 2, message = "Major must be at least 2 characters"))]
    pub major: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RegisterData {
    pub email: String,
    pub name: String,
    pub major: String,
}

#[derive(Template)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub form: FormState<RegisterData>,
    pub redirect: Option<String>,
}

impl RegisterTemplate {
    fn login_url(&self) -> String {
        with_redirect("/auth/login", self.redirect.as_deref())
    }

    fn action_url(&self) -> String {
        with_redirect("/auth/register", self.redirect.as_deref())
    }
}

/// GET /auth/register - Show registration form
pub async fn page(session: Session, Query(query): Query<RedirectQuery>) -> Response {
    if session.is_authenticated() {
        return PageRedirect::see_other(query.target()).into_response();
    }

    render(RegisterTemplate {
        form: FormState::empty(RegisterData::default()),
        redirect: query.redirect.as_deref().and_then(safe_redirect).map(str::to_owned),
    })
}

/// POST /auth/register - Create an account, then go to login
pub async fn action(
    State(state): State<AppState>,
    Query(query): Query<RedirectQuery>,
    headers: HeaderMap,
    Form(form): Form<RegisterForm>,
) -> Response {
    let redirect = query.redirect.as_deref().and_then(safe_redirect).map(str::to_owned);
    let outcome = register(&state, form, redirect.as_deref()).await;

    outcome.respond(&headers, |form| render(RegisterTemplate { form, redirect }))
}

async fn register(
    state: &AppState,
    form: RegisterForm,
    redirect: Option<&str>,
) -> Outcome<RegisterData> {
    let data = RegisterData {
        email: form.email.to_owned(),
        name: form.name.to_owned(),
        major: form.major.to_owned(),
    };

    if let Err(errors) = validate(&form) {
        return Outcome::ValidationFailed(FormState::invalid(data, errors));
    }

    let dto = RegisterDto {
        email: form.email,
        password: form.password,
        name: form.name,
        major: form.major,
    };

    match state.api.register(&dto, RequestParams::default()).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, email = %user.email, "User registered");

            Outcome::Success(PageRedirect::see_other(with_redirect("/auth/login", redirect)))
        }
        Err(e) => {
            tracing::warn!(email = %data.email, error = %e, "Registration failed");

            Outcome::BackendFailed(FormState::backend(data, FormErrors::default(), &e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_rules() {
        let errors = validate(&RegisterForm {
            email: "ada@example.com".to_owned(),
            name: "A".to_owned(),
            password: "secret".to_owned(),
            major: "C".to_owned(),
        })
        .unwrap_err();

        assert_eq!(errors.first("email"), None);
        assert_eq!(errors.first("password"), None);
        assert_eq!(
            errors.first("name"),
            Some("Name must be at least 2 characters")
        );
        assert_eq!(
            errors.first("major"),
            Some("Major must be at least 2 characters")
        );
    }

    #[test]
    fn test_login_url_keeps_redirect() {
        let template = RegisterTemplate {
            form: FormState::empty(RegisterData::default()),
            redirect: Some("/docs".to_owned()),
        };

        assert_eq!(template.login_url(), "/auth/login?redirect=%2Fdocs");
        assert_eq!(template.action_url(), "/auth/register?redirect=%2Fdocs");
    }
}

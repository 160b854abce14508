//! Form validation results and the outcome of a page action.
//!
//! Both auth actions walk the same states:
//! `Validating -> {ValidationFailed | BackendCall} -> {BackendFailed | Success}`.

use std::collections::BTreeMap;

use axum::{
    Json,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use validator::{Validate, ValidationErrors};

use crate::template::SERVER_ERROR_MESSAGE;

/// Field name to messages, in the order they were reported.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn from_validation(errors: &ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let messages = errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("{field} is invalid ({})", e.code))
                    })
                    .collect();

                (field.to_string(), messages)
            })
            .collect();

        Self(fields)
    }

    pub fn first(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FormMessage {
    pub error: bool,
    pub message: String,
}

/// What a form page needs to re-render itself.
///
/// `data` never holds secrets; passwords are not echoed back.
#[derive(Debug, Clone, Serialize)]
pub struct FormState<T> {
    pub data: T,
    pub valid: bool,
    pub errors: FormErrors,
    pub message: Option<FormMessage>,
}

impl<T> FormState<T> {
    pub fn empty(data: T) -> Self {
        Self {
            data,
            valid: true,
            errors: FormErrors::default(),
            message: None,
        }
    }

    pub fn invalid(data: T, errors: FormErrors) -> Self {
        Self {
            data,
            valid: false,
            errors,
            message: None,
        }
    }

    /// Failure reported by the backend, merged into the form's own errors.
    ///
    /// Backend field errors and message replace the form's when present.
    /// Transport failures get a generic message.
    pub fn backend(data: T, errors: FormErrors, err: &docrag_api::Error) -> Self {
        let (errors, message) = match err {
            docrag_api::Error::Backend { message, .. } => (
                err.field_errors()
                    .map(|fields| FormErrors(fields.clone()))
                    .unwrap_or(errors),
                message.to_owned(),
            ),
            _ => (errors, SERVER_ERROR_MESSAGE.to_owned()),
        };

        Self {
            data,
            valid: false,
            errors,
            message: Some(FormMessage {
                error: true,
                message,
            }),
        }
    }
}

pub fn validate<F: Validate>(form: &F) -> Result<(), FormErrors> {
    form.validate()
        .map_err(|errors| FormErrors::from_validation(&errors))
}

/// Where a successful action sends the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRedirect {
    pub status: StatusCode,
    pub location: String,
}

impl PageRedirect {
    /// 302, used after login.
    pub fn found(location: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FOUND,
            location: location.into(),
        }
    }

    /// 303, used after registration and for already signed-in visitors.
    pub fn see_other(location: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SEE_OTHER,
            location: location.into(),
        }
    }
}

impl IntoResponse for PageRedirect {
    fn into_response(self) -> Response {
        (self.status, [(header::LOCATION, self.location)]).into_response()
    }
}

#[derive(Debug)]
pub enum Outcome<T> {
    ValidationFailed(FormState<T>),
    BackendFailed(FormState<T>),
    Success(PageRedirect),
}

impl<T: Serialize> Outcome<T> {
    /// Renders the terminal state.
    ///
    /// Clients asking for `application/json` get an action result instead
    /// of a page or a redirect.
    pub fn respond<F>(self, headers: &HeaderMap, render: F) -> Response
    where
        F: FnOnce(FormState<T>) -> Response,
    {
        let json = wants_json(headers);

        match self {
            Outcome::Success(redirect) if json => Json(json!({
                "type": "redirect",
                "status": redirect.status.as_u16(),
                "location": redirect.location,
            }))
            .into_response(),
            Outcome::Success(redirect) => redirect.into_response(),
            Outcome::ValidationFailed(form) | Outcome::BackendFailed(form) if json => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "type": "failure",
                    "status": StatusCode::BAD_REQUEST.as_u16(),
                    "data": { "form": form },
                })),
            )
                .into_response(),
            Outcome::ValidationFailed(form) | Outcome::BackendFailed(form) => {
                let mut response = render(form);
                if response.status().is_success() {
                    *response.status_mut() = StatusCode::BAD_REQUEST;
                }
                response
            }
        }
    }
}

pub fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"))
}

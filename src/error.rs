use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::template::SERVER_ERROR_MESSAGE;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorPageTemplate {
    status_code: u16,
    error_title: String,
    error_message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_title, error_message) = match &self {
            AppError::Template(_) => {
                tracing::error!(error = %self, "Request failed");

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server error",
                    SERVER_ERROR_MESSAGE,
                )
            }
        };

        let page = ErrorPageTemplate {
            status_code: status_code.as_u16(),
            error_title: error_title.to_owned(),
            error_message: error_message.to_owned(),
        };

        match page.render() {
            Ok(html) => (status_code, Html(html)).into_response(),
            Err(_) => (status_code, error_message.to_owned()).into_response(),
        }
    }
}

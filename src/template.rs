use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use docrag_api::UserData;

pub const SERVER_ERROR_MESSAGE: &str = "Something went wrong, please retry later";

/// Renders `template` as a 200 HTML page.
pub fn render<T: askama::Template>(template: T) -> Response {
    render_with_status(StatusCode::OK, template)
}

pub fn render_with_status<T: askama::Template>(status: StatusCode, template: T) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "Failed to render template");

            crate::error::AppError::Template(err).into_response()
        }
    }
}

#[derive(askama::Template)]
#[template(path = "404.html")]
pub struct NotFoundTemplate {
    pub user: Option<UserData>,
}

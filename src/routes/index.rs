use askama::Template;
use axum::response::IntoResponse;
use docrag_api::UserData;

use crate::{middleware::Session, template::render};

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub user: Option<UserData>,
    pub signed_in: bool,
}

pub async fn page(session: Session) -> impl IntoResponse {
    render(IndexTemplate {
        signed_in: session.is_authenticated(),
        user: session.user,
    })
}

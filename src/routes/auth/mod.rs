//! Login, registration and logout.

pub mod login;
pub mod logout;
pub mod register;

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct RedirectQuery {
    pub redirect: Option<String>,
}

impl RedirectQuery {
    /// Target after a successful sign-in, `/` unless a safe one was given.
    pub fn target(&self) -> String {
        self.redirect
            .as_deref()
            .and_then(safe_redirect)
            .unwrap_or("/")
            .to_owned()
    }
}

/// `path`, carrying the post-login target along when there is one.
pub fn with_redirect(path: &str, redirect: Option<&str>) -> String {
    match redirect {
        Some(redirect) => format!(
            "{path}?{}",
            url::form_urlencoded::Serializer::new(String::new())
                .append_pair("redirect", redirect)
                .finish()
        ),
        None => path.to_owned(),
    }
}

/// Accepts only same-origin absolute paths.
pub fn safe_redirect(target: &str) -> Option<&str> {
    let is_local = target.starts_with('/')
        && !target.starts_with("//")
        && !target.starts_with("/\\")
        && !target.chars().any(char::is_control);

    is_local.then_some(target)
}

//! Session cookies and the attributes every one of them carries.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::{Duration, OffsetDateTime};

use crate::config::Config;

/// Bearer token issued by the backend on login.
pub const AUTH_COOKIE: &str = "auth_token";

/// JSON copy of the signed-in user's profile.
pub const USER_COOKIE: &str = "user";

pub const DEFAULT_MAX_AGE: Duration = Duration::days(7);

/// Overrides for a single cookie's lifetime.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lifetime {
    pub max_age: Option<Duration>,
    pub expires: Option<OffsetDateTime>,
}

/// Defaults shared by every session cookie: `path=/`, `HttpOnly`,
/// `SameSite=Lax`, `Secure` in production.
#[derive(Debug, Clone, Copy)]
pub struct CookieSettings {
    pub secure: bool,
    pub max_age: Duration,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            secure: true,
            max_age: DEFAULT_MAX_AGE,
        }
    }
}

impl CookieSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            secure: config.session.secure.unwrap_or(config.is_production()),
            max_age: Duration::days(config.session.max_age_days),
        }
    }

    pub fn build(&self, name: &'static str, value: String) -> Cookie<'static> {
        self.build_with(name, value, Lifetime::default())
    }

    pub fn build_with(
        &self,
        name: &'static str,
        value: String,
        lifetime: Lifetime,
    ) -> Cookie<'static> {
        let mut cookie = Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(lifetime.max_age.unwrap_or(self.max_age));

        if let Some(expires) = lifetime.expires {
            cookie = cookie.expires(expires);
        }

        cookie.build()
    }

    /// A cookie that tells the browser to drop `name`.
    pub fn removal(&self, name: &'static str) -> Cookie<'static> {
        let mut cookie = self.build(name, String::new());
        cookie.make_removal();
        cookie
    }
}

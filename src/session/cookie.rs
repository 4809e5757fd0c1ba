use actix_web::cookie::time::{Duration, OffsetDateTime};
use actix_web::cookie::Cookie;
use actix_web::HttpRequest;

use crate::session::codec::DESTROY_SENTINEL;
use crate::session::config::SessionConfig;

/// The single outgoing cookie instruction a handle produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieDirective {
    /// Store a fresh cookie value for `max_age_seconds`
    Set {
        value: String,
        max_age_seconds: i64,
    },
    /// Overwrite the cookie with the sentinel and a past expiry
    Destroy,
}

impl CookieDirective {
    #[must_use]
    pub fn is_destroy(&self) -> bool {
        matches!(self, Self::Destroy)
    }

    /// Cookie value carried by this directive
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Set { value, .. } => value,
            Self::Destroy => DESTROY_SENTINEL,
        }
    }
}

/// Cookie factory for turning directives into `Set-Cookie` cookies
///
/// Supplies attribute values from the normalized config; serialization is
/// left to the `cookie` crate.
#[derive(Clone, Copy)]
pub struct CookieFactory<'a> {
    config: &'a SessionConfig,
}

impl<'a> CookieFactory<'a> {
    #[must_use]
    pub fn new(config: &'a SessionConfig) -> Self {
        Self { config }
    }

    /// Build the cookie for a directive
    #[must_use]
    pub fn build(&self, directive: &CookieDirective) -> Cookie<'static> {
        match directive {
            CookieDirective::Set {
                value,
                max_age_seconds,
            } => self.create_session_cookie(value.clone(), *max_age_seconds),
            CookieDirective::Destroy => self.create_expired_cookie(),
        }
    }

    /// Create a session cookie carrying `value` for `max_age_seconds`
    #[must_use]
    pub fn create_session_cookie(&self, value: String, max_age_seconds: i64) -> Cookie<'static> {
        let mut cookie = self.base_cookie(value);
        cookie.set_max_age(Duration::seconds(max_age_seconds.max(0)));
        cookie
    }

    /// Create an expired cookie to clear the session
    #[must_use]
    pub fn create_expired_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.base_cookie(DESTROY_SENTINEL.to_string());
        cookie.set_expires(OffsetDateTime::UNIX_EPOCH);
        cookie
    }

    fn base_cookie(&self, value: String) -> Cookie<'static> {
        let attributes = self.config.cookie();
        let mut cookie = Cookie::build(self.config.key().to_owned(), value)
            .http_only(attributes.http_only)
            .secure(attributes.secure)
            .same_site(attributes.same_site)
            .path(attributes.path.clone())
            .finish();

        if let Some(domain) = attributes.domain.clone() {
            cookie.set_domain(domain);
        }

        cookie
    }
}

/// Extract the session cookie value from a raw `Cookie` header string
#[must_use]
pub fn extract_from_header(cookie_header: &str, name: &str) -> Option<String> {
    cookie_header
        .split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| Cookie::parse(pair.to_owned()).ok())
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

/// Extract the session cookie value from an incoming request
#[must_use]
pub fn extract_from_request(req: &HttpRequest, name: &str) -> Option<String> {
    req.cookie(name).map(|cookie| cookie.value().to_string())
}

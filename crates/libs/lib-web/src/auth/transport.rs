//! # Transports
//!
//! How an access token travels between client and server.
//!
//! - [`CookieTransport`]: token in an `HttpOnly` session cookie, login answers `204`
//! - [`BearerTransport`]: token in `Authorization: Bearer`, login answers with a JSON body

use axum::{
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use lib_core::dto::BearerResponse;
use tower_cookies::{
    cookie::{time::Duration, SameSite},
    Cookie, Cookies,
};

/// Name of the session cookie.
pub const COOKIE_NAME: &str = "userauth";

/// Login route advertised by the bearer transport.
pub const BEARER_TOKEN_URL: &str = "/auth/bearer/login";

// region: --- Transport

#[derive(Debug, Clone)]
pub enum Transport {
    Cookie(CookieTransport),
    Bearer(BearerTransport),
}

impl Transport {
    /// Token presented by the request, if any.
    pub fn read_token(&self, parts: &Parts) -> Option<String> {
        match self {
            Transport::Cookie(cookie) => cookie.read_token(parts),
            Transport::Bearer(bearer) => bearer.read_token(parts),
        }
    }

    pub fn login_response(&self, cookies: &Cookies, token: String) -> Response {
        match self {
            Transport::Cookie(cookie) => cookie.login_response(cookies, token),
            Transport::Bearer(bearer) => bearer.login_response(token),
        }
    }

    pub fn logout_response(&self, cookies: &Cookies) -> Response {
        match self {
            Transport::Cookie(cookie) => cookie.logout_response(cookies),
            Transport::Bearer(_) => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

// endregion: --- Transport

// region: --- Cookie

/// Session cookie settings.
///
/// No `Max-Age`: the cookie lives for the browser session, the token row
/// decides how long it is honored.
#[derive(Debug, Clone)]
pub struct CookieTransport {
    pub name: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
}

impl CookieTransport {
    pub fn new(name: impl Into<String>, secure: bool) -> Self {
        Self {
            name: name.into(),
            path: "/".to_string(),
            secure,
            http_only: true,
            same_site: SameSite::Lax,
        }
    }

    fn read_token(&self, parts: &Parts) -> Option<String> {
        let cookies = parts.extensions.get::<Cookies>()?;
        cookies
            .get(&self.name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }

    fn cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build((self.name.clone(), value))
            .path(self.path.clone())
            .secure(self.secure)
            .http_only(self.http_only)
            .same_site(self.same_site)
            .build()
    }

    fn login_response(&self, cookies: &Cookies, token: String) -> Response {
        cookies.add(self.cookie(token));
        StatusCode::NO_CONTENT.into_response()
    }

    fn logout_response(&self, cookies: &Cookies) -> Response {
        let mut expired = self.cookie(String::new());
        expired.set_max_age(Duration::ZERO);
        cookies.add(expired);
        StatusCode::NO_CONTENT.into_response()
    }
}

// endregion: --- Cookie

// region: --- Bearer

#[derive(Debug, Clone)]
pub struct BearerTransport {
    pub token_url: String,
}

impl BearerTransport {
    pub fn new(token_url: impl Into<String>) -> Self {
        Self {
            token_url: token_url.into(),
        }
    }

    fn read_token(&self, parts: &Parts) -> Option<String> {
        let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
        let (scheme, token) = value.split_once(' ')?;

        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }

        let token = token.trim();
        (!token.is_empty()).then(|| token.to_string())
    }

    fn login_response(&self, token: String) -> Response {
        Json(BearerResponse {
            access_token: token,
            token_type: "bearer".to_string(),
        })
        .into_response()
    }
}

impl Default for BearerTransport {
    fn default() -> Self {
        Self::new(BEARER_TOKEN_URL)
    }
}

// endregion: --- Bearer

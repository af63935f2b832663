//! Axum extractor for the session credential.

use crate::auth::service::Authenticator;
use crate::auth::token::SessionClaims;
use crate::config::{Config, SESSION_COOKIE};
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::convert::Infallible;
use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<Authenticator>,
    pub config: Arc<Config>,
}

/// The session presented with a request, if any.
///
/// Checks `Authorization: Bearer {token}` first, then the `wg_session`
/// cookie. Never rejects the request: a missing, corrupt, or expired
/// token yields `None`, and handlers decide what that means (the session
/// endpoint answers `authenticated: false`; a protected route would
/// answer 401). The failure kind is logged so operators can tell expiry
/// churn from corruption.
pub struct CurrentSession(pub Option<SessionClaims>);

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = presented_token(parts) else {
            return Ok(CurrentSession(None));
        };

        match state.auth.decode_session(&token) {
            Ok(claims) => Ok(CurrentSession(Some(claims))),
            Err(e) => {
                tracing::debug!(action = "session_rejected", reason = %e, "Presented token rejected");
                Ok(CurrentSession(None))
            }
        }
    }
}

/// Pull the token from the Authorization header or the session cookie.
fn presented_token(parts: &Parts) -> Option<String> {
    if let Some(auth_header) = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }

    parts
        .headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(cookie_value)
}

fn cookie_value(cookie_header: &str) -> Option<String> {
    cookie_header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

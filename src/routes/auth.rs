//! Auth API endpoints.
//!
//! The session credential travels both ways: `verify` sets it as an
//! HttpOnly cookie and echoes it in the body for bearer-header clients.
//! Logout only clears the cookie — the server keeps no session state to
//! delete, so a bearer client logs out by discarding its copy.

use crate::auth::middleware::{AppState, CurrentSession};
use crate::config::SESSION_COOKIE;
use crate::error::AuthError;
use crate::models::{
    ChallengeRequest, ChallengeResponse, SessionResponse, VerifyRequest, VerifyResponse,
};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

/// POST /auth/challenge — issue a challenge message to sign.
pub async fn request_challenge(
    State(state): State<AppState>,
    Json(req): Json<ChallengeRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let issued = state.auth.issue_challenge(&req.address, &req.network)?;

    Ok(Json(ChallengeResponse {
        message: issued.message,
        nonce: issued.nonce,
        expiration_time: issued.expiration_time,
    }))
}

/// POST /auth/verify — verify a signed challenge and establish a session.
pub async fn verify_challenge(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let session = match state.auth.verify(&req.network, &req.message, &req.signature) {
        Ok(session) => session,
        Err(e) => {
            // The code is enough for the client to decide its next step;
            // signature bytes are never logged.
            tracing::warn!(action = "auth_failed", code = e.code(), "Verification failed");
            return Err(e);
        }
    };

    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        SESSION_COOKIE,
        session.token,
        state.auth.session_ttl_secs()
    );

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(VerifyResponse {
            address: session.identity.address,
            network: session.identity.network.to_string(),
            profile_id: session.identity.profile_id,
            expiration_time: session.expires_at,
            token: session.token,
        }),
    ))
}

/// GET /auth/session — decode the presented credential.
///
/// Always 200: an absent or rejected token is `authenticated: false`,
/// prompting re-login, never an error.
pub async fn session(CurrentSession(claims): CurrentSession) -> impl IntoResponse {
    match claims {
        Some(claims) => Json(SessionResponse {
            authenticated: true,
            address: Some(claims.address),
            network: Some(claims.network.to_string()),
            profile_id: Some(claims.profile_id),
            expiration_time: Some(claims.expires_at),
        }),
        None => Json(SessionResponse::unauthenticated()),
    }
}

/// POST /auth/logout — clear the session cookie.
pub async fn logout(CurrentSession(claims): CurrentSession) -> impl IntoResponse {
    if let Some(claims) = claims {
        tracing::info!(action = "logout", profile_id = %claims.profile_id, "Session logged out");
    }

    let cookie = format!("{}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0", SESSION_COOKIE);
    (StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)])
}

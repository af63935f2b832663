//! Error taxonomy and Axum response conversions.
//!
//! Every failure a client can act on carries a stable `code` string so
//! callers can decide whether to request a fresh challenge, re-prompt for a
//! signature, or ask the user to reconnect a wallet. Internal errors are
//! logged server-side and never forwarded verbatim.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failures of the challenge-response protocol.
///
/// `NotFound`/`AlreadyUsed`/`Expired` mean the challenge is gone and the
/// client must request a new one. The verification variants are terminal
/// for the consumed nonce: retrying with the same signed message can only
/// yield `AlreadyUsed`.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("unsupported network: {0}")]
    UnsupportedNetwork(String),

    #[error("malformed message: {0}")]
    MalformedMessage(String),

    #[error("challenge not found")]
    NotFound,

    #[error("challenge already used")]
    AlreadyUsed,

    #[error("challenge expired")]
    Expired,

    #[error("message does not match the issued challenge")]
    TamperedMessage,

    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    #[error("signature verification failed")]
    InvalidSignature,

    #[error("too many pending challenges")]
    Busy,

    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Stable machine-readable code for the wire.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidAddress(_) => "invalid_address",
            AuthError::UnsupportedNetwork(_) => "unsupported_network",
            AuthError::MalformedMessage(_) => "malformed_message",
            AuthError::NotFound => "not_found",
            AuthError::AlreadyUsed => "already_used",
            AuthError::Expired => "expired",
            AuthError::TamperedMessage => "tampered_message",
            AuthError::MalformedSignature(_) => "malformed_signature",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::Busy => "busy",
            AuthError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::Internal(msg) => {
                // Log detailed error server-side, return generic message to client
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AuthError::InvalidAddress(_)
            | AuthError::UnsupportedNetwork(_)
            | AuthError::MalformedMessage(_)
            | AuthError::MalformedSignature(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AuthError::NotFound
            | AuthError::AlreadyUsed
            | AuthError::Expired
            | AuthError::TamperedMessage
            | AuthError::InvalidSignature => (StatusCode::UNAUTHORIZED, self.to_string()),
            AuthError::Busy => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
        };

        let body = Json(json!({
            "code": self.code(),
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Failures when decoding a session token.
///
/// Deliberately coarse: AEAD verification failure, truncation, an unknown
/// network in the claims, and a rotated secret are all just `Corrupt`.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token corrupt")]
    Corrupt,

    #[error("token expired")]
    Expired,

    #[error("token sealing failed")]
    Seal,
}

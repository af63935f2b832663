//! Request and response models for the API.
//!
//! All models use serde for serialization/deserialization. Timestamps are
//! RFC 3339 on the wire (chrono's default serde representation).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Challenge Models
// ============================================================================

/// Request for an authentication challenge.
#[derive(Debug, Deserialize)]
pub struct ChallengeRequest {
    pub address: String,
    pub network: String,
}

/// Response containing the message to sign.
#[derive(Debug, Serialize)]
pub struct ChallengeResponse {
    pub message: String,
    pub nonce: String,
    pub expiration_time: DateTime<Utc>,
}

// ============================================================================
// Verify Models
// ============================================================================

/// Request to verify a signed challenge message.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub message: String,
    pub signature: String, // base64
    pub network: String,
}

/// Response after successful verification.
///
/// The token is also set as an HttpOnly cookie; the body copy is for
/// clients that prefer a bearer header.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub address: String,
    pub network: String,
    pub profile_id: String,
    pub expiration_time: DateTime<Utc>,
    pub token: String,
}

// ============================================================================
// Session Models
// ============================================================================

/// Decoded session claims, or `authenticated: false` when the presented
/// credential is missing, corrupt, or expired.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<DateTime<Utc>>,
}

impl SessionResponse {
    pub fn unauthenticated() -> Self {
        SessionResponse {
            authenticated: false,
            address: None,
            network: None,
            profile_id: None,
            expiration_time: None,
        }
    }
}

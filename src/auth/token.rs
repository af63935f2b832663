//! Session token codec.
//!
//! A token is the AES-256-GCM sealing of the session claims under the
//! server secret: `iv || ciphertext`, base64url-encoded. GCM gives
//! confidentiality and integrity in one pass, so any bit flip — and any
//! token minted under a rotated secret — fails uniformly as `Corrupt`.
//!
//! The IV is 96 bits of fresh randomness per encode. GCM is unforgiving
//! about IV reuse under one key; random IVs keep the birthday bound near
//! 2^48 encodes per key, far beyond a session issuer's lifetime volume.
//!
//! The token carries its own expiration, re-checked against the clock at
//! every decode. The server holds no per-session state: the token is the
//! session.

use crate::auth::network::Network;
use crate::auth::verify::VerifiedIdentity;
use crate::error::TokenError;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

const IV_LENGTH: usize = 12;

/// Claims carried inside a session token, as serialized into the
/// ciphertext. `expires_at` is the session's own lifetime, which may be
/// shorter than the challenge expiration that minted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct TokenClaims {
    address: String,
    network: String,
    profile_id: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// Decoded, validated session claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub address: String,
    pub network: Network,
    pub profile_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Seal a verified identity into a session token.
pub fn encode(
    identity: &VerifiedIdentity,
    expires_at: DateTime<Utc>,
    secret: &[u8; 32],
) -> Result<String, TokenError> {
    let claims = TokenClaims {
        address: identity.address.clone(),
        network: identity.network.as_str().to_string(),
        profile_id: identity.profile_id.clone(),
        issued_at: identity.issued_at,
        expires_at,
    };
    let plaintext = serde_json::to_vec(&claims).map_err(|_| TokenError::Seal)?;

    let cipher = Aes256Gcm::new_from_slice(secret).map_err(|_| TokenError::Seal)?;

    // Fresh random IV per call; never reuse under the same key.
    let mut iv = [0u8; IV_LENGTH];
    rand::rng().fill(&mut iv);
    let nonce = Nonce::from_slice(&iv);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_slice())
        .map_err(|_| TokenError::Seal)?;

    let mut wire = Vec::with_capacity(IV_LENGTH + ciphertext.len());
    wire.extend_from_slice(&iv);
    wire.extend_from_slice(&ciphertext);
    Ok(general_purpose::URL_SAFE_NO_PAD.encode(wire))
}

/// Open a session token and validate its expiration.
///
/// Expiry is only reported for tokens that authenticated successfully;
/// everything else is `Corrupt` with no further detail.
pub fn decode(
    token: &str,
    secret: &[u8; 32],
    now: DateTime<Utc>,
) -> Result<SessionClaims, TokenError> {
    let wire = general_purpose::URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|_| TokenError::Corrupt)?;
    if wire.len() <= IV_LENGTH {
        return Err(TokenError::Corrupt);
    }
    let (iv, ciphertext) = wire.split_at(IV_LENGTH);

    let cipher = Aes256Gcm::new_from_slice(secret).map_err(|_| TokenError::Corrupt)?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map_err(|_| TokenError::Corrupt)?;

    let claims: TokenClaims =
        serde_json::from_slice(&plaintext).map_err(|_| TokenError::Corrupt)?;

    // Networks are revalidated at every step; a token minted for a
    // since-withdrawn network stops authenticating.
    let network: Network = claims.network.parse().map_err(|_| TokenError::Corrupt)?;

    if claims.expires_at <= now {
        return Err(TokenError::Expired);
    }

    Ok(SessionClaims {
        address: claims.address,
        network,
        profile_id: claims.profile_id,
        issued_at: claims.issued_at,
        expires_at: claims.expires_at,
    })
}

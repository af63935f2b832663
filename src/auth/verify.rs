//! Signature verification against a stored challenge.
//!
//! The order of checks matters. The nonce is claimed (and burned) before
//! anything about the signature is examined, so a failed attempt can never
//! be retried with the same challenge. The client-supplied text is then
//! compared byte-for-byte against the message re-composed from the stored
//! challenge — nothing parsed out of the client's copy is trusted beyond
//! locating the nonce.

use crate::auth::challenge::Challenge;
use crate::auth::message;
use crate::auth::network::Network;
use crate::auth::store::{ChallengeStore, ClaimError};
use crate::error::AuthError;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Identity proven by a successful challenge-response round.
///
/// Only produced here and by decoding a session token that was minted
/// from one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub address: String,
    pub network: Network,
    pub profile_id: String,
    pub issued_at: DateTime<Utc>,
    pub expiration_time: DateTime<Utc>,
}

/// Verify a signed challenge message.
///
/// Consumes the challenge on claim; every later failure is terminal for
/// that nonce and the caller must request a fresh challenge.
pub fn verify(
    store: &ChallengeStore,
    network: Network,
    message_text: &str,
    signature_b64: &str,
    now: DateTime<Utc>,
) -> Result<VerifiedIdentity, AuthError> {
    // 1. Parse only to locate the claimed address and nonce.
    let parsed = message::parse(message_text)?;

    // 2. Claim the challenge; burns the nonce whatever happens next.
    let challenge = store
        .claim_and_consume(&parsed.address, network, &parsed.nonce, now)
        .map_err(|e| match e {
            ClaimError::NotFound => AuthError::NotFound,
            ClaimError::AlreadyUsed => AuthError::AlreadyUsed,
            ClaimError::Expired => AuthError::Expired,
        })?;

    // 3. The signed text must be byte-identical to what the server issued.
    //    Catches a client editing statement/domain/expiry while keeping a
    //    valid nonce.
    if message::compose(&challenge) != message_text {
        return Err(AuthError::TamperedMessage);
    }

    // 4–5. Decode the signature, derive the key from the address, verify.
    let signature = network.decode_signature(signature_b64)?;
    let verifying_key = network.verifying_key(&challenge.address)?;
    if !network.verify(&verifying_key, message_text.as_bytes(), &signature) {
        return Err(AuthError::InvalidSignature);
    }

    // 6. Expiration is copied from the challenge, never re-extended.
    Ok(identity_for(&challenge))
}

fn identity_for(challenge: &Challenge) -> VerifiedIdentity {
    VerifiedIdentity {
        address: challenge.address.clone(),
        network: challenge.network,
        profile_id: profile_id(&challenge.address, challenge.network),
        issued_at: challenge.issued_at,
        expiration_time: challenge.expiration_time,
    }
}

/// Deterministic identifier for (address, network), stable across
/// sessions: hex of the first 16 bytes of SHA-256("network:address").
pub fn profile_id(address: &str, network: Network) -> String {
    let mut hasher = Sha256::new();
    hasher.update(network.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(address.as_bytes());
    let digest = hasher.finalize();

    digest[..16].iter().map(|b| format!("{:02x}", b)).collect()
}

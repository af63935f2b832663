//! End-to-end session lifecycle.
//!
//! `Authenticator` ties the challenge store, the verifier, and the token
//! codec together behind the protocol's state transitions:
//!
//! ```text
//! Unauthenticated --issue_challenge--> ChallengeIssued
//! ChallengeIssued --verify ok-------> Authenticated (token minted)
//! ChallengeIssued --verify err------> Unauthenticated (re-issue)
//! Authenticated --token expiry/corrupt/logout--> Unauthenticated
//! ```
//!
//! Logout is client-side discard of the token; with no per-session row on
//! the server there is nothing to delete.
//!
//! All configuration is passed in at construction. Nothing here reads
//! ambient state, so two authenticators with different secrets can coexist
//! in one process (and in tests).

use crate::auth::challenge::Challenge;
use crate::auth::message;
use crate::auth::network::Network;
use crate::auth::store::{ChallengeStore, InsertError};
use crate::auth::token;
use crate::auth::verify::{self, VerifiedIdentity};
use crate::config::Config;
use crate::error::{AuthError, TokenError};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// A freshly issued challenge, ready to hand to the client.
#[derive(Debug, Clone)]
pub struct IssuedChallenge {
    pub message: String,
    pub nonce: String,
    pub expiration_time: DateTime<Utc>,
}

/// Outcome of a successful verification: the proven identity plus the
/// session token encoding it.
#[derive(Debug, Clone)]
pub struct EstablishedSession {
    pub identity: VerifiedIdentity,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct Authenticator {
    config: Arc<Config>,
    store: Arc<ChallengeStore>,
}

impl Authenticator {
    pub fn new(config: Arc<Config>) -> Self {
        let store = Arc::new(ChallengeStore::new(config.max_pending_challenges));
        Authenticator { config, store }
    }

    /// The challenge store, exposed for the background sweep task.
    pub fn store(&self) -> Arc<ChallengeStore> {
        Arc::clone(&self.store)
    }

    /// Issue a challenge for an address on a network.
    ///
    /// The address must decode under the network's addressing scheme and
    /// the network must be supported; both are re-checked at verify and
    /// decode time rather than trusted from this first pass.
    pub fn issue_challenge(
        &self,
        address: &str,
        network_str: &str,
    ) -> Result<IssuedChallenge, AuthError> {
        let network: Network = network_str
            .parse()
            .map_err(|_| AuthError::UnsupportedNetwork(network_str.to_string()))?;
        network.decode_address(address)?;

        let now = Utc::now();

        // Nonce collisions are vanishingly rare at 256 bits, but the store
        // enforces uniqueness among live entries; regenerate on the off
        // chance rather than fail the client.
        let mut challenge = Challenge::new(&self.config, address, network, now);
        loop {
            match self.store.insert(challenge.clone(), now) {
                Ok(()) => break,
                Err(InsertError::DuplicateNonce) => {
                    challenge = Challenge::new(&self.config, address, network, now);
                }
                Err(InsertError::Busy) => return Err(AuthError::Busy),
            }
        }

        tracing::debug!(
            action = "challenge_issued",
            network = %network,
            expiration_time = %challenge.expiration_time,
            "Challenge issued"
        );

        Ok(IssuedChallenge {
            message: message::compose(&challenge),
            nonce: challenge.nonce,
            expiration_time: challenge.expiration_time,
        })
    }

    /// Verify a signed challenge and mint a session token.
    pub fn verify(
        &self,
        network_str: &str,
        message_text: &str,
        signature_b64: &str,
    ) -> Result<EstablishedSession, AuthError> {
        let network: Network = network_str
            .parse()
            .map_err(|_| AuthError::UnsupportedNetwork(network_str.to_string()))?;

        let now = Utc::now();
        let identity = verify::verify(&self.store, network, message_text, signature_b64, now)?;

        // The session may not outlive the challenge window, but a shorter
        // configured session lifetime wins.
        let session_cap = now + Duration::seconds(self.config.session_ttl_secs as i64);
        let expires_at = identity.expiration_time.min(session_cap);

        let token = token::encode(&identity, expires_at, &self.config.secret)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        tracing::info!(
            action = "auth_success",
            network = %network,
            profile_id = %identity.profile_id,
            "Wallet authenticated"
        );

        Ok(EstablishedSession {
            identity,
            token,
            expires_at,
        })
    }

    /// Decode and validate a presented session token.
    pub fn decode_session(&self, token: &str) -> Result<token::SessionClaims, TokenError> {
        token::decode(token, &self.config.secret, Utc::now())
    }

    /// Seconds a newly minted session cookie should live.
    pub fn session_ttl_secs(&self) -> u64 {
        self.config.session_ttl_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_config;
    use base64::{engine::general_purpose, Engine as _};
    use ed25519_dalek::{Signer, SigningKey};

    fn wallet() -> (SigningKey, String) {
        let mut seed = [0u8; 32];
        rand::fill(&mut seed);
        let key = SigningKey::from_bytes(&seed);
        let address = bs58::encode(key.verifying_key().as_bytes()).into_string();
        (key, address)
    }

    fn authenticator() -> Authenticator {
        Authenticator::new(Arc::new(test_config()))
    }

    #[test]
    fn test_full_lifecycle() {
        let auth = authenticator();
        let (key, address) = wallet();

        let issued = auth.issue_challenge(&address, "solana-devnet").unwrap();
        assert!(issued.message.contains(&address));
        assert!(issued.message.contains(&issued.nonce));

        let signature =
            general_purpose::STANDARD.encode(key.sign(issued.message.as_bytes()).to_bytes());
        let session = auth
            .verify("solana-devnet", &issued.message, &signature)
            .unwrap();
        assert_eq!(session.identity.address, address);
        assert!(session.expires_at <= session.identity.expiration_time);

        let claims = auth.decode_session(&session.token).unwrap();
        assert_eq!(claims.address, address);
        assert_eq!(claims.profile_id, session.identity.profile_id);

        // Replay of the same signed message must fail
        assert!(matches!(
            auth.verify("solana-devnet", &issued.message, &signature),
            Err(AuthError::AlreadyUsed)
        ));
    }

    #[test]
    fn test_issue_rejects_bad_inputs() {
        let auth = authenticator();
        let (_, address) = wallet();

        assert!(matches!(
            auth.issue_challenge(&address, "dogecoin"),
            Err(AuthError::UnsupportedNetwork(_))
        ));
        assert!(matches!(
            auth.issue_challenge("not-base58-0OIl", "solana-devnet"),
            Err(AuthError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_verify_rejects_unknown_network() {
        let auth = authenticator();
        assert!(matches!(
            auth.verify("dogecoin", "msg", "sig"),
            Err(AuthError::UnsupportedNetwork(_))
        ));
    }

    #[test]
    fn test_session_ttl_caps_token_lifetime() {
        let mut config = test_config();
        config.challenge_ttl_secs = 300;
        config.session_ttl_secs = 60;
        let auth = Authenticator::new(Arc::new(config));
        let (key, address) = wallet();

        let issued = auth.issue_challenge(&address, "solana-devnet").unwrap();
        let signature =
            general_purpose::STANDARD.encode(key.sign(issued.message.as_bytes()).to_bytes());
        let session = auth
            .verify("solana-devnet", &issued.message, &signature)
            .unwrap();

        assert!(session.expires_at < session.identity.expiration_time);
    }

    #[test]
    fn test_decode_rejects_foreign_token() {
        let auth_a = authenticator();
        let mut config_b = test_config();
        config_b.secret = [9u8; 32];
        let auth_b = Authenticator::new(Arc::new(config_b));
        let (key, address) = wallet();

        let issued = auth_a.issue_challenge(&address, "solana-devnet").unwrap();
        let signature =
            general_purpose::STANDARD.encode(key.sign(issued.message.as_bytes()).to_bytes());
        let session = auth_a
            .verify("solana-devnet", &issued.message, &signature)
            .unwrap();

        assert_eq!(
            auth_b.decode_session(&session.token),
            Err(TokenError::Corrupt)
        );
    }

    #[test]
    fn test_issued_nonces_are_distinct() {
        let auth = authenticator();
        let (_, address) = wallet();
        let a = auth.issue_challenge(&address, "solana-devnet").unwrap();
        let b = auth.issue_challenge(&address, "solana-devnet").unwrap();
        assert_ne!(a.nonce, b.nonce);
    }
}

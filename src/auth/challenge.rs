//! Challenge construction and nonce generation.

use crate::auth::network::Network;
use crate::config::Config;
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// Version tag embedded in every challenge message.
pub const MESSAGE_VERSION: &str = "1";

/// A pending challenge: the structured fields a client must sign, exactly
/// as rendered into the message text.
///
/// Invariant: `issued_at < expiration_time`, both at whole-second
/// precision so the rendered message round-trips without loss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub address: String,
    pub network: Network,
    pub domain: String,
    pub uri: String,
    pub statement: String,
    pub version: String,
    pub nonce: String,
    pub issued_at: DateTime<Utc>,
    pub expiration_time: DateTime<Utc>,
}

impl Challenge {
    /// Build a fresh challenge for an address, binding the configured
    /// domain/URI/statement and a newly generated nonce.
    pub fn new(config: &Config, address: &str, network: Network, now: DateTime<Utc>) -> Self {
        let issued_at = truncate_to_seconds(now);
        Challenge {
            address: address.to_string(),
            network,
            domain: config.domain.clone(),
            uri: config.uri.clone(),
            statement: config.statement.clone(),
            version: MESSAGE_VERSION.to_string(),
            nonce: generate_nonce(),
            issued_at,
            expiration_time: issued_at + Duration::seconds(config.challenge_ttl_secs as i64),
        }
    }
}

/// Generate a cryptographically random challenge nonce.
///
/// 32 random bytes, base64url-encoded without padding (43 characters) so
/// the nonce is safe on a single message line.
pub fn generate_nonce() -> String {
    let mut rng = rand::rng();
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes);
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Drop sub-second precision so timestamps survive the RFC 3339 seconds
/// rendering in the message text byte-for-byte.
pub fn truncate_to_seconds(t: DateTime<Utc>) -> DateTime<Utc> {
    t - Duration::nanoseconds(i64::from(t.timestamp_subsec_nanos()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_generate_nonce() {
        let nonce = generate_nonce();

        // base64url of 32 bytes without padding is 43 characters
        assert_eq!(nonce.len(), 43);

        let decoded = general_purpose::URL_SAFE_NO_PAD.decode(&nonce).unwrap();
        assert_eq!(decoded.len(), 32);
    }

    #[test]
    fn test_nonces_are_unique() {
        let a = generate_nonce();
        let b = generate_nonce();
        assert_ne!(a, b);
    }

    #[test]
    fn test_truncate_to_seconds() {
        let now = Utc::now();
        let truncated = truncate_to_seconds(now);
        assert_eq!(truncated.nanosecond(), 0);
        assert_eq!(truncated.timestamp(), now.timestamp());
    }

    #[test]
    fn test_challenge_window_matches_ttl() {
        let config = crate::auth::test_config();
        let now = Utc::now();
        let challenge = Challenge::new(&config, "addr", Network::SolanaDevnet, now);

        assert!(challenge.issued_at < challenge.expiration_time);
        assert_eq!(
            (challenge.expiration_time - challenge.issued_at).num_seconds(),
            config.challenge_ttl_secs as i64
        );
        assert_eq!(challenge.version, MESSAGE_VERSION);
    }
}

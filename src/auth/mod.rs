//! Wallet challenge-response authentication and stateless sessions.

pub mod challenge;
pub mod message;
pub mod middleware;
pub mod network;
pub mod service;
pub mod store;
pub mod token;
pub mod verify;

pub use challenge::Challenge;
pub use middleware::{AppState, CurrentSession};
pub use network::Network;
pub use service::Authenticator;
pub use token::SessionClaims;
pub use verify::VerifiedIdentity;

/// Baseline configuration used by the unit tests across this module.
#[cfg(test)]
pub(crate) fn test_config() -> crate::config::Config {
    crate::config::Config {
        domain: "example.test".to_string(),
        uri: "https://example.test/auth".to_string(),
        statement: "Sign this message to authenticate.".to_string(),
        secret: [7u8; 32],
        api_key: None,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        challenge_ttl_secs: 300,
        session_ttl_secs: 900,
        max_pending_challenges: 1024,
        sweep_interval_secs: 60,
    }
}

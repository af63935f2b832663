use base64::{engine::general_purpose, Engine as _};
use std::env;
use std::net::SocketAddr;

/// Cookie name under which the session token is set.
pub const SESSION_COOKIE: &str = "wg_session";

#[derive(Clone)]
pub struct Config {
    // Challenge message binding
    pub domain: String,
    pub uri: String,
    pub statement: String,

    // Token encryption key (AES-256-GCM)
    pub secret: [u8; 32],

    // Optional key for a delegated address-validation service
    pub api_key: Option<String>,

    // Server
    pub bind_addr: SocketAddr,

    // TTLs (in seconds)
    pub challenge_ttl_secs: u64,
    pub session_ttl_secs: u64,

    // Limits
    pub max_pending_challenges: usize,
    pub sweep_interval_secs: u64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("domain", &self.domain)
            .field("uri", &self.uri)
            .field("statement", &self.statement)
            .field("secret", &"[REDACTED]")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("bind_addr", &self.bind_addr)
            .field("challenge_ttl_secs", &self.challenge_ttl_secs)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("max_pending_challenges", &self.max_pending_challenges)
            .field("sweep_interval_secs", &self.sweep_interval_secs)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("Failed to parse {0}: {1}")]
    ParseError(String, String),
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Fails fast: a missing or malformed `WG_SECRET`, `WG_DOMAIN`, or
    /// `WG_URI` is fatal and the process must not serve requests.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Attempt to load .env file, but don't fail if it doesn't exist
        // (env vars may be set directly in production)
        let _ = dotenvy::dotenv();

        let domain =
            env::var("WG_DOMAIN").map_err(|_| ConfigError::MissingVar("WG_DOMAIN".to_string()))?;
        validate_single_token("WG_DOMAIN", &domain)?;

        let uri = env::var("WG_URI").map_err(|_| ConfigError::MissingVar("WG_URI".to_string()))?;
        validate_single_token("WG_URI", &uri)?;

        let statement = env::var("WG_STATEMENT")
            .unwrap_or_else(|_| "Sign this message to authenticate.".to_string());
        if statement.is_empty() || statement.contains('\n') {
            return Err(ConfigError::InvalidValue(
                "WG_STATEMENT".to_string(),
                "must be a non-empty single line".to_string(),
            ));
        }

        let secret_b64 =
            env::var("WG_SECRET").map_err(|_| ConfigError::MissingVar("WG_SECRET".to_string()))?;
        let secret = decode_secret(&secret_b64)?;

        let api_key = env::var("WG_API_KEY").ok().filter(|k| !k.is_empty());

        let bind_addr = env::var("WG_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::ParseError("WG_BIND_ADDR".to_string(), e.to_string()))?;

        let challenge_ttl_secs = parse_env_u64("WG_CHALLENGE_TTL_SECS", 300)?;
        let session_ttl_secs = parse_env_u64("WG_SESSION_TTL_SECS", 900)?;
        let max_pending_challenges = parse_env_u64("WG_MAX_PENDING_CHALLENGES", 10_000)? as usize;
        let sweep_interval_secs = parse_env_u64("WG_SWEEP_INTERVAL_SECS", 60)?;

        if challenge_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "WG_CHALLENGE_TTL_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        if session_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "WG_SESSION_TTL_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Config {
            domain,
            uri,
            statement,
            secret,
            api_key,
            bind_addr,
            challenge_ttl_secs,
            session_ttl_secs,
            max_pending_challenges,
            sweep_interval_secs,
        })
    }
}

/// Decode and validate the token encryption key.
///
/// Must be standard base64 decoding to exactly 32 bytes.
pub(crate) fn decode_secret(secret_b64: &str) -> Result<[u8; 32], ConfigError> {
    let bytes = general_purpose::STANDARD.decode(secret_b64).map_err(|e| {
        ConfigError::InvalidValue("WG_SECRET".to_string(), format!("invalid base64: {}", e))
    })?;

    bytes.try_into().map_err(|_| {
        ConfigError::InvalidValue(
            "WG_SECRET".to_string(),
            "must decode to exactly 32 bytes".to_string(),
        )
    })
}

/// Domain and URI are embedded verbatim into the challenge message grammar;
/// whitespace would make the message ambiguous.
fn validate_single_token(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidValue(
            name.to_string(),
            "must be non-empty and contain no whitespace".to_string(),
        ));
    }
    Ok(())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(val) => val
            .parse::<u64>()
            .map_err(|e| ConfigError::ParseError(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_secret_valid() {
        let key = general_purpose::STANDARD.encode([7u8; 32]);
        let decoded = decode_secret(&key).unwrap();
        assert_eq!(decoded, [7u8; 32]);
    }

    #[test]
    fn test_decode_secret_wrong_length() {
        let key = general_purpose::STANDARD.encode([7u8; 16]);
        assert!(decode_secret(&key).is_err());
    }

    #[test]
    fn test_decode_secret_not_base64() {
        assert!(decode_secret("not base64!!!").is_err());
    }

    #[test]
    fn test_validate_single_token() {
        assert!(validate_single_token("WG_DOMAIN", "example.test").is_ok());
        assert!(validate_single_token("WG_DOMAIN", "").is_err());
        assert!(validate_single_token("WG_DOMAIN", "two words").is_err());
        assert!(validate_single_token("WG_DOMAIN", "line\nbreak").is_err());
    }
}

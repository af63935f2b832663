//! Canonical challenge message text.
//!
//! `compose` renders a [`Challenge`] into the exact text the wallet signs;
//! `parse` is its left inverse (`parse(compose(c)) == c` for every valid
//! challenge). The grammar is line-oriented and unambiguous:
//!
//! ```text
//! {domain} wants you to sign in with your wallet:
//! {address}
//!
//! {statement}
//!
//! URI: {uri}
//! Version: 1
//! Network: {network}
//! Nonce: {nonce}
//! Issued At: {issued_at}
//! Expiration Time: {expiration_time}
//! ```
//!
//! Parsing is used only to locate the nonce for the store lookup; every
//! security-relevant decision compares the client-supplied text against
//! the message re-composed from the server's own stored challenge.

use crate::auth::challenge::Challenge;
use crate::auth::network::Network;
use crate::error::AuthError;
use chrono::{DateTime, SecondsFormat, Utc};

const GREETING_SUFFIX: &str = " wants you to sign in with your wallet:";
const URI_PREFIX: &str = "URI: ";
const VERSION_PREFIX: &str = "Version: ";
const NETWORK_PREFIX: &str = "Network: ";
const NONCE_PREFIX: &str = "Nonce: ";
const ISSUED_AT_PREFIX: &str = "Issued At: ";
const EXPIRATION_PREFIX: &str = "Expiration Time: ";

/// Render a challenge into its canonical message text.
///
/// Total over valid challenges (single-line fields, whole-second
/// timestamps); the same fields always produce the same bytes.
pub fn compose(challenge: &Challenge) -> String {
    format!(
        "{domain}{greeting}\n\
         {address}\n\
         \n\
         {statement}\n\
         \n\
         {uri_prefix}{uri}\n\
         {version_prefix}{version}\n\
         {network_prefix}{network}\n\
         {nonce_prefix}{nonce}\n\
         {issued_prefix}{issued}\n\
         {expiration_prefix}{expiration}",
        domain = challenge.domain,
        greeting = GREETING_SUFFIX,
        address = challenge.address,
        statement = challenge.statement,
        uri_prefix = URI_PREFIX,
        uri = challenge.uri,
        version_prefix = VERSION_PREFIX,
        version = challenge.version,
        network_prefix = NETWORK_PREFIX,
        network = challenge.network,
        nonce_prefix = NONCE_PREFIX,
        nonce = challenge.nonce,
        issued_prefix = ISSUED_AT_PREFIX,
        issued = render_timestamp(challenge.issued_at),
        expiration_prefix = EXPIRATION_PREFIX,
        expiration = render_timestamp(challenge.expiration_time),
    )
}

/// Parse message text back into its structured fields.
///
/// Strictly structural: the grammar must match line for line, but no
/// cross-field checks happen here (the verifier compares against the
/// stored challenge instead).
pub fn parse(message: &str) -> Result<Challenge, AuthError> {
    let lines: Vec<&str> = message.split('\n').collect();
    if lines.len() != 11 {
        return Err(AuthError::MalformedMessage(format!(
            "expected 11 lines, got {}",
            lines.len()
        )));
    }

    let domain = lines[0]
        .strip_suffix(GREETING_SUFFIX)
        .ok_or_else(|| AuthError::MalformedMessage("missing sign-in greeting".to_string()))?;
    if domain.is_empty() {
        return Err(AuthError::MalformedMessage("empty domain".to_string()));
    }

    let address = lines[1];
    if address.is_empty() {
        return Err(AuthError::MalformedMessage("empty address".to_string()));
    }

    if !lines[2].is_empty() || !lines[4].is_empty() {
        return Err(AuthError::MalformedMessage(
            "missing blank separator lines".to_string(),
        ));
    }

    let statement = lines[3];
    if statement.is_empty() {
        return Err(AuthError::MalformedMessage("empty statement".to_string()));
    }

    let uri = expect_field(lines[5], URI_PREFIX)?;
    let version = expect_field(lines[6], VERSION_PREFIX)?;
    let network_str = expect_field(lines[7], NETWORK_PREFIX)?;
    let nonce = expect_field(lines[8], NONCE_PREFIX)?;
    let issued_str = expect_field(lines[9], ISSUED_AT_PREFIX)?;
    let expiration_str = expect_field(lines[10], EXPIRATION_PREFIX)?;

    let network: Network = network_str
        .parse()
        .map_err(|e: String| AuthError::MalformedMessage(e))?;
    let issued_at = parse_timestamp(issued_str)?;
    let expiration_time = parse_timestamp(expiration_str)?;

    Ok(Challenge {
        address: address.to_string(),
        network,
        domain: domain.to_string(),
        uri: uri.to_string(),
        statement: statement.to_string(),
        version: version.to_string(),
        nonce: nonce.to_string(),
        issued_at,
        expiration_time,
    })
}

fn expect_field<'a>(line: &'a str, prefix: &str) -> Result<&'a str, AuthError> {
    let value = line.strip_prefix(prefix).ok_or_else(|| {
        AuthError::MalformedMessage(format!("expected line starting with {:?}", prefix.trim_end()))
    })?;
    if value.is_empty() {
        return Err(AuthError::MalformedMessage(format!(
            "empty value for {:?}",
            prefix.trim_end()
        )));
    }
    Ok(value)
}

fn render_timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, AuthError> {
    let parsed = DateTime::parse_from_rfc3339(s)
        .map_err(|e| AuthError::MalformedMessage(format!("bad timestamp: {}", e)))?;
    Ok(parsed.with_timezone(&Utc))
}

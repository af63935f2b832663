//! Supported networks and their signature schemes.
//!
//! A network names two capabilities: how an address decodes to a verifying
//! key, and which signature algorithm checks a signature over message
//! bytes. Keeping both on the enum means adding a differently-schemed
//! network touches this file only, instead of scattering branches through
//! the verifier.
//!
//! All three Solana clusters share Ed25519 with base58 addresses; they are
//! distinct networks so a challenge issued for devnet can never be replayed
//! against mainnet.

use crate::error::AuthError;
use base64::{engine::general_purpose, Engine as _};
use ed25519_dalek::{Signature, VerifyingKey};

/// Networks a client may authenticate against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    SolanaMainnet,
    SolanaDevnet,
    SolanaTestnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::SolanaMainnet => "solana-mainnet",
            Network::SolanaDevnet => "solana-devnet",
            Network::SolanaTestnet => "solana-testnet",
        }
    }

    /// Decode an address into raw public key bytes.
    ///
    /// Solana addresses are the base58 encoding of the 32-byte Ed25519
    /// public key, so this is a direct decode. Used as the address format
    /// check at challenge issuance as well.
    pub fn decode_address(&self, address: &str) -> Result<[u8; 32], AuthError> {
        let bytes = bs58::decode(address)
            .into_vec()
            .map_err(|e| AuthError::InvalidAddress(format!("invalid base58: {}", e)))?;

        bytes.try_into().map_err(|v: Vec<u8>| {
            AuthError::InvalidAddress(format!("expected 32 bytes, got {}", v.len()))
        })
    }

    /// Derive the verifying key for an address.
    ///
    /// Fails if the bytes are not a valid curve point; such an address can
    /// never have produced a signature.
    pub fn verifying_key(&self, address: &str) -> Result<VerifyingKey, AuthError> {
        let bytes = self.decode_address(address)?;
        VerifyingKey::from_bytes(&bytes)
            .map_err(|_| AuthError::InvalidAddress("not a valid public key".to_string()))
    }

    /// Decode a signature from its wire encoding (base64, 64 bytes).
    pub fn decode_signature(&self, signature_b64: &str) -> Result<Signature, AuthError> {
        let bytes = general_purpose::STANDARD
            .decode(signature_b64)
            .map_err(|e| AuthError::MalformedSignature(format!("invalid base64: {}", e)))?;

        let array: [u8; 64] = bytes.try_into().map_err(|v: Vec<u8>| {
            AuthError::MalformedSignature(format!("expected 64 bytes, got {}", v.len()))
        })?;

        Ok(Signature::from_bytes(&array))
    }

    /// Verify a signature over the exact message bytes.
    ///
    /// Strict verification: edge-case signatures that lenient Ed25519
    /// implementations accept are rejected here.
    pub fn verify(&self, key: &VerifyingKey, message: &[u8], signature: &Signature) -> bool {
        match self {
            Network::SolanaMainnet | Network::SolanaDevnet | Network::SolanaTestnet => {
                key.verify_strict(message, signature).is_ok()
            }
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solana-mainnet" => Ok(Network::SolanaMainnet),
            "solana-devnet" => Ok(Network::SolanaDevnet),
            "solana-testnet" => Ok(Network::SolanaTestnet),
            _ => Err(format!("Unsupported network: {}", s)),
        }
    }
}

//! # Core Domain Entities
//!
//! Value types for the credits client.
//!
//! ## Clusters
//!
//! - **Identity**: `Account`
//! - **Payments**: `TokenAmount` (U256, 6-decimal payment token units)
//! - **Requests**: `RequestId`, `RequestKind`
//! - **Records**: `RecordId`, `ContentRef`

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

// Re-export U256 from primitive-types for use across all subsystems
pub use primitive_types::U256;

/// Payment-token amount in base units (6 decimals for the USDC-style token).
pub type TokenAmount = U256;

/// Ledger-assigned identifier of a minted routine record.
pub type RecordId = u64;

/// A 20-byte Ethereum-style account or contract address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Account(pub [u8; 20]);

impl Account {
    /// Create an account from raw address bytes.
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Raw address bytes.
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Parse a `0x`-prefixed hex address.
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).ok()?;
        let bytes: [u8; 20] = bytes.try_into().ok()?;
        Some(Self(bytes))
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Account({self})")
    }
}

/// Identifier of a submitted ledger request (transaction hash).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct RequestId(pub [u8; 32]);

impl RequestId {
    /// Derive a request id from the submitting account and a nonce.
    pub fn derive(account: Account, nonce: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(account.as_bytes());
        hasher.update(nonce.to_le_bytes());
        let digest = hasher.finalize();
        let mut id = [0u8; 32];
        id.copy_from_slice(&digest);
        Self(id)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is enough for logs; full bytes stay available via Debug.
        write!(f, "0x{}…", hex::encode(&self.0[..4]))
    }
}

impl fmt::Debug for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RequestId(0x{})", hex::encode(self.0))
    }
}

/// The kind of state-changing request a controller can have in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    /// Grant the credits contract a spending cap on the payment token.
    Authorize,
    /// Buy upload credits through the previously granted allowance.
    Purchase,
    /// Claim the one-time free credit grant.
    Claim,
    /// Mint a routine record.
    Mint,
}

impl RequestKind {
    /// Human-readable label for progress display.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Authorize => "authorize spending cap",
            Self::Purchase => "purchase credits",
            Self::Claim => "claim free credits",
            Self::Mint => "mint routine record",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Opaque reference to a privately stored payload.
///
/// Only the reference travels with the public record; the payload itself is
/// retrievable solely through the ledger's access-control primitives.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ContentRef(String);

impl ContentRef {
    /// Derive a reference over a private payload.
    pub fn derive(payload: &[u8]) -> Self {
        let digest = Sha256::digest(payload);
        Self(format!("sha256:{}", hex::encode(digest)))
    }

    /// The reference string as stored on the ledger.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current unix timestamp in seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

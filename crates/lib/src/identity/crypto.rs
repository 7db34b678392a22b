//! Cryptographic helpers for the identity service
//!
//! Provides:
//! - SHA-256 password digests, compared in constant time
//! - Session tokens drawn from the operating system CSPRNG

use std::fmt;

use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::constants::{DIGEST_LENGTH, TOKEN_BYTES};

/// Fixed-length one-way digest of a password.
///
/// The digest is deterministic: the same password always yields the same
/// digest. It is only ever compared, never reversed or returned to callers.
/// Serializes as a lowercase hex string.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest([u8; DIGEST_LENGTH]);

impl PasswordDigest {
    /// Build a digest from raw bytes, e.g. when decoding a stored record.
    pub fn from_bytes(bytes: [u8; DIGEST_LENGTH]) -> Self {
        Self(bytes)
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LENGTH] {
        &self.0
    }

    /// Check `password` against this digest.
    ///
    /// Always compares the full digest so the time taken does not depend on
    /// where the first mismatching byte is.
    pub fn verify(&self, password: impl AsRef<str>) -> bool {
        constant_time_eq(&self.0, digest_password(password).as_bytes())
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}

impl Serialize for PasswordDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for PasswordDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        let bytes = hex::decode(&encoded).map_err(serde::de::Error::custom)?;
        let bytes: [u8; DIGEST_LENGTH] = bytes.try_into().map_err(|b: Vec<u8>| {
            serde::de::Error::custom(format!(
                "password digest must be {DIGEST_LENGTH} bytes, got {}",
                b.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

/// Hash a password with SHA-256.
pub fn digest_password(password: impl AsRef<str>) -> PasswordDigest {
    let mut bytes = [0u8; DIGEST_LENGTH];
    bytes.copy_from_slice(&Sha256::digest(password.as_ref().as_bytes()));
    PasswordDigest(bytes)
}

/// Generate a new session token: 128 random bits from the OS, hex encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

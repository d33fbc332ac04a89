//! SHA-1 hashing of plaintext values into the upper-case hex form used as both
//! the cache key and the source of the anonymized range prefix.

use std::fmt;
use std::str::FromStr;

use sha1::{Digest, Sha1};

use crate::{DIGEST_LEN, Error, HEX_CHARS, PREFIX_LEN};

/// Upper-case hex SHA-1 digest, stored inline as 40 ASCII bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sha1Hex([u8; DIGEST_LEN]);

/// Hashes `value` and renders the digest as 40 upper-case hex characters.
///
/// Total and deterministic; rejecting empty values is left to the caller.
pub fn digest(value: &str) -> Sha1Hex {
    let mut hasher = Sha1::new();
    hasher.update(value.as_bytes());
    let hash: [u8; 20] = hasher.finalize().into();
    Sha1Hex::from_bytes(&hash)
}

impl Sha1Hex {
    /// Renders a raw 20-byte SHA-1 hash as hex.
    #[inline]
    pub fn from_bytes(hash: &[u8; 20]) -> Self {
        let mut hex = [0u8; DIGEST_LEN];
        for (i, byte) in hash.iter().enumerate() {
            hex[i * 2] = HEX_CHARS[(byte >> 4) as usize];
            hex[i * 2 + 1] = HEX_CHARS[(byte & 0x0f) as usize];
        }
        Self(hex)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        // SAFETY: bytes come from HEX_CHARS or were validated as ASCII hex in from_str.
        unsafe { std::str::from_utf8_unchecked(&self.0) }
    }

    /// The 5 characters sent to the range API.
    #[inline]
    pub fn prefix(&self) -> &str {
        &self.as_str()[..PREFIX_LEN]
    }

    /// The 35 characters that never leave the process.
    #[inline]
    pub fn suffix(&self) -> &str {
        &self.as_str()[PREFIX_LEN..]
    }

    /// Splits into `(prefix, suffix)`; the two halves concatenate back to the digest.
    #[inline]
    pub fn split(&self) -> (&str, &str) {
        self.as_str().split_at(PREFIX_LEN)
    }
}

impl FromStr for Sha1Hex {
    type Err = Error;

    /// Parses a 40 character hex digest in either case, normalizing to upper-case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != DIGEST_LEN || !bytes.iter().all(u8::is_ascii_hexdigit) {
            return Err(Error::InvalidDigest(s.to_string()));
        }

        let mut hex = [0u8; DIGEST_LEN];
        for (dst, src) in hex.iter_mut().zip(bytes) {
            *dst = src.to_ascii_uppercase();
        }
        Ok(Self(hex))
    }
}

impl fmt::Display for Sha1Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Sha1Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Sha1Hex").field(&self.as_str()).finish()
    }
}

impl AsRef<str> for Sha1Hex {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

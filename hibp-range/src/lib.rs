//! Breached password checker using the Have I Been Pwned range API.
//!
//! This library checks whether a secret has appeared in a breach corpus without
//! ever sending the secret, or even its full hash, over the network. The value is
//! SHA-1 hashed locally, only the first five hex characters of the digest are sent
//! to `GET /range/{prefix}`, and the returned `SUFFIX:COUNT` lines are scanned
//! locally for the remaining 35 characters.
//!
//! Verdicts are cached per digest for a fixed time-to-live (two hours by default)
//! so repeated checks of the same value never hit the network twice inside that
//! window. The cache is an owned, lock-guarded value that can be shared between
//! clients through an [`Arc`](std::sync::Arc).
//!
//! # Example
//!
//! ```no_run
//! use hibp_range::RangeClient;
//!
//! fn main() -> Result<(), hibp_range::Error> {
//!     let client = RangeClient::from_env()?;
//!     let verdict = client.check_compromised("p@ssword")?;
//!     if verdict.compromised {
//!         println!("seen {} times in breaches", verdict.occurrences);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod client;
pub mod clock;
pub mod config;
pub mod digest;
pub mod error;
pub mod response;
pub mod transport;

pub use cache::{Cache, CacheRecord, PURGE_INTERVAL};
pub use client::{RangeClient, Verdict};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    ClientConfig, DEFAULT_BASE_URL, DEFAULT_CACHE_TTL, DEFAULT_USER_AGENT, HIBP_API_URL_ENV,
    HIBP_USER_AGENT_ENV,
};
pub use digest::{Sha1Hex, digest};
pub use error::Error;
pub use response::{RangeEntry, find_suffix};
pub use transport::{HttpTransport, Transport};

/// Length of a hex-encoded SHA-1 digest.
pub const DIGEST_LEN: usize = 40;

/// Length of the digest prefix sent to the range API (5 hex characters).
pub const PREFIX_LEN: usize = 5;

/// Length of the digest suffix matched locally against the range response.
pub const SUFFIX_LEN: usize = DIGEST_LEN - PREFIX_LEN;

/// Hex lookup table for digest rendering.
pub const HEX_CHARS: &[u8; 16] = b"0123456789ABCDEF";

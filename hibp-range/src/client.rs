//! Range lookups with a cache in front of the transport.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::Error;
use crate::cache::Cache;
use crate::config::ClientConfig;
use crate::digest::{Sha1Hex, digest};
use crate::response::find_suffix;
use crate::transport::{HttpTransport, Transport};

/// Outcome of a compromise check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub compromised: bool,
    /// Times the value appeared in the breach corpus. Zero when not compromised,
    /// or when answered from a cache record that carries no count.
    pub occurrences: u64,
    /// Whether the answer came from the cache rather than the network.
    pub cached: bool,
}

/// Checks values against the range API, caching verdicts per digest.
///
/// Only the first five characters of the digest are ever sent over the
/// transport. Failed lookups are never cached, so retrying after an error
/// always goes back to the network.
///
/// The cache sweeps expired records every [`PURGE_INTERVAL`](crate::PURGE_INTERVAL)
/// stores. Long-lived callers with bursty traffic can also call
/// `cache().purge_expired()` from their own housekeeping.
#[derive(Debug)]
pub struct RangeClient<T = HttpTransport> {
    transport: T,
    cache: Arc<Cache>,
}

impl RangeClient<HttpTransport> {
    /// Client for the public API with default settings.
    pub fn new() -> Result<Self, Error> {
        Self::from_config(&ClientConfig::default())
    }

    /// Client configured from the HIBP_API_URL and HIBP_USER_AGENT environment
    /// variables.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_config(&ClientConfig::from_env())
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, Error> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::with_transport(transport, config.cache_ttl))
    }
}

impl<T: Transport> RangeClient<T> {
    /// Creates a client with its own cache.
    pub fn with_transport(transport: T, cache_ttl: Duration) -> Self {
        Self::with_cache(transport, Arc::new(Cache::new(cache_ttl)))
    }

    /// Creates a client that shares `cache` with whoever else holds it.
    pub fn with_cache(transport: T, cache: Arc<Cache>) -> Self {
        Self { transport, cache }
    }

    pub fn cache(&self) -> &Arc<Cache> {
        &self.cache
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Checks whether `value` appears in the breach corpus.
    ///
    /// Empty values are rejected before any cache or network activity.
    pub fn check_compromised(&self, value: &str) -> Result<Verdict, Error> {
        if value.is_empty() {
            return Err(Error::EmptyValue);
        }
        self.check_digest(&digest(value))
    }

    /// Like [`RangeClient::check_compromised`] for a value that is already hashed.
    pub fn check_digest(&self, hash: &Sha1Hex) -> Result<Verdict, Error> {
        if let Some(record) = self.cache.get(hash) {
            debug!(prefix = hash.prefix(), "cache hit");
            return Ok(Verdict {
                compromised: record.compromised,
                occurrences: record.occurrences.unwrap_or(0),
                cached: true,
            });
        }

        let (prefix, suffix) = hash.split();
        debug!(prefix, "cache miss, querying range");

        let body = self.transport.get(&format!("range/{prefix}"))?;

        let verdict = match find_suffix(&body, suffix) {
            Ok(Some(occurrences)) => Verdict { compromised: true, occurrences, cached: false },
            Ok(None) => Verdict { compromised: false, occurrences: 0, cached: false },
            Err(e) => {
                warn!(prefix, error = %e, "malformed range response");
                return Err(e);
            }
        };

        self.cache.store_with_count(hash, verdict.compromised, verdict.occurrences);
        Ok(verdict)
    }

    /// Returns only the compromised flag.
    pub fn compromised(&self, value: &str) -> Result<bool, Error> {
        self.check_compromised(value).map(|v| v.compromised)
    }

    /// Returns the compromised flag together with the occurrence count.
    pub fn compromised_count(&self, value: &str) -> Result<(bool, u64), Error> {
        self.check_compromised(value).map(|v| (v.compromised, v.occurrences))
    }
}

#[cfg(feature = "tokio")]
impl<T: Transport + 'static> RangeClient<T> {
    /// Runs [`RangeClient::check_compromised`] on tokio's blocking pool.
    ///
    /// With [`HttpTransport`] the client owns a `reqwest::blocking::Client`,
    /// which panics if it is created or dropped on an async worker thread.
    /// Build the client before entering the runtime (or inside
    /// `spawn_blocking`) and make sure the last `Arc` is not dropped from
    /// async code, e.g. keep it alive past `block_on`.
    pub async fn check_compromised_async(self: &Arc<Self>, value: &str) -> Result<Verdict, Error> {
        if value.is_empty() {
            return Err(Error::EmptyValue);
        }
        let client = Arc::clone(self);
        let value = value.to_owned();
        tokio::task::spawn_blocking(move || client.check_compromised(&value)).await?
    }
}

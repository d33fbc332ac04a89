//! In-memory verdict cache with a fixed time-to-live.
//!
//! Records are keyed by the full digest. A record older than the TTL is
//! treated exactly like a missing one: [`Cache::get`] never hands out a stale
//! verdict, it reports a miss and leaves the record in place until it is
//! overwritten, invalidated, or purged. Every [`PURGE_INTERVAL`] stores the
//! cache sweeps out expired records itself, so a long-running process does not
//! accumulate verdicts for digests it never asks about again.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::config::DEFAULT_CACHE_TTL;
use crate::digest::Sha1Hex;

/// Number of stores between automatic sweeps of expired records.
pub const PURGE_INTERVAL: u64 = 1024;

/// A cached verdict for one digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheRecord {
    pub digest: Sha1Hex,
    pub compromised: bool,
    /// Occurrence count from the range response, if it was recorded.
    pub occurrences: Option<u64>,
    pub updated_at: DateTime<Utc>,
}

/// Digest to verdict map guarded by a single mutex.
pub struct Cache {
    records: Mutex<HashMap<Sha1Hex, CacheRecord>>,
    ttl: Duration,
    ttl_delta: TimeDelta,
    clock: Arc<dyn Clock>,
    stores: AtomicU64,
}

impl Cache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Creates a cache that stamps and expires records using `clock`.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            ttl,
            ttl_delta: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            clock,
            stores: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the record for `digest` if present and not expired.
    pub fn get(&self, digest: &Sha1Hex) -> Option<CacheRecord> {
        let now = self.clock.now();
        let records = self.records.lock();
        records
            .get(digest)
            .filter(|record| !self.is_stale(record, now))
            .copied()
    }

    /// Returns the record for `digest` whether or not it has expired.
    pub fn get_raw(&self, digest: &Sha1Hex) -> Option<CacheRecord> {
        self.records.lock().get(digest).copied()
    }

    /// Inserts or overwrites the verdict for `digest`, stamped with the current time.
    pub fn store(&self, digest: &Sha1Hex, compromised: bool) {
        self.insert(digest, compromised, None);
    }

    /// Like [`Cache::store`], but also records the occurrence count.
    pub fn store_with_count(&self, digest: &Sha1Hex, compromised: bool, occurrences: u64) {
        self.insert(digest, compromised, Some(occurrences));
    }

    fn insert(&self, digest: &Sha1Hex, compromised: bool, occurrences: Option<u64>) {
        let now = self.clock.now();
        let record = CacheRecord { digest: *digest, compromised, occurrences, updated_at: now };

        let mut records = self.records.lock();
        records.insert(*digest, record);
        debug!(prefix = digest.prefix(), compromised, "stored verdict");

        if (self.stores.fetch_add(1, Ordering::Relaxed) + 1) % PURGE_INTERVAL == 0 {
            let before = records.len();
            records.retain(|_, record| !self.is_stale(record, now));
            debug!(purged = before - records.len(), "swept expired verdicts");
        }
    }

    /// True if there is no record for `digest` or its `updated_at + ttl` is
    /// strictly before now.
    pub fn is_expired(&self, digest: &Sha1Hex) -> bool {
        self.get(digest).is_none()
    }

    /// Removes the record for `digest`. No-op if absent.
    pub fn invalidate(&self, digest: &Sha1Hex) {
        if self.records.lock().remove(digest).is_some() {
            debug!(prefix = digest.prefix(), "invalidated verdict");
        }
    }

    /// Removes every record.
    pub fn invalidate_all(&self) {
        let mut records = self.records.lock();
        let flushed = records.len();
        records.clear();
        debug!(flushed, "invalidated all verdicts");
    }

    /// Drops expired records, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|_, record| !self.is_stale(record, now));
        let purged = before - records.len();
        if purged > 0 {
            debug!(purged, "purged expired verdicts");
        }
        purged
    }

    /// Number of records held, expired ones included.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    #[inline]
    fn is_stale(&self, record: &CacheRecord, now: DateTime<Utc>) -> bool {
        match record.updated_at.checked_add_signed(self.ttl_delta) {
            Some(expires_at) => expires_at < now,
            // Past the representable range: never expires.
            None => false,
        }
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("ttl", &self.ttl)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

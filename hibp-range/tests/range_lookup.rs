use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, TimeDelta};
use hibp_range::{
    Cache, Clock, DEFAULT_CACHE_TTL, Error, ManualClock, RangeClient, Transport, Verdict, digest,
};
use parking_lot::Mutex;

/// Stub range API that serves a canned reply and counts requests.
struct StubTransport {
    reply: Mutex<Reply>,
    calls: AtomicUsize,
}

#[derive(Clone)]
enum Reply {
    Body(String),
    Status(u16),
}

impl StubTransport {
    fn body(body: impl Into<String>) -> Arc<Self> {
        Arc::new(Self { reply: Mutex::new(Reply::Body(body.into())), calls: AtomicUsize::new(0) })
    }

    fn status(status: u16) -> Arc<Self> {
        Arc::new(Self { reply: Mutex::new(Reply::Status(status)), calls: AtomicUsize::new(0) })
    }

    fn set_reply(&self, reply: Reply) {
        *self.reply.lock() = reply;
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transport for StubTransport {
    fn get(&self, path: &str) -> Result<String, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply.lock().clone() {
            Reply::Body(body) => Ok(body),
            Reply::Status(status) => Err(Error::HttpStatus { path: path.to_string(), status }),
        }
    }
}

fn client_for(transport: &Arc<StubTransport>) -> RangeClient<Arc<StubTransport>> {
    RangeClient::with_transport(Arc::clone(transport), DEFAULT_CACHE_TTL)
}

fn client_with_clock(
    transport: &Arc<StubTransport>,
) -> (RangeClient<Arc<StubTransport>>, Arc<ManualClock>) {
    let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
    let clock = Arc::new(ManualClock::new(start));
    let cache = Arc::new(Cache::with_clock(DEFAULT_CACHE_TTL, clock.clone()));
    (RangeClient::with_cache(Arc::clone(transport), cache), clock)
}

/// A response line carrying the suffix of `value`'s digest.
fn line_for(value: &str, count: &str) -> String {
    format!("{}:{}", digest(value).suffix(), count)
}

/// A realistic-looking range body with `extra` spliced in the middle.
fn range_body(extra: &str) -> String {
    [
        "0018A45C4D1DEF81644B54AB7F969B88D65:1",
        "00D4F6E8FA6EECAD2A3AA415EEC418D38EC:2",
        extra,
        "011053FD0102E94D6AE2F8B83D76FAF94F6:13",
    ]
    .join("\r\n")
}

#[test]
fn test_empty_value_is_rejected_without_side_effects() {
    let transport = StubTransport::body("");
    let client = client_for(&transport);

    let err = client.check_compromised("").unwrap_err();
    assert!(matches!(err, Error::EmptyValue));
    assert!(err.is_validation());
    assert_eq!(err.to_string(), "value for compromised check cannot be empty");
    assert_eq!(transport.calls(), 0);
    assert!(client.cache().is_empty());
}

#[test]
fn test_matching_suffix_is_compromised() {
    let transport = StubTransport::body(range_body(&line_for("p@ssword", "3")));
    let client = client_for(&transport);

    assert_eq!(client.compromised_count("p@ssword").unwrap(), (true, 3));

    let record = client.cache().get(&digest("p@ssword")).unwrap();
    assert!(record.compromised);
    assert_eq!(record.occurrences, Some(3));
}

#[test]
fn test_p_at_ssword_scenario() {
    // SHA-1("p@ssword") = 36E618512A68721F032470BB0891ADEF3362CFA9
    let hash = digest("p@ssword");
    assert_eq!(hash.prefix(), "36E61");
    assert_eq!(hash.suffix(), "8512A68721F032470BB0891ADEF3362CFA9");

    let transport = StubTransport::body(range_body("8512A68721F032470BB0891ADEF3362CFA9:4128"));
    let client = client_for(&transport);
    assert_eq!(client.compromised_count("p@ssword").unwrap(), (true, 4128));

    // A line carrying only the tail of the suffix must not match.
    let tail_only = StubTransport::body(range_body("12A68721F032470BB0891ADEF3362CFA9:4128"));
    let client = client_for(&tail_only);
    assert_eq!(client.compromised_count("p@ssword").unwrap(), (false, 0));
}

#[test]
fn test_no_matching_suffix_is_not_compromised() {
    let transport = StubTransport::body(range_body("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF:9"));
    let client = client_for(&transport);

    let verdict = client.check_compromised("correct horse battery staple").unwrap();
    assert_eq!(verdict, Verdict { compromised: false, occurrences: 0, cached: false });

    let record = client.cache().get(&digest("correct horse battery staple")).unwrap();
    assert!(!record.compromised);
}

#[test]
fn test_second_lookup_is_served_from_cache() {
    let transport = StubTransport::body(range_body(&line_for("p@ssword", "3")));
    let client = client_for(&transport);

    assert!(client.compromised("p@ssword").unwrap());
    // Even if upstream changes its answer, the cached verdict stands within the TTL.
    transport.set_reply(Reply::Status(503));
    let verdict = client.check_compromised("p@ssword").unwrap();
    assert!(verdict.compromised);
    assert!(verdict.cached);
    assert_eq!(transport.calls(), 1);
}

#[test]
fn test_expired_record_goes_back_to_network() {
    let transport = StubTransport::body(range_body(&line_for("p@ssword", "3")));
    let (client, clock) = client_with_clock(&transport);
    let hash = digest("p@ssword");

    client.check_compromised("p@ssword").unwrap();
    clock.advance(TimeDelta::hours(2) + TimeDelta::seconds(1));

    // Record still held, but reads as absent.
    assert!(client.cache().get_raw(&hash).is_some());
    assert_eq!(client.cache().get(&hash), None);
    assert!(client.cache().is_expired(&hash));

    transport.set_reply(Reply::Body(range_body("")));
    let verdict = client.check_compromised("p@ssword").unwrap();
    assert_eq!(verdict, Verdict { compromised: false, occurrences: 0, cached: false });
    assert_eq!(transport.calls(), 2);
    assert_eq!(client.cache().get(&hash).map(|r| r.updated_at), Some(clock.now()));
}

#[test]
fn test_invalidate_forces_refetch() {
    let transport = StubTransport::body(range_body(&line_for("p@ssword", "3")));
    let client = client_for(&transport);
    let hash = digest("p@ssword");

    client.check_compromised("p@ssword").unwrap();
    client.cache().invalidate(&hash);
    assert_eq!(client.cache().get(&hash), None);

    client.check_compromised("p@ssword").unwrap();
    assert_eq!(transport.calls(), 2);
}

#[test]
fn test_invalidate_all_empties_cache() {
    let transport = StubTransport::body(range_body(""));
    let client = client_for(&transport);
    let values = ["alpha", "bravo", "charlie"];

    for value in values {
        client.check_compromised(value).unwrap();
    }
    assert_eq!(client.cache().len(), 3);

    client.cache().invalidate_all();
    for value in values {
        assert_eq!(client.cache().get(&digest(value)), None);
    }
    assert!(client.cache().is_empty());
}

#[test]
fn test_server_error_is_not_cached() {
    let transport = StubTransport::status(500);
    let client = client_for(&transport);

    let err = client.check_compromised("p@ssword").unwrap_err();
    assert!(err.is_transport());
    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
    assert!(err.to_string().contains("500"));
    assert!(client.cache().is_empty());

    // No failure caching: the next call retries the network.
    transport.set_reply(Reply::Body(range_body(&line_for("p@ssword", "7"))));
    assert_eq!(client.compromised_count("p@ssword").unwrap(), (true, 7));
    assert_eq!(transport.calls(), 2);
}

#[test]
fn test_malformed_count_is_not_cached() {
    let transport = StubTransport::body(range_body(&line_for("p@ssword", "12x")));
    let client = client_for(&transport);

    let err = client.check_compromised("p@ssword").unwrap_err();
    assert!(err.is_parse());
    assert_eq!(client.cache().get_raw(&digest("p@ssword")), None);
}

#[test]
fn test_shared_cache_between_clients() {
    let cache = Arc::new(Cache::default());
    let first = StubTransport::body(range_body(&line_for("p@ssword", "3")));
    let second = StubTransport::status(500);

    let a = RangeClient::with_cache(Arc::clone(&first), Arc::clone(&cache));
    let b = RangeClient::with_cache(Arc::clone(&second), Arc::clone(&cache));

    assert!(a.compromised("p@ssword").unwrap());
    assert!(b.compromised("p@ssword").unwrap());
    assert_eq!(second.calls(), 0);
}

#[test]
fn test_concurrent_lookups() {
    let transport = StubTransport::body(range_body(&line_for("p@ssword", "3")));
    let client = client_for(&transport);

    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..50 {
                    assert!(client.compromised_count("p@ssword").unwrap().0);
                    client.check_compromised("something else").unwrap();
                }
            });
        }
    });

    assert_eq!(client.cache().len(), 2);
    // Concurrent misses may each reach the transport, but never more than once
    // per thread per digest before the cache is warm.
    assert!(transport.calls() >= 2 && transport.calls() <= 16);
}

#[cfg(feature = "tokio")]
#[tokio::test]
async fn test_async_lookup() {
    let transport = StubTransport::body(range_body(&line_for("p@ssword", "3")));
    let client = Arc::new(client_for(&transport));

    let verdict = client.check_compromised_async("p@ssword").await.unwrap();
    assert_eq!(verdict, Verdict { compromised: true, occurrences: 3, cached: false });

    let err = client.check_compromised_async("").await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(transport.calls(), 1);
}

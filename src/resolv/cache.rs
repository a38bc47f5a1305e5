//! A cache of answers from upstream servers.
//!
//! The cache sits between the resolver and the datagram transport. Its
//! key is the triple of server address, canonicalized query name, and
//! record type, so the randomized letter case of the actual wire query
//! never fragments the cache. Entries expire when the shortest TTL of
//! the records they carry runs out.
//!
//! Lookups are single-flight: when several tasks ask for the same key at
//! the same time, one of them performs the network exchange and the
//! others wait for its result. Errors are never cached, so a failed
//! exchange is retried by the next caller.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use crate::base::iana::Rtype;
use crate::base::name::Name;
use crate::net::dgram::Answer;
use crate::resolv::error::ResolveError;
use crate::utils::config::DefMinMax;
use moka::future::Cache;
use moka::Expiry;
use std::future::Future;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

//------------ Configuration Constants ---------------------------------------

/// Configuration limits for the maximum number of cache entries.
const MAX_CACHE_ENTRIES: DefMinMax<u64> =
    DefMinMax::new(1_000, 1, 1_000_000_000);

//------------ Config --------------------------------------------------------

/// Configuration of the answer cache.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum number of cache entries.
    max_cache_entries: u64,
}

impl Config {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the maximum number of cache entries.
    pub fn max_cache_entries(&self) -> u64 {
        self.max_cache_entries
    }

    /// Sets the maximum number of cache entries.
    ///
    /// If this value is too small or too large, it will be capped.
    pub fn set_max_cache_entries(&mut self, value: u64) {
        self.max_cache_entries = MAX_CACHE_ENTRIES.limit(value)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_cache_entries: MAX_CACHE_ENTRIES.default(),
        }
    }
}

//------------ Key -----------------------------------------------------------

/// The key for cache entries.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct Key {
    /// The server the query went to.
    server: SocketAddr,

    /// The canonicalized, i.e., lowercased, query name.
    name: Name,

    /// The record type queried for.
    rtype: Rtype,
}

//------------ AnswerExpiry --------------------------------------------------

/// Per-entry expiry policy: an answer lives as long as its shortest TTL.
struct AnswerExpiry;

impl Expiry<Key, Answer> for AnswerExpiry {
    fn expire_after_create(
        &self,
        _key: &Key,
        value: &Answer,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.iter().map(|record| record.ttl()).min()
    }
}

//------------ QueryCache ----------------------------------------------------

/// A cache of per-server query answers.
#[derive(Clone)]
pub struct QueryCache {
    /// The moka cache.
    cache: Cache<Key, Answer>,
}

impl QueryCache {
    /// Creates a new cache with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(config.max_cache_entries)
                .expire_after(AnswerExpiry)
                .build(),
        }
    }

    /// Returns the cached answer for a query, producing it if necessary.
    ///
    /// If the key is absent, `init` is run to produce the answer and, on
    /// success, the result is stored. Concurrent callers for the same
    /// key share a single execution of `init`. A failed `init` leaves
    /// the cache unchanged and its error is handed to every waiting
    /// caller.
    pub async fn get_with<F>(
        &self,
        server: SocketAddr,
        name: &Name,
        rtype: Rtype,
        init: F,
    ) -> Result<Answer, ResolveError>
    where
        F: Future<Output = Result<Answer, ResolveError>>,
    {
        let key = Key {
            server,
            name: name.to_canonical(),
            rtype,
        };
        self.cache
            .try_get_with(key, init)
            .await
            .map_err(|err| (*err).clone())
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::message::Rdata;
    use crate::base::timed::TimedValue;
    use std::net::Ipv4Addr;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn answer(ttl: Duration) -> Answer {
        vec![TimedValue::new(
            Rdata::A(Ipv4Addr::new(192, 0, 2, 1)),
            tokio::time::Instant::now() + ttl,
        )]
    }

    fn key_parts() -> (SocketAddr, Name, Rtype) {
        (
            SocketAddr::from(([192, 0, 2, 53], 53)),
            Name::from_str("www.example.com").unwrap(),
            Rtype::A,
        )
    }

    #[tokio::test]
    async fn second_lookup_is_served_from_cache() {
        let cache = QueryCache::new(Config::default());
        let (server, name, rtype) = key_parts();
        let hits = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let hits = hits.clone();
            let res = cache
                .get_with(server, &name, rtype, async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Ok(answer(Duration::from_secs(300)))
                })
                .await;
            assert!(res.is_ok());
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn case_does_not_fragment_the_cache() {
        let cache = QueryCache::new(Config::default());
        let (server, _, rtype) = key_parts();
        let hits = Arc::new(AtomicUsize::new(0));

        for spelling in ["www.example.com", "WWW.Example.COM"] {
            let name = Name::from_str(spelling).unwrap();
            let hits = hits.clone();
            let res = cache
                .get_with(server, &name, rtype, async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Ok(answer(Duration::from_secs(300)))
                })
                .await;
            assert!(res.is_ok());
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache = QueryCache::new(Config::default());
        let (server, name, rtype) = key_parts();
        let hits = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let hits = hits.clone();
            let res = cache
                .get_with(server, &name, rtype, async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Err(ResolveError::Timeout)
                })
                .await;
            assert!(matches!(res, Err(ResolveError::Timeout)));
        }
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn concurrent_lookups_share_one_exchange() {
        let cache = Arc::new(QueryCache::new(Config::default()));
        let (server, name, rtype) = key_parts();
        let hits = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..5 {
            let cache = cache.clone();
            let name = name.clone();
            let hits = hits.clone();
            tasks.push(tokio::spawn(async move {
                cache
                    .get_with(server, &name, rtype, async move {
                        tokio::time::sleep(Duration::from_millis(50))
                            .await;
                        hits.fetch_add(1, Ordering::SeqCst);
                        Ok(answer(Duration::from_secs(300)))
                    })
                    .await
            }));
        }
        for task in tasks {
            assert!(task.await.unwrap().is_ok());
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}

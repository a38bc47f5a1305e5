//! The stub resolver.
//!
//! The [`StubResolver`] is the entry point for resolutions. It asks its
//! [`ServerSource`] for the list of servers to try, runs each query
//! through the answer cache, follows CNAME chains, and enforces one
//! overall deadline over everything a single resolution does.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use crate::base::iana::Rtype;
use crate::base::message::Rdata;
use crate::base::name::Name;
use crate::base::timed::TimedValue;
use crate::net::dgram::{self, Answer};
use crate::net::protocol::{
    AsyncConnect, AsyncDgramRecv, AsyncDgramSend, UdpConnect,
};
use crate::resolv::cache::{self, QueryCache};
use crate::resolv::conf::{ResolvConf, ResolvOptions, ServerSource, SystemConf};
use crate::resolv::error::ResolveError;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;
use tokio::time::{timeout, Instant};
use tracing::debug;

//------------ StubResolver --------------------------------------------------

/// A DNS stub resolver.
///
/// The resolver is cheap to clone and safe to share: all clones use the
/// same answer cache, so concurrent identical queries collapse into a
/// single network exchange.
#[derive(Clone)]
pub struct StubResolver<S = UdpConnect> {
    /// Everything shared between clones.
    inner: Arc<Inner<S>>,
}

/// The shared state of a resolver.
struct Inner<S> {
    /// Where the server list comes from.
    ///
    /// Asked afresh at the start of every resolution.
    source: Arc<dyn ServerSource>,

    /// The resolver options.
    options: ResolvOptions,

    /// The datagram transport.
    conn: dgram::Connection<S>,

    /// The answer cache.
    cache: QueryCache,
}

impl StubResolver<UdpConnect> {
    /// Creates a resolver using the system configuration.
    ///
    /// The configuration file is re-read at the start of every
    /// resolution, so changes take effect without a restart.
    pub fn new() -> Self {
        Self::with_connect(
            Arc::new(SystemConf::new()),
            ResolvOptions::default(),
            UdpConnect::new(),
        )
    }

    /// Creates a resolver from the given configuration.
    ///
    /// Unlike [`StubResolver::new`], the configuration is fixed for the
    /// lifetime of the resolver.
    pub fn from_conf(conf: ResolvConf) -> Self {
        let options = conf.options.clone();
        Self::with_connect(Arc::new(conf), options, UdpConnect::new())
    }
}

impl Default for StubResolver<UdpConnect> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, C> StubResolver<S>
where
    S: AsyncConnect<Connection = C> + Clone + Send + Sync + 'static,
    C: AsyncDgramRecv + AsyncDgramSend + Send + Sync + Unpin + 'static,
{
    /// Creates a resolver using the given transport connector.
    pub fn with_connect(
        source: Arc<dyn ServerSource>,
        options: ResolvOptions,
        connect: S,
    ) -> Self {
        let mut config = dgram::Config::new();
        config.set_read_timeout(options.timeout);
        config.set_attempts(options.attempts);
        StubResolver {
            inner: Arc::new(Inner {
                source,
                options,
                conn: dgram::Connection::new(config, connect),
                cache: QueryCache::new(cache::Config::new()),
            }),
        }
    }

    /// Returns the resolver options.
    pub fn options(&self) -> &ResolvOptions {
        &self.inner.options
    }

    /// Resolves a hostname into the records of the given type.
    ///
    /// Follows CNAME chains; the returned records are of the requested
    /// type and their expiry is capped by the shortest-lived link of any
    /// chain that was followed. The whole resolution, including all
    /// retries and chain hops, is bounded by the configured overall
    /// timeout.
    pub async fn resolve(
        &self,
        name: &str,
        rtype: Rtype,
    ) -> Result<Answer, ResolveError> {
        let name = Name::from_str(name)
            .map_err(|_| ResolveError::InvalidName)?;
        match timeout(
            self.inner.options.resolve_timeout,
            self.resolve_name(name, rtype),
        )
        .await
        {
            Ok(res) => res,
            Err(_) => Err(ResolveError::Timeout),
        }
    }

    /// Resolves all addresses of a hostname.
    ///
    /// Queries for both A and AAAA records concurrently. Succeeds if
    /// either query does; fails with the A query's error if both fail.
    pub async fn lookup_host(
        &self,
        name: &str,
    ) -> Result<Vec<TimedValue<IpAddr>>, ResolveError> {
        let (a, aaaa) = futures_util::future::join(
            self.resolve(name, Rtype::A),
            self.resolve(name, Rtype::Aaaa),
        )
        .await;
        if let (Err(err), Err(_)) = (&a, &aaaa) {
            return Err(err.clone());
        }
        let mut res = Vec::new();
        for answer in [a, aaaa].into_iter().flatten() {
            for record in answer {
                match *record.value() {
                    Rdata::A(addr) => {
                        res.push(record.map(|_| IpAddr::V4(addr)))
                    }
                    Rdata::Aaaa(addr) => {
                        res.push(record.map(|_| IpAddr::V6(addr)))
                    }
                    _ => {}
                }
            }
        }
        Ok(res)
    }

    /// Resolves a name, following CNAME chains.
    async fn resolve_name(
        &self,
        name: Name,
        rtype: Rtype,
    ) -> Result<Answer, ResolveError> {
        let servers = self.inner.source.nameservers();
        if servers.is_empty() {
            return Err(ResolveError::NoServers);
        }

        let mut qname = name;
        let mut ceiling: Option<Instant> = None;
        loop {
            let answer =
                self.query_servers(&servers, &qname, rtype).await?;

            // Only records of the requested type count as the final
            // answer. The transport already dropped records not owned
            // by the query name.
            let direct: Answer = answer
                .iter()
                .filter(|record| answers_rtype(record.value(), rtype))
                .cloned()
                .collect();
            if !direct.is_empty() {
                return Ok(match ceiling {
                    Some(ceiling) => direct
                        .into_iter()
                        .map(|record| record.clamp_expiry(ceiling))
                        .collect(),
                    None => direct,
                });
            }

            let cname = answer.into_iter().find_map(|record| {
                let expires_at = record.expires_at();
                match record.into_value() {
                    Rdata::Cname(target) => Some((target, expires_at)),
                    _ => None,
                }
            });
            match cname {
                Some((target, expires_at)) => {
                    debug!("{}: following CNAME to {}", qname, target);
                    ceiling = Some(match ceiling {
                        Some(ceiling) => ceiling.min(expires_at),
                        None => expires_at,
                    });
                    qname = target;
                    // A chain served entirely from cache would
                    // otherwise never hit an await point, leaving the
                    // overall deadline unable to fire on a CNAME loop.
                    tokio::task::yield_now().await;
                }
                None => return Err(ResolveError::DoesNotExist),
            }
        }
    }

    /// Queries the servers in order until one gives a usable response.
    ///
    /// A definite answer, positive or negative, ends the iteration. A
    /// transient failure moves on to the next server; if every server
    /// fails, the last failure is returned.
    async fn query_servers(
        &self,
        servers: &[SocketAddr],
        name: &Name,
        rtype: Rtype,
    ) -> Result<Answer, ResolveError> {
        let mut last_err = ResolveError::NoServers;
        for &server in servers {
            let conn = self.inner.conn.clone();
            let qname = name.clone();
            let res = self
                .inner
                .cache
                .get_with(server, name, rtype, async move {
                    conn.query(server, &qname, rtype).await
                })
                .await;
            match res {
                Ok(answer) => return Ok(answer),
                Err(ResolveError::DoesNotExist) => {
                    return Err(ResolveError::DoesNotExist)
                }
                Err(err) => {
                    debug!(
                        "{}/{}: server {} failed: {}",
                        name, rtype, server, err
                    );
                    last_err = err;
                }
            }
        }
        Err(last_err)
    }
}

/// Returns whether record data is a final answer for the given type.
///
/// A decoded variant answers exactly its own type; undecoded data can
/// only ever satisfy a query for a type this crate does not decode.
fn answers_rtype(data: &Rdata, rtype: Rtype) -> bool {
    match *data {
        Rdata::A(_) => rtype == Rtype::A,
        Rdata::Aaaa(_) => rtype == Rtype::Aaaa,
        Rdata::Cname(_) => rtype == Rtype::Cname,
        Rdata::Other(_) => matches!(rtype, Rtype::Other(_)),
    }
}

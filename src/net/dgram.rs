//! Querying a single server over a datagram transport.
//!
//! A [`Connection`] sends a query to one server and waits for a
//! response that survives validation, retrying a configurable number of
//! times with a per-attempt timeout. Validation is deliberately
//! paranoid: a datagram is only trusted if it is long enough to carry a
//! header, echoes the random message ID, parses, and echoes the question
//! section byte for byte, including the randomized letter case of the
//! query name. Anything else is dropped silently and the connection
//! keeps listening, so that an off-path attacker flooding guesses cannot
//! abort a legitimate in-flight query.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use crate::base::iana::{Class, Rcode, Rtype};
use crate::base::message::{Message, Rdata};
use crate::base::name::Name;
use crate::base::timed::TimedValue;
use crate::net::protocol::{AsyncConnect, AsyncDgramRecv, AsyncDgramSend};
use crate::resolv::error::ResolveError;
use crate::utils::config::DefMinMax;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::time::{timeout, Duration, Instant};
use tracing::{debug, trace};

//------------ Configuration Constants ---------------------------------------

/// Configuration limits for the read timeout.
const READ_TIMEOUT: DefMinMax<Duration> = DefMinMax::new(
    Duration::from_millis(500),
    Duration::from_millis(1),
    Duration::from_secs(60),
);

/// Configuration limits for the number of attempts per server.
const ATTEMPTS: DefMinMax<usize> = DefMinMax::new(5, 1, 100);

/// Receive buffer size.
///
/// Without EDNS, a UDP response is at most 512 octets.
const RECV_SIZE: usize = 512;

//------------ Answer --------------------------------------------------------

/// The payload of a positive response: record data with expiry times.
pub type Answer = Vec<TimedValue<Rdata>>;

//------------ Config --------------------------------------------------------

/// Configuration for a datagram transport connection.
#[derive(Clone, Debug)]
pub struct Config {
    /// Read timeout.
    read_timeout: Duration,

    /// Number of attempts per server.
    attempts: usize,
}

impl Config {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the read timeout.
    ///
    /// The read timeout is the maximum amount of time a single attempt
    /// waits for a validated response after its query was sent.
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Sets the read timeout.
    ///
    /// If this value is too small or too large, it will be capped.
    pub fn set_read_timeout(&mut self, value: Duration) {
        self.read_timeout = READ_TIMEOUT.limit(value)
    }

    /// Returns the number of attempts made against a server.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Sets the number of attempts made against a server.
    ///
    /// If this value is too small or too large, it will be capped.
    pub fn set_attempts(&mut self, value: usize) {
        self.attempts = ATTEMPTS.limit(value)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            read_timeout: READ_TIMEOUT.default(),
            attempts: ATTEMPTS.default(),
        }
    }
}

//------------ Connection ----------------------------------------------------

/// A datagram transport for queries to single servers.
#[derive(Clone, Debug)]
pub struct Connection<S> {
    /// User configuration variables.
    config: Config,

    /// Connector for datagram sockets.
    connect: S,
}

impl<S, C> Connection<S>
where
    S: AsyncConnect<Connection = C> + Clone + Send + Sync + 'static,
    C: AsyncDgramRecv + AsyncDgramSend + Send + Sync + Unpin + 'static,
{
    /// Creates a new datagram transport.
    pub fn new(config: Config, connect: S) -> Self {
        Self { config, connect }
    }

    /// Queries one server, retrying up to the configured attempt count.
    ///
    /// A timed out attempt or a transient server failure moves on to
    /// the next attempt against the same server. A definite answer,
    /// positive or negative, ends the loop immediately. If all attempts
    /// fail, the error of the last attempt is returned.
    pub async fn query(
        &self,
        server: SocketAddr,
        name: &Name,
        rtype: Rtype,
    ) -> Result<Answer, ResolveError> {
        let mut last_err = ResolveError::Timeout;
        for attempt in 0..self.config.attempts {
            match self.query_attempt(server, name, rtype).await {
                Ok(answer) => return Ok(answer),
                Err(ResolveError::DoesNotExist) => {
                    return Err(ResolveError::DoesNotExist)
                }
                Err(err) => {
                    debug!(
                        "{}/{} query attempt {} failed: {}",
                        name, rtype, attempt, err
                    );
                    last_err = err;
                }
            }
        }
        Err(last_err)
    }

    /// Performs a single query attempt.
    ///
    /// Sends one datagram and then receives until a response passes
    /// validation or the read timeout fires. The TTLs of any returned
    /// records count from right before the datagram was sent.
    async fn query_attempt(
        &self,
        server: SocketAddr,
        name: &Name,
        rtype: Rtype,
    ) -> Result<Answer, ResolveError> {
        let qname = name.randomize_case();
        let mut request = Message::query(qname.clone(), rtype);
        request.header.set_random_id();
        let dgram = request.pack();

        let sock = self
            .connect
            .connect(server)
            .await
            .map_err(|e| ResolveError::Connect(Arc::new(e)))?;

        let ttl_start = Instant::now();
        let sent = sock
            .send(&dgram)
            .await
            .map_err(|e| ResolveError::Send(Arc::new(e)))?;
        if sent != dgram.len() {
            return Err(ResolveError::ShortSend);
        }

        loop {
            let elapsed = ttl_start.elapsed();
            if elapsed >= self.config.read_timeout {
                return Err(ResolveError::Timeout);
            }
            let remain = self.config.read_timeout - elapsed;

            let buf = vec![0; RECV_SIZE];
            let response =
                match timeout(remain, sock.recv(buf)).await {
                    Ok(Ok(response)) => response,
                    Ok(Err(e)) => {
                        return Err(ResolveError::Receive(Arc::new(e)))
                    }
                    Err(_) => return Err(ResolveError::Timeout),
                };

            // Anything that fails validation is ignored; the timer on
            // this loop is the only thing a bogus packet gets us
            // closer to.
            let response = match validate_response(&response, &request)
            {
                Some(response) => response,
                None => {
                    trace!(
                        "{}/{}: ignoring unexpected response from {}",
                        name,
                        rtype,
                        server
                    );
                    continue;
                }
            };

            match response.header.rcode() {
                Rcode::NoError => {}
                Rcode::NXDomain => return Err(ResolveError::DoesNotExist),
                rcode => return Err(ResolveError::Temporary(rcode)),
            }

            let answer: Answer = response
                .answers
                .into_iter()
                .filter(|record| {
                    record.class == Class::In && record.name == qname
                })
                .map(|record| {
                    TimedValue::new(
                        record.data,
                        ttl_start
                            + Duration::from_secs(record.ttl.into()),
                    )
                })
                .collect();

            // Some servers signal a nonexistent name through a
            // successful but empty answer section rather than through
            // NXDOMAIN.
            if answer.is_empty() {
                return Err(ResolveError::DoesNotExist);
            }
            return Ok(answer);
        }
    }
}

//------------ Utility -------------------------------------------------------

/// Checks whether a datagram is a valid response to the given request.
///
/// The checks short-circuit in order of cost: minimum header length,
/// then the raw ID prefix before spending any time on parsing, then a
/// full decode, and finally the byte-for-byte comparison of the echoed
/// question section. The last check includes the randomized letter case
/// of the query name, which an off-path attacker would have to guess on
/// top of the sixteen bit ID.
fn validate_response(raw: &[u8], request: &Message) -> Option<Message> {
    if raw.len() < 12 {
        return None;
    }
    if u16::from_be_bytes([raw[0], raw[1]]) != request.header.id() {
        return None;
    }
    let response = Message::parse(raw).ok()?;
    if !response.header.qr()
        || response.header.id() != request.header.id()
        || response.questions != request.questions
    {
        return None;
    }
    Some(response)
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    fn request() -> Message {
        let mut request = Message::query(
            Name::from_str("wWw.ExAmPle.cOm").unwrap(),
            Rtype::A,
        );
        request.header.set_id(0x2345);
        request
    }

    fn response_to(request: &Message) -> Message {
        let mut response = request.clone();
        response.header.set_qr(true);
        response
    }

    #[test]
    fn accepts_matching_response() {
        let request = request();
        let response = response_to(&request);
        assert_eq!(
            validate_response(&response.pack(), &request),
            Some(response)
        );
    }

    #[test]
    fn rejects_short_packet() {
        let request = request();
        assert_eq!(
            validate_response(b"\x23\x45\x80\x00\x00\x00", &request),
            None
        );
    }

    #[test]
    fn rejects_wrong_id() {
        let request = request();
        let mut response = response_to(&request);
        response.header.set_id(0x2346);
        assert_eq!(validate_response(&response.pack(), &request), None);
    }

    #[test]
    fn rejects_query_echo() {
        // A reflected copy of the query itself has qr unset.
        let request = request();
        assert_eq!(validate_response(&request.pack(), &request), None);
    }

    #[test]
    fn rejects_case_mismatch() {
        // Correct ID, but the question name does not match the
        // randomized spelling of the request.
        let request = request();
        let mut response = response_to(&request);
        response.questions[0].name =
            response.questions[0].name.to_canonical();
        assert_eq!(validate_response(&response.pack(), &request), None);
    }

    #[test]
    fn rejects_wrong_question() {
        let request = request();
        let mut response = response_to(&request);
        response.questions[0].rtype = Rtype::Aaaa;
        assert_eq!(validate_response(&response.pack(), &request), None);
    }

    #[test]
    fn rejects_garbage() {
        let request = request();
        // Correct ID prefix, unparseable rest.
        let raw = b"\x23\x45\x80\x00\x00\x01\x00\x00\x00\x00\x00\x00\xff";
        assert_eq!(validate_response(raw, &request), None);
    }
}

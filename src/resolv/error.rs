//! Error type for resolutions.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use crate::base::iana::Rcode;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::{error, io};

//------------ ResolveError --------------------------------------------------

/// An error happened during a resolution.
///
/// The variants matter to callers and to the retry logic alike: a
/// [`DoesNotExist`][Self::DoesNotExist] is an authoritative negative
/// answer and is never retried against further servers, while all other
/// variants are transient and only surface once every configured server
/// and attempt has been exhausted or the overall deadline has fired.
#[derive(Clone, Debug)]
pub enum ResolveError {
    /// The name does not exist.
    ///
    /// A server returned NXDOMAIN or a successful response without
    /// matching answers.
    DoesNotExist,

    /// A server returned an error code other than NXDOMAIN.
    Temporary(Rcode),

    /// No validated response arrived within the deadline.
    ///
    /// This is the per-attempt timeout while retries remain and the
    /// overall deadline when it reaches the caller.
    Timeout,

    /// The configuration did not yield any servers to query.
    NoServers,

    /// The queried hostname is not a valid domain name.
    InvalidName,

    /// Connecting a datagram socket gave an error.
    Connect(Arc<io::Error>),

    /// Sending over a datagram socket gave an error.
    Send(Arc<io::Error>),

    /// Sending over a datagram socket gave a partial result.
    ShortSend,

    /// Receiving from a datagram socket gave an error.
    Receive(Arc<io::Error>),
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            ResolveError::DoesNotExist => {
                write!(f, "name does not exist")
            }
            ResolveError::Temporary(rcode) => {
                write!(f, "server failed with {}", rcode)
            }
            ResolveError::Timeout => {
                write!(f, "timeout waiting for response")
            }
            ResolveError::NoServers => {
                write!(f, "no servers available")
            }
            ResolveError::InvalidName => {
                write!(f, "invalid hostname")
            }
            ResolveError::Connect(_) => {
                write!(f, "error connecting datagram socket")
            }
            ResolveError::Send(_) => {
                write!(f, "error sending to datagram socket")
            }
            ResolveError::ShortSend => {
                write!(f, "partial send to datagram socket")
            }
            ResolveError::Receive(_) => {
                write!(f, "error receiving from datagram socket")
            }
        }
    }
}

impl error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ResolveError::Connect(e) => Some(e),
            ResolveError::Send(e) => Some(e),
            ResolveError::Receive(e) => Some(e),
            _ => None,
        }
    }
}

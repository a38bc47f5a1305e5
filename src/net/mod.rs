//! Talking to nameservers.
//!
//! The [protocol] module defines the seam between the resolver and the
//! operating system: asynchronous, connected datagram sockets. The
//! [dgram] module drives a single server over that seam, from building
//! the randomized query to validating and classifying the response.

pub mod dgram;
pub mod protocol;

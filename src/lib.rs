//! An asynchronous stub DNS resolver.
//!
//! This crate turns a hostname and record type into a validated,
//! TTL-bounded set of addresses. It speaks the RFC 1035 wire format over
//! UDP to a configured set of nameservers, follows CNAME chains, retries
//! across servers, defends against off-path response spoofing, and caches
//! results for exactly as long as their TTL permits.
//!
//! It is a _stub_ resolver: it only talks to the recursive servers it has
//! been configured with, typically those listed in `/etc/resolv.conf`.
//! Recursive resolution, DNSSEC validation, and TCP fallback are out of
//! scope.
//!
//! # Modules
//!
//! * [base] contains the DNS data model and the wire format: messages,
//!   domain names, resource records, and the header bit fields.
//! * [net] contains the datagram transport and the per-server query
//!   logic, including response validation.
//! * [resolv] contains the resolver itself: configuration, the answer
//!   cache, and the [`StubResolver`] entry point.
//!
//! # Example
//!
//! ```no_run
//! use stub_resolv::{Rtype, StubResolver};
//!
//! # async fn example() -> Result<(), stub_resolv::ResolveError> {
//! let resolver = StubResolver::new();
//! for addr in resolver.resolve("example.com", Rtype::A).await? {
//!     println!("{} (valid for {:?})", addr.value(), addr.ttl());
//! }
//! # Ok(())
//! # }
//! ```

pub mod base;
pub mod net;
pub mod resolv;

mod utils;

pub use self::base::iana::{Class, Opcode, Rcode, Rtype};
pub use self::base::message::{Message, Question, Rdata, Record};
pub use self::base::name::Name;
pub use self::base::timed::TimedValue;
pub use self::resolv::conf::{
    ResolvConf, ResolvOptions, ServerSource, SystemConf,
};
pub use self::resolv::error::ResolveError;
pub use self::resolv::resolver::StubResolver;

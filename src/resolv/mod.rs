//! The resolver.
//!
//! [`StubResolver`][resolver::StubResolver] is the entry point: it owns
//! the configuration, the answer cache, and the datagram transport, and
//! drives queries across the configured servers, chasing CNAME chains
//! along the way.

pub mod cache;
pub mod conf;
pub mod error;
pub mod resolver;

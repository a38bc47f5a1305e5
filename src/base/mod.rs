//! The DNS data model and wire format.
//!
//! This module provides the types for handling DNS data: domain names,
//! questions, resource records, and complete messages, together with the
//! code to convert them from and into their wire format as defined in
//! [RFC 1035]. Parsing supports name compression; composing never uses
//! it, which is fine for the query messages this crate sends.
//!
//! [RFC 1035]: https://tools.ietf.org/html/rfc1035

pub mod header;
pub mod iana;
pub mod message;
pub mod name;
pub mod timed;
pub mod wire;

pub use self::header::{Header, HeaderCounts};
pub use self::message::{Message, Question, Rdata, Record};
pub use self::name::Name;
pub use self::timed::TimedValue;
pub use self::wire::{FormError, ParseError, Parser};

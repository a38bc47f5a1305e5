//! IANA definitions for the parts of the DNS this crate speaks.
//!
//! Each type wraps the raw integer from the respective IANA registry.
//! Values not known by name are kept in an `Other` variant so that
//! nothing is lost in a parse/compose round trip.

use std::fmt;

//------------ Rtype ---------------------------------------------------------

/// Resource record types.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Rtype {
    /// A host address.
    A,

    /// The canonical name for an alias.
    Cname,

    /// An IPv6 host address.
    Aaaa,

    /// A record type not known by name.
    Other(u16),
}

impl Rtype {
    /// Returns the record type for the given integer value.
    pub fn from_int(value: u16) -> Self {
        match value {
            1 => Rtype::A,
            5 => Rtype::Cname,
            28 => Rtype::Aaaa,
            _ => Rtype::Other(value),
        }
    }

    /// Returns the integer value for this record type.
    pub fn to_int(self) -> u16 {
        match self {
            Rtype::A => 1,
            Rtype::Cname => 5,
            Rtype::Aaaa => 28,
            Rtype::Other(value) => value,
        }
    }
}

impl From<u16> for Rtype {
    fn from(value: u16) -> Self {
        Rtype::from_int(value)
    }
}

impl From<Rtype> for u16 {
    fn from(value: Rtype) -> Self {
        value.to_int()
    }
}

impl fmt::Display for Rtype {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Rtype::A => f.write_str("A"),
            Rtype::Cname => f.write_str("CNAME"),
            Rtype::Aaaa => f.write_str("AAAA"),
            Rtype::Other(value) => write!(f, "TYPE{}", value),
        }
    }
}

//------------ Class ---------------------------------------------------------

/// DNS class values.
///
/// In practice only the Internet class is ever used.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Class {
    /// The Internet class.
    In,

    /// A class not known by name.
    Other(u16),
}

impl Class {
    /// Returns the class for the given integer value.
    pub fn from_int(value: u16) -> Self {
        match value {
            1 => Class::In,
            _ => Class::Other(value),
        }
    }

    /// Returns the integer value for this class.
    pub fn to_int(self) -> u16 {
        match self {
            Class::In => 1,
            Class::Other(value) => value,
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Class::In => f.write_str("IN"),
            Class::Other(value) => write!(f, "CLASS{}", value),
        }
    }
}

//------------ Opcode --------------------------------------------------------

/// DNS message opcodes.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Opcode {
    /// A standard query.
    Query,

    /// An opcode not known by name.
    Other(u8),
}

impl Opcode {
    /// Returns the opcode for the given integer value.
    ///
    /// Only the lower four bits of the value are considered.
    pub fn from_int(value: u8) -> Self {
        match value & 0x0F {
            0 => Opcode::Query,
            value => Opcode::Other(value),
        }
    }

    /// Returns the integer value for this opcode.
    pub fn to_int(self) -> u8 {
        match self {
            Opcode::Query => 0,
            Opcode::Other(value) => value & 0x0F,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Opcode::Query => f.write_str("QUERY"),
            Opcode::Other(value) => write!(f, "OPCODE{}", value),
        }
    }
}

//------------ Rcode ---------------------------------------------------------

/// DNS response codes.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Rcode {
    /// No error condition.
    NoError,

    /// The server was unable to interpret the query.
    FormErr,

    /// The server was unable to process the query.
    ServFail,

    /// The queried domain name does not exist.
    NXDomain,

    /// The server does not support the requested kind of query.
    NotImp,

    /// The server refused to answer for policy reasons.
    Refused,

    /// A response code not known by name.
    Other(u8),
}

impl Rcode {
    /// Returns the response code for the given integer value.
    ///
    /// Only the lower four bits of the value are considered.
    pub fn from_int(value: u8) -> Self {
        match value & 0x0F {
            0 => Rcode::NoError,
            1 => Rcode::FormErr,
            2 => Rcode::ServFail,
            3 => Rcode::NXDomain,
            4 => Rcode::NotImp,
            5 => Rcode::Refused,
            value => Rcode::Other(value),
        }
    }

    /// Returns the integer value for this response code.
    pub fn to_int(self) -> u8 {
        match self {
            Rcode::NoError => 0,
            Rcode::FormErr => 1,
            Rcode::ServFail => 2,
            Rcode::NXDomain => 3,
            Rcode::NotImp => 4,
            Rcode::Refused => 5,
            Rcode::Other(value) => value & 0x0F,
        }
    }
}

impl fmt::Display for Rcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Rcode::NoError => f.write_str("NOERROR"),
            Rcode::FormErr => f.write_str("FORMERR"),
            Rcode::ServFail => f.write_str("SERVFAIL"),
            Rcode::NXDomain => f.write_str("NXDOMAIN"),
            Rcode::NotImp => f.write_str("NOTIMP"),
            Rcode::Refused => f.write_str("REFUSED"),
            Rcode::Other(value) => write!(f, "RCODE{}", value),
        }
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rtype_round_trip() {
        for value in [1u16, 5, 28, 16, 257] {
            assert_eq!(Rtype::from_int(value).to_int(), value);
        }
        assert_eq!(Rtype::from_int(28), Rtype::Aaaa);
    }

    #[test]
    fn rcode_round_trip() {
        for value in 0..16u8 {
            assert_eq!(Rcode::from_int(value).to_int(), value);
        }
        assert_eq!(Rcode::from_int(3), Rcode::NXDomain);
        assert_eq!(Rcode::from_int(0x73), Rcode::NXDomain);
    }
}

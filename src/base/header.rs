//! The header of a DNS message.
//!
//! Each DNS message starts with a twelve octet long header section
//! containing some general information related to the message as well as
//! the number of records in each of the four sections that follow. Its
//! content and format are defined in section 4.1.1 of [RFC 1035].
//!
//! The header is split into two types: [`Header`] contains the message
//! ID, opcode, rcode, and flags, while [`HeaderCounts`] contains the
//! section counts, which on the wire must match the actual lengths of
//! the sections.
//!
//! [RFC 1035]: https://tools.ietf.org/html/rfc1035

use super::iana::{Opcode, Rcode};
use super::wire::{ParseError, Parser};

//------------ Header --------------------------------------------------------

/// The first part of the header of a DNS message.
///
/// This type represents the information contained in the first four
/// octets of the header: the message ID, opcode, rcode, and the various
/// flags. It keeps those four octets in wire representation, i.e., in
/// network byte order. The data is layed out like this:
///
/// ```text
///                                 1  1  1  1  1  1
///   0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      ID                       |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |QR|   Opcode  |AA|TC|RD|RA|    Z   |   RCODE   |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Header {
    /// The actual header in its wire format representation.
    ///
    /// This means that the ID field is in big endian.
    inner: [u8; 4],
}

impl Header {
    /// Creates a new header.
    ///
    /// The new header has all fields as either zero or false. Thus, the
    /// opcode will be [`Opcode::Query`] and the response code will be
    /// [`Rcode::NoError`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of the ID field.
    ///
    /// The ID field is an identifier chosen by whoever created a query
    /// and is copied into a response by a server. It allows matching
    /// incoming responses to their queries.
    pub fn id(self) -> u16 {
        u16::from_be_bytes([self.inner[0], self.inner[1]])
    }

    /// Sets the value of the ID field.
    pub fn set_id(&mut self, value: u16) {
        self.inner[..2].copy_from_slice(&value.to_be_bytes())
    }

    /// Sets the value of the ID field to a randomly chosen number.
    ///
    /// A random ID makes blindly spoofing a response a sixteen bit
    /// guessing game, which is why queries must never use a predictable
    /// ID.
    pub fn set_random_id(&mut self) {
        self.set_id(::rand::random())
    }

    /// Returns whether the QR bit is set.
    ///
    /// The bit is false in queries and true in responses.
    pub fn qr(self) -> bool {
        self.get_bit(2, 7)
    }

    /// Sets the value of the QR bit.
    pub fn set_qr(&mut self, set: bool) {
        self.set_bit(2, 7, set)
    }

    /// Returns the value of the Opcode field.
    pub fn opcode(self) -> Opcode {
        Opcode::from_int((self.inner[2] >> 3) & 0x0F)
    }

    /// Sets the value of the opcode field.
    pub fn set_opcode(&mut self, opcode: Opcode) {
        self.inner[2] = self.inner[2] & 0x87 | (opcode.to_int() << 3);
    }

    /// Returns whether the AA bit is set.
    ///
    /// The bit is set in a response if the server is authoritative for
    /// the queried name.
    pub fn aa(self) -> bool {
        self.get_bit(2, 2)
    }

    /// Sets the value of the AA bit.
    pub fn set_aa(&mut self, set: bool) {
        self.set_bit(2, 2, set)
    }

    /// Returns whether the TC bit is set.
    ///
    /// The bit is set if the response was truncated to fit the
    /// transport.
    pub fn tc(self) -> bool {
        self.get_bit(2, 1)
    }

    /// Sets the value of the TC bit.
    pub fn set_tc(&mut self, set: bool) {
        self.set_bit(2, 1, set)
    }

    /// Returns whether the RD bit is set.
    ///
    /// The bit asks the server to pursue the query recursively. A stub
    /// resolver always sets it.
    pub fn rd(self) -> bool {
        self.get_bit(2, 0)
    }

    /// Sets the value of the RD bit.
    pub fn set_rd(&mut self, set: bool) {
        self.set_bit(2, 0, set)
    }

    /// Returns whether the RA bit is set.
    ///
    /// The bit is set in a response if the server supports recursion.
    pub fn ra(self) -> bool {
        self.get_bit(3, 7)
    }

    /// Sets the value of the RA bit.
    pub fn set_ra(&mut self, set: bool) {
        self.set_bit(3, 7, set)
    }

    /// Returns the value of the reserved Z field.
    ///
    /// The three bits of this field must be zero in all messages.
    pub fn z(self) -> u8 {
        (self.inner[3] >> 4) & 0x07
    }

    /// Sets the value of the reserved Z field.
    ///
    /// Only the lower three bits of `value` are used.
    pub fn set_z(&mut self, value: u8) {
        self.inner[3] = self.inner[3] & 0x8F | ((value & 0x07) << 4);
    }

    /// Returns the value of the RCODE field.
    pub fn rcode(self) -> Rcode {
        Rcode::from_int(self.inner[3] & 0x0F)
    }

    /// Sets the value of the RCODE field.
    pub fn set_rcode(&mut self, rcode: Rcode) {
        self.inner[3] = self.inner[3] & 0xF0 | (rcode.to_int() & 0x0F);
    }

    /// Returns the value of the bit at the given position.
    ///
    /// The argument `offset` gives the byte index in the header octets
    /// and `bit` gives the bit number within that byte with the most
    /// significant bit being 7.
    fn get_bit(self, offset: usize, bit: usize) -> bool {
        self.inner[offset] & (1 << bit) != 0
    }

    /// Sets or resets the given bit.
    fn set_bit(&mut self, offset: usize, bit: usize, set: bool) {
        if set {
            self.inner[offset] |= 1 << bit
        } else {
            self.inner[offset] &= !(1 << bit)
        }
    }

    /// Appends the header to the end of a wire format buffer.
    pub fn compose(self, target: &mut Vec<u8>) {
        target.extend_from_slice(&self.inner)
    }

    /// Takes a header from the beginning of the parser.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let octets = parser.parse_octets(4)?;
        let mut inner = [0u8; 4];
        inner.copy_from_slice(octets);
        Ok(Header { inner })
    }
}

//------------ HeaderCounts --------------------------------------------------

/// The section counts of the header of a DNS message.
///
/// These are the numbers of entries in the four sections that follow the
/// header: questions, answers, authority records, and additional
/// records, in this order, each a sixteen bit integer in network byte
/// order.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct HeaderCounts {
    /// The number of questions.
    pub qdcount: u16,

    /// The number of answer records.
    pub ancount: u16,

    /// The number of authority records.
    pub nscount: u16,

    /// The number of additional records.
    pub arcount: u16,
}

impl HeaderCounts {
    /// Appends the counts to the end of a wire format buffer.
    pub fn compose(self, target: &mut Vec<u8>) {
        target.extend_from_slice(&self.qdcount.to_be_bytes());
        target.extend_from_slice(&self.ancount.to_be_bytes());
        target.extend_from_slice(&self.nscount.to_be_bytes());
        target.extend_from_slice(&self.arcount.to_be_bytes());
    }

    /// Takes the counts from the beginning of the parser.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        Ok(HeaderCounts {
            qdcount: parser.parse_u16()?,
            ancount: parser.parse_u16()?,
            nscount: parser.parse_u16()?,
            arcount: parser.parse_u16()?,
        })
    }
}

//============ Testing =======================================================

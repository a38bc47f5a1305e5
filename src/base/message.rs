//! DNS messages.
//!
//! A [`Message`] is the unit of exchange of the DNS: a header followed
//! by four sections of questions and resource records. This module
//! keeps messages fully decoded, which suits a stub resolver that only
//! ever builds small queries and picks a handful of records out of each
//! response. [`Message::pack`] produces the wire format of a message and
//! [`Message::parse`] decodes one, including compressed names anywhere
//! a name may occur.

use super::header::{Header, HeaderCounts};
use super::iana::{Class, Rtype};
use super::name::Name;
use super::wire::{FormError, ParseError, Parser};
use bytes::Bytes;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

//------------ Message -------------------------------------------------------

/// A DNS message.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Message {
    /// The message header.
    pub header: Header,

    /// The question section.
    pub questions: Vec<Question>,

    /// The answer section.
    pub answers: Vec<Record>,

    /// The authority section.
    pub authority: Vec<Record>,

    /// The additional section.
    pub additional: Vec<Record>,
}

impl Message {
    /// Creates a query message for the given question.
    ///
    /// The query has the recursion desired flag set, as a stub resolver
    /// relies on its servers to do the actual work. The message ID is
    /// left at zero; it is assigned freshly for every transmission.
    pub fn query(name: Name, rtype: Rtype) -> Self {
        let mut header = Header::new();
        header.set_rd(true);
        Message {
            header,
            questions: vec![Question {
                name,
                rtype,
                class: Class::In,
            }],
            ..Default::default()
        }
    }

    /// Returns the wire format of the message.
    ///
    /// The section counts in the packed header are taken from the
    /// actual section lengths. Names are written without compression.
    pub fn pack(&self) -> Vec<u8> {
        let mut target = Vec::with_capacity(512);
        self.header.compose(&mut target);
        HeaderCounts {
            qdcount: self.questions.len() as u16,
            ancount: self.answers.len() as u16,
            nscount: self.authority.len() as u16,
            arcount: self.additional.len() as u16,
        }
        .compose(&mut target);
        for question in &self.questions {
            question.compose(&mut target);
        }
        for record in self
            .answers
            .iter()
            .chain(&self.authority)
            .chain(&self.additional)
        {
            record.compose(&mut target);
        }
        target
    }

    /// Decodes a message from its wire format.
    ///
    /// Each section must contain exactly as many entries as the header
    /// counts announce; a packet that ends early fails with
    /// [`ParseError::ShortInput`].
    pub fn parse(octets: &[u8]) -> Result<Self, ParseError> {
        let mut parser = Parser::from_octets(octets);
        let header = Header::parse(&mut parser)?;
        let counts = HeaderCounts::parse(&mut parser)?;
        let mut questions = Vec::with_capacity(counts.qdcount.into());
        for _ in 0..counts.qdcount {
            questions.push(Question::parse(&mut parser)?);
        }
        let mut parse_records = |count: u16| {
            let mut records = Vec::with_capacity(count.into());
            for _ in 0..count {
                records.push(Record::parse(&mut parser)?);
            }
            Ok::<_, ParseError>(records)
        };
        Ok(Message {
            header,
            questions,
            answers: parse_records(counts.ancount)?,
            authority: parse_records(counts.nscount)?,
            additional: parse_records(counts.arcount)?,
        })
    }
}

//------------ Question ------------------------------------------------------

/// An entry of the question section of a message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Question {
    /// The name being asked about.
    pub name: Name,

    /// The requested record type.
    pub rtype: Rtype,

    /// The requested class.
    pub class: Class,
}

impl Question {
    /// Appends the wire format of the question to the end of a buffer.
    pub fn compose(&self, target: &mut Vec<u8>) {
        self.name.compose(target);
        target.extend_from_slice(&self.rtype.to_int().to_be_bytes());
        target.extend_from_slice(&self.class.to_int().to_be_bytes());
    }

    /// Takes a question from the beginning of the parser.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        Ok(Question {
            name: Name::parse(parser)?,
            rtype: Rtype::from_int(parser.parse_u16()?),
            class: Class::from_int(parser.parse_u16()?),
        })
    }
}

//------------ Record --------------------------------------------------------

/// A resource record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    /// The name this record pertains to.
    pub name: Name,

    /// The record type.
    pub rtype: Rtype,

    /// The record class.
    pub class: Class,

    /// The number of seconds the record may be cached.
    pub ttl: u32,

    /// The record data.
    pub data: Rdata,
}

impl Record {
    /// Appends the wire format of the record to the end of a buffer.
    pub fn compose(&self, target: &mut Vec<u8>) {
        self.name.compose(target);
        target.extend_from_slice(&self.rtype.to_int().to_be_bytes());
        target.extend_from_slice(&self.class.to_int().to_be_bytes());
        target.extend_from_slice(&self.ttl.to_be_bytes());
        target
            .extend_from_slice(&(self.data.compose_len() as u16).to_be_bytes());
        self.data.compose(target);
    }

    /// Takes a record from the beginning of the parser.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let name = Name::parse(parser)?;
        let rtype = Rtype::from_int(parser.parse_u16()?);
        let class = Class::from_int(parser.parse_u16()?);
        let ttl = parser.parse_u32()?;
        let rdlen = parser.parse_u16()? as usize;
        let data = Rdata::parse(parser, rtype, rdlen)?;
        Ok(Record {
            name,
            rtype,
            class,
            ttl,
            data,
        })
    }
}

//------------ Rdata ---------------------------------------------------------

/// The data of a resource record.
///
/// Only the record types the resolver acts upon are decoded; everything
/// else is carried as raw bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Rdata {
    /// An IPv4 host address.
    A(Ipv4Addr),

    /// An IPv6 host address.
    Aaaa(Ipv6Addr),

    /// The canonical name of an alias.
    Cname(Name),

    /// The data of a record type not decoded further.
    Other(Bytes),
}

impl Rdata {
    /// Returns the length of the data in wire format.
    pub fn compose_len(&self) -> usize {
        match *self {
            Rdata::A(_) => 4,
            Rdata::Aaaa(_) => 16,
            Rdata::Cname(ref name) => name.compose_len(),
            Rdata::Other(ref data) => data.len(),
        }
    }

    /// Appends the wire format of the data to the end of a buffer.
    pub fn compose(&self, target: &mut Vec<u8>) {
        match *self {
            Rdata::A(addr) => {
                target.extend_from_slice(&addr.octets())
            }
            Rdata::Aaaa(addr) => {
                target.extend_from_slice(&addr.octets())
            }
            Rdata::Cname(ref name) => name.compose(target),
            Rdata::Other(ref data) => target.extend_from_slice(data),
        }
    }

    /// Takes record data of the given type and length from the parser.
    ///
    /// CNAME data is decoded as a name and may use compression pointers
    /// like any other name in the packet. Address data must have exactly
    /// the length of an address. Anything else is taken verbatim.
    pub fn parse(
        parser: &mut Parser,
        rtype: Rtype,
        rdlen: usize,
    ) -> Result<Self, ParseError> {
        match rtype {
            Rtype::A => {
                if rdlen != 4 {
                    return Err(
                        FormError::new("invalid A record data").into()
                    );
                }
                let octets = parser.parse_octets(4)?;
                let mut addr = [0u8; 4];
                addr.copy_from_slice(octets);
                Ok(Rdata::A(addr.into()))
            }
            Rtype::Aaaa => {
                if rdlen != 16 {
                    return Err(
                        FormError::new("invalid AAAA record data").into()
                    );
                }
                let octets = parser.parse_octets(16)?;
                let mut addr = [0u8; 16];
                addr.copy_from_slice(octets);
                Ok(Rdata::Aaaa(addr.into()))
            }
            Rtype::Cname => {
                let start = parser.pos();
                let name = Name::parse(parser)?;
                if parser.pos() > start + rdlen {
                    return Err(FormError::new(
                        "invalid CNAME record data",
                    )
                    .into());
                }
                parser.seek(start + rdlen)?;
                Ok(Rdata::Cname(name))
            }
            _ => Ok(Rdata::Other(Bytes::copy_from_slice(
                parser.parse_octets(rdlen)?,
            ))),
        }
    }
}

//--- Display

impl fmt::Display for Rdata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Rdata::A(addr) => addr.fmt(f),
            Rdata::Aaaa(addr) => addr.fmt(f),
            Rdata::Cname(ref name) => name.fmt(f),
            // The generic format of RFC 3597.
            Rdata::Other(ref data) => {
                write!(f, "\\# {}", data.len())?;
                for ch in data.iter() {
                    write!(f, " {:02X}", ch)?;
                }
                Ok(())
            }
        }
    }
}

//============ Testing =======================================================

//! Domain names.
//!
//! A [`Name`] stores a fully qualified domain name as dot-joined label
//! bytes, i.e., `example.com` is kept as the eleven bytes of that string
//! and the root name is kept as an empty sequence. Comparison and
//! hashing are byte-exact and therefore case-sensitive. This matters:
//! outgoing queries randomize the letter case of the name (the "0x20
//! technique") as an extra source of anti-spoofing entropy, and response
//! validation relies on comparing the echoed name with its exact
//! randomized spelling.
//!
//! Parsing from the wire supports compression pointers as defined in
//! section 4.1.4 of [RFC 1035], including protection against pointer
//! loops.
//!
//! [RFC 1035]: https://tools.ietf.org/html/rfc1035

use super::wire::{FormError, ParseError, Parser};
use smallvec::SmallVec;
use std::str::FromStr;
use std::{error, fmt};

/// The maximum length of the dotted representation of a name.
///
/// A name on the wire is limited to 255 octets. Each label costs its
/// length plus one octet and the terminating empty label costs one more,
/// so the dotted text form can be at most 253 bytes long.
const MAX_NAME_LEN: usize = 253;

/// The maximum length of a single label.
const MAX_LABEL_LEN: usize = 63;

//------------ Name ----------------------------------------------------------

/// A fully qualified domain name.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Name {
    /// The name in dot-joined form without a trailing dot.
    ///
    /// The root name is the empty sequence.
    octets: Vec<u8>,
}

impl Name {
    /// Creates the root name.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns whether this is the root name.
    pub fn is_root(&self) -> bool {
        self.octets.is_empty()
    }

    /// Returns a reference to the dot-joined label bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.octets
    }

    /// Returns an iterator over the labels of the name.
    ///
    /// The root name has no labels.
    pub fn labels(&self) -> impl Iterator<Item = &[u8]> {
        self.octets.split(|&ch| ch == b'.').filter(|l| !l.is_empty())
    }

    /// Returns the length of the name in wire format.
    pub fn compose_len(&self) -> usize {
        if self.is_root() {
            1
        } else {
            self.octets.len() + 2
        }
    }

    /// Returns a copy of the name with randomized letter case.
    ///
    /// Each ASCII letter keeps or flips its case with equal probability.
    /// Since a conforming server echoes the question name verbatim, the
    /// random spelling serves as unguessable entropy orthogonal to the
    /// sixteen bit message ID.
    pub fn randomize_case(&self) -> Self {
        Name {
            octets: self
                .octets
                .iter()
                .map(|&ch| {
                    if ch.is_ascii_alphabetic() && ::rand::random() {
                        ch ^ 0x20
                    } else {
                        ch
                    }
                })
                .collect(),
        }
    }

    /// Returns the canonical, all-lowercase copy of the name.
    ///
    /// Names that differ only in case refer to the same domain, so this
    /// is the form to use for cache keys.
    pub fn to_canonical(&self) -> Self {
        Name {
            octets: self.octets.to_ascii_lowercase(),
        }
    }

    /// Appends the wire format of the name to the end of a buffer.
    ///
    /// Each label is written as a length octet followed by the label
    /// bytes, terminated by an empty label. Composing never uses
    /// compression.
    pub fn compose(&self, target: &mut Vec<u8>) {
        for label in self.labels() {
            target.push(label.len() as u8);
            target.extend_from_slice(label);
        }
        target.push(0);
    }

    /// Takes a name from the beginning of the parser.
    ///
    /// The name may use compression pointers referring anywhere into the
    /// underlying packet. After the first pointer, the parser position
    /// advances past the two pointer octets and stays there; further
    /// jumps only affect where labels are read from. An offset that is
    /// visited twice while resolving a single name means the pointer
    /// chain loops and results in an error.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let mut octets = Vec::new();
        let mut visited = SmallVec::<[usize; 8]>::new();
        let mut return_pos = None;
        loop {
            let ltype = parser.parse_u8()?;
            match ltype {
                0 => break,
                1..=0x3F => {
                    let label = parser.parse_octets(ltype as usize)?;
                    if label.contains(&b'.') {
                        return Err(FormError::new(
                            "dot inside label",
                        )
                        .into());
                    }
                    if !octets.is_empty() {
                        octets.push(b'.');
                    }
                    octets.extend_from_slice(label);
                    if octets.len() > MAX_NAME_LEN {
                        return Err(
                            FormError::new("long domain name").into()
                        );
                    }
                }
                0xC0..=0xFF => {
                    let target = (ltype as usize - 0xC0) * 256
                        + parser.parse_u8()? as usize;
                    if visited.contains(&target) {
                        return Err(FormError::new(
                            "compression pointer loop",
                        )
                        .into());
                    }
                    visited.push(target);
                    if return_pos.is_none() {
                        return_pos = Some(parser.pos());
                    }
                    parser.seek(target)?;
                }
                _ => {
                    return Err(
                        FormError::new("unknown label type").into()
                    )
                }
            }
        }
        if let Some(pos) = return_pos {
            parser.seek(pos)?;
        }
        Ok(Name { octets })
    }
}

//--- FromStr

impl FromStr for Name {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "." {
            return Ok(Self::root());
        }
        let s = s.strip_suffix('.').unwrap_or(s);
        if s.is_empty() {
            return Err(NameError::EmptyLabel);
        }
        if s.len() > MAX_NAME_LEN {
            return Err(NameError::LongName);
        }
        for label in s.split('.') {
            if label.is_empty() {
                return Err(NameError::EmptyLabel);
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(NameError::LongLabel);
            }
        }
        Ok(Name {
            octets: s.as_bytes().into(),
        })
    }
}

//--- Display

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_root() {
            return f.write_str(".");
        }
        for &ch in &self.octets {
            if ch.is_ascii_graphic() {
                write!(f, "{}", ch as char)?;
            } else {
                write!(f, "\\{:03}", ch)?;
            }
        }
        Ok(())
    }
}

//------------ NameError -----------------------------------------------------

/// An error happened while converting a string into a name.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NameError {
    /// The name contains an empty label.
    EmptyLabel,

    /// A label is longer than 63 characters.
    LongLabel,

    /// The name as a whole is too long.
    LongName,
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            NameError::EmptyLabel => f.write_str("empty label"),
            NameError::LongLabel => f.write_str("label too long"),
            NameError::LongName => f.write_str("name too long"),
        }
    }
}

impl error::Error for NameError {}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    #[test]
    fn from_str() {
        assert_eq!(name("example.com").as_slice(), b"example.com");
        assert_eq!(name("example.com.").as_slice(), b"example.com");
        assert!(name(".").is_root());
        assert_eq!(Name::from_str(""), Err(NameError::EmptyLabel));
        assert_eq!(
            Name::from_str("foo..bar"),
            Err(NameError::EmptyLabel)
        );
        assert_eq!(
            Name::from_str(&"x".repeat(64)),
            Err(NameError::LongLabel)
        );
        assert_eq!(
            Name::from_str(
                &["abcdefg"; 40].join(".")
            ),
            Err(NameError::LongName)
        );
    }

    #[test]
    fn labels() {
        let www = name("www.example.com");
        let labels: Vec<_> = www.labels().collect();
        assert_eq!(labels, [b"www".as_ref(), b"example", b"com"]);
        assert_eq!(Name::root().labels().count(), 0);
    }

    #[test]
    fn compose() {
        let mut buf = Vec::new();
        name("example.com").compose(&mut buf);
        assert_eq!(buf, b"\x07example\x03com\x00");
        assert_eq!(name("example.com").compose_len(), buf.len());

        buf.clear();
        Name::root().compose(&mut buf);
        assert_eq!(buf, b"\x00");
    }

    #[test]
    fn parse_uncompressed() {
        let mut parser =
            Parser::from_octets(b"\x07example\x03com\x00\xff");
        assert_eq!(Name::parse(&mut parser), Ok(name("example.com")));
        assert_eq!(parser.remaining(), 1);
    }

    #[test]
    fn parse_compressed() {
        // Offset 0: "example.com", offset 13: "www" + pointer to 0.
        let packet = b"\x07example\x03com\x00\x03www\xc0\x00rest";
        let mut parser = Parser::from_octets(packet);
        parser.seek(13).unwrap();
        assert_eq!(
            Name::parse(&mut parser),
            Ok(name("www.example.com"))
        );
        // The cursor sits right after the two pointer octets.
        assert_eq!(parser.pos(), 19);
        assert_eq!(parser.parse_octets(4), Ok(&b"rest"[..]));
    }

    #[test]
    fn parse_nested_pointers() {
        // A pointer target that itself ends in another pointer.
        let packet =
            b"\x03com\x00\x07example\xc0\x00\x03www\xc0\x05";
        let mut parser = Parser::from_octets(packet);
        parser.seek(15).unwrap();
        assert_eq!(
            Name::parse(&mut parser),
            Ok(name("www.example.com"))
        );
        assert_eq!(parser.pos(), packet.len());
    }

    #[test]
    fn parse_pointer_loop() {
        let packet = b"\x03www\xc0\x00";
        let mut parser = Parser::from_octets(packet);
        assert_eq!(
            Name::parse(&mut parser),
            Err(FormError::new("compression pointer loop").into())
        );

        // Two pointers referring to each other.
        let packet = b"\xc0\x02\xc0\x00";
        let mut parser = Parser::from_octets(packet);
        assert!(Name::parse(&mut parser).is_err());
    }

    #[test]
    fn parse_short_input() {
        let mut parser = Parser::from_octets(b"\x07exam");
        assert_eq!(
            Name::parse(&mut parser),
            Err(ParseError::ShortInput)
        );
        let mut parser = Parser::from_octets(b"\x03www\xc0");
        assert_eq!(
            Name::parse(&mut parser),
            Err(ParseError::ShortInput)
        );
    }

    #[test]
    fn parse_unknown_label_type() {
        let mut parser = Parser::from_octets(b"\x40foo\x00");
        assert!(matches!(
            Name::parse(&mut parser),
            Err(ParseError::Form(_))
        ));
    }

    #[test]
    fn randomize_case() {
        let original = name("www.example.com");
        let randomized = original.randomize_case();
        assert_eq!(randomized.to_canonical(), original);
        assert_eq!(
            randomized.as_slice().to_ascii_lowercase(),
            original.as_slice()
        );
    }

    #[test]
    fn case_sensitive_eq() {
        assert_ne!(name("WWW.example.com"), name("www.example.com"));
        assert_eq!(
            name("WWW.example.COM").to_canonical(),
            name("www.example.com")
        );
    }

    #[test]
    fn display() {
        assert_eq!(name("example.com").to_string(), "example.com");
        assert_eq!(Name::root().to_string(), ".");
    }
}

//! Low-level wire format parsing.
//!
//! The [`Parser`] wraps a packet buffer and remembers the read position.
//! Methods allow reading out data and progressing the position beyond
//! processed data. All methods check against the end of the buffer and
//! fail with [`ParseError::ShortInput`] rather than panic.

use std::{error, fmt};

//------------ Parser --------------------------------------------------------

/// A parser for sequentially extracting data from a packet buffer.
#[derive(Clone, Copy, Debug)]
pub struct Parser<'a> {
    /// The underlying octets.
    octets: &'a [u8],

    /// The current position of the parser from the beginning of `octets`.
    pos: usize,
}

impl<'a> Parser<'a> {
    /// Creates a new parser atop an octets slice.
    pub fn from_octets(octets: &'a [u8]) -> Self {
        Parser { octets, pos: 0 }
    }

    /// Returns the current parse position as an index into the octets.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the length of the underlying octets sequence.
    pub fn len(&self) -> usize {
        self.octets.len()
    }

    /// Returns whether the underlying octets sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.octets.is_empty()
    }

    /// Returns the number of remaining octets to parse.
    pub fn remaining(&self) -> usize {
        self.octets.len() - self.pos
    }

    /// Returns a slice for the next `len` octets without advancing.
    ///
    /// If less than `len` octets are left, returns an error.
    pub fn peek(&self, len: usize) -> Result<&'a [u8], ParseError> {
        self.check_len(len)?;
        Ok(&self.octets[self.pos..self.pos + len])
    }

    /// Repositions the parser to the given index.
    ///
    /// It is okay to reposition anywhere within the sequence. However,
    /// if `pos` is larger than the length of the sequence, an error is
    /// returned.
    pub fn seek(&mut self, pos: usize) -> Result<(), ParseError> {
        if pos > self.octets.len() {
            Err(ParseError::ShortInput)
        } else {
            self.pos = pos;
            Ok(())
        }
    }

    /// Advances the parser's position by `len` octets.
    ///
    /// If this would take the parser beyond its end, an error is returned.
    pub fn advance(&mut self, len: usize) -> Result<(), ParseError> {
        if len > self.remaining() {
            Err(ParseError::ShortInput)
        } else {
            self.pos += len;
            Ok(())
        }
    }

    /// Checks that there are `len` octets left to parse.
    ///
    /// If there aren't, returns an error.
    pub fn check_len(&self, len: usize) -> Result<(), ParseError> {
        if self.remaining() < len {
            Err(ParseError::ShortInput)
        } else {
            Ok(())
        }
    }

    /// Takes and returns the next `len` octets.
    ///
    /// Advances the parser by `len` octets. If there aren't enough octets
    /// left, leaves the parser untouched and returns an error instead.
    pub fn parse_octets(
        &mut self,
        len: usize,
    ) -> Result<&'a [u8], ParseError> {
        let res = self.peek(len)?;
        self.pos += len;
        Ok(res)
    }

    /// Takes a `u8` from the beginning of the parser.
    pub fn parse_u8(&mut self) -> Result<u8, ParseError> {
        let res = self.peek(1)?[0];
        self.pos += 1;
        Ok(res)
    }

    /// Takes a `u16` from the beginning of the parser.
    ///
    /// The value is converted from network byte order into the system's
    /// own byte order if necessary.
    pub fn parse_u16(&mut self) -> Result<u16, ParseError> {
        let res = self.peek(2)?;
        let res = u16::from_be_bytes([res[0], res[1]]);
        self.pos += 2;
        Ok(res)
    }

    /// Takes a `u32` from the beginning of the parser.
    ///
    /// The value is converted from network byte order into the system's
    /// own byte order if necessary.
    pub fn parse_u32(&mut self) -> Result<u32, ParseError> {
        let res = self.peek(4)?;
        let res = u32::from_be_bytes([res[0], res[1], res[2], res[3]]);
        self.pos += 4;
        Ok(res)
    }
}

//------------ ParseError ----------------------------------------------------

/// An error happened while parsing data.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// An attempt was made to go beyond the end of the parser.
    ShortInput,

    /// A formatting error occurred.
    Form(FormError),
}

impl From<FormError> for ParseError {
    fn from(err: FormError) -> Self {
        ParseError::Form(err)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ParseError::ShortInput => f.write_str("unexpected end of input"),
            ParseError::Form(ref err) => err.fmt(f),
        }
    }
}

impl error::Error for ParseError {}

//------------ FormError -----------------------------------------------------

/// A formatting error occurred.
///
/// This is a generic error for all kinds of error cases that result in
/// data not being accepted. To be able to provide a bit more context, the
/// error carries a static string.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FormError(&'static str);

impl FormError {
    /// Creates a new form error value with the given diagnostics string.
    pub const fn new(msg: &'static str) -> Self {
        FormError(msg)
    }
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl error::Error for FormError {}

//============ Testing =======================================================

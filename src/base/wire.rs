//! Basic wire format handling.
//!
//! [`Parser`] wraps the octets of a DNS message and provides bounds checked
//! access to the integers and octet sequences the format is built from.
//! Because domain names may contain compression pointers into earlier parts
//! of a message, the parser keeps the entire message around and allows
//! jumping via [`seek`][Parser::seek].
//!
//! Composing happens directly into a [`bytes::BytesMut`] through the
//! [`bytes::BufMut`] trait, so there is no composer type here.

use bytes::Bytes;
use std::{error, fmt};

//------------ Parser --------------------------------------------------------

/// A cursor over the octets of a DNS message.
#[derive(Clone, Debug)]
pub struct Parser<'a> {
    /// The octets of the full message.
    octets: &'a [u8],

    /// The current read position.
    pos: usize,

    /// The position past which reading is not allowed.
    ///
    /// This equals the message length except within
    /// [`parse_block`][Self::parse_block], where it marks the end of the
    /// current record data.
    limit: usize,
}

impl<'a> Parser<'a> {
    /// Creates a parser positioned at the beginning of `octets`.
    pub fn from_octets(octets: &'a [u8]) -> Self {
        Parser {
            octets,
            pos: 0,
            limit: octets.len(),
        }
    }

    /// Returns the current read position.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the number of octets left to read.
    pub fn remaining(&self) -> usize {
        self.limit - self.pos
    }

    /// Moves the read position to `pos`.
    pub fn seek(&mut self, pos: usize) -> Result<(), ParseError> {
        if pos > self.limit {
            return Err(ParseError::ShortInput);
        }
        self.pos = pos;
        Ok(())
    }

    /// Skips over the next `len` octets.
    pub fn advance(&mut self, len: usize) -> Result<(), ParseError> {
        if len > self.remaining() {
            return Err(ParseError::ShortInput);
        }
        self.pos += len;
        Ok(())
    }

    /// Takes the next octet.
    pub fn parse_u8(&mut self) -> Result<u8, ParseError> {
        if self.remaining() < 1 {
            return Err(ParseError::ShortInput);
        }
        let res = self.octets[self.pos];
        self.pos += 1;
        Ok(res)
    }

    /// Takes a big-endian `u16` from the next two octets.
    pub fn parse_u16_be(&mut self) -> Result<u16, ParseError> {
        if self.remaining() < 2 {
            return Err(ParseError::ShortInput);
        }
        let res = u16::from_be_bytes([
            self.octets[self.pos],
            self.octets[self.pos + 1],
        ]);
        self.pos += 2;
        Ok(res)
    }

    /// Takes a big-endian `u32` from the next four octets.
    pub fn parse_u32_be(&mut self) -> Result<u32, ParseError> {
        if self.remaining() < 4 {
            return Err(ParseError::ShortInput);
        }
        let res = u32::from_be_bytes([
            self.octets[self.pos],
            self.octets[self.pos + 1],
            self.octets[self.pos + 2],
            self.octets[self.pos + 3],
        ]);
        self.pos += 4;
        Ok(res)
    }

    /// Takes the next `len` octets.
    pub fn parse_octets(&mut self, len: usize) -> Result<Bytes, ParseError> {
        if len > self.remaining() {
            return Err(ParseError::ShortInput);
        }
        let res = Bytes::copy_from_slice(&self.octets[self.pos..self.pos + len]);
        self.pos += len;
        Ok(res)
    }

    /// Parses a block of exactly `len` octets via `op`.
    ///
    /// The operation sees a parser limited to the block and must consume
    /// it entirely, otherwise a form error is returned. Used for record
    /// data, where the length is given by the preceding RDLENGTH.
    pub fn parse_block<T, F>(&mut self, len: usize, op: F) -> Result<T, ParseError>
    where
        F: FnOnce(&mut Parser<'a>) -> Result<T, ParseError>,
    {
        if len > self.remaining() {
            return Err(ParseError::ShortInput);
        }
        let saved_limit = self.limit;
        self.limit = self.pos + len;
        let res = op(self);
        let reached_end = self.pos == self.limit;
        self.limit = saved_limit;
        let res = res?;
        if !reached_end {
            return Err(ParseError::form_error("trailing data in record data"));
        }
        Ok(res)
    }
}

//------------ ParseError ----------------------------------------------------

/// An error happened while parsing data.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// An attempt was made to read past the end of the available data.
    ShortInput,

    /// The data was formatted wrongly.
    Form(FormError),
}

impl ParseError {
    /// Creates a parse error wrapping a form error with the given text.
    pub const fn form_error(msg: &'static str) -> Self {
        ParseError::Form(FormError::new(msg))
    }
}

impl From<FormError> for ParseError {
    fn from(err: FormError) -> Self {
        ParseError::Form(err)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::ShortInput => f.write_str("unexpected end of input"),
            ParseError::Form(err) => err.fmt(f),
        }
    }
}

impl error::Error for ParseError {}

//------------ FormError -----------------------------------------------------

/// A formatting error occurred.
///
/// This is a generic error for the many ways data can fail to be
/// acceptable. It carries a static string for diagnostics.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FormError(&'static str);

impl FormError {
    /// Creates a new form error with the given diagnostics text.
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

//============ Tests =========================================================

//! Domain names.
//!
//! All names in this crate are absolute: the wire format always ends in
//! the empty root label, and the presentation format accepts a trailing
//! dot but does not require one. Comparison and hashing are ASCII case
//! insensitive as demanded by [RFC 4343].
//!
//! [RFC 4343]: https://tools.ietf.org/html/rfc4343

use super::wire::{ParseError, Parser};
use bytes::{BufMut, Bytes, BytesMut};
use std::str::FromStr;
use std::{error, fmt, hash};

//------------ Name ----------------------------------------------------------

/// An absolute domain name.
///
/// The name is kept in uncompressed wire format: a sequence of labels,
/// each prefixed by its length octet, terminated by the zero length root
/// label. Parsing from a message resolves compression pointers, so the
/// stored form never contains any.
#[derive(Clone)]
pub struct Name {
    /// The wire format octets, ending in the root label.
    octets: Bytes,
}

impl Name {
    /// The maximum length of a name in wire format octets.
    pub const MAX_LEN: usize = 255;

    /// The maximum length of a single label.
    const MAX_LABEL_LEN: usize = 63;

    /// Returns the root name.
    pub fn root() -> Self {
        Name {
            octets: Bytes::from_static(b"\0"),
        }
    }

    /// Creates a name from wire format octets without checking them.
    ///
    /// The octets must be a correctly encoded, uncompressed absolute name.
    pub(crate) fn from_wire_unchecked(octets: Bytes) -> Self {
        Name { octets }
    }

    /// Returns whether the name consists of the root label only.
    pub fn is_root(&self) -> bool {
        self.octets.len() == 1
    }

    /// Returns the length of the wire format of the name.
    pub fn len(&self) -> usize {
        self.octets.len()
    }

    /// Returns the wire format octets of the name.
    pub fn as_slice(&self) -> &[u8] {
        &self.octets
    }

    /// Returns an iterator over the labels of the name.
    ///
    /// The final root label is not included.
    pub fn iter_labels(&self) -> Labels {
        Labels {
            slice: &self.octets,
        }
    }

    /// Parses a name from the beginning of `parser`.
    ///
    /// Compression pointers are followed. A pointer must point strictly
    /// towards the start of the message, i.e., before its own position,
    /// which makes pointer loops impossible.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let mut octets = BytesMut::with_capacity(32);
        let mut resume = None;
        loop {
            let ltype_pos = parser.pos();
            let ltype = parser.parse_u8()?;
            match ltype {
                0 => {
                    octets.put_u8(0);
                    break;
                }
                1..=0x3F => {
                    let len = usize::from(ltype);
                    if octets.len() + 1 + len + 1 > Self::MAX_LEN {
                        return Err(ParseError::form_error("long domain name"));
                    }
                    let label = parser.parse_octets(len)?;
                    octets.put_u8(ltype);
                    octets.put_slice(&label);
                }
                0xC0..=0xFF => {
                    let second = parser.parse_u8()?;
                    let target = (usize::from(ltype & 0x3F) << 8)
                        | usize::from(second);
                    if target >= ltype_pos {
                        return Err(ParseError::form_error(
                            "forward compression pointer",
                        ));
                    }
                    if resume.is_none() {
                        resume = Some(parser.pos());
                    }
                    parser.seek(target)?;
                }
                _ => {
                    return Err(ParseError::form_error("unknown label type"));
                }
            }
        }
        if let Some(pos) = resume {
            parser.seek(pos)?;
        }
        Ok(Name {
            octets: octets.freeze(),
        })
    }

    /// Appends the wire format of the name to `buf`.
    pub fn compose<B: BufMut>(&self, buf: &mut B) {
        buf.put_slice(&self.octets)
    }

    /// Appends the canonical wire format of the name to `buf`.
    ///
    /// In the canonical form all labels are lower case ([RFC 4034],
    /// section 6.2). TSIG digests are computed over this form.
    ///
    /// [RFC 4034]: https://tools.ietf.org/html/rfc4034
    pub fn compose_canonical<B: BufMut>(&self, buf: &mut B) {
        for label in self.iter_labels() {
            buf.put_u8(label.len() as u8);
            for &ch in label {
                buf.put_u8(ch.to_ascii_lowercase());
            }
        }
        buf.put_u8(0);
    }
}

//--- FromStr

impl FromStr for Name {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "." {
            return Ok(Name::root());
        }
        let s = s.strip_suffix('.').unwrap_or(s);
        if s.is_empty() {
            return Err(NameError::EmptyLabel);
        }
        let mut octets = BytesMut::with_capacity(s.len() + 2);
        for label in s.split('.') {
            if label.is_empty() {
                return Err(NameError::EmptyLabel);
            }
            if label.len() > Self::MAX_LABEL_LEN {
                return Err(NameError::LongLabel);
            }
            octets.put_u8(label.len() as u8);
            octets.put_slice(label.as_bytes());
        }
        if octets.len() + 1 > Self::MAX_LEN {
            return Err(NameError::LongName);
        }
        octets.put_u8(0);
        Ok(Name {
            octets: octets.freeze(),
        })
    }
}

//--- PartialEq, Eq, and Hash

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.octets.eq_ignore_ascii_case(&other.octets)
    }
}

impl Eq for Name {}

impl hash::Hash for Name {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        for &ch in self.octets.iter() {
            state.write_u8(ch.to_ascii_lowercase())
        }
    }
}

//--- Display and Debug

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_root() {
            return f.write_str(".");
        }
        for label in self.iter_labels() {
            for &ch in label {
                match ch {
                    b'.' | b'\\' => write!(f, "\\{}", ch as char)?,
                    0x21..=0x7E => write!(f, "{}", ch as char)?,
                    _ => write!(f, "\\{:03}", ch)?,
                }
            }
            f.write_str(".")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Name({})", self)
    }
}

//------------ Labels --------------------------------------------------------

/// An iterator over the labels of a name.
pub struct Labels<'a> {
    /// The remaining wire format octets.
    slice: &'a [u8],
}

impl<'a> Iterator for Labels<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let len = usize::from(*self.slice.first()?);
        if len == 0 {
            return None;
        }
        let res = &self.slice[1..1 + len];
        self.slice = &self.slice[1 + len..];
        Some(res)
    }
}

//------------ NameError -----------------------------------------------------

/// A name failed to parse from its presentation format.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NameError {
    /// The name contains an empty label.
    EmptyLabel,

    /// A label is longer than 63 octets.
    LongLabel,

    /// The name is longer than 255 octets.
    LongName,
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NameError::EmptyLabel => f.write_str("empty label"),
            NameError::LongLabel => f.write_str("long label"),
            NameError::LongName => f.write_str("long domain name"),
        }
    }
}

impl error::Error for NameError {}

//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn from_str_and_display() {
        let name = Name::from_str("example.com").unwrap();
        assert_eq!(format!("{}", name), "example.com.");
        let name = Name::from_str("example.com.").unwrap();
        assert_eq!(format!("{}", name), "example.com.");
        assert_eq!(format!("{}", Name::root()), ".");
        assert_eq!(
            name.as_slice(),
            b"\x07example\x03com\x00".as_slice()
        );
    }

    #[test]
    fn from_str_rejects_bad_names() {
        assert_eq!(Name::from_str(""), Err(NameError::EmptyLabel));
        assert_eq!(Name::from_str("foo..bar"), Err(NameError::EmptyLabel));
        let label = "x".repeat(64);
        assert_eq!(Name::from_str(&label), Err(NameError::LongLabel));
        let name = vec!["x".repeat(63); 5].join(".");
        assert_eq!(Name::from_str(&name), Err(NameError::LongName));
    }

    #[test]
    fn eq_is_case_insensitive() {
        let lower = Name::from_str("example.com").unwrap();
        let upper = Name::from_str("EXAMPLE.COM").unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn parse_follows_pointers() {
        // "com" at position 0, "example" + pointer to it at position 5.
        let octets = b"\x03com\x00\x07example\xC0\x00";
        let mut parser = Parser::from_octets(octets);
        parser.seek(5).unwrap();
        let name = Name::parse(&mut parser).unwrap();
        assert_eq!(name, Name::from_str("example.com").unwrap());
        assert_eq!(parser.pos(), octets.len());
    }

    #[test]
    fn parse_rejects_forward_pointers() {
        let octets = b"\xC0\x02\x03com\x00";
        let mut parser = Parser::from_octets(octets);
        assert!(matches!(
            Name::parse(&mut parser),
            Err(ParseError::Form(_))
        ));
    }

    #[test]
    fn canonical_form_is_lower_case() {
        let name = Name::from_str("ExAmPlE.CoM").unwrap();
        let mut buf = BytesMut::new();
        name.compose_canonical(&mut buf);
        assert_eq!(buf.as_ref(), b"\x07example\x03com\x00".as_slice());
    }
}

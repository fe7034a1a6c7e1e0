//! The header of a DNS message.

use super::iana::{Opcode, Rcode};
use super::wire::{ParseError, Parser};
use bytes::BufMut;

//------------ Header --------------------------------------------------------

/// The first part of the header of a DNS message.
///
/// This type covers the transaction id and the flags and code fields, the
/// first four octets of the wire format header. The four section counts
/// that follow on the wire are not kept here; [`Message`] derives them
/// from the lengths of its sections.
///
/// [`Message`]: super::message::Message
///
/// The field layout follows [RFC 1035], section 4.1.1:
///
/// ```text
///                                 1  1  1  1  1  1
///   0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      ID                       |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |QR|   Opcode  |AA|TC|RD|RA|   Z    |   RCODE   |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
///
/// [RFC 1035]: https://tools.ietf.org/html/rfc1035
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Header {
    /// The wire format octets of the id and flags fields.
    inner: [u8; 4],
}

impl Header {
    /// Creates a new header with all fields zero.
    pub fn new() -> Self {
        Default::default()
    }

    /// Parses the header from the beginning of a message.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let mut inner = [0u8; 4];
        for octet in inner.iter_mut() {
            *octet = parser.parse_u8()?;
        }
        Ok(Header { inner })
    }

    /// Appends the wire format of the header to `buf`.
    pub fn compose<B: BufMut>(&self, buf: &mut B) {
        buf.put_slice(&self.inner)
    }

    /// Returns the transaction id.
    ///
    /// The id is chosen by the originator of a query and copied into the
    /// response, letting the querier match up replies.
    pub fn id(&self) -> u16 {
        u16::from_be_bytes([self.inner[0], self.inner[1]])
    }

    /// Sets the transaction id.
    pub fn set_id(&mut self, id: u16) {
        self.inner[..2].copy_from_slice(&id.to_be_bytes())
    }

    /// Sets the transaction id to a randomly chosen number.
    pub fn set_random_id(&mut self) {
        self.set_id(::rand::random())
    }

    /// Returns whether the message is a response.
    pub fn qr(&self) -> bool {
        self.get_bit(2, 7)
    }

    /// Sets whether the message is a response.
    pub fn set_qr(&mut self, set: bool) {
        self.set_bit(2, 7, set)
    }

    /// Returns the opcode, the kind of query the message carries.
    pub fn opcode(&self) -> Opcode {
        Opcode::from_int((self.inner[2] >> 3) & 0x0F)
    }

    /// Sets the opcode.
    pub fn set_opcode(&mut self, opcode: Opcode) {
        self.inner[2] = (self.inner[2] & 0x87) | ((opcode.to_int() & 0x0F) << 3);
    }

    /// Returns whether the answer is authoritative.
    pub fn aa(&self) -> bool {
        self.get_bit(2, 2)
    }

    /// Sets whether the answer is authoritative.
    pub fn set_aa(&mut self, set: bool) {
        self.set_bit(2, 2, set)
    }

    /// Returns whether the message was truncated.
    pub fn tc(&self) -> bool {
        self.get_bit(2, 1)
    }

    /// Sets whether the message was truncated.
    pub fn set_tc(&mut self, set: bool) {
        self.set_bit(2, 1, set)
    }

    /// Returns whether recursion is desired.
    pub fn rd(&self) -> bool {
        self.get_bit(2, 0)
    }

    /// Sets whether recursion is desired.
    pub fn set_rd(&mut self, set: bool) {
        self.set_bit(2, 0, set)
    }

    /// Returns whether recursion is available.
    pub fn ra(&self) -> bool {
        self.get_bit(3, 7)
    }

    /// Sets whether recursion is available.
    pub fn set_ra(&mut self, set: bool) {
        self.set_bit(3, 7, set)
    }

    /// Returns the response code.
    pub fn rcode(&self) -> Rcode {
        Rcode::from_int(self.inner[3] & 0x0F)
    }

    /// Sets the response code.
    pub fn set_rcode(&mut self, rcode: Rcode) {
        self.inner[3] = (self.inner[3] & 0xF0) | (rcode.to_int() & 0x0F);
    }

    /// Returns the value of the bit at the given position.
    fn get_bit(&self, offset: usize, bit: usize) -> bool {
        self.inner[offset] & (1 << bit) != 0
    }

    /// Sets or resets the bit at the given position.
    fn set_bit(&mut self, offset: usize, bit: usize, set: bool) {
        if set {
            self.inner[offset] |= 1 << bit
        } else {
            self.inner[offset] &= !(1 << bit)
        }
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn id() {
        let mut header = Header::new();
        header.set_id(0x1234);
        assert_eq!(header.id(), 0x1234);
        assert_eq!(header.inner, [0x12, 0x34, 0, 0]);
    }

    #[test]
    fn flags() {
        let mut header = Header::new();
        header.set_qr(true);
        header.set_aa(true);
        header.set_rd(true);
        assert_eq!(header.inner[2], 0x85);
        assert!(header.qr());
        assert!(header.aa());
        assert!(!header.tc());
        header.set_qr(false);
        assert!(!header.qr());
    }

    #[test]
    fn opcode_and_rcode() {
        let mut header = Header::new();
        header.set_opcode(Opcode::NOTIFY);
        header.set_rcode(Rcode::REFUSED);
        assert_eq!(header.opcode(), Opcode::NOTIFY);
        assert_eq!(header.rcode(), Rcode::REFUSED);
        assert_eq!(header.inner[2], 0x20);
        assert_eq!(header.inner[3], 0x05);
    }

    #[test]
    fn parse_and_compose() {
        let octets = [0xDE, 0xAD, 0x85, 0x00];
        let mut parser = Parser::from_octets(&octets);
        let header = Header::parse(&mut parser).unwrap();
        assert_eq!(header.id(), 0xDEAD);
        assert!(header.qr());
        let mut buf = bytes::BytesMut::new();
        header.compose(&mut buf);
        assert_eq!(buf.as_ref(), octets.as_slice());
    }
}

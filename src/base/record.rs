//! Resource records.

use super::iana::{Class, Rtype};
use super::name::Name;
use super::rdata::{RecordData, Soa, Tsig};
use super::wire::{ParseError, Parser};
use bytes::BufMut;
use std::fmt;

//------------ Record --------------------------------------------------------

/// A resource record.
///
/// Records travel through a zone transfer in the answer section of its
/// messages. The engine only looks at the owner, type, and data of SOA and
/// TSIG records; all other data stays opaque.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    /// The owner name of the record.
    owner: Name,

    /// The type of the record.
    rtype: Rtype,

    /// The class of the record.
    class: Class,

    /// The time this record may be cached.
    ttl: u32,

    /// The data of the record.
    data: RecordData,
}

impl Record {
    /// Creates a new record from its components.
    pub fn new(
        owner: Name,
        rtype: Rtype,
        class: Class,
        ttl: u32,
        data: RecordData,
    ) -> Self {
        Record {
            owner,
            rtype,
            class,
            ttl,
            data,
        }
    }

    /// Returns the owner name of the record.
    pub fn owner(&self) -> &Name {
        &self.owner
    }

    /// Returns the type of the record.
    pub fn rtype(&self) -> Rtype {
        self.rtype
    }

    /// Returns the class of the record.
    pub fn class(&self) -> Class {
        self.class
    }

    /// Returns the TTL of the record.
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Returns the data of the record.
    pub fn data(&self) -> &RecordData {
        &self.data
    }

    /// Returns the SOA record data if this is a SOA record.
    pub fn as_soa(&self) -> Option<&Soa> {
        match &self.data {
            RecordData::Soa(soa) => Some(soa),
            _ => None,
        }
    }

    /// Returns the TSIG record data if this is a TSIG record.
    pub fn as_tsig(&self) -> Option<&Tsig> {
        match &self.data {
            RecordData::Tsig(tsig) => Some(tsig),
            _ => None,
        }
    }

    /// Parses a record from the beginning of `parser`.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let owner = Name::parse(parser)?;
        let rtype = Rtype::from_int(parser.parse_u16_be()?);
        let class = Class::from_int(parser.parse_u16_be()?);
        let ttl = parser.parse_u32_be()?;
        let rdlen = parser.parse_u16_be()?;
        let data = RecordData::parse(rtype, rdlen.into(), parser)?;
        Ok(Record {
            owner,
            rtype,
            class,
            ttl,
            data,
        })
    }

    /// Appends the wire format of the record to `buf`.
    ///
    /// The length of the record data is patched in after composing it.
    pub fn compose(&self, buf: &mut bytes::BytesMut) {
        self.owner.compose(buf);
        buf.put_u16(self.rtype.to_int());
        buf.put_u16(self.class.to_int());
        buf.put_u32(self.ttl);
        buf.put_u16(0);
        let start = buf.len();
        self.data.compose(buf);
        let rdlen = buf.len() - start;
        debug_assert!(rdlen <= usize::from(u16::MAX));
        buf[start - 2..start].copy_from_slice(&(rdlen as u16).to_be_bytes());
    }
}

//--- Display

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.owner, self.ttl, self.class, self.rtype
        )
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::super::serial::Serial;
    use super::*;
    use bytes::{Bytes, BytesMut};
    use std::str::FromStr;

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    #[test]
    fn round_trip_soa() {
        let record = Record::new(
            name("example.com"),
            Rtype::SOA,
            Class::IN,
            3600,
            RecordData::Soa(Soa::new(
                name("ns.example.com"),
                name("hostmaster.example.com"),
                Serial(7),
                10800,
                3600,
                604800,
                3600,
            )),
        );
        let mut buf = BytesMut::new();
        record.compose(&mut buf);
        let mut parser = Parser::from_octets(&buf);
        assert_eq!(Record::parse(&mut parser).unwrap(), record);
        assert_eq!(parser.remaining(), 0);
    }

    #[test]
    fn round_trip_opaque() {
        let record = Record::new(
            name("www.example.com"),
            Rtype::A,
            Class::IN,
            300,
            RecordData::Other(Bytes::from_static(&[192, 0, 2, 1])),
        );
        let mut buf = BytesMut::new();
        record.compose(&mut buf);
        let mut parser = Parser::from_octets(&buf);
        assert_eq!(Record::parse(&mut parser).unwrap(), record);
    }

    #[test]
    fn rdlen_is_patched() {
        let record = Record::new(
            name("www.example.com"),
            Rtype::A,
            Class::IN,
            300,
            RecordData::Other(Bytes::from_static(&[192, 0, 2, 1])),
        );
        let mut buf = BytesMut::new();
        record.compose(&mut buf);
        // owner (17) + type (2) + class (2) + ttl (4) = 25; rdlen follows.
        assert_eq!(&buf[25..27], &[0, 4]);
    }

    #[test]
    fn short_rdata_is_an_error() {
        let record = Record::new(
            name("www.example.com"),
            Rtype::A,
            Class::IN,
            300,
            RecordData::Other(Bytes::from_static(&[192, 0, 2, 1])),
        );
        let mut buf = BytesMut::new();
        record.compose(&mut buf);
        let truncated = &buf[..buf.len() - 1];
        let mut parser = Parser::from_octets(truncated);
        assert!(Record::parse(&mut parser).is_err());
    }
}

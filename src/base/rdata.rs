//! Record data.
//!
//! Zone transfers only ever interpret two kinds of record data: SOA
//! records frame a transfer and carry the zone serial, and TSIG records
//! authenticate messages. Everything else travels through the engine as
//! opaque octets, which is all a transfer needs.

use super::iana::{Rtype, TsigRcode};
use super::name::Name;
use super::serial::Serial;
use super::wire::{ParseError, Parser};
use bytes::{BufMut, Bytes};
use std::time::{SystemTime, UNIX_EPOCH};

//------------ RecordData ----------------------------------------------------

/// The data of a resource record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RecordData {
    /// The data of a SOA record.
    Soa(Soa),

    /// The data of a TSIG record.
    Tsig(Tsig),

    /// The unparsed data of any other record type.
    Other(Bytes),
}

impl RecordData {
    /// Parses record data of the given type and length.
    pub fn parse(
        rtype: Rtype,
        rdlen: usize,
        parser: &mut Parser,
    ) -> Result<Self, ParseError> {
        parser.parse_block(rdlen, |parser| match rtype {
            Rtype::SOA => Soa::parse(parser).map(RecordData::Soa),
            Rtype::TSIG => Tsig::parse(parser).map(RecordData::Tsig),
            _ => parser
                .parse_octets(parser.remaining())
                .map(RecordData::Other),
        })
    }

    /// Appends the wire format of the record data to `buf`.
    pub fn compose<B: BufMut>(&self, buf: &mut B) {
        match self {
            RecordData::Soa(soa) => soa.compose(buf),
            RecordData::Tsig(tsig) => tsig.compose(buf),
            RecordData::Other(octets) => buf.put_slice(octets),
        }
    }
}

//------------ Soa -----------------------------------------------------------

/// The data of a SOA record ([RFC 1035], section 3.3.13).
///
/// The start of authority record marks the apex of a zone. Its serial
/// field versions the zone's content, and in zone transfers the record
/// doubles as the start and end marker of the record stream.
///
/// [RFC 1035]: https://tools.ietf.org/html/rfc1035
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Soa {
    /// The name of the zone's primary server.
    mname: Name,

    /// The mailbox of the person responsible for the zone.
    rname: Name,

    /// The version number of the zone.
    serial: Serial,

    /// The number of seconds between refresh attempts.
    refresh: u32,

    /// The number of seconds between retries of failed refreshes.
    retry: u32,

    /// The number of seconds after which the zone expires.
    expire: u32,

    /// The minimum TTL, used for negative caching.
    minimum: u32,
}

impl Soa {
    /// Creates new SOA record data from its components.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mname: Name,
        rname: Name,
        serial: Serial,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    ) -> Self {
        Soa {
            mname,
            rname,
            serial,
            refresh,
            retry,
            expire,
            minimum,
        }
    }

    /// Returns the name of the zone's primary server.
    pub fn mname(&self) -> &Name {
        &self.mname
    }

    /// Returns the mailbox of the person responsible for the zone.
    pub fn rname(&self) -> &Name {
        &self.rname
    }

    /// Returns the serial number of the zone.
    pub fn serial(&self) -> Serial {
        self.serial
    }

    /// Returns the refresh interval in seconds.
    pub fn refresh(&self) -> u32 {
        self.refresh
    }

    /// Returns the retry interval in seconds.
    pub fn retry(&self) -> u32 {
        self.retry
    }

    /// Returns the expire interval in seconds.
    pub fn expire(&self) -> u32 {
        self.expire
    }

    /// Returns the minimum TTL.
    pub fn minimum(&self) -> u32 {
        self.minimum
    }

    /// Parses SOA record data.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        Ok(Soa {
            mname: Name::parse(parser)?,
            rname: Name::parse(parser)?,
            serial: Serial(parser.parse_u32_be()?),
            refresh: parser.parse_u32_be()?,
            retry: parser.parse_u32_be()?,
            expire: parser.parse_u32_be()?,
            minimum: parser.parse_u32_be()?,
        })
    }

    /// Appends the wire format of the record data to `buf`.
    pub fn compose<B: BufMut>(&self, buf: &mut B) {
        self.mname.compose(buf);
        self.rname.compose(buf);
        buf.put_u32(self.serial.into_int());
        buf.put_u32(self.refresh);
        buf.put_u32(self.retry);
        buf.put_u32(self.expire);
        buf.put_u32(self.minimum);
    }
}

//------------ Tsig ----------------------------------------------------------

/// The data of a TSIG record ([RFC 2845]).
///
/// TSIG records are appended as the last record of the additional section
/// of a message to carry its signature. They never appear in zone data.
///
/// [RFC 2845]: https://tools.ietf.org/html/rfc2845
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Tsig {
    /// The name of the algorithm in domain name form.
    algorithm: Name,

    /// The time the signature was created.
    time_signed: Time48,

    /// The number of seconds the time may be off in either direction.
    fudge: u16,

    /// The message authentication code.
    mac: Bytes,

    /// The original id of the message before signing.
    original_id: u16,

    /// The TSIG error field of a response.
    error: TsigRcode,

    /// The other data field.
    ///
    /// Only used in BADTIME responses, where it carries the server's
    /// notion of the current time.
    other: Bytes,
}

impl Tsig {
    /// Creates new TSIG record data from its components.
    pub fn new(
        algorithm: Name,
        time_signed: Time48,
        fudge: u16,
        mac: Bytes,
        original_id: u16,
        error: TsigRcode,
        other: Bytes,
    ) -> Self {
        Tsig {
            algorithm,
            time_signed,
            fudge,
            mac,
            original_id,
            error,
            other,
        }
    }

    /// Returns the name of the algorithm.
    pub fn algorithm(&self) -> &Name {
        &self.algorithm
    }

    /// Returns the time the signature was created.
    pub fn time_signed(&self) -> Time48 {
        self.time_signed
    }

    /// Returns the permitted clock skew in seconds.
    pub fn fudge(&self) -> u16 {
        self.fudge
    }

    /// Returns the message authentication code.
    pub fn mac(&self) -> &Bytes {
        &self.mac
    }

    /// Returns the original message id.
    pub fn original_id(&self) -> u16 {
        self.original_id
    }

    /// Returns the TSIG error field.
    pub fn error(&self) -> TsigRcode {
        self.error
    }

    /// Returns the other data field.
    pub fn other(&self) -> &Bytes {
        &self.other
    }

    /// Parses TSIG record data.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let algorithm = Name::parse(parser)?;
        let time_signed = Time48::parse(parser)?;
        let fudge = parser.parse_u16_be()?;
        let mac_size = parser.parse_u16_be()?;
        let mac = parser.parse_octets(mac_size.into())?;
        let original_id = parser.parse_u16_be()?;
        let error = TsigRcode::from_int(parser.parse_u16_be()?);
        let other_len = parser.parse_u16_be()?;
        let other = parser.parse_octets(other_len.into())?;
        Ok(Tsig {
            algorithm,
            time_signed,
            fudge,
            mac,
            original_id,
            error,
            other,
        })
    }

    /// Appends the wire format of the record data to `buf`.
    pub fn compose<B: BufMut>(&self, buf: &mut B) {
        self.algorithm.compose(buf);
        buf.put_slice(&self.time_signed.into_octets());
        buf.put_u16(self.fudge);
        buf.put_u16(self.mac.len() as u16);
        buf.put_slice(&self.mac);
        buf.put_u16(self.original_id);
        buf.put_u16(self.error.to_int());
        buf.put_u16(self.other.len() as u16);
        buf.put_slice(&self.other);
    }
}

//------------ Time48 --------------------------------------------------------

/// A 48 bit number of seconds since the Unix epoch.
///
/// This is the representation of the TSIG time signed field. The upper 16
/// bits of the inner `u64` are always zero.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Time48(u64);

impl Time48 {
    /// Returns a value for the current time.
    pub fn now() -> Self {
        Self::from_u64(
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("system time before Unix epoch")
                .as_secs(),
        )
    }

    /// Creates a value from a `u64`, targeting its lower 48 bits.
    ///
    /// # Panics
    ///
    /// The function panics if the upper 16 bits of the value are not zero.
    pub fn from_u64(value: u64) -> Self {
        assert!(value & 0xFFFF_0000_0000_0000 == 0);
        Time48(value)
    }

    /// Returns the value as a raw integer.
    pub fn into_u64(self) -> u64 {
        self.0
    }

    /// Parses a value from its six octet wire format.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let mut value = 0u64;
        for _ in 0..6 {
            value = (value << 8) | u64::from(parser.parse_u8()?);
        }
        Ok(Time48(value))
    }

    /// Returns the six octet wire format of the value.
    pub fn into_octets(self) -> [u8; 6] {
        let mut res = [0u8; 6];
        res.copy_from_slice(&self.0.to_be_bytes()[2..]);
        res
    }

    /// Returns whether `other` lies within `fudge` seconds of `self`.
    pub fn eq_fudged(self, other: Self, fudge: u64) -> bool {
        self.0.saturating_sub(fudge) <= other.0
            && self.0.saturating_add(fudge) >= other.0
    }
}

//============ Tests =========================================================

//! The parameter values used by DNS.
//!
//! Only the small subset of the IANA registries that zone transfers touch
//! is defined here. Unknown values round-trip unharmed and display in the
//! generic notation of [RFC 3597].
//!
//! [RFC 3597]: https://tools.ietf.org/html/rfc3597

use std::fmt;

//------------ Rtype ---------------------------------------------------------

/// Resource record types.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Rtype(u16);

impl Rtype {
    /// A host address.
    pub const A: Rtype = Rtype(1);

    /// An authoritative name server.
    pub const NS: Rtype = Rtype(2);

    /// The canonical name for an alias.
    pub const CNAME: Rtype = Rtype(5);

    /// The start of a zone of authority.
    pub const SOA: Rtype = Rtype(6);

    /// Text strings.
    pub const TXT: Rtype = Rtype(16);

    /// An IPv6 host address.
    pub const AAAA: Rtype = Rtype(28);

    /// A transaction signature.
    pub const TSIG: Rtype = Rtype(250);

    /// An incremental zone transfer.
    pub const IXFR: Rtype = Rtype(251);

    /// A full zone transfer.
    pub const AXFR: Rtype = Rtype(252);

    /// All records a server has available.
    pub const ANY: Rtype = Rtype(255);

    /// Creates a record type from its integer value.
    pub const fn from_int(value: u16) -> Self {
        Rtype(value)
    }

    /// Returns the integer value of the record type.
    pub const fn to_int(self) -> u16 {
        self.0
    }
}

impl From<u16> for Rtype {
    fn from(value: u16) -> Self {
        Rtype(value)
    }
}

impl From<Rtype> for u16 {
    fn from(value: Rtype) -> Self {
        value.0
    }
}

impl fmt::Display for Rtype {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Rtype::A => f.write_str("A"),
            Rtype::NS => f.write_str("NS"),
            Rtype::CNAME => f.write_str("CNAME"),
            Rtype::SOA => f.write_str("SOA"),
            Rtype::TXT => f.write_str("TXT"),
            Rtype::AAAA => f.write_str("AAAA"),
            Rtype::TSIG => f.write_str("TSIG"),
            Rtype::IXFR => f.write_str("IXFR"),
            Rtype::AXFR => f.write_str("AXFR"),
            Rtype::ANY => f.write_str("ANY"),
            Rtype(value) => write!(f, "TYPE{}", value),
        }
    }
}

//------------ Class ---------------------------------------------------------

/// DNS class values.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Class(u16);

impl Class {
    /// The Internet class.
    pub const IN: Class = Class(1);

    /// The class for deleting records in dynamic updates.
    pub const NONE: Class = Class(254);

    /// Any class; used by TSIG records.
    pub const ANY: Class = Class(255);

    /// Creates a class from its integer value.
    pub const fn from_int(value: u16) -> Self {
        Class(value)
    }

    /// Returns the integer value of the class.
    pub const fn to_int(self) -> u16 {
        self.0
    }
}

impl From<u16> for Class {
    fn from(value: u16) -> Self {
        Class(value)
    }
}

impl From<Class> for u16 {
    fn from(value: Class) -> Self {
        value.0
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Class::IN => f.write_str("IN"),
            Class::NONE => f.write_str("NONE"),
            Class::ANY => f.write_str("ANY"),
            Class(value) => write!(f, "CLASS{}", value),
        }
    }
}

//------------ Opcode --------------------------------------------------------

/// DNS message opcodes.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Opcode(u8);

impl Opcode {
    /// A standard query.
    pub const QUERY: Opcode = Opcode(0);

    /// A zone change notification.
    pub const NOTIFY: Opcode = Opcode(4);

    /// A dynamic update.
    pub const UPDATE: Opcode = Opcode(5);

    /// Creates an opcode from its integer value.
    pub const fn from_int(value: u8) -> Self {
        Opcode(value)
    }

    /// Returns the integer value of the opcode.
    pub const fn to_int(self) -> u8 {
        self.0
    }
}

impl From<u8> for Opcode {
    fn from(value: u8) -> Self {
        Opcode(value)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Opcode::QUERY => f.write_str("QUERY"),
            Opcode::NOTIFY => f.write_str("NOTIFY"),
            Opcode::UPDATE => f.write_str("UPDATE"),
            Opcode(value) => write!(f, "OPCODE{}", value),
        }
    }
}

//------------ Rcode ---------------------------------------------------------

/// DNS response codes.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Rcode(u8);

impl Rcode {
    /// No error condition.
    pub const NOERROR: Rcode = Rcode(0);

    /// The server was unable to interpret the query.
    pub const FORMERR: Rcode = Rcode(1);

    /// The server encountered an internal problem.
    pub const SERVFAIL: Rcode = Rcode(2);

    /// The queried domain name does not exist.
    pub const NXDOMAIN: Rcode = Rcode(3);

    /// The requested kind of query is not supported.
    pub const NOTIMP: Rcode = Rcode(4);

    /// The server refuses to perform the operation.
    pub const REFUSED: Rcode = Rcode(5);

    /// The server is not authoritative for the zone.
    pub const NOTAUTH: Rcode = Rcode(9);

    /// Creates a response code from its integer value.
    ///
    /// Only the lower four bits of `value` are used.
    pub const fn from_int(value: u8) -> Self {
        Rcode(value & 0x0F)
    }

    /// Returns the integer value of the response code.
    pub const fn to_int(self) -> u8 {
        self.0
    }
}

impl From<u8> for Rcode {
    fn from(value: u8) -> Self {
        Rcode::from_int(value)
    }
}

impl fmt::Display for Rcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Rcode::NOERROR => f.write_str("NOERROR"),
            Rcode::FORMERR => f.write_str("FORMERR"),
            Rcode::SERVFAIL => f.write_str("SERVFAIL"),
            Rcode::NXDOMAIN => f.write_str("NXDOMAIN"),
            Rcode::NOTIMP => f.write_str("NOTIMP"),
            Rcode::REFUSED => f.write_str("REFUSED"),
            Rcode::NOTAUTH => f.write_str("NOTAUTH"),
            Rcode(value) => write!(f, "RCODE{}", value),
        }
    }
}

//------------ TsigRcode -----------------------------------------------------

/// Response codes for the TSIG record's error field.
///
/// These are 16 bits wide and extend the message response codes with the
/// TSIG specific values of [RFC 2845].
///
/// [RFC 2845]: https://tools.ietf.org/html/rfc2845
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TsigRcode(u16);

impl TsigRcode {
    /// No error condition.
    pub const NOERROR: TsigRcode = TsigRcode(0);

    /// The message signature did not verify.
    pub const BADSIG: TsigRcode = TsigRcode(16);

    /// The key used for signing is not recognized.
    pub const BADKEY: TsigRcode = TsigRcode(17);

    /// The signing time was outside the allowed window.
    pub const BADTIME: TsigRcode = TsigRcode(18);

    /// Creates a TSIG response code from its integer value.
    pub const fn from_int(value: u16) -> Self {
        TsigRcode(value)
    }

    /// Returns the integer value of the response code.
    pub const fn to_int(self) -> u16 {
        self.0
    }
}

impl From<u16> for TsigRcode {
    fn from(value: u16) -> Self {
        TsigRcode(value)
    }
}

impl fmt::Display for TsigRcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            TsigRcode::NOERROR => f.write_str("NOERROR"),
            TsigRcode::BADSIG => f.write_str("BADSIG"),
            TsigRcode::BADKEY => f.write_str("BADKEY"),
            TsigRcode::BADTIME => f.write_str("BADTIME"),
            TsigRcode(value) => write!(f, "RCODE{}", value),
        }
    }
}

//============ Tests =========================================================

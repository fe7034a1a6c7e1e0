//! The basic building blocks of the DNS.
//!
//! This module provides the fundamental types for dealing with DNS data
//! as far as zone transfers need them: domain names, the message header,
//! questions, records, and the record data of the SOA and TSIG types.
//! The transfer machinery in [`net`][crate::net] is built from these.
//!
//! Most types are re-exported at the module level, so glob importing the
//! module gets you everything in one go.

//--- Re-exports

pub use self::header::Header;
pub use self::iana::{Class, Opcode, Rcode, Rtype, TsigRcode};
pub use self::message::Message;
pub use self::name::{Name, NameError};
pub use self::question::Question;
pub use self::rdata::{RecordData, Soa, Time48, Tsig};
pub use self::record::Record;
pub use self::serial::Serial;
pub use self::wire::{FormError, ParseError, Parser};

//--- Modules

pub mod header;
pub mod iana;
pub mod message;
pub mod name;
pub mod question;
pub mod rdata;
pub mod record;
pub mod serial;
pub mod wire;

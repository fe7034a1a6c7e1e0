//! Asynchronous DNS zone transfers.
//!
//! This crate implements the DNS zone transfer protocols on top of the
//! [Tokio](https://tokio.rs/) async runtime: full transfers, known as
//! AXFR and defined in [RFC 5936], incremental transfers, known as IXFR
//! and defined in [RFC 1995], and TSIG authentication of whole transfer
//! sequences as defined in [RFC 2845]. It serves both sides of the
//! exchange, fetching zones from a remote primary as well as answering
//! transfer queries out of a local zone source.
//!
//! # Modules
//!
//! * [base] provides the DNS data types transfers are made of: domain
//!   names, messages, questions, records, and the record data of the
//!   SOA and TSIG types.
//! * [net] moves DNS messages over stream transports and contains the
//!   transfer engines in [net::xfr], the main module of the crate.
//! * [tsig] signs and verifies individual messages and is used by the
//!   transfer engines to authenticate whole sequences.
//!
//! The type to start with is [`net::xfr::Transfer`]. It begins incoming
//! transfers, delivering the received records as an async stream, and
//! answers transfer queries from a record stream a producer supplies.
//!
//! [RFC 1995]: https://tools.ietf.org/html/rfc1995
//! [RFC 2845]: https://tools.ietf.org/html/rfc2845
//! [RFC 5936]: https://tools.ietf.org/html/rfc5936

pub mod base;
pub mod net;
pub mod tsig;

mod utils;

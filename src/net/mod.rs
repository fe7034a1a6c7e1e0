//! Sending and receiving DNS messages.
//!
//! The [`conn`] module moves single messages over stream transports. The
//! [`xfr`] module builds the zone transfer protocol on top of it.

pub mod conn;
pub mod xfr;

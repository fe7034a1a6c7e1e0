//! Zone transfers.
//!
//! Zone transfers replicate the content of a DNS zone between servers.
//! A full transfer, AXFR, defined in [RFC 5936], carries every record of
//! the zone framed by its SOA record. An incremental transfer, IXFR,
//! defined in [RFC 1995], carries only the changes since the zone serial
//! the client presents in its query. Either way, the response is a
//! sequence of messages over one stream connection, optionally
//! authenticated end to end with TSIG.
//!
//! The central type of the module is [`Transfer`]. It holds the
//! [`Config`] with timeouts and TSIG secrets and starts transfers in
//! both directions:
//!
//! * [`Transfer::begin`] sends a transfer query and returns an
//!   [`EnvelopeStream`] delivering the records of the response sequence
//!   as they arrive, one [`Envelope`] per message.
//! * [`Transfer::answer`] answers a received transfer query by draining
//!   a producer supplied envelope source into a reply sequence through a
//!   [`ResponseWriter`].
//!
//! Both directions run as a background task owning the connection and,
//! for authenticated transfers, the TSIG chain state of the whole
//! exchange. The envelope handoff is a bounded channel of capacity one,
//! so a slow consumer throttles the transfer to its own pace instead of
//! buffering the zone in memory.
//!
//! # Example
//!
//! Fetching a zone from a primary server:
//!
//! ```no_run
//! use std::str::FromStr;
//! use zonexfr::base::{Message, Name};
//! use zonexfr::net::xfr::{Config, Transfer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transfer = Transfer::new(Config::new());
//!     let query = Message::axfr_query(Name::from_str("example.com")?);
//!     let mut stream = transfer.begin(query, "192.0.2.1:53".parse()?).await?;
//!     while let Some(envelope) = stream.recv().await {
//!         if let Some(err) = envelope.error() {
//!             return Err(err.to_string().into());
//!         }
//!         for record in envelope.records() {
//!             println!("{}", record);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! [RFC 1995]: https://tools.ietf.org/html/rfc1995
//! [RFC 5936]: https://tools.ietf.org/html/rfc5936

mod channel;
mod config;
mod envelope;
mod error;
mod inbound;
mod outbound;

pub use self::channel::Channel;
pub use self::config::{Config, SecretError};
pub use self::envelope::{Envelope, EnvelopeStream};
pub use self::error::Error;
pub use self::outbound::{
    OutboundTransfer, ResponseWriter, StreamResponseWriter,
};

#[cfg(test)]
mod tests;

//------------ Transfer ------------------------------------------------------

/// Zone transfer parameters.
///
/// A value of this type carries the configuration transfers run with.
/// It is cheap to clone and can be reused for any number of transfers.
#[derive(Clone, Debug, Default)]
pub struct Transfer {
    /// The transfer configuration.
    config: Config,
}

impl Transfer {
    /// Creates a new value from a configuration.
    pub fn new(config: Config) -> Self {
        Transfer { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

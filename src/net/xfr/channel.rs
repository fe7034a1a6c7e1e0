//! The message channel of a transfer connection.

use super::config::Config;
use super::error::Error;
use crate::base::message::Message;
use crate::base::rdata::Time48;
use crate::net::conn::StreamConn;
use crate::tsig;
use bytes::Bytes;
use std::io;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::trace;

//------------ Channel -------------------------------------------------------

/// A connection that reads and writes whole DNS messages.
///
/// The channel wraps a stream transport and carries the TSIG state of the
/// connection: the MAC of the last signed message moving in either
/// direction and whether signatures have switched to the reduced form
/// that digests only the timers. Both ends of a transfer advance this
/// state in lockstep, which is what chains the signatures of the exchange
/// together.
///
/// Messages are signed on write when they carry a TSIG stub and a secret
/// is configured for the stub's key. Messages are verified on read when
/// they carry a TSIG record and any secrets are configured at all; an
/// unknown key name is an error then, an unsigned message is not.
#[derive(Debug)]
pub struct Channel<S> {
    /// The underlying transport.
    conn: StreamConn<S>,

    /// The transfer configuration.
    config: Config,

    /// The MAC of the last signed message on this connection.
    last_mac: Bytes,

    /// Whether signatures digest only the timer values.
    timers_only: bool,
}

impl<S> Channel<S> {
    /// Creates a channel on top of a transport.
    pub fn new(conn: StreamConn<S>, config: Config) -> Self {
        Channel {
            conn,
            config,
            last_mac: Bytes::new(),
            timers_only: false,
        }
    }

    /// Switches signatures to the reduced, timers only form.
    ///
    /// The switch is one way. Once an exchange has moved past its first
    /// signed response, it never goes back to full variables, so a
    /// `false` argument leaves an already switched channel alone.
    pub fn set_timers_only(&mut self, timers_only: bool) {
        self.timers_only = self.timers_only || timers_only;
    }

    /// Returns whether signatures digest only the timer values.
    pub fn timers_only(&self) -> bool {
        self.timers_only
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> Channel<S> {
    /// Reads the next message from the connection.
    ///
    /// If the message is signed and secrets are configured, the signature
    /// is verified and the chain state advanced.
    pub async fn read_msg(&mut self) -> Result<Message, Error> {
        let octets = self.conn.read_frame(self.config.read_timeout()).await?;
        let msg = Message::from_octets(&octets)?;
        if self.config.has_secrets() {
            if let Some((key_name, _)) = msg.tsig() {
                let secret = match self.config.secret(key_name) {
                    Some(secret) => secret,
                    None => {
                        return Err(Error::UnknownKey(key_name.clone()))
                    }
                };
                let mac = tsig::verify(
                    &octets,
                    secret,
                    &self.last_mac,
                    self.timers_only,
                    Time48::now(),
                )?;
                trace!(
                    "verified TSIG on message {:#06X}",
                    msg.header().id()
                );
                self.last_mac = mac;
            }
        }
        Ok(msg)
    }

    /// Writes a message to the connection.
    ///
    /// A TSIG stub on the message is replaced with a real signature if a
    /// secret is configured for its key. Without any configured secrets
    /// the stub is quietly dropped instead, so the same message building
    /// code serves authenticated and plain transfers.
    pub async fn write_msg(&mut self, msg: &Message) -> Result<(), Error> {
        let octets = match msg.tsig() {
            Some((key_name, _)) if self.config.has_secrets() => {
                let secret = match self.config.secret(key_name) {
                    Some(secret) => secret,
                    None => {
                        return Err(Error::UnknownKey(key_name.clone()))
                    }
                };
                let (octets, mac) = tsig::generate(
                    msg,
                    secret,
                    &self.last_mac,
                    self.timers_only,
                    Time48::now(),
                )?;
                trace!("signed message {:#06X}", msg.header().id());
                self.last_mac = mac;
                octets
            }
            Some(_) => {
                let mut msg = msg.clone();
                msg.take_tsig();
                msg.to_octets()
            }
            None => msg.to_octets(),
        };
        self.conn
            .write_frame(&octets, self.config.write_timeout())
            .await?;
        Ok(())
    }

    /// Shuts down the connection.
    pub async fn shutdown(&mut self) -> Result<(), io::Error> {
        self.conn.shutdown().await
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::name::Name;
    use std::str::FromStr;

    #[tokio::test]
    async fn write_rejects_unknown_keys() {
        let (stream, _other) = tokio::io::duplex(512);
        let mut config = Config::new();
        config
            .add_secret(
                Name::from_str("known.example.com").unwrap(),
                "c2VjcmV0IHNlY3JldA==",
            )
            .unwrap();
        let mut chan = Channel::new(StreamConn::new(stream), config);
        let mut query =
            Message::axfr_query(Name::from_str("example.com").unwrap());
        query.set_tsig(
            Name::from_str("other.example.com").unwrap(),
            tsig::Algorithm::Sha256.to_name(),
            0,
        );
        match chan.write_msg(&query).await {
            Err(Error::UnknownKey(name)) => {
                assert_eq!(
                    name,
                    Name::from_str("other.example.com").unwrap()
                );
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn timers_only_is_one_way() {
        let (stream, _other) = tokio::io::duplex(64);
        let mut chan = Channel::new(StreamConn::new(stream), Config::new());
        assert!(!chan.timers_only());
        chan.set_timers_only(false);
        assert!(!chan.timers_only());
        chan.set_timers_only(true);
        assert!(chan.timers_only());
        chan.set_timers_only(false);
        assert!(chan.timers_only());
    }
}

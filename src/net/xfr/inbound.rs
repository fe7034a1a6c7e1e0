//! Consuming zone transfers.
//!
//! This module implements the client side of a transfer: send the query,
//! then turn the response sequence into a stream of record envelopes
//! while watching for the conditions that end it.

use super::channel::Channel;
use super::envelope::{Envelope, EnvelopeStream};
use super::error::Error;
use super::Transfer;
use crate::base::iana::Rtype;
use crate::base::message::Message;
use crate::base::rdata::Soa;
use crate::base::record::Record;
use crate::base::serial::Serial;
use crate::net::conn::StreamConn;
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tracing::{debug, trace};

impl Transfer {
    /// Starts an incoming transfer with the server at `addr`.
    ///
    /// The query must carry a single AXFR or IXFR question, normally
    /// built via [`Message::axfr_query`] or [`Message::ixfr_query`]. If
    /// it also carries a TSIG stub and a secret is configured for the
    /// stub's key, the whole exchange is signed and verified.
    ///
    /// On success, the records of the transfer arrive on the returned
    /// stream grouped into one [`Envelope`] per response message. The
    /// stream ends after the envelope carrying the closing SOA record
    /// or, if the transfer fails along the way, after an envelope
    /// reporting the error. Dropping the stream early cancels the
    /// transfer and closes the connection.
    ///
    /// Returns an error directly if the question is not a transfer
    /// question or if the connection or the query itself fails.
    pub async fn begin(
        &self,
        query: Message,
        addr: SocketAddr,
    ) -> Result<EnvelopeStream, Error> {
        let qtype = transfer_qtype(&query)?;
        let conn =
            StreamConn::connect(addr, self.config().dial_timeout()).await?;
        self.start(qtype, query, conn).await
    }

    /// Starts an incoming transfer over an existing stream.
    ///
    /// This behaves like [`begin`][Self::begin] but runs the transfer
    /// over a connection the caller already holds.
    pub async fn begin_stream<S>(
        &self,
        query: Message,
        stream: S,
    ) -> Result<EnvelopeStream, Error>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let qtype = transfer_qtype(&query)?;
        self.start(qtype, query, StreamConn::new(stream)).await
    }

    /// Sends the query and spawns the engine driving the transfer.
    async fn start<S>(
        &self,
        qtype: Rtype,
        query: Message,
        conn: StreamConn<S>,
    ) -> Result<EnvelopeStream, Error>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let mut chan = Channel::new(conn, self.config().clone());
        chan.write_msg(&query).await?;
        let id = query.header().id();
        debug!("sent {} query {:#06X}", qtype, id);
        let (tx, rx) = mpsc::channel(1);
        if qtype == Rtype::AXFR {
            tokio::spawn(run_axfr(chan, id, tx));
        } else {
            tokio::spawn(run_ixfr(chan, id, tx));
        }
        Ok(EnvelopeStream::new(rx))
    }
}

//------------ Helper Functions ----------------------------------------------

/// Checks that a message is a transfer query and returns its type.
fn transfer_qtype(query: &Message) -> Result<Rtype, Error> {
    let question =
        query.sole_question().ok_or(Error::UnsupportedQuestion)?;
    match question.qtype() {
        Rtype::AXFR | Rtype::IXFR => Ok(question.qtype()),
        _ => Err(Error::UnsupportedQuestion),
    }
}

/// Returns the SOA leading the answer section, if any.
fn first_soa(msg: &Message) -> Option<&Soa> {
    msg.answer().first().and_then(Record::as_soa)
}

/// Returns the SOA closing the answer section, if any.
fn last_soa(msg: &Message) -> Option<&Soa> {
    msg.answer().last().and_then(Record::as_soa)
}

/// Runs the client side of an AXFR response sequence.
///
/// The first message must lead with the zone's SOA record. The sequence
/// ends with the message whose answer section closes with a SOA record,
/// the same one repeated.
async fn run_axfr<S>(
    mut chan: Channel<S>,
    id: u16,
    tx: mpsc::Sender<Envelope>,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut first = true;
    loop {
        let msg = tokio::select! {
            res = chan.read_msg() => match res {
                Ok(msg) => msg,
                Err(err) => {
                    finish(chan, tx, Envelope::failed(Vec::new(), err))
                        .await;
                    return;
                }
            },
            _ = tx.closed() => {
                cancel(chan).await;
                return;
            }
        };
        if msg.header().id() != id {
            finish(
                chan,
                tx,
                Envelope::failed(msg.into_answer(), Error::IdMismatch),
            )
            .await;
            return;
        }
        if first {
            if first_soa(&msg).is_none() {
                finish(
                    chan,
                    tx,
                    Envelope::failed(msg.into_answer(), Error::MissingSoa),
                )
                .await;
                return;
            }
            first = false;
            // A first message of just the SOA means more are coming.
            if msg.answer().len() == 1 {
                chan.set_timers_only(true);
                if tx.send(Envelope::new(msg.into_answer())).await.is_err()
                {
                    cancel(chan).await;
                    return;
                }
                continue;
            }
        }
        chan.set_timers_only(true);
        if last_soa(&msg).is_some() {
            finish(chan, tx, Envelope::new(msg.into_answer())).await;
            return;
        }
        if tx.send(Envelope::new(msg.into_answer())).await.is_err() {
            cancel(chan).await;
            return;
        }
    }
}

/// Runs the client side of an IXFR response sequence.
///
/// The serial of the first SOA seen is the server's current serial. The
/// sequence ends with the message whose answer section closes with a SOA
/// record carrying that serial again. A first message of a single SOA
/// record means the client is already up to date.
async fn run_ixfr<S>(
    mut chan: Channel<S>,
    id: u16,
    tx: mpsc::Sender<Envelope>,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut serial = Serial(0);
    let mut first = true;
    loop {
        let msg = tokio::select! {
            res = chan.read_msg() => match res {
                Ok(msg) => msg,
                Err(err) => {
                    finish(chan, tx, Envelope::failed(Vec::new(), err))
                        .await;
                    return;
                }
            },
            _ = tx.closed() => {
                cancel(chan).await;
                return;
            }
        };
        if msg.header().id() != id {
            finish(
                chan,
                tx,
                Envelope::failed(msg.into_answer(), Error::IdMismatch),
            )
            .await;
            return;
        }
        if first {
            let first_serial = first_soa(&msg).map(Soa::serial);
            if msg.answer().len() == 1 && first_serial.is_some() {
                finish(chan, tx, Envelope::new(msg.into_answer())).await;
                return;
            }
            serial = match first_serial {
                Some(serial) => serial,
                None => {
                    finish(
                        chan,
                        tx,
                        Envelope::failed(
                            msg.into_answer(),
                            Error::MissingSoa,
                        ),
                    )
                    .await;
                    return;
                }
            };
            first = false;
        }
        chan.set_timers_only(true);
        if last_soa(&msg).map(Soa::serial) == Some(serial) {
            finish(chan, tx, Envelope::new(msg.into_answer())).await;
            return;
        }
        if tx.send(Envelope::new(msg.into_answer())).await.is_err() {
            cancel(chan).await;
            return;
        }
    }
}

/// Delivers the final envelope of a transfer and closes the connection.
async fn finish<S>(
    mut chan: Channel<S>,
    tx: mpsc::Sender<Envelope>,
    envelope: Envelope,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if let Err(failed) = tx.send(envelope).await {
        if let Some(err) = failed.0.error() {
            debug!("transfer failed with nobody listening: {}", err);
        }
    }
    if let Err(err) = chan.shutdown().await {
        debug!("shutdown after transfer failed: {}", err);
    }
}

/// Closes the connection of a transfer the consumer walked away from.
async fn cancel<S>(mut chan: Channel<S>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    trace!("transfer cancelled by consumer");
    if let Err(err) = chan.shutdown().await {
        debug!("shutdown after cancel failed: {}", err);
    }
}

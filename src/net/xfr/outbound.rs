//! Producing zone transfers.
//!
//! This module implements the server side of a transfer: turn a stream
//! of record envelopes supplied by the zone producer into the response
//! sequence answering a transfer query. The producer decides the record
//! order, conventionally the opening SOA, the data, and the closing SOA.

use super::channel::Channel;
use super::envelope::Envelope;
use super::error::Error;
use super::Transfer;
use crate::base::message::Message;
use async_trait::async_trait;
use std::io;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

//------------ ResponseWriter ------------------------------------------------

/// A sink for the reply messages of a transfer.
///
/// The outbound engine writes its replies through this trait so servers
/// can put their own connection handling behind it. The engine never
/// closes the connection; when its task completes, the writer comes back
/// to the caller through [`OutboundTransfer::join`] for whatever the
/// connection carries next.
#[async_trait]
pub trait ResponseWriter: Send {
    /// Writes one reply message.
    async fn write_msg(&mut self, msg: &Message) -> Result<(), Error>;

    /// Switches signing to the reduced, timers only form.
    fn set_timers_only(&mut self, timers_only: bool);
}

//------------ StreamResponseWriter ------------------------------------------

/// A response writer on top of a message channel.
///
/// Replies are signed by the channel when they carry a TSIG stub and a
/// secret is configured. After each successful write the writer switches
/// the channel to timers only signing, so the first reply of a sequence
/// is signed over the full TSIG variables and every later one over just
/// the timers.
#[derive(Debug)]
pub struct StreamResponseWriter<S> {
    /// The channel replies go out on.
    chan: Channel<S>,
}

impl<S> StreamResponseWriter<S> {
    /// Creates a writer on top of a channel.
    pub fn new(chan: Channel<S>) -> Self {
        StreamResponseWriter { chan }
    }

    /// Converts the writer back into its channel.
    pub fn into_inner(self) -> Channel<S> {
        self.chan
    }
}

#[async_trait]
impl<S> ResponseWriter for StreamResponseWriter<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn write_msg(&mut self, msg: &Message) -> Result<(), Error> {
        self.chan.write_msg(msg).await?;
        self.chan.set_timers_only(true);
        Ok(())
    }

    fn set_timers_only(&mut self, timers_only: bool) {
        self.chan.set_timers_only(timers_only)
    }
}

//------------ OutboundTransfer ----------------------------------------------

/// A handle on a running outgoing transfer.
#[derive(Debug)]
pub struct OutboundTransfer<W> {
    /// The task draining the producer's envelopes.
    handle: JoinHandle<(W, Result<(), Error>)>,
}

impl<W> OutboundTransfer<W> {
    /// Waits for the transfer to complete.
    ///
    /// Returns the response writer so the caller can keep using the
    /// connection, or the error that ended the reply sequence early.
    pub async fn join(self) -> Result<W, Error> {
        match self.handle.await {
            Ok((writer, Ok(()))) => Ok(writer),
            Ok((_, Err(err))) => Err(err),
            Err(err) => Err(Error::Transport(io::Error::new(
                io::ErrorKind::Other,
                err,
            ))),
        }
    }
}

//--- Transfer

impl Transfer {
    /// Starts an outgoing transfer answering `query`.
    ///
    /// Builds an authoritative reply to the query and spawns a task that
    /// drains `source`. The records of each received envelope are added
    /// to the reply's answer section and the grown reply is written out
    /// as one message, so the producer controls the message boundaries
    /// through the envelopes it sends. If the query carries a TSIG
    /// record, the replies carry a stub for the same key, signing the
    /// response sequence on a signing writer.
    ///
    /// The reply sequence ends when the producer closes the sending end
    /// of `source`. Use [`OutboundTransfer::join`] to wait for that and
    /// get the writer back.
    pub fn answer<W>(
        &self,
        writer: W,
        query: &Message,
        source: mpsc::Receiver<Envelope>,
    ) -> OutboundTransfer<W>
    where
        W: ResponseWriter + 'static,
    {
        let mut reply = query.reply();
        reply.header_mut().set_aa(true);
        if let Some((key_name, tsig)) = query.tsig() {
            reply.set_tsig(
                key_name.clone(),
                tsig.algorithm().clone(),
                tsig.fudge(),
            );
        }
        OutboundTransfer {
            handle: tokio::spawn(drain(writer, reply, source)),
        }
    }
}

/// Drains the producer's envelopes into reply messages.
async fn drain<W: ResponseWriter>(
    mut writer: W,
    mut reply: Message,
    mut source: mpsc::Receiver<Envelope>,
) -> (W, Result<(), Error>) {
    while let Some(envelope) = source.recv().await {
        reply.answer_mut().extend(envelope.into_records());
        if let Err(err) = writer.write_msg(&reply).await {
            return (writer, Err(err));
        }
        trace!("wrote reply with {} answers", reply.answer().len());
    }
    writer.set_timers_only(true);
    reply.answer_mut().clear();
    (writer, Ok(()))
}

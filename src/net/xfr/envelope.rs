//! The units of a record stream.

use super::error::Error;
use crate::base::record::Record;
use futures_util::stream::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

//------------ Envelope ------------------------------------------------------

/// A batch of records from one message of a transfer.
///
/// The records of a transfer arrive split over response messages. Each
/// message becomes one envelope, so consumers can process records as they
/// come in rather than wait for the whole zone. An envelope carrying an
/// error is always the last one of its stream; the records that travelled
/// in the failed message ride along with it.
#[derive(Debug)]
pub struct Envelope {
    /// The records of the message.
    records: Vec<Record>,

    /// The error that ended the transfer, if any.
    error: Option<Error>,
}

impl Envelope {
    /// Creates an envelope carrying records.
    ///
    /// This is how a producer feeding an outgoing transfer shapes its
    /// messages. Each envelope becomes one reply message on the wire.
    pub fn new(records: Vec<Record>) -> Self {
        Envelope {
            records,
            error: None,
        }
    }

    /// Creates the final envelope of a failed transfer.
    pub(crate) fn failed(records: Vec<Record>, error: Error) -> Self {
        Envelope {
            records,
            error: Some(error),
        }
    }

    /// Returns the records of the envelope.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Converts the envelope into its records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Returns the error that ended the transfer, if any.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Returns whether the envelope reports a failed transfer.
    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }
}

//------------ EnvelopeStream ------------------------------------------------

/// The sequence of envelopes of one transfer.
///
/// The stream ends after the envelope holding the closing SOA record of a
/// successful transfer or after an envelope carrying an error. Dropping
/// the stream cancels the transfer and closes its connection.
///
/// The stream applies backpressure. The transfer machinery reads at most
/// one message ahead of the consumer, so a slow consumer slows the
/// network reads down rather than buffer the whole zone in memory.
#[derive(Debug)]
pub struct EnvelopeStream {
    /// The receiving end of the transfer task.
    rx: mpsc::Receiver<Envelope>,
}

impl EnvelopeStream {
    /// Creates a stream from the receiving end of a channel.
    pub(crate) fn new(rx: mpsc::Receiver<Envelope>) -> Self {
        EnvelopeStream { rx }
    }

    /// Receives the next envelope.
    ///
    /// Returns `None` after the final envelope of the transfer.
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.rx.recv().await
    }
}

//--- Stream

impl Stream for EnvelopeStream {
    type Item = Envelope;

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Envelope>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

//! Stream transports for DNS messages.
//!
//! DNS over a byte stream prefixes each message with a two octet, big
//! endian length shim as described in [RFC 1035] section 4.2.2.
//! [`StreamConn`] wraps any async byte stream and moves whole message
//! frames in and out, bounding every read and write with a deadline.
//! Zone transfers run over long lived connections as [RFC 7766]
//! recommends, so the connection stays open until shut down explicitly.
//!
//! [RFC 1035]: https://tools.ietf.org/html/rfc1035
//! [RFC 7766]: https://tools.ietf.org/html/rfc7766

use bytes::{BufMut, Bytes, BytesMut};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

//------------ Constants -----------------------------------------------------

/// The largest DNS message a stream transport can carry.
///
/// This is the largest length the two octet shim can express.
pub const MAX_MSG_LEN: usize = 65_535;

//------------ StreamConn ----------------------------------------------------

/// A DNS message transport over an async byte stream.
#[derive(Debug)]
pub struct StreamConn<S> {
    /// The underlying stream.
    stream: S,
}

impl StreamConn<TcpStream> {
    /// Opens a TCP connection to `addr`.
    ///
    /// Fails with [`io::ErrorKind::TimedOut`] if the connection doesn't
    /// come up within `timeout`.
    pub async fn connect(
        addr: SocketAddr,
        timeout: Duration,
    ) -> Result<Self, io::Error> {
        let stream = timed(timeout, "connect", TcpStream::connect(addr))
            .await??;
        Ok(Self::new(stream))
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> StreamConn<S> {
    /// Creates a transport on top of an existing stream.
    pub fn new(stream: S) -> Self {
        StreamConn { stream }
    }

    /// Reads a single message frame.
    ///
    /// Reads the length shim and then exactly that many octets. Both
    /// reads together must finish within `timeout`.
    pub async fn read_frame(
        &mut self,
        timeout: Duration,
    ) -> Result<Bytes, io::Error> {
        timed(timeout, "read", async {
            let mut shim = [0u8; 2];
            self.stream.read_exact(&mut shim).await?;
            let len = usize::from(u16::from_be_bytes(shim));
            let mut frame = vec![0u8; len];
            self.stream.read_exact(&mut frame).await?;
            Ok(Bytes::from(frame))
        })
        .await?
    }

    /// Writes a single message frame.
    ///
    /// The shim and the message go out in one write so a frame is never
    /// left half written when the deadline strikes between them.
    pub async fn write_frame(
        &mut self,
        octets: &[u8],
        timeout: Duration,
    ) -> Result<(), io::Error> {
        if octets.len() > MAX_MSG_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "message too long for stream transport",
            ));
        }
        let mut frame = BytesMut::with_capacity(octets.len() + 2);
        frame.put_u16(octets.len() as u16);
        frame.put_slice(octets);
        timed(timeout, "write", async {
            self.stream.write_all(&frame).await?;
            self.stream.flush().await
        })
        .await?
    }

    /// Shuts down the write direction of the stream.
    pub async fn shutdown(&mut self) -> Result<(), io::Error> {
        self.stream.shutdown().await
    }
}

//------------ Helper Functions ----------------------------------------------

/// Runs `op` under a deadline.
///
/// An elapsed deadline becomes a [`io::ErrorKind::TimedOut`] error naming
/// the operation.
async fn timed<T, F: Future<Output = T>>(
    timeout: Duration,
    what: &'static str,
    op: F,
) -> Result<T, io::Error> {
    tokio::time::timeout(timeout, op)
        .await
        .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, what))
}

//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn frame_round_trip() {
        let (left, right) = tokio::io::duplex(4096);
        let mut tx = StreamConn::new(left);
        let mut rx = StreamConn::new(right);
        let timeout = Duration::from_secs(1);
        tx.write_frame(b"\x12\x34\x00\x00", timeout).await.unwrap();
        tx.write_frame(b"", timeout).await.unwrap();
        assert_eq!(
            rx.read_frame(timeout).await.unwrap().as_ref(),
            b"\x12\x34\x00\x00"
        );
        assert_eq!(rx.read_frame(timeout).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn overlong_frame_is_refused() {
        let (left, _right) = tokio::io::duplex(4096);
        let mut tx = StreamConn::new(left);
        let err = tx
            .write_frame(&vec![0; MAX_MSG_LEN + 1], Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[tokio::test(start_paused = true)]
    async fn read_deadline() {
        let (left, _right) = tokio::io::duplex(4096);
        let mut rx = StreamConn::new(left);
        let err = rx
            .read_frame(Duration::from_millis(10))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }

    #[tokio::test]
    async fn closed_stream_ends_reads() {
        let (left, right) = tokio::io::duplex(4096);
        let mut rx = StreamConn::new(left);
        drop(right);
        let err = rx
            .read_frame(Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}

//! Newline-delimited TCP transport using `tokio-util`'s `LinesCodec`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};

use crate::{Connection, ConnectionId, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Longest inbound line accepted by default (64 KiB).
pub const DEFAULT_MAX_LINE_LEN: usize = 64 * 1024;

/// A TCP [`Transport`] where every frame is one line of UTF-8 text.
pub struct LineTransport {
    listener: TcpListener,
    max_line_len: usize,
}

impl LineTransport {
    /// Binds a new line transport to the given address.
    ///
    /// Inbound lines longer than `max_line_len` bytes are rejected with
    /// [`TransportError::LineTooLong`].
    pub async fn bind(
        addr: &str,
        max_line_len: usize,
    ) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, max_line_len, "line transport listening");
        Ok(Self {
            listener,
            max_line_len,
        })
    }

    /// Returns the address the listener is actually bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for LineTransport {
    type Connection = LineConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, peer) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;
        // Small JSON frames: don't let Nagle hold them back.
        let _ = stream.set_nodelay(true);

        let (read_half, write_half) = stream.into_split();
        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(%id, %peer, "accepted TCP connection");

        Ok(LineConnection {
            id,
            peer,
            max_line_len: self.max_line_len,
            reader: Mutex::new(FramedRead::new(
                read_half,
                LinesCodec::new_with_max_length(self.max_line_len),
            )),
            writer: Mutex::new(FramedWrite::new(
                write_half,
                LinesCodec::new(),
            )),
        })
    }

    async fn shutdown(&self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// A single newline-delimited TCP connection.
///
/// The socket is split so a task blocked in
/// [`recv_line`](Connection::recv_line) never holds up a concurrent
/// [`send_line`](Connection::send_line) from the writer task.
pub struct LineConnection {
    id: ConnectionId,
    peer: SocketAddr,
    max_line_len: usize,
    reader: Mutex<FramedRead<OwnedReadHalf, LinesCodec>>,
    writer: Mutex<FramedWrite<OwnedWriteHalf, LinesCodec>>,
}

impl LineConnection {
    /// Maps a codec error; `io` picks the variant for the I/O case.
    fn codec_error(
        &self,
        e: LinesCodecError,
        io: fn(std::io::Error) -> TransportError,
    ) -> TransportError {
        match e {
            LinesCodecError::Io(e) => io(e),
            LinesCodecError::MaxLineLengthExceeded => {
                TransportError::LineTooLong(self.max_line_len)
            }
        }
    }
}

impl Connection for LineConnection {
    type Error = TransportError;

    async fn send_line(&self, line: &str) -> Result<(), Self::Error> {
        self.writer
            .lock()
            .await
            .send(line)
            .await
            .map_err(|e| self.codec_error(e, TransportError::SendFailed))
    }

    async fn recv_line(&self) -> Result<Option<String>, Self::Error> {
        self.reader
            .lock()
            .await
            .next()
            .await
            .transpose()
            .map_err(|e| self.codec_error(e, TransportError::ReceiveFailed))
    }

    async fn close(&self) -> Result<(), Self::Error> {
        SinkExt::<&str>::close(&mut *self.writer.lock().await)
            .await
            .map_err(|e| self.codec_error(e, TransportError::SendFailed))
    }

    fn id(&self) -> ConnectionId {
        self.id
    }

    fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

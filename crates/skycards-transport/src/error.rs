use crate::ConnectionId;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection was closed.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding or accepting connections failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// An inbound line exceeded the configured maximum length.
    /// The framed stream ends after this, so callers drop the connection.
    #[error("line exceeds {0} bytes")]
    LineTooLong(usize),

    /// A write to the peer failed, so the peer is considered gone.
    #[error("peer {0} unreachable")]
    PeerUnreachable(ConnectionId),

    /// The transport was shut down.
    #[error("transport shut down")]
    Shutdown,
}

//! Integration tests for the newline-delimited TCP transport.
//!
//! These spin up a real listener on an OS-assigned port and talk to it
//! with a plain `TcpStream`, the same way a game client would.

#[cfg(feature = "tcp")]
mod tcp {
    use skycards_transport::{
        Connection, LineConnection, LineTransport, Transport, TransportError,
    };
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpStream;

    /// Binds on port 0, connects one client, and returns both ends.
    async fn connected_pair(max_line_len: usize) -> (LineConnection, TcpStream) {
        let mut transport = LineTransport::bind("127.0.0.1:0", max_line_len)
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound address");

        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });
        let client = TcpStream::connect(addr).await.expect("client should connect");
        let server_conn = server_handle.await.expect("task should complete");
        (server_conn, client)
    }

    #[tokio::test]
    async fn test_line_transport_send_and_receive() {
        let (server_conn, client) = connected_pair(1024).await;
        assert!(server_conn.id().into_inner() > 0);

        let (read_half, mut write_half) = client.into_split();
        let mut client_lines = BufReader::new(read_half).lines();

        // --- Server sends, client receives one line ---
        server_conn
            .send_line(r#"{"type":"SCREEN_MSG","data":{"content":"hi"}}"#)
            .await
            .expect("send should succeed");
        let line = client_lines.next_line().await.unwrap().expect("a line");
        assert_eq!(line, r#"{"type":"SCREEN_MSG","data":{"content":"hi"}}"#);

        // --- Client sends two lines in one write, server sees two frames ---
        write_half
            .write_all(b"{\"type\":\"QUIT\"}\n{\"type\":\"CREATE_ROOM\"}\n")
            .await
            .unwrap();

        let first = server_conn.recv_line().await.unwrap().expect("first line");
        let second = server_conn.recv_line().await.unwrap().expect("second line");
        assert_eq!(first, r#"{"type":"QUIT"}"#);
        assert_eq!(second, r#"{"type":"CREATE_ROOM"}"#);

        server_conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_line_transport_recv_returns_none_on_client_close() {
        let (server_conn, client) = connected_pair(1024).await;
        drop(client);

        let result = server_conn.recv_line().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_line_transport_rejects_overlong_line() {
        let (server_conn, mut client) = connected_pair(16).await;

        let long = "x".repeat(64);
        client
            .write_all(format!("{long}\n").as_bytes())
            .await
            .unwrap();

        let err = server_conn.recv_line().await.expect_err("line is too long");
        assert!(matches!(err, TransportError::LineTooLong(16)));
    }

    #[tokio::test]
    async fn test_line_transport_assigns_distinct_ids() {
        let (a, _client_a) = connected_pair(1024).await;
        let (b, _client_b) = connected_pair(1024).await;
        assert_ne!(a.id(), b.id());
        // Both clients come from loopback; only the id tells them apart.
        assert_eq!(a.peer_addr().ip(), b.peer_addr().ip());
    }

    #[tokio::test]
    async fn test_line_transport_close_gives_client_eof() {
        let (server_conn, client) = connected_pair(1024).await;
        let mut client_lines = BufReader::new(client).lines();

        server_conn.send_line("bye").await.unwrap();
        server_conn.close().await.unwrap();

        assert_eq!(client_lines.next_line().await.unwrap().as_deref(), Some("bye"));
        assert!(client_lines.next_line().await.unwrap().is_none());
    }
}

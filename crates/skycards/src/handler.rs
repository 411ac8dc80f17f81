//! Per-connection handler: decode each line and route it.
//!
//! Each accepted connection gets its own Tokio task running this handler
//! plus a writer task:
//!
//! ```text
//! socket ──recv──→ handler ──→ sessions / matchmaker
//!                                   │
//! socket ←──send── writer ←─outbox──┘ (room actors push here too)
//! ```
//!
//! Every recoverable error goes back to the client as a `SCREEN_MSG` with
//! the error's text. Only a transport failure ends the connection.

use std::sync::Arc;

use skycards_protocol::{
    ClientMessage, Codec, Credentials, LoginResponse, LoginStatus, MatchMode,
    PlayerId, RoomRequest, ServerMessage,
};
use skycards_room::{Contender, MatchStatus, PlayerSender, RoomError};
use skycards_session::{Authenticator, SessionError};
use skycards_transport::{Connection, ConnectionId, LineConnection, TransportError};
use tokio::sync::mpsc;

use crate::SkycardsError;
use crate::server::ServerState;

/// Whether the read loop keeps going after a command.
enum Flow {
    Continue,
    Close,
}

/// Drop guard that takes the player out of matchmaking and marks their
/// session offline when the handler exits, however it exits.
///
/// `Drop` is synchronous, so the async cleanup runs in a spawned task.
struct ConnectionGuard<A: Authenticator, C: Codec> {
    conn_id: ConnectionId,
    state: Arc<ServerState<A, C>>,
}

impl<A: Authenticator, C: Codec> Drop for ConnectionGuard<A, C> {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let player = state.sessions.lock().await.player_for(conn_id).ok();
            if let Some(player_id) = player {
                state.matchmaker.leave(player_id).await;
            }
            state.sessions.lock().await.detach(conn_id);
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<A, C>(
    conn: LineConnection,
    state: Arc<ServerState<A, C>>,
) -> Result<(), SkycardsError>
where
    A: Authenticator,
    C: Codec,
{
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::info!(%conn_id, peer = %conn.peer_addr(), "client connected");

    let (outbox, inbox) = mpsc::unbounded_channel();
    let mut writer = tokio::spawn(write_loop(
        Arc::clone(&conn),
        inbox,
        Arc::clone(&state),
    ));
    let _guard = ConnectionGuard {
        conn_id,
        state: Arc::clone(&state),
    };

    loop {
        let line = tokio::select! {
            inbound = conn.recv_line() => match inbound {
                Ok(Some(line)) => line,
                Ok(None) => {
                    tracing::info!(%conn_id, "connection closed cleanly");
                    break;
                }
                Err(e) => {
                    tracing::debug!(%conn_id, error = %e, "recv error");
                    break;
                }
            },
            written = &mut writer => {
                if let Ok(Err(e)) = written {
                    tracing::warn!(%conn_id, error = %e, "dropping connection");
                }
                break;
            }
        };

        let msg: ClientMessage = match state.codec.decode(&line) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode message");
                reply(&outbox, ServerMessage::screen("invalid message"));
                continue;
            }
        };

        match dispatch(&state, conn_id, &outbox, msg).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Close) => {
                tracing::info!(%conn_id, "client quit");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "command rejected");
                reply(&outbox, ServerMessage::screen(e.to_string()));
            }
        }
    }

    writer.abort();
    let _ = conn.close().await;
    // _guard drops here → matchmaking leave + session detach.
    Ok(())
}

/// Drains the outbox onto the socket. Ends with `PeerUnreachable` on the
/// first failed write.
async fn write_loop<A, C>(
    conn: Arc<LineConnection>,
    mut inbox: mpsc::UnboundedReceiver<ServerMessage>,
    state: Arc<ServerState<A, C>>,
) -> Result<(), TransportError>
where
    A: Authenticator,
    C: Codec,
{
    while let Some(msg) = inbox.recv().await {
        let line = match state.codec.encode(&msg) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(conn_id = %conn.id(), error = %e, "failed to encode message");
                continue;
            }
        };
        if let Err(e) = conn.send_line(&line).await {
            tracing::warn!(conn_id = %conn.id(), error = %e, "write failed");
            return Err(TransportError::PeerUnreachable(conn.id()));
        }
    }
    Ok(())
}

async fn dispatch<A, C>(
    state: &Arc<ServerState<A, C>>,
    conn_id: ConnectionId,
    outbox: &PlayerSender,
    msg: ClientMessage,
) -> Result<Flow, SkycardsError>
where
    A: Authenticator,
    C: Codec,
{
    match msg {
        ClientMessage::Register(Credentials { login, password }) => {
            let player_id = state.auth.register(&login, &password).await?;
            tracing::debug!(%conn_id, %player_id, "registered");
            reply(outbox, ServerMessage::screen(format!("account created: {}", login.trim())));
        }

        ClientMessage::Login(credentials) => {
            let status = login(state, conn_id, credentials).await?;
            reply(outbox, ServerMessage::Login(status));
        }

        ClientMessage::Quit => return Ok(Flow::Close),

        command => {
            let player_id = state.sessions.lock().await.player_for(conn_id)?;
            player_command(state, player_id, outbox, command).await?;
        }
    }
    Ok(Flow::Continue)
}

/// Authenticates and binds the player to this connection. Expected
/// failures become a `LOGIN` status rather than an error.
async fn login<A, C>(
    state: &Arc<ServerState<A, C>>,
    conn_id: ConnectionId,
    Credentials { login, password }: Credentials,
) -> Result<LoginResponse, SkycardsError>
where
    A: Authenticator,
    C: Codec,
{
    let refused = |status| LoginResponse {
        status,
        player_id: None,
    };

    let player = match state.auth.authenticate(&login, &password).await {
        Ok(player) => player,
        Err(SessionError::UnknownAccount(_)) => {
            return Ok(refused(LoginStatus::UnknownAccount));
        }
        Err(SessionError::BadCredentials) => {
            return Ok(refused(LoginStatus::BadCredentials));
        }
        Err(e) => return Err(e.into()),
    };

    let player_id = player.id;
    match state.sessions.lock().await.attach(conn_id, player) {
        Ok(_) => Ok(LoginResponse {
            status: LoginStatus::LoggedIn,
            player_id: Some(player_id),
        }),
        Err(SessionError::AlreadyOnline(_)) => Ok(refused(LoginStatus::AlreadyOnline)),
        Err(e) => Err(e.into()),
    }
}

/// Commands that need a logged-in player.
async fn player_command<A, C>(
    state: &Arc<ServerState<A, C>>,
    player_id: PlayerId,
    outbox: &PlayerSender,
    command: ClientMessage,
) -> Result<(), SkycardsError>
where
    A: Authenticator,
    C: Codec,
{
    match command {
        ClientMessage::SetDeck { cards } => {
            // A queued contender already carries its deck; keep it frozen
            // until the room is gone.
            if let Some(code) = state.matchmaker.room_of(player_id).await {
                return Err(RoomError::AlreadyInRoom(player_id, code).into());
            }
            state.sessions.lock().await.set_deck(player_id, cards)?;
            reply(outbox, ServerMessage::screen("deck saved"));
        }

        ClientMessage::FindRoom(RoomRequest {
            mode: MatchMode::Public,
        }) => {
            let contender = contender(state, player_id, outbox).await?;
            if let MatchStatus::Waiting(code) =
                state.matchmaker.find_public(contender).await?
            {
                tracing::debug!(%player_id, room = %code, "queued for a public match");
                reply(outbox, ServerMessage::screen("waiting for opponent"));
            }
        }

        ClientMessage::FindRoom(RoomRequest {
            mode: MatchMode::Private,
        })
        | ClientMessage::CreateRoom => {
            let contender = contender(state, player_id, outbox).await?;
            let code = state.matchmaker.create_private(contender).await?;
            reply(outbox, ServerMessage::screen(format!("room code: {code}")));
        }

        ClientMessage::PrivRoom { room_code } => {
            let contender = contender(state, player_id, outbox).await?;
            state.matchmaker.join_private(contender, &room_code).await?;
        }

        ClientMessage::PlayMove {
            card_index,
            attribute,
        } => {
            state
                .matchmaker
                .submit_move(player_id, card_index, attribute)
                .await?;
        }

        ClientMessage::Chat { content } => {
            state.matchmaker.chat(player_id, content).await?;
        }

        ClientMessage::Register(_) | ClientMessage::Login(_) | ClientMessage::Quit => {}
    }
    Ok(())
}

/// Builds a matchmaking entry from the player's session. Requires a deck.
async fn contender<A, C>(
    state: &Arc<ServerState<A, C>>,
    player_id: PlayerId,
    outbox: &PlayerSender,
) -> Result<Contender, SkycardsError>
where
    A: Authenticator,
    C: Codec,
{
    let sessions = state.sessions.lock().await;
    let session = sessions
        .get(player_id)
        .ok_or(SessionError::NotFound(player_id))?;
    let deck = session.deck.clone().ok_or(RoomError::DeckNotReady)?;
    Ok(Contender {
        player_id,
        name: session.name.clone(),
        deck,
        outbox: outbox.clone(),
    })
}

/// Queues a message for this connection's writer. A closed outbox means
/// the writer already stopped and the read loop is about to end.
fn reply(outbox: &PlayerSender, msg: ServerMessage) {
    let _ = outbox.send(msg);
}

//! The line-level wire format: one `{"type": ..., "data": ...}` object per
//! line, in each direction.
//!
//! Both enums are adjacently tagged (`#[serde(tag = "type", content =
//! "data")]`) with `SCREAMING_SNAKE_CASE` tags, so `ClientMessage::PlayMove`
//! travels as `{"type": "PLAY_MOVE", "data": {...}}`. Commands without a
//! payload may leave out `data` entirely.

use serde::{Deserialize, Serialize};

use crate::{Card, PlayerId, RoomCode};

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// Everything a client can ask the server to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    /// Create an account.
    Register(Credentials),

    /// Log in to an existing account on this connection.
    Login(Credentials),

    /// Replace the player's deck. Must be exactly four cards.
    SetDeck { cards: Vec<Card> },

    /// Join the public matchmaking queue.
    FindRoom(RoomRequest),

    /// Join a private room by code.
    PrivRoom { room_code: RoomCode },

    /// Open a private room; the code comes back as a `SCREEN_MSG`.
    CreateRoom,

    /// Play a card on an attribute for the current round.
    ///
    /// Both fields are deliberately loose (signed index, free-form name)
    /// so that out-of-range values reach the room and are reported as
    /// game errors rather than undecodable frames.
    PlayMove { card_index: i64, attribute: String },

    /// Say something to the opponent.
    Chat { content: String },

    /// Close this connection.
    Quit,
}

/// Login/registration payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub login: String,
    #[serde(default)]
    pub password: String,
}

/// Which kind of room `FIND_ROOM` asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchMode {
    Public,
    Private,
}

/// `FIND_ROOM` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRequest {
    pub mode: MatchMode,
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// Everything the server can push to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    /// Plain informational text: confirmations, room codes, and every
    /// recoverable error.
    ScreenMsg(ScreenMessage),

    /// Outcome of a `LOGIN` request.
    Login(LoginResponse),

    /// The room is paired and about to start.
    Pareado(PairingNotice),

    /// Who the opponent is.
    GameStart(GameStartMessage),

    /// A new round: the round number and this player's current hand.
    RoundStart(RoundStartMessage),

    /// Both moves of a round and the resulting scores.
    RoundResult(RoundResultMessage),

    /// Final result, personalised per player (only `coins_earned` differs).
    GameOver(GameOverMessage),

    /// A chat line relayed from the opponent.
    Chat(ChatMessage),
}

impl ServerMessage {
    /// Shorthand for a `SCREEN_MSG`.
    pub fn screen(content: impl Into<String>) -> Self {
        Self::ScreenMsg(ScreenMessage {
            content: content.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenMessage {
    pub content: String,
}

/// Result of a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoginStatus {
    LoggedIn,
    UnknownAccount,
    AlreadyOnline,
    BadCredentials,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub status: LoginStatus,
    /// Set only when `status` is `LOGGED_IN`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingNotice {
    pub status: String,
}

impl Default for PairingNotice {
    fn default() -> Self {
        Self {
            status: "PAREADO".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStartMessage {
    pub opponent: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundStartMessage {
    pub round: u32,
    pub hand: Vec<Card>,
}

/// One player's side of a resolved round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveReport {
    pub player_name: String,
    pub card_name: String,
    pub attribute: crate::Attribute,
    /// The chosen attribute's value on this player's own card.
    pub attribute_value: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResultMessage {
    pub round: u32,
    pub player1_move: MoveReport,
    pub player2_move: MoveReport,
    pub round_points_p1: u32,
    pub round_points_p2: u32,
    pub total_score_p1: u32,
    pub total_score_p2: u32,
}

/// Marker used in [`GameOverMessage::winner`] when totals are equal.
pub const DRAW: &str = "DRAW";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOverMessage {
    /// The winner's name, or [`DRAW`].
    pub winner: String,
    pub final_score_p1: u32,
    pub final_score_p2: u32,
    /// This recipient's own reward.
    pub coins_earned: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub from: String,
    pub content: String,
}

// =========================================================================
// Tests
// =========================================================================

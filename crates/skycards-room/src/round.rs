//! The round engine: hands, pending moves, and running scores for one
//! match.
//!
//! ```text
//! RoundStart ──begin_round()──→ AwaitingMoves ──(both moves in)──→ resolve
//!     ↑                                                              │
//!     └──────────────(round ≤ 3)─────────────────────────────────────┤
//!                                                                    ▼
//!                                                                GameOver
//! ```
//!
//! Resolution happens inside the `submit_move` call that delivers the
//! second move, so it is atomic with respect to both submissions. The
//! engine is plain data owned by one room actor; it does no I/O.

use skycards_protocol::{Attribute, Card, Deck};

use crate::config::ROUNDS_PER_MATCH;
use crate::scoring::score_round;
use crate::RoomError;

/// One of the two places at the table. `First` is the player who opened
/// the room and is reported as `player1` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    pub const BOTH: [Seat; 2] = [Seat::First, Seat::Second];

    pub fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Between rounds; moves are rejected until `begin_round`.
    RoundStart,
    AwaitingMoves,
    GameOver,
}

/// A validated move for the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub card_index: usize,
    pub attribute: Attribute,
}

/// One side of a resolved round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Play {
    pub card: Card,
    pub attribute: Attribute,
    /// The chosen attribute's value on this player's own card.
    pub value: u32,
    pub points: u32,
}

/// Everything that happened in one resolved round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    pub round: u32,
    /// Indexed by [`Seat::index`].
    pub plays: [Play; 2],
    pub totals: [u32; 2],
}

/// Final standing of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Standing {
    Winner(Seat),
    Draw,
}

/// State of one match.
#[derive(Debug, Clone)]
pub struct GameState {
    round: u32,
    phase: Phase,
    scores: [u32; 2],
    hands: [Vec<Card>; 2],
    moves: [Option<Move>; 2],
}

impl GameState {
    /// A fresh match at round 1. Hands are copies; the decks are untouched.
    pub fn new(first: &Deck, second: &Deck) -> Self {
        Self {
            round: 1,
            phase: Phase::RoundStart,
            scores: [0, 0],
            hands: [first.to_hand(), second.to_hand()],
            moves: [None, None],
        }
    }

    /// The round being played, or the one about to start. After the last
    /// round resolves this reads `ROUNDS_PER_MATCH + 1`.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn scores(&self) -> [u32; 2] {
        self.scores
    }

    pub fn hand(&self, seat: Seat) -> &[Card] {
        &self.hands[seat.index()]
    }

    pub fn has_submitted(&self, seat: Seat) -> bool {
        self.moves[seat.index()].is_some()
    }

    /// Opens the current round for moves and returns its number.
    ///
    /// # Errors
    /// [`RoomError::NoActiveMatch`] unless the engine is in `RoundStart`.
    pub fn begin_round(&mut self) -> Result<u32, RoomError> {
        if self.phase != Phase::RoundStart {
            return Err(RoomError::NoActiveMatch);
        }
        self.moves = [None, None];
        self.phase = Phase::AwaitingMoves;
        Ok(self.round)
    }

    /// Records a move for `seat`, replacing any earlier move this round.
    ///
    /// Returns the round outcome when this was the second player's move.
    /// A rejected move leaves the state exactly as it was.
    ///
    /// # Errors
    /// - [`RoomError::NoActiveMatch`]: not in `AwaitingMoves`
    /// - [`RoomError::InvalidCardIndex`]: index outside the current hand
    /// - [`RoomError::InvalidAttribute`]: not one of the four attributes
    pub fn submit_move(
        &mut self,
        seat: Seat,
        card_index: i64,
        attribute: &str,
    ) -> Result<Option<RoundOutcome>, RoomError> {
        if self.phase != Phase::AwaitingMoves {
            return Err(RoomError::NoActiveMatch);
        }

        let hand_len = self.hands[seat.index()].len();
        let card_index = usize::try_from(card_index)
            .ok()
            .filter(|i| *i < hand_len)
            .ok_or(RoomError::InvalidCardIndex {
                index: card_index,
                hand_len,
            })?;
        let attribute: Attribute = attribute
            .parse()
            .map_err(|_| RoomError::InvalidAttribute(attribute.to_string()))?;

        self.moves[seat.index()] = Some(Move {
            card_index,
            attribute,
        });

        match self.moves {
            [Some(first), Some(second)] => Ok(Some(self.resolve(first, second))),
            _ => Ok(None),
        }
    }

    /// Scores both moves. Indexes were checked against these same hands
    /// at submission, and hands only change here.
    fn resolve(&mut self, first: Move, second: Move) -> RoundOutcome {
        let card_a = self.hands[0].remove(first.card_index);
        let card_b = self.hands[1].remove(second.card_index);
        let (points_a, points_b) =
            score_round(&card_a, first.attribute, &card_b, second.attribute);
        self.scores[0] += points_a;
        self.scores[1] += points_b;

        let outcome = RoundOutcome {
            round: self.round,
            plays: [
                Play {
                    value: card_a.value(first.attribute),
                    attribute: first.attribute,
                    points: points_a,
                    card: card_a,
                },
                Play {
                    value: card_b.value(second.attribute),
                    attribute: second.attribute,
                    points: points_b,
                    card: card_b,
                },
            ],
            totals: self.scores,
        };

        self.moves = [None, None];
        self.round += 1;
        self.phase = if self.round > ROUNDS_PER_MATCH {
            Phase::GameOver
        } else {
            Phase::RoundStart
        };
        outcome
    }

    /// Ends the match early, keeping the current totals.
    pub fn abandon(&mut self) {
        self.moves = [None, None];
        self.phase = Phase::GameOver;
    }

    /// Who is ahead on points. Equal totals are a draw.
    pub fn standing(&self) -> Standing {
        match self.scores[0].cmp(&self.scores[1]) {
            std::cmp::Ordering::Greater => Standing::Winner(Seat::First),
            std::cmp::Ordering::Less => Standing::Winner(Seat::Second),
            std::cmp::Ordering::Equal => Standing::Draw,
        }
    }
}

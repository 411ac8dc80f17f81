//! Core value types shared by every layer: identities and the card model.
//!
//! Everything here is plain data. Cards are immutable once loaded, and a
//! [`Deck`] can only be built from exactly [`DECK_SIZE`] of them, so any code
//! holding a `Deck` can rely on its length.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Number of cards in a deck, and in a hand at the start of a match.
pub const DECK_SIZE: usize = 4;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a registered player.
///
/// Serialized as a plain number (`#[serde(transparent)]`), displayed as
/// `P-<n>` in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// The short alphanumeric code that names a room.
///
/// Codes are what players type to join a private room, so they are
/// compared exactly as given (the generator only emits uppercase).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Wraps a code string.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Attribute
// ---------------------------------------------------------------------------

/// One of the four numeric attributes a round can be contested on.
///
/// On the wire these are lowercase names: `"wingspan"`, `"speed"`,
/// `"height"`, `"passengers"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Wingspan,
    Speed,
    Height,
    Passengers,
}

impl Attribute {
    /// Every attribute, in wire order.
    pub const ALL: [Attribute; 4] = [
        Attribute::Wingspan,
        Attribute::Speed,
        Attribute::Height,
        Attribute::Passengers,
    ];

    /// The wire name of this attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wingspan => "wingspan",
            Self::Speed => "speed",
            Self::Height => "height",
            Self::Passengers => "passengers",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a wire name, ignoring ASCII case.
///
/// `PLAY_MOVE` carries the attribute as a free string so that a bad name
/// can be reported as such instead of failing the whole frame.
impl FromStr for Attribute {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|attr| attr.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ProtocolError::UnknownAttribute(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Card and Deck
// ---------------------------------------------------------------------------

/// An aircraft card from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub name: String,
    /// Category label (e.g. "common", "rare"). Not used by scoring.
    #[serde(default)]
    pub rarity: String,
    #[serde(default)]
    pub wingspan: u32,
    #[serde(default)]
    pub speed: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub passengers: u32,
}

impl Card {
    /// Returns this card's value for `attribute`.
    pub fn value(&self, attribute: Attribute) -> u32 {
        match attribute {
            Attribute::Wingspan => self.wingspan,
            Attribute::Speed => self.speed,
            Attribute::Height => self.height,
            Attribute::Passengers => self.passengers,
        }
    }
}

/// A player's permanent loadout of exactly [`DECK_SIZE`] cards.
///
/// Matches never touch a `Deck` directly: they play from a [`Deck::to_hand`]
/// copy, so removing cards during a match leaves the deck intact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Card>", into = "Vec<Card>")]
pub struct Deck([Card; DECK_SIZE]);

impl Deck {
    /// The cards, in the order the player chose them.
    pub fn cards(&self) -> &[Card] {
        &self.0
    }

    /// A fresh, owned hand for a new match.
    pub fn to_hand(&self) -> Vec<Card> {
        self.0.to_vec()
    }
}

impl TryFrom<Vec<Card>> for Deck {
    type Error = ProtocolError;

    fn try_from(cards: Vec<Card>) -> Result<Self, Self::Error> {
        let got = cards.len();
        let cards: [Card; DECK_SIZE] =
            cards.try_into().map_err(|_| ProtocolError::DeckSize {
                expected: DECK_SIZE,
                got,
            })?;
        Ok(Self(cards))
    }
}

impl From<Deck> for Vec<Card> {
    fn from(deck: Deck) -> Self {
        deck.0.into()
    }
}

// =========================================================================
// Tests
// =========================================================================

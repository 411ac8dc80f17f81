//! Round scoring.
//!
//! Each player names one attribute, and both attributes are compared on
//! both cards, so a round is two independent comparisons. The points table
//! rewards partial success: winning one comparison and losing the other is
//! worth the same as a double tie.
//!
//! | on A's attribute | on B's attribute | A's points |
//! |---|---|---|
//! | A wins | A wins | 3 |
//! | A wins | B wins | 2 |
//! | B wins | A wins | 2 |
//! | A wins | tie | 2 |
//! | tie | A wins | 2 |
//! | tie | tie | 2 |
//! | B wins | tie | 1 |
//! | tie | B wins | 1 |
//! | B wins | B wins | 0 |
//!
//! B's points are the same table with the winners swapped. The two sides
//! do not sum to a constant.

use std::cmp::Ordering;

use skycards_protocol::{Attribute, Card};

/// Result of comparing two cards on one attribute, from A's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    AWins,
    BWins,
    Tie,
}

impl Outcome {
    /// The same outcome seen from B's side.
    pub fn flip(self) -> Self {
        match self {
            Self::AWins => Self::BWins,
            Self::BWins => Self::AWins,
            Self::Tie => Self::Tie,
        }
    }
}

/// Compares A's value against B's. Higher wins.
pub fn compare(a: u32, b: u32) -> Outcome {
    match a.cmp(&b) {
        Ordering::Greater => Outcome::AWins,
        Ordering::Less => Outcome::BWins,
        Ordering::Equal => Outcome::Tie,
    }
}

/// A's points given the outcome on A's attribute and on B's attribute.
pub fn points_for_a(on_a_attr: Outcome, on_b_attr: Outcome) -> u32 {
    use Outcome::*;
    match (on_a_attr, on_b_attr) {
        (AWins, AWins) => 3,
        (AWins, BWins) | (BWins, AWins) => 2,
        (AWins, Tie) | (Tie, AWins) | (Tie, Tie) => 2,
        (BWins, Tie) | (Tie, BWins) => 1,
        (BWins, BWins) => 0,
    }
}

/// Scores one round. Returns `(a_points, b_points)`, each in `0..=3`.
pub fn score_round(
    card_a: &Card,
    attr_a: Attribute,
    card_b: &Card,
    attr_b: Attribute,
) -> (u32, u32) {
    let on_a_attr = compare(card_a.value(attr_a), card_b.value(attr_a));
    let on_b_attr = compare(card_a.value(attr_b), card_b.value(attr_b));
    (
        points_for_a(on_a_attr, on_b_attr),
        points_for_a(on_a_attr.flip(), on_b_attr.flip()),
    )
}

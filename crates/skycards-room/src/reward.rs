//! Coins paid out at the end of a match.

/// Decides what each player earns from a finished match.
///
/// Called once per player when the match ends, including on a forfeit.
pub trait RewardPolicy: Send + Sync + 'static {
    fn coins(&self, own_score: u32, opponent_score: u32) -> u32;
}

/// Pays each player their own final score.
#[derive(Debug, Clone, Copy, Default)]
pub struct FinalScoreReward;

impl RewardPolicy for FinalScoreReward {
    fn coins(&self, own_score: u32, _opponent_score: u32) -> u32 {
        own_score
    }
}

use enum_map::Enum;
use strum_macros::EnumIter;

/// Number of distinct rank-equivalence classes in a shoe.
pub const N_RANKS: usize = 10;

/// A card rank, collapsed into one of ten equivalence classes and used as an
/// index into a [`crate::shoe::Shoe`]. Index 0 is the Ace; indices 1..=8 are
/// the pip cards 2..=9; index 9 is any ten-value card (T, J, Q, K).
pub type Rank = usize;

pub const ACE: Rank = 0;
pub const TEN: Rank = 9;

pub const RANKS: [Rank; N_RANKS] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9];

/// Hard point value of a rank (Ace counts low; softness is tracked separately).
pub fn pip_value(rank: Rank) -> u32 {
    match rank {
        ACE => 1,
        TEN => 10,
        n => (n + 1) as u32,
    }
}

/// A decision available to the player at a given hand/dealer state.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Enum, EnumIter, Hash)]
pub enum Action {
    Stand,
    Hit,
    Double,
    Split,
}

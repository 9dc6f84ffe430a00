use std::ops::Index;

use crate::types::{Rank, N_RANKS, RANKS};

/// The remaining, unseen cards available to be drawn, keyed by rank.
///
/// Index 0 is the Ace; see [`crate::types`] for the full ordering. This is
/// the shape that keys every cache entry in the engine, so it derives
/// `Hash`/`Eq` directly off the backing array rather than any richer
/// representation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Shoe {
    pub counts: [u32; N_RANKS],
}

impl Shoe {
    pub fn new(counts: [u32; N_RANKS]) -> Self {
        Shoe { counts }
    }

    /// A shoe made up of `num_decks` standard 52-card decks.
    pub fn standard(num_decks: u32) -> Self {
        let mut counts = [4 * num_decks; N_RANKS];
        counts[crate::types::TEN] = 16 * num_decks;
        Shoe { counts }
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// A copy of this shoe with one card of `rank` removed.
    pub fn removed(&self, rank: Rank) -> Self {
        let mut c = *self;
        c.counts[rank] -= 1;
        c
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn iter_nonzero(&self) -> impl Iterator<Item = (Rank, u32)> + '_ {
        RANKS.into_iter().filter(move |&r| self.counts[r] > 0).map(move |r| (r, self.counts[r]))
    }
}

impl Index<Rank> for Shoe {
    type Output = u32;

    fn index(&self, index: Rank) -> &Self::Output {
        &self.counts[index]
    }
}

/// Build a shoe from explicit counts, Ace-first: `shoe_of!(ace, two, three, ..., nine, ten)`.
#[macro_export]
macro_rules! shoe_of {
    ($ace:expr, $two:expr, $three:expr, $four:expr, $five:expr,
     $six:expr, $seven:expr, $eight:expr, $nine:expr, $ten:expr) => {
        $crate::shoe::Shoe::new([
            $ace, $two, $three, $four, $five, $six, $seven, $eight, $nine, $ten,
        ])
    };
}

/// Build a shoe containing the given number of standard 52-card decks.
#[macro_export]
macro_rules! shoe {
    ($decks:expr) => {
        $crate::shoe::Shoe::standard($decks)
    };
}

use std::collections::HashMap;

use log::trace;

use crate::hand::{add_card, score_of_one};
use crate::rules::BlackjackRules;
use crate::shoe::Shoe;
use crate::types::{Rank, ACE, N_RANKS, RANKS, TEN};

/// The distribution of ways a dealer's hand can resolve, conditioned on the
/// player still being at the table to see it (i.e. conditioned on "no
/// peeked natural" when `dealer_peeks_for_21` is set).
///
/// `totals[0..5]` are final totals 17..=21 reached on three or more cards;
/// `natural` is a two-card 21, kept apart from `totals[4]` because it is
/// settled differently by [`crate::outcome::outcome`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DealerDist {
    pub bust: f64,
    pub totals: [f64; 5],
    pub natural: f64,
}

impl DealerDist {
    fn zero() -> Self {
        DealerDist { bust: 0.0, totals: [0.0; 5], natural: 0.0 }
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct DealerKey {
    shoe: [u32; N_RANKS],
    score: u32,
    soft: bool,
}

/// Caches of the dealer-side recursion. Kept separate from the player-side
/// cache in [`super::Engine`] because the dealer's distribution depends only
/// on the shoe and the dealer's own total, never on the player's hand,
/// split flag, or action under consideration.
#[derive(Default)]
pub struct DealerCache {
    totals: HashMap<DealerKey, [f64; 6]>,
}

impl DealerCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The dealer's resolution distribution given only the up-card, i.e.
    /// before the hole card is known. This is the single place a dealer
    /// natural, and `dealer_peeks_for_21` pruning of it, can occur.
    pub fn distribution_from_upcard(
        &mut self,
        shoe: Shoe,
        upcard: Rank,
        rules: &BlackjackRules,
    ) -> DealerDist {
        let (score0, soft0) = score_of_one(upcard);
        if shoe.is_empty() {
            return DealerDist::zero();
        }

        let mut acc = [0.0f64; 6];
        let mut natural = 0.0f64;
        let mut denom = 0.0f64;

        for hole in RANKS {
            let count = shoe[hole];
            if count == 0 {
                continue;
            }
            let forms_natural = (upcard == TEN && hole == ACE) || (upcard == ACE && hole == TEN);
            if forms_natural && rules.dealer_peeks_for_21 {
                // The dealer would have already revealed blackjack and ended
                // the hand before the player got to act; this branch is
                // impossible conditional on the player still being here.
                trace!("pruning peeked dealer natural branch (up={upcard}, hole={hole})");
                continue;
            }

            let weight = count as f64;
            denom += weight;

            if forms_natural {
                natural += weight;
                continue;
            }

            let next_shoe = shoe.removed(hole);
            let (score, soft) = add_card(score0, soft0, hole);
            let sub = self.totals(next_shoe, score, soft, rules);
            for i in 0..6 {
                acc[i] += weight * sub[i];
            }
        }

        if denom == 0.0 {
            return DealerDist::zero();
        }
        for v in acc.iter_mut() {
            *v /= denom;
        }
        natural /= denom;

        DealerDist { bust: acc[0], totals: [acc[1], acc[2], acc[3], acc[4], acc[5]], natural }
    }

    /// `[bust, 17, 18, 19, 20, 21]` reached from a dealer hand already past
    /// the single-up-card stage, so no natural or peek logic applies here.
    fn totals(&mut self, shoe: Shoe, score: u32, soft: bool, rules: &BlackjackRules) -> [f64; 6] {
        if score > 21 {
            return [1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        }

        let stands = score >= 18 || (score >= 17 && (!rules.dealer_hits_on_soft_17 || !soft));
        if stands {
            let mut out = [0.0; 6];
            out[(score - 16) as usize] = 1.0;
            return out;
        }

        let key = DealerKey { shoe: shoe.counts, score, soft };
        if let Some(cached) = self.totals.get(&key) {
            return *cached;
        }

        let total = shoe.total();
        if total == 0 {
            return [0.0; 6];
        }

        let mut acc = [0.0f64; 6];
        for r in RANKS {
            let count = shoe[r];
            if count == 0 {
                continue;
            }
            let weight = count as f64;
            let next_shoe = shoe.removed(r);
            let (new_score, new_soft) = add_card(score, soft, r);
            let sub = self.totals(next_shoe, new_score, new_soft, rules);
            for i in 0..6 {
                acc[i] += weight * sub[i];
            }
        }
        for v in acc.iter_mut() {
            *v /= total as f64;
        }

        self.totals.insert(key, acc);
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distribution_sums_to_one() {
        let mut cache = DealerCache::new();
        let rules = BlackjackRules::las_vegas();
        let shoe = Shoe::standard(1).removed(TEN); // up-card already drawn
        let dist = cache.distribution_from_upcard(shoe, TEN, &rules);
        let total = dist.bust + dist.natural + dist.totals.iter().sum::<f64>();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn peek_excludes_natural_branch_from_distribution() {
        let mut cache = DealerCache::new();
        let rules = BlackjackRules::las_vegas(); // peeks
        let shoe = Shoe::standard(1).removed(TEN);
        let dist = cache.distribution_from_upcard(shoe, TEN, &rules);
        assert_eq!(dist.natural, 0.0);
    }

    #[test]
    fn no_peek_still_classifies_dealer_natural() {
        let mut cache = DealerCache::new();
        let mut rules = BlackjackRules::las_vegas();
        rules.dealer_peeks_for_21 = false;
        let shoe = Shoe::standard(1).removed(TEN);
        let dist = cache.distribution_from_upcard(shoe, TEN, &rules);
        assert!(dist.natural > 0.0);
    }
}

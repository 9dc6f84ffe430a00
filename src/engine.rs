mod dealer;

use std::collections::HashMap;

use enum_map::EnumMap;
use log::debug;

use crate::engine::dealer::DealerCache;
use crate::error::EngineError;
use crate::hand::{add_card, score_of_two, Hand};
use crate::outcome::outcome;
use crate::rules::BlackjackRules;
use crate::shoe::Shoe;
use crate::types::{Action, Rank, N_RANKS, RANKS, ACE};

#[derive(Clone, PartialEq, Eq, Hash)]
struct OptimalKey {
    shoe: [u32; N_RANKS],
    score: u32,
    soft: bool,
    upcard: Rank,
}

/// A deterministic expected-value engine for a single rule configuration.
///
/// An `Engine` owns its memoization caches; it is built once per rule set
/// and is cheap to query many times, but it is **not** safe to share across
/// threads or to reuse across an unrelated rule configuration. Build a
/// fresh `Engine` per configuration (or per worker, if you want to shard
/// load across threads) rather than trying to synchronize one.
pub struct Engine {
    rules: BlackjackRules,
    dealer: DealerCache,
    /// EV of the best of {stand, hit} from a hand with no further action
    /// available (already hit at least once, so doubling/splitting are off
    /// the table). Keyed on (shoe, score, soft, upcard) only: once a hand is
    /// three or more cards deep it can never be a natural, so the split
    /// flag plays no part in this particular recursion.
    optimal: HashMap<OptimalKey, f64>,
}

/// The EV of every legal action for a hand, and which of them is best.
#[derive(Debug, Clone, Copy)]
pub struct Analysis {
    pub choices: EnumMap<Action, Option<f64>>,
    pub best: Action,
    pub best_ev: f64,
}

impl Engine {
    pub fn new(rules: BlackjackRules) -> Self {
        Engine { rules, dealer: DealerCache::new(), optimal: HashMap::new() }
    }

    pub fn rules(&self) -> &BlackjackRules {
        &self.rules
    }

    pub fn stand(&mut self, shoe: &Shoe, player: &Hand, dealer: &Hand) -> Result<f64, EngineError> {
        let upcard = validate(player, dealer)?;
        let (score, soft) = player.score_and_soft();
        let is_two = player.len() == 2;
        Ok(self.stand_ev(*shoe, score, soft, is_two, upcard, false))
    }

    pub fn hit(&mut self, shoe: &Shoe, player: &Hand, dealer: &Hand) -> Result<f64, EngineError> {
        let upcard = validate(player, dealer)?;
        let (score, soft) = player.score_and_soft();
        Ok(self.hit_ev(*shoe, score, soft, upcard))
    }

    pub fn double(&mut self, shoe: &Shoe, player: &Hand, dealer: &Hand) -> Result<f64, EngineError> {
        let upcard = validate(player, dealer)?;
        let (score, soft) = player.score_and_soft();
        Ok(self.double_ev(*shoe, score, soft, upcard))
    }

    pub fn split(&mut self, shoe: &Shoe, player: &Hand, dealer: &Hand) -> Result<f64, EngineError> {
        let upcard = validate(player, dealer)?;
        let split_card = player
            .can_split()
            .ok_or_else(|| EngineError::NotSplittable(player.cards.clone()))?;
        Ok(self.split_ev(*shoe, split_card, upcard))
    }

    /// EV of every legal action at once, plus which one a caller should
    /// take. Illegal actions (double on a 3+ card hand, split on a non-pair)
    /// are reported as `None` rather than folded into the max.
    pub fn analyze(&mut self, shoe: &Shoe, player: &Hand, dealer: &Hand) -> Result<Analysis, EngineError> {
        let upcard = validate(player, dealer)?;
        let (score, soft) = player.score_and_soft();
        let is_two = player.len() == 2;

        let mut choices: EnumMap<Action, Option<f64>> = EnumMap::default();
        choices[Action::Stand] = Some(self.stand_ev(*shoe, score, soft, is_two, upcard, false));
        choices[Action::Hit] = Some(self.hit_ev(*shoe, score, soft, upcard));
        if is_two {
            choices[Action::Double] = Some(self.double_ev(*shoe, score, soft, upcard));
        }
        if let Some(split_card) = player.can_split() {
            choices[Action::Split] = Some(self.split_ev(*shoe, split_card, upcard));
        }

        let (best, best_ev) = choices
            .iter()
            .filter_map(|(action, ev)| ev.as_ref().map(|&v| (action, v)))
            .fold((Action::Stand, f64::NEG_INFINITY), |acc, cur| if cur.1 > acc.1 { cur } else { acc });

        Ok(Analysis { choices, best, best_ev })
    }

    /// EV of standing with a hand of the given (score, soft, is_two) against
    /// `dealer_upcard`, under `split_flag`. This is the one function that
    /// ever has to know about naturals: everything recursing through
    /// [`Engine::hit_ev`]/[`Engine::optimal_ev`] is by construction three or
    /// more cards deep and can never be one.
    fn stand_ev(&mut self, shoe: Shoe, score: u32, _soft: bool, is_two: bool, upcard: Rank, split_flag: bool) -> f64 {
        if score > 21 {
            return -1.0;
        }
        let dist = self.dealer.distribution_from_upcard(shoe, upcard, &self.rules);

        let mut ev = dist.natural * outcome(score, is_two, 21, true, split_flag, &self.rules);
        ev += dist.bust * outcome(score, is_two, 22, false, split_flag, &self.rules);
        for (i, dealer_score) in (17u32..=21).enumerate() {
            ev += dist.totals[i] * outcome(score, is_two, dealer_score, false, split_flag, &self.rules);
        }
        ev
    }

    /// EV of the best of {stand, hit} from a hand that has already taken at
    /// least one hit (so never a natural, and never eligible to double or
    /// split again).
    fn optimal_ev(&mut self, shoe: Shoe, score: u32, soft: bool, upcard: Rank) -> f64 {
        if score > 21 {
            return -1.0;
        }
        let key = OptimalKey { shoe: shoe.counts, score, soft, upcard };
        if let Some(&v) = self.optimal.get(&key) {
            return v;
        }

        let stand = self.stand_ev(shoe, score, soft, false, upcard, false);
        let hit = self.hit_ev(shoe, score, soft, upcard);
        let best = stand.max(hit);

        debug!("optimal(score={score}, soft={soft}, upcard={upcard}) = {best:.6}");
        self.optimal.insert(key, best);
        best
    }

    fn hit_ev(&mut self, shoe: Shoe, score: u32, soft: bool, upcard: Rank) -> f64 {
        if score > 21 {
            return -1.0;
        }
        let total = shoe.total();
        if total == 0 {
            return 0.0;
        }

        let mut cumulative = 0.0;
        for r in RANKS {
            let count = shoe[r];
            if count == 0 {
                continue;
            }
            let weight = count as f64;
            let (new_score, new_soft) = add_card(score, soft, r);
            let next_shoe = shoe.removed(r);
            let branch = if new_score > 21 {
                -1.0
            } else {
                self.optimal_ev(next_shoe, new_score, new_soft, upcard)
            };
            cumulative += weight * branch;
        }
        cumulative / total as f64
    }

    fn double_ev(&mut self, shoe: Shoe, score: u32, soft: bool, upcard: Rank) -> f64 {
        let total = shoe.total();
        if total == 0 {
            return 0.0;
        }

        let mut cumulative = 0.0;
        for r in RANKS {
            let count = shoe[r];
            if count == 0 {
                continue;
            }
            let weight = count as f64;
            let (new_score, new_soft) = add_card(score, soft, r);
            let next_shoe = shoe.removed(r);
            let branch = if new_score > 21 {
                -2.0
            } else {
                2.0 * self.stand_ev(next_shoe, new_score, new_soft, false, upcard, false)
            };
            cumulative += weight * branch;
        }
        cumulative / total as f64
    }

    /// EV of both hands formed by splitting a pair of `split_card`.
    fn split_ev(&mut self, shoe: Shoe, split_card: Rank, upcard: Rank) -> f64 {
        let is_ace_split = split_card == ACE;
        let total = shoe.total();
        if total == 0 {
            return 0.0;
        }

        let can_hit = !is_ace_split || self.rules.hit_split_aces;
        let can_double = self.rules.double_after_split
            && (!is_ace_split || (self.rules.hit_split_aces && self.rules.double_split_aces));

        let mut cumulative = 0.0;
        for r in RANKS {
            let count = shoe[r];
            if count == 0 {
                continue;
            }
            let weight = count as f64;
            let next_shoe = shoe.removed(r);
            let (score, soft) = score_of_two(split_card, r);

            let mut best = self.stand_ev(next_shoe, score, soft, true, upcard, true);
            if can_hit {
                best = best.max(self.hit_ev(next_shoe, score, soft, upcard));
            }
            if can_double {
                best = best.max(self.double_ev(next_shoe, score, soft, upcard));
            }

            cumulative += weight * 2.0 * best;
        }
        cumulative / total as f64
    }
}

fn validate(player: &Hand, dealer: &Hand) -> Result<Rank, EngineError> {
    if player.is_empty() {
        return Err(EngineError::EmptyPlayerHand);
    }
    if dealer.is_empty() {
        return Err(EngineError::EmptyDealerHand);
    }
    Ok(dealer[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand;
    use crate::shoe;
    use crate::types::TEN;

    fn engine() -> Engine {
        Engine::new(BlackjackRules::las_vegas())
    }

    #[test]
    fn stand_and_hit_are_bounded() {
        let mut e = engine();
        let s = shoe!(6);
        let player = hand![TEN, 6];
        let dealer = hand![TEN];
        let stand = e.stand(&s, &player, &dealer).unwrap();
        let hit = e.hit(&s, &player, &dealer).unwrap();
        assert!((-1.0..=1.5).contains(&stand));
        assert!((-1.0..=1.5).contains(&hit));
    }

    #[test]
    fn hard_16_vs_10_favors_hitting() {
        let mut e = engine();
        let s = shoe!(6);
        let player = hand![TEN, 6];
        let dealer = hand![TEN];
        let stand = e.stand(&s, &player, &dealer).unwrap();
        let hit = e.hit(&s, &player, &dealer).unwrap();
        assert!(hit > stand, "expected hit ({hit}) > stand ({stand}) on hard 16 vs 10");
    }

    #[test]
    fn pair_of_fives_prefers_hit_over_double() {
        let mut e = engine();
        let s = shoe!(6);
        let player = hand![5, 5];
        let dealer = hand![TEN];
        let hit = e.hit(&s, &player, &dealer).unwrap();
        let double = e.double(&s, &player, &dealer).unwrap();
        assert!(hit > double, "expected hit ({hit}) > double ({double}) on 5,5 vs 10");
    }

    #[test]
    fn splitting_aces_beats_every_alternative() {
        let mut e = engine();
        let s = shoe!(6);
        let player = hand![ACE, ACE];
        let dealer = hand![6];
        let analysis = e.analyze(&s, &player, &dealer).unwrap();
        assert_eq!(analysis.best, Action::Split);
    }

    #[test]
    fn split_rejected_on_non_pair() {
        let mut e = engine();
        let s = shoe!(6);
        let player = hand![TEN, 6];
        let dealer = hand![TEN];
        assert_eq!(e.split(&s, &player, &dealer), Err(EngineError::NotSplittable(vec![TEN, 6])));
    }

    #[test]
    fn empty_hands_are_rejected() {
        let mut e = engine();
        let s = shoe!(6);
        let empty = Hand::new(vec![]);
        let dealer = hand![TEN];
        assert_eq!(e.stand(&s, &empty, &dealer), Err(EngineError::EmptyPlayerHand));
        assert_eq!(e.stand(&s, &hand![TEN, 6], &empty), Err(EngineError::EmptyDealerHand));
    }

    #[test]
    fn inputs_are_not_mutated() {
        let mut e = engine();
        let s = shoe!(6);
        let before = s;
        let player = hand![TEN, 6];
        let dealer = hand![TEN];
        let _ = e.analyze(&s, &player, &dealer).unwrap();
        assert_eq!(s, before);
        assert_eq!(player.cards, vec![TEN, 6]);
    }

    #[test]
    fn repeated_queries_are_deterministic() {
        let mut e = engine();
        let s = shoe!(6);
        let player = hand![TEN, 6];
        let dealer = hand![TEN];
        let a = e.stand(&s, &player, &dealer).unwrap();
        let b = e.stand(&s, &player, &dealer).unwrap();
        assert_eq!(a, b);
    }

    // Classic basic-strategy reference hands. These pin down the
    // qualitative claims (sign, ordering, which action wins) rather than
    // magic constants, since those require running the engine to confirm
    // bit-exact.

    #[test]
    fn scenario_1_twenty_vs_six_is_a_strong_favorite() {
        let mut e = engine();
        let s = shoe!(6);
        let player = hand![TEN, TEN];
        let dealer = hand![6];
        let stand = e.stand(&s, &player, &dealer).unwrap();
        assert!((0.5..0.9).contains(&stand), "expected a strong positive EV, got {stand}");
    }

    #[test]
    fn scenario_2_hard_16_vs_10_is_a_clear_underdog() {
        let mut e = engine();
        let s = shoe!(6);
        let player = hand![TEN, 6];
        let dealer = hand![TEN];
        let stand = e.stand(&s, &player, &dealer).unwrap();
        assert!((-0.7..-0.3).contains(&stand), "expected a clearly negative EV, got {stand}");
    }

    #[test]
    fn scenario_6_player_natural_vs_ten_upcard() {
        let mut e = engine();
        let s = shoe!(6);
        let player = hand![TEN, ACE];
        let dealer = hand![TEN];
        let stand = e.stand(&s, &player, &dealer).unwrap();
        // Peek prunes the dealer-natural branch entirely, so conditional on
        // the player still being at the table the payout is the full odds.
        let odds = e.rules().blackjack_odds;
        assert!((stand - odds).abs() < 1e-9, "expected stand ({stand}) == blackjack_odds ({odds})");
    }
}

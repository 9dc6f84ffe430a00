/// Immutable house-rule configuration consumed by [`crate::engine::Engine`].
///
/// An `Engine` is built once against a `BlackjackRules` and that rule set
/// never changes for the lifetime of the engine; switching rules means
/// building a new engine (and, with it, a fresh cache — see
/// [`crate::engine::Engine::new`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackjackRules {
    /// Payout multiplier for a player natural, e.g. `1.5` for 3:2 or `1.2` for 6:5.
    pub blackjack_odds: f64,
    /// Dealer draws on soft 17 rather than standing.
    pub dealer_hits_on_soft_17: bool,
    /// Dealer checks the hole card for a natural before the player acts.
    pub dealer_peeks_for_21: bool,
    /// A 21 reached on the first two cards of a post-split hand pays blackjack odds.
    pub natural_blackjack_splits: bool,
    /// Doubling is allowed after a split.
    pub double_after_split: bool,
    /// Hitting is allowed after splitting aces.
    pub hit_split_aces: bool,
    /// Doubling is allowed after splitting aces (requires `hit_split_aces`).
    pub double_split_aces: bool,
    /// Surrender is offered. Reserved: the core EV engine does not price it.
    pub can_surrender: bool,
}

impl BlackjackRules {
    /// Typical multi-deck Las Vegas Strip rules: H17, peek, 3:2, DAS.
    pub fn las_vegas() -> Self {
        BlackjackRules {
            blackjack_odds: 1.5,
            dealer_hits_on_soft_17: true,
            dealer_peeks_for_21: true,
            natural_blackjack_splits: false,
            double_after_split: true,
            hit_split_aces: false,
            double_split_aces: false,
            can_surrender: false,
        }
    }

    /// Atlantic City rules: S17, peek, 3:2, DAS, late surrender.
    pub fn atlantic_city() -> Self {
        BlackjackRules {
            dealer_hits_on_soft_17: false,
            can_surrender: true,
            ..Self::las_vegas()
        }
    }

    /// European no-hole-card rules: the dealer does not peek, so a dealer
    /// natural can still be drawn into after the player has already doubled
    /// or split.
    pub fn european() -> Self {
        BlackjackRules {
            dealer_peeks_for_21: false,
            double_after_split: false,
            ..Self::las_vegas()
        }
    }

    /// Single-deck rules typically pair with stricter doubling and no DAS.
    pub fn single_deck() -> Self {
        BlackjackRules {
            double_after_split: false,
            ..Self::las_vegas()
        }
    }
}

impl Default for BlackjackRules {
    fn default() -> Self {
        Self::las_vegas()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_distinct() {
        assert!(BlackjackRules::atlantic_city().can_surrender);
        assert!(!BlackjackRules::las_vegas().can_surrender);
        assert!(!BlackjackRules::european().dealer_peeks_for_21);
    }
}

use crate::rules::BlackjackRules;

/// Settle a single terminal player/dealer hand pair into a payoff in units
/// of the initial wager, given as plain (score, two-card?) facts so callers
/// never need to materialize the actual cards to classify an outcome.
///
/// `split_flag` gates whether a two-card 21 on this hand still counts as a
/// natural for payout purposes (see `BlackjackRules::natural_blackjack_splits`).
pub fn outcome(
    player_score: u32,
    player_is_two: bool,
    dealer_score: u32,
    dealer_is_two: bool,
    split_flag: bool,
    rules: &BlackjackRules,
) -> f64 {
    let player_natural =
        player_score == 21 && player_is_two && (!split_flag || rules.natural_blackjack_splits);
    let dealer_natural = dealer_score == 21 && dealer_is_two;

    match (player_natural, dealer_natural) {
        (true, true) => 0.0,
        (true, false) => rules.blackjack_odds,
        (false, true) => -1.0,
        (false, false) => {
            if player_score > 21 {
                -1.0
            } else if dealer_score > 21 {
                1.0
            } else if player_score > dealer_score {
                1.0
            } else if player_score < dealer_score {
                -1.0
            } else {
                0.0
            }
        }
    }
}

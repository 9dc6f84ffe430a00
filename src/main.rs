mod engine;
mod error;
mod hand;
mod outcome;
mod rules;
mod shoe;
mod types;

use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::info;
use strum::IntoEnumIterator;

use crate::engine::Engine;
use crate::hand::Hand;
use crate::rules::BlackjackRules;
use crate::shoe::Shoe;
use crate::types::{Action, Rank, ACE, TEN};

/// Exact expected-value calculator for a single blackjack decision.
///
/// Enumerates every reachable future card sequence weighted by its
/// conditional probability given the remaining shoe; this is not a
/// simulation, so results are deterministic and exact to the tolerance of
/// IEEE-754 double arithmetic.
#[derive(Parser, Debug)]
#[command(name = "blackjack-ev", version, about)]
struct Cli {
    /// Player's cards, e.g. "-p 10,6" or "-p A,A". Ten-value face cards may
    /// be written as 10, T, J, Q, or K.
    #[arg(short = 'p', long, value_delimiter = ',')]
    player: Vec<String>,

    /// Dealer's up-card.
    #[arg(short = 'd', long)]
    dealer: String,

    /// Number of 52-card decks in the shoe before any cards are removed.
    #[arg(long, default_value_t = 6)]
    decks: u32,

    /// Named house-rule preset.
    #[arg(long, value_enum, default_value_t = RulePreset::LasVegas)]
    rules: RulePreset,

    /// Print only the EV of this action instead of analyzing every legal one.
    #[arg(long, value_enum)]
    action: Option<ActionArg>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum RulePreset {
    LasVegas,
    AtlanticCity,
    European,
    SingleDeck,
}

impl RulePreset {
    fn rules(self) -> BlackjackRules {
        match self {
            RulePreset::LasVegas => BlackjackRules::las_vegas(),
            RulePreset::AtlanticCity => BlackjackRules::atlantic_city(),
            RulePreset::European => BlackjackRules::european(),
            RulePreset::SingleDeck => BlackjackRules::single_deck(),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ActionArg {
    Stand,
    Hit,
    Double,
    Split,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let player_ranks: Result<Vec<Rank>, String> =
        cli.player.iter().map(|s| parse_rank(s)).collect();
    let player_ranks = match player_ranks {
        Ok(ranks) => ranks,
        Err(e) => return fail(&e),
    };
    let dealer_rank = match parse_rank(&cli.dealer) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    let player = Hand::new(player_ranks);
    let dealer = Hand::new(vec![dealer_rank]);

    let mut shoe = Shoe::standard(cli.decks);
    for &r in &player.cards {
        shoe = shoe.removed(r);
    }
    shoe = shoe.removed(dealer_rank);

    let rules = cli.rules.rules();
    info!("evaluating {:?} vs {:?} under {:?}", player.cards, dealer.cards, cli.rules);
    let mut engine = Engine::new(rules);

    if let Some(action) = cli.action {
        return match evaluate_one(&mut engine, &shoe, &player, &dealer, action) {
            Ok(ev) => {
                println!("{action:?}: {ev:+.6}");
                ExitCode::SUCCESS
            }
            Err(e) => fail(&e),
        };
    }

    match engine.analyze(&shoe, &player, &dealer) {
        Ok(analysis) => {
            for action in Action::iter() {
                match analysis.choices[action] {
                    Some(ev) => println!("{action:?}: {ev:+.6}"),
                    None => println!("{action:?}: n/a"),
                }
            }
            println!("best: {:?} ({:+.6})", analysis.best, analysis.best_ev);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn evaluate_one(
    engine: &mut Engine,
    shoe: &Shoe,
    player: &Hand,
    dealer: &Hand,
    action: ActionArg,
) -> Result<f64, error::EngineError> {
    match action {
        ActionArg::Stand => engine.stand(shoe, player, dealer),
        ActionArg::Hit => engine.hit(shoe, player, dealer),
        ActionArg::Double => engine.double(shoe, player, dealer),
        ActionArg::Split => engine.split(shoe, player, dealer),
    }
}

fn fail(message: &impl std::fmt::Display) -> ExitCode {
    eprintln!("error: {message}");
    ExitCode::FAILURE
}

/// Parse a single card token into a [`Rank`]. Accepts `A` for the ace,
/// `2`-`9` for pip cards, and `10`/`T`/`J`/`Q`/`K` (any case) for the
/// collapsed ten-value class.
fn parse_rank(s: &str) -> Result<Rank, String> {
    let s = s.trim();
    match s.to_ascii_uppercase().as_str() {
        "A" => Ok(ACE),
        "10" | "T" | "J" | "Q" | "K" => Ok(TEN),
        _ => match s.parse::<usize>() {
            Ok(n @ 2..=9) => Ok(n - 1),
            _ => Err(format!("invalid card: {s:?}")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aces_and_faces() {
        assert_eq!(parse_rank("A"), Ok(ACE));
        assert_eq!(parse_rank("a"), Ok(ACE));
        assert_eq!(parse_rank("10"), Ok(TEN));
        assert_eq!(parse_rank("K"), Ok(TEN));
        assert_eq!(parse_rank("q"), Ok(TEN));
    }

    #[test]
    fn parses_pip_cards() {
        assert_eq!(parse_rank("2"), Ok(1));
        assert_eq!(parse_rank("9"), Ok(8));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_rank("11").is_err());
        assert!(parse_rank("0").is_err());
        assert!(parse_rank("").is_err());
    }
}

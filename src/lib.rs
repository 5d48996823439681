//! Texas Hold'em hand evaluation and equity estimation.
//!
//! ```
//! use holdem_equity::{compute_equity, EquityConfig, Holding};
//!
//! let hero = Holding::parse("AsAh").unwrap();
//! let villain = Holding::parse("QQ+,AKs").unwrap();
//! let cfg = EquityConfig::default().with_seed(7).with_trials(10_000);
//! let result = compute_equity(&hero, &[villain], &[], &cfg).unwrap();
//! assert!(result.hero().equity > 0.5);
//! ```

pub mod bitboard;
pub mod card;
pub mod deck;
pub mod equity;
pub mod error;
pub mod evaluator;
pub mod lut;
pub mod mask;
pub mod odds;
pub mod range;
pub mod strength;

pub use bitboard::{SuitMasks, MASK13};
pub use card::{parse_cards, Card, Rank, Suit};
pub use deck::{make_deck, Deck};
pub use equity::{
    compute_equity, compute_equity_cancellable, showdown, EquityConfig, EquityResult, Mode,
    PlayerEquity, Status, MAX_PLAYERS, MAX_WORKERS,
};
pub use error::{Error, Result};
pub use evaluator::{best_five, evaluate, evaluate_masks};
pub use mask::CardSet;
pub use odds::{breakeven_equity, decide, expected_value, pot_odds, Advice, Decision};
pub use range::{Combo, Holding, Range};
pub use strength::{Category, HandStrength};

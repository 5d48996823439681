//! Crate-wide error type.

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Malformed card text, card id out of range, or a card given twice.
    InvalidCard(String),
    /// The evaluator was handed the wrong number of cards or a duplicate.
    InvalidHand(String),
    /// Asked to draw more cards than the deck holds.
    InsufficientCards { requested: usize, available: usize },
    /// Negative/NaN weight, a non 2-card entry, or bad range notation.
    InvalidRange(String),
    /// No live combo left to sample. `player` is set when the engine knows
    /// whose holding it was (0 = hero).
    RangeExhausted { player: Option<usize> },
    /// Trial retries exhausted; the query cannot be dealt.
    Simulation { attempts: u32, player: usize },
    /// Deadline passed before a single trial completed.
    Timeout,
    InvalidBoard(usize),
    TooFewPlayers,
    TooManyPlayers(usize),
    InvalidConfig(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidCard(msg) => write!(f, "invalid card: {msg}"),
            Error::InvalidHand(msg) => write!(f, "invalid hand: {msg}"),
            Error::InsufficientCards {
                requested,
                available,
            } => write!(
                f,
                "cannot draw {requested} cards from a deck of {available}"
            ),
            Error::InvalidRange(msg) => write!(f, "invalid range: {msg}"),
            Error::RangeExhausted { player: Some(p) } => {
                write!(f, "range of player {p} has no live combos")
            }
            Error::RangeExhausted { player: None } => write!(f, "range has no live combos"),
            Error::Simulation { attempts, player } => write!(
                f,
                "gave up dealing player {player} after {attempts} attempts"
            ),
            Error::Timeout => write!(f, "timed out before any trial completed"),
            Error::InvalidBoard(n) => write!(f, "board must have 0, 3, 4 or 5 cards, got {n}"),
            Error::TooFewPlayers => write!(f, "at least one opponent is required"),
            Error::TooManyPlayers(n) => write!(f, "too many players: {n}"),
            Error::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

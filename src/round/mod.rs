//! Round lifecycle
//!
//! Owns everything that lives for exactly one round: the shuffled deck,
//! the countdown, the append-only tally and the stage machine that ties
//! gestures to them.

pub mod deck;
pub mod machine;
pub mod state;

pub use deck::{Deck, shuffle};
pub use machine::Round;
pub use state::{FinishReason, HistoryEntry, Outcome, RoundConfig, RoundResult, Stage, Tally};

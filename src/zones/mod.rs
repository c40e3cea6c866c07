//! Card piles and shuffling.
//!
//! Each room owns two piles: prompts and responses. A pile is a draw deck
//! plus a discard pile; drawing past the end of the deck recycles the
//! discard underneath whatever is left.
//!
//! ## Key Types
//!
//! - `Pile`: Deck + discard with draw/discard/reshuffle
//! - `PileKind`: Which of the two piles
//! - `Draw`: Result of a draw (cards, whether a reshuffle happened)
//! - `shuffle`: Fisher-Yates over any `rand::Rng`

pub mod pile;
pub mod shuffle;

pub use pile::{Draw, Pile, PileKind};
pub use shuffle::shuffle;

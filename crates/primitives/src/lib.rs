//! Value types shared by the controller and the worker: scored guesses and
//! guess feedback patterns.

/// Guess feedback patterns.
pub mod pattern;
/// Scored guess statistics and best-list ranking.
pub mod stat;

pub use pattern::{Mark, Pattern, PatternError, WORD_LEN};
pub use stat::{WordStat, rank};

use botle_primitives::{Pattern, WordStat};
use thiserror::Error;

/// Failure reported by the solving engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct EngineError(pub String);

impl EngineError {
	/// Creates an error from any message.
	pub fn new(message: impl Into<String>) -> Self {
		Self(message.into())
	}
}

/// The solving engine, driven exclusively by the compute loop.
///
/// The engine is single-instance and mutated in place; the compute loop calls
/// it from one sequential context, so implementations need no locking.
pub trait Engine: Send + 'static {
	/// Replaces the dictionary and resets all game state.
	fn load_dict(&mut self, allowed_guesses: &[String], possible_secrets: &[String], hard_mode: bool) -> Result<(), EngineError>;

	/// Computes the next streamed result for the current state.
	///
	/// `Ok(None)` means the search space is exhausted.
	fn compute_next_suggestion(&mut self) -> Result<Option<WordStat>, EngineError>;

	/// Applies a guess and its feedback.
	fn make_guess(&mut self, word: &str, pattern: Pattern) -> Result<(), EngineError>;

	/// Stable identifier of the current state, used for external cache lookups.
	fn cache_key(&self) -> String;

	/// Undoes the last guess; returns whether there was one.
	fn back(&mut self) -> bool;
}

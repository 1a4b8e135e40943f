//! Scripted engine double for exercising the pipeline without a solver.

use std::sync::Arc;

use botle_primitives::{Pattern, WordStat};
use parking_lot::Mutex;

use crate::engine::{Engine, EngineError};

/// Shared log of engine calls, readable after the engine moved into a loop.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
	/// All recorded calls, oldest first.
	pub fn entries(&self) -> Vec<String> {
		self.0.lock().clone()
	}

	/// Number of recorded calls equal to `entry`.
	pub fn count(&self, entry: &str) -> usize {
		self.0.lock().iter().filter(|e| *e == entry).count()
	}

	fn record(&self, entry: impl Into<String>) {
		self.0.lock().push(entry.into());
	}
}

/// Engine that replays a fixed list of suggestions.
///
/// Every state change (dictionary load, guess, undo) restarts the script from
/// the top, the way a real engine restarts its search. The cache key is
/// `root` before any guess, else the guess history as `WORD-PATTERN` joined
/// by `+`.
#[derive(Debug)]
pub struct ScriptedEngine {
	script: Vec<WordStat>,
	cursor: usize,
	fail_at: Option<usize>,
	allowed: Vec<String>,
	history: Vec<(String, Pattern)>,
	journal: Journal,
}

impl ScriptedEngine {
	/// Creates an engine that streams `script` for every state.
	pub fn new(script: Vec<WordStat>) -> Self {
		Self {
			script,
			cursor: 0,
			fail_at: None,
			allowed: Vec::new(),
			history: Vec::new(),
			journal: Journal::default(),
		}
	}

	/// Makes the step at script position `step` fail once.
	pub fn failing_at(mut self, step: usize) -> Self {
		self.fail_at = Some(step);
		self
	}

	/// Handle to the call log.
	pub fn journal(&self) -> Journal {
		self.journal.clone()
	}
}

impl Engine for ScriptedEngine {
	fn load_dict(&mut self, allowed_guesses: &[String], possible_secrets: &[String], hard_mode: bool) -> Result<(), EngineError> {
		self.journal.record(format!(
			"load-dict {} {} {hard_mode}",
			allowed_guesses.len(),
			possible_secrets.len()
		));
		if allowed_guesses.is_empty() {
			return Err(EngineError::new("dictionary has no allowed guesses"));
		}
		self.allowed = allowed_guesses.to_vec();
		self.history.clear();
		self.cursor = 0;
		Ok(())
	}

	fn compute_next_suggestion(&mut self) -> Result<Option<WordStat>, EngineError> {
		self.journal.record("step");
		if self.fail_at == Some(self.cursor) {
			self.fail_at = None;
			return Err(EngineError::new("simulated engine failure"));
		}
		let next = self.script.get(self.cursor).cloned();
		self.cursor += 1;
		Ok(next)
	}

	fn make_guess(&mut self, word: &str, pattern: Pattern) -> Result<(), EngineError> {
		self.journal.record(format!("make-guess {word} {pattern}"));
		if !self.allowed.is_empty() && !self.allowed.iter().any(|w| w == word) {
			return Err(EngineError::new(format!("{word} is not an allowed guess")));
		}
		self.history.push((word.to_owned(), pattern));
		self.cursor = 0;
		Ok(())
	}

	fn cache_key(&self) -> String {
		if self.history.is_empty() {
			return "root".to_owned();
		}
		self.history
			.iter()
			.map(|(word, pattern)| format!("{word}-{pattern}"))
			.collect::<Vec<_>>()
			.join("+")
	}

	fn back(&mut self) -> bool {
		self.journal.record("back");
		self.cursor = 0;
		self.history.pop().is_some()
	}
}

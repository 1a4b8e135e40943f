use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of letters in a word, and so of marks in a pattern.
pub const WORD_LEN: usize = 5;

/// Feedback for a single letter of a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
	/// The letter does not occur in the secret (`X`).
	Absent,
	/// The letter occurs elsewhere in the secret (`?`).
	Present,
	/// The letter is in the right position (`!`).
	Exact,
}

impl Mark {
	/// Wire character for this mark.
	pub const fn as_char(self) -> char {
		match self {
			Self::Absent => 'X',
			Self::Present => '?',
			Self::Exact => '!',
		}
	}

	/// Parses a wire character.
	pub const fn from_char(c: char) -> Option<Self> {
		match c {
			'X' => Some(Self::Absent),
			'?' => Some(Self::Present),
			'!' => Some(Self::Exact),
			_ => None,
		}
	}
}

/// Errors from [`Pattern::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
	/// Wrong number of marks.
	#[error("pattern must have {WORD_LEN} marks, got {0}")]
	Length(usize),
	/// Unknown mark character.
	#[error("invalid mark {0:?} (expected 'X', '?' or '!')")]
	Mark(char),
}

/// Feedback for a whole guess, e.g. `X?X!!`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern([Mark; WORD_LEN]);

impl Pattern {
	/// Creates a pattern from explicit marks.
	pub const fn new(marks: [Mark; WORD_LEN]) -> Self {
		Self(marks)
	}

	/// Parses the wire form of a pattern.
	pub fn parse(s: &str) -> Result<Self, PatternError> {
		let len = s.chars().count();
		if len != WORD_LEN {
			return Err(PatternError::Length(len));
		}
		let mut marks = [Mark::Absent; WORD_LEN];
		for (slot, c) in marks.iter_mut().zip(s.chars()) {
			*slot = Mark::from_char(c).ok_or(PatternError::Mark(c))?;
		}
		Ok(Self(marks))
	}

	/// Per-letter marks.
	pub const fn marks(&self) -> &[Mark; WORD_LEN] {
		&self.0
	}

	/// Returns true when every letter is in position.
	pub fn is_solved(&self) -> bool {
		self.0.iter().all(|m| *m == Mark::Exact)
	}
}

impl FromStr for Pattern {
	type Err = PatternError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl TryFrom<String> for Pattern {
	type Error = PatternError;

	fn try_from(s: String) -> Result<Self, Self::Error> {
		Self::parse(&s)
	}
}

impl From<Pattern> for String {
	fn from(pattern: Pattern) -> Self {
		pattern.to_string()
	}
}

impl fmt::Display for Pattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for mark in self.0 {
			write!(f, "{}", mark.as_char())?;
		}
		Ok(())
	}
}

//! Incremental top-K aggregation of streamed suggestions.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use botle_config::DEFAULT_BEST_LIST_LIMIT;
use botle_primitives::{WordStat, rank};

/// Ranked list of the best guesses seen so far in one stream.
///
/// Every word keeps one entry. An entry is replaced only by a measurement
/// with a strictly lower average; any other measurement of the same word just
/// records the deeper search depth. The visible list is rebuilt from all
/// entries after every merge, ranked by [`rank`] and cut to the limit.
#[derive(Debug, Clone)]
pub struct BestList {
	limit: usize,
	by_word: HashMap<String, WordStat>,
	ranked: Vec<WordStat>,
}

impl Default for BestList {
	fn default() -> Self {
		Self::with_limit(DEFAULT_BEST_LIST_LIMIT)
	}
}

impl BestList {
	/// Creates an empty list holding at most `limit` entries.
	pub fn with_limit(limit: usize) -> Self {
		assert!(limit > 0, "best list limit must be > 0");
		Self {
			limit,
			by_word: HashMap::new(),
			ranked: Vec::new(),
		}
	}

	/// Folds one streamed measurement into the list.
	///
	/// Returns the new leader if the top entry changed, compared by guess and
	/// average rather than by any other field.
	pub fn merge(&mut self, update: WordStat) -> Option<&WordStat> {
		let previous = self.ranked.first().cloned();

		match self.by_word.entry(update.guess.clone()) {
			Entry::Vacant(slot) => {
				slot.insert(update);
			}
			Entry::Occupied(mut slot) => {
				let stored = slot.get_mut();
				if update.avg_guesses < stored.avg_guesses {
					*stored = update;
				} else {
					stored.max_depth = update.max_depth;
				}
			}
		}

		self.ranked = self.by_word.values().cloned().collect();
		self.ranked.sort_by(rank);
		self.ranked.truncate(self.limit);

		let leader = self.ranked.first()?;
		match previous {
			Some(prev) if prev.same_standing(leader) => None,
			_ => Some(leader),
		}
	}

	/// Replaces everything with a finished list from the cache.
	///
	/// Per-word history is dropped, so a later [`merge`](Self::merge) starts
	/// from the cached entries' absence. The list is taken in the order given.
	pub fn install_cached(&mut self, mut list: Vec<WordStat>) -> Option<&WordStat> {
		list.truncate(self.limit);
		self.by_word.clear();
		self.ranked = list;
		self.ranked.first()
	}

	/// Drops every entry.
	pub fn clear(&mut self) {
		self.by_word.clear();
		self.ranked.clear();
	}

	/// Entries in rank order.
	pub fn entries(&self) -> &[WordStat] {
		&self.ranked
	}

	/// Top entry.
	pub fn leader(&self) -> Option<&WordStat> {
		self.ranked.first()
	}

	/// Number of visible entries.
	pub fn len(&self) -> usize {
		self.ranked.len()
	}

	/// Whether no entry is visible.
	pub fn is_empty(&self) -> bool {
		self.ranked.is_empty()
	}

	/// Maximum number of visible entries.
	pub fn limit(&self) -> usize {
		self.limit
	}
}

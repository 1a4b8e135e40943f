use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Search statistics for one candidate guess.
///
/// The engine reports a guess repeatedly as its search deepens, so several
/// `WordStat`s with the same `guess` but growing `max_depth` flow through a
/// single thinking stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordStat {
	/// The candidate guess.
	pub guess: String,
	/// Expected number of guesses when opening with `guess`.
	pub avg_guesses: f64,
	/// Number of guesses needed in the worst case.
	pub worst_num_guesses: u32,
	/// Search depth the figures were measured at.
	#[serde(default)]
	pub max_depth: u32,
}

impl WordStat {
	/// Creates a new statistic record.
	pub fn new(guess: impl Into<String>, avg_guesses: f64, worst_num_guesses: u32, max_depth: u32) -> Self {
		Self {
			guess: guess.into(),
			avg_guesses,
			worst_num_guesses,
			max_depth,
		}
	}

	/// Returns true when both records name the same guess at the same average.
	///
	/// This is the equality used for leader-change detection; depth and worst
	/// case refinements of an unchanged leader do not count as a change.
	pub fn same_standing(&self, other: &Self) -> bool {
		self.guess == other.guess && self.avg_guesses == other.avg_guesses
	}
}

/// Best-list ordering: lower average first, then lower worst case, then guess.
pub fn rank(a: &WordStat, b: &WordStat) -> Ordering {
	a.avg_guesses
		.total_cmp(&b.avg_guesses)
		.then_with(|| a.worst_num_guesses.cmp(&b.worst_num_guesses))
		.then_with(|| a.guess.cmp(&b.guess))
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use proptest::prelude::*;

	use super::*;

	#[test]
	fn rank_orders_by_average_then_worst_then_guess() {
		let mut stats = vec![
			WordStat::new("TRACE", 3.5, 5, 1),
			WordStat::new("SLATE", 3.4, 6, 1),
			WordStat::new("CRANE", 3.5, 5, 2),
			WordStat::new("CRATE", 3.5, 4, 1),
		];
		stats.sort_by(rank);
		let order: Vec<_> = stats.iter().map(|s| s.guess.as_str()).collect();
		assert_eq!(order, ["SLATE", "CRATE", "CRANE", "TRACE"]);
	}

	#[test]
	fn same_standing_ignores_depth_and_worst_case() {
		let a = WordStat::new("CRANE", 3.2, 4, 1);
		let b = WordStat::new("CRANE", 3.2, 6, 9);
		assert!(a.same_standing(&b));
		assert!(!a.same_standing(&WordStat::new("CRANE", 3.1, 4, 1)));
		assert!(!a.same_standing(&WordStat::new("CRATE", 3.2, 4, 1)));
	}

	#[test]
	fn decodes_engine_json_with_extra_fields() {
		let json = r#"{"guess":"SALET","avg_guesses":3.42,"worst_num_guesses":5,"max_depth":3,"sum_num_guesses":7920}"#;
		let stat: WordStat = serde_json::from_str(json).unwrap();
		assert_eq!(stat, WordStat::new("SALET", 3.42, 5, 3));
	}

	#[test]
	fn missing_depth_defaults_to_zero() {
		let json = r#"{"guess":"SALET","avg_guesses":3.42,"worst_num_guesses":5}"#;
		let stat: WordStat = serde_json::from_str(json).unwrap();
		assert_eq!(stat.max_depth, 0);
	}

	fn arb_stat() -> impl Strategy<Value = WordStat> {
		("[A-E]{2}", 1.0f64..6.0, 1u32..8, 0u32..4).prop_map(|(g, avg, worst, depth)| WordStat::new(g, avg, worst, depth))
	}

	proptest! {
		#[test]
		fn rank_is_a_total_order(a in arb_stat(), b in arb_stat()) {
			prop_assert_eq!(rank(&a, &b), rank(&b, &a).reverse());
			prop_assert_eq!(rank(&a, &a), Ordering::Equal);
		}
	}
}

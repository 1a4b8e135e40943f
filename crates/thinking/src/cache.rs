//! Lookup of precomputed best lists by engine cache key.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use botle_primitives::WordStat;
use parking_lot::Mutex;

use crate::error::CacheError;

/// Read-only source of finished best lists.
pub trait CacheStore: Send + Sync {
	/// Finished list for `key`, or `None` if nothing was precomputed.
	fn lookup(&self, key: &str) -> Option<Vec<WordStat>>;
}

/// Cache held entirely in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryCacheStore {
	entries: HashMap<String, Vec<WordStat>>,
}

impl MemoryCacheStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds or replaces the list for `key`.
	pub fn insert(&mut self, key: impl Into<String>, list: Vec<WordStat>) {
		self.entries.insert(key.into(), list);
	}
}

impl<K: Into<String>> FromIterator<(K, Vec<WordStat>)> for MemoryCacheStore {
	fn from_iter<I: IntoIterator<Item = (K, Vec<WordStat>)>>(iter: I) -> Self {
		Self {
			entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
		}
	}
}

impl CacheStore for MemoryCacheStore {
	fn lookup(&self, key: &str) -> Option<Vec<WordStat>> {
		self.entries.get(key).filter(|list| !list.is_empty()).cloned()
	}
}

/// Cache backed by a directory of `<key>.json` files.
///
/// Each file holds a JSON array of suggestions in rank order; fields other
/// than those of [`WordStat`] are ignored. Results, including misses, are
/// remembered for the lifetime of the store.
#[derive(Debug)]
pub struct DirCacheStore {
	dir: PathBuf,
	memo: Mutex<HashMap<String, Option<Vec<WordStat>>>>,
}

impl DirCacheStore {
	/// Creates a store reading from `dir`.
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self {
			dir: dir.into(),
			memo: Mutex::new(HashMap::new()),
		}
	}

	/// Directory the store reads from.
	pub fn dir(&self) -> &Path {
		&self.dir
	}

	/// Reads `key` from disk, bypassing the memo.
	///
	/// A missing file is `Ok(None)`.
	pub fn read(&self, key: &str) -> Result<Option<Vec<WordStat>>, CacheError> {
		let path = self.dir.join(format!("{key}.json"));
		let bytes = match std::fs::read(&path) {
			Ok(bytes) => bytes,
			Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
			Err(error) => return Err(CacheError::Io { path, error }),
		};
		serde_json::from_slice(&bytes)
			.map(Some)
			.map_err(|error| CacheError::Decode { path, error })
	}
}

impl CacheStore for DirCacheStore {
	fn lookup(&self, key: &str) -> Option<Vec<WordStat>> {
		if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
			tracing::warn!(key, "cache.key.rejected");
			return None;
		}
		if let Some(hit) = self.memo.lock().get(key) {
			return hit.clone();
		}

		let found = match self.read(key) {
			Ok(list) => list.filter(|list| !list.is_empty()),
			Err(CacheError::Io { path, error }) => {
				// Not remembered: the file may become readable later.
				tracing::warn!(path = %path.display(), %error, "cache.read.failed");
				return None;
			}
			Err(err @ CacheError::Decode { .. }) => {
				tracing::debug!(error = %err, "cache.decode.failed");
				None
			}
		};
		self.memo.lock().insert(key.to_owned(), found.clone());
		found
	}
}

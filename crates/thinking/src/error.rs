//! Error types for the thinking crate.

use std::path::PathBuf;

use thiserror::Error;

/// Failure reading a precomputed list from a [`DirCacheStore`](crate::DirCacheStore).
#[derive(Debug, Error)]
pub enum CacheError {
	/// The cache file exists but could not be read.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// File that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},
	/// The cache file is not a JSON list of suggestions.
	#[error("malformed cache file {path}: {error}")]
	Decode {
		/// File that failed to decode.
		path: PathBuf,
		/// The underlying JSON error.
		error: serde_json::Error,
	},
}

/// Failure starting a worker and its session.
#[derive(Debug, Error)]
pub enum LaunchError {
	/// Called outside a tokio runtime.
	#[error("no tokio runtime: {0}")]
	NoRuntime(#[from] tokio::runtime::TryCurrentError),
	/// The worker thread or its runtime could not be created.
	#[error("failed to spawn worker: {0}")]
	Spawn(#[from] std::io::Error),
	/// The configuration is out of range.
	#[error(transparent)]
	Config(#[from] botle_config::ConfigError),
}

//! Configuration for the thinking pipeline.
//!
//! Configuration is written in TOML. Every key is optional and defaults to
//! the protocol constants:
//!
//! ```toml
//! [pipe]
//! window = 5
//!
//! [thinking]
//! best_list_limit = 50
//!
//! [cache]
//! dir = "public/cache"
//! ```

pub mod error;

use std::path::{Path, PathBuf};

pub use botle_rpc::DEFAULT_WINDOW;
pub use error::{ConfigError, Result};
use serde::Deserialize;

/// Default length of the best-results list.
pub const DEFAULT_BEST_LIST_LIMIT: usize = 50;

/// Parsed configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Flow-controlled pipe settings.
	pub pipe: PipeConfig,
	/// Result aggregation settings.
	pub thinking: ThinkingConfig,
	/// Precomputed result cache settings.
	pub cache: CacheConfig,
}

/// `[pipe]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipeConfig {
	/// Maximum unacknowledged payload frames.
	pub window: usize,
}

impl Default for PipeConfig {
	fn default() -> Self {
		Self { window: DEFAULT_WINDOW }
	}
}

/// `[thinking]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThinkingConfig {
	/// Number of entries kept in the best-results list.
	pub best_list_limit: usize,
}

impl Default for ThinkingConfig {
	fn default() -> Self {
		Self {
			best_list_limit: DEFAULT_BEST_LIST_LIMIT,
		}
	}
}

/// `[cache]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
	/// Directory holding `<key>.json` precomputed best lists.
	pub dir: Option<PathBuf>,
}

impl Config {
	/// Parses and validates configuration from TOML text.
	pub fn from_toml_str(input: &str) -> Result<Self> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	/// Reads, parses and validates a configuration file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&input)
	}

	/// Rejects values the pipeline cannot run with.
	pub fn validate(&self) -> Result<()> {
		if self.pipe.window == 0 {
			return Err(ConfigError::InvalidValue {
				field: "pipe.window",
				reason: "must be at least 1",
			});
		}
		if self.thinking.best_list_limit == 0 {
			return Err(ConfigError::InvalidValue {
				field: "thinking.best_list_limit",
				reason: "must be at least 1",
			});
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use super::*;

	#[test]
	fn empty_document_uses_defaults() {
		let config = Config::from_toml_str("").unwrap();
		assert_eq!(config, Config::default());
		assert_eq!(config.pipe.window, DEFAULT_WINDOW);
		assert_eq!(config.thinking.best_list_limit, DEFAULT_BEST_LIST_LIMIT);
		assert_eq!(config.cache.dir, None);
	}

	#[test]
	fn default_window_is_the_pipe_default() {
		assert_eq!(PipeConfig::default().window, botle_rpc::DEFAULT_WINDOW);
	}

	#[test]
	fn partial_sections_keep_other_defaults() {
		let config = Config::from_toml_str("[pipe]\nwindow = 2\n\n[cache]\ndir = \"cache\"\n").unwrap();
		assert_eq!(config.pipe.window, 2);
		assert_eq!(config.thinking.best_list_limit, DEFAULT_BEST_LIST_LIMIT);
		assert_eq!(config.cache.dir.as_deref(), Some(Path::new("cache")));
	}

	#[test]
	fn zero_window_is_rejected() {
		let err = Config::from_toml_str("[pipe]\nwindow = 0\n").unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { field: "pipe.window", .. }));
	}

	#[test]
	fn zero_limit_is_rejected() {
		let err = Config::from_toml_str("[thinking]\nbest_list_limit = 0\n").unwrap_err();
		assert!(matches!(
			err,
			ConfigError::InvalidValue {
				field: "thinking.best_list_limit",
				..
			}
		));
	}

	#[test]
	fn unknown_keys_are_rejected() {
		let err = Config::from_toml_str("[pipe]\nwindw = 3\n").unwrap_err();
		assert!(matches!(err, ConfigError::Toml(_)));
	}

	#[test]
	fn load_reads_file_and_reports_missing_path() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[thinking]\nbest_list_limit = 10").unwrap();
		let config = Config::load(file.path()).unwrap();
		assert_eq!(config.thinking.best_list_limit, 10);

		let missing = file.path().with_extension("missing");
		let err = Config::load(&missing).unwrap_err();
		assert!(matches!(err, ConfigError::Io { path, .. } if path == missing));
	}
}

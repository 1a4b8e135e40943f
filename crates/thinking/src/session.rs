//! UI-facing orchestration of one game's thinking.
//!
//! A [`ThinkingSession`] turns user actions (load a dictionary, pick a guess,
//! undo) into worker requests, answers from the cache when it can, and
//! otherwise folds the worker's stream into a [`BestList`].

use std::sync::Arc;

use botle_client::WorkerSocket;
use botle_primitives::{Pattern, WORD_LEN, WordStat};
use botle_rpc::Result;
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::best::BestList;
use crate::cache::CacheStore;

/// Progress of the current position's search.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ThinkingStatus {
	/// Nothing has arrived yet for the current position.
	#[default]
	Initializing,
	/// Updates are arriving.
	Thinking,
	/// The search finished or the list came from the cache.
	Done,
}

/// Result of [`ThinkingSession::back`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
	/// A guess was undone and thinking restarted for the earlier position.
	Rewound,
	/// There was nothing to undo.
	AtStart,
}

/// Word lists and rules for one game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
	/// Words the player may guess.
	pub allowed_guesses: Vec<String>,
	/// Words that may be the answer. Empty means any allowed guess.
	pub possible_secrets: Vec<String>,
	/// Whether revealed hints must be reused.
	pub hard_mode: bool,
}

impl Dictionary {
	/// Builds a dictionary from newline-separated word lists.
	pub fn from_word_lists(allowed_guesses: &str, possible_secrets: Option<&str>, hard_mode: bool) -> Self {
		Self {
			allowed_guesses: parse_word_list(allowed_guesses),
			possible_secrets: possible_secrets.map(parse_word_list).unwrap_or_default(),
			hard_mode,
		}
	}
}

/// Keeps the lines of `text` that are exactly one word long.
pub fn parse_word_list(text: &str) -> Vec<String> {
	text.lines()
		.filter(|line| line.chars().count() == WORD_LEN)
		.map(str::to_owned)
		.collect()
}

/// Point-in-time copy of the session's visible state.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
	/// Best guesses in rank order.
	pub best: Vec<WordStat>,
	/// Top entry of `best`.
	pub leader: Option<WordStat>,
	/// Search progress.
	pub status: ThinkingStatus,
	/// Word named by the most recent update.
	pub thinking_word: Option<String>,
}

/// Receives the new leader whenever it changes.
pub type SelectionFn = Box<dyn FnMut(&WordStat) + Send>;

struct Panel {
	best: BestList,
	thinking_word: Option<String>,
	generation: u64,
}

struct Shared {
	panel: Mutex<Panel>,
	status: watch::Sender<ThinkingStatus>,
	on_selection: Mutex<Option<SelectionFn>>,
}

impl Shared {
	fn set_status(&self, status: ThinkingStatus) {
		self.status.send_if_modified(|current| std::mem::replace(current, status) != status);
	}

	/// Clears the panel for a fresh stream and returns its generation.
	fn reset(&self) -> u64 {
		let mut panel = self.panel.lock();
		panel.generation += 1;
		panel.best.clear();
		panel.thinking_word = None;
		self.set_status(ThinkingStatus::Initializing);
		panel.generation
	}

	fn install(&self, list: Vec<WordStat>) {
		let leader = {
			let mut panel = self.panel.lock();
			panel.generation += 1;
			panel.thinking_word = None;
			self.set_status(ThinkingStatus::Done);
			panel.best.install_cached(list).cloned()
		};
		if let Some(leader) = leader {
			self.notify(&leader);
		}
	}

	fn update(&self, generation: u64, update: WordStat) {
		let leader = {
			let mut panel = self.panel.lock();
			if panel.generation != generation {
				return;
			}
			panel.thinking_word = Some(update.guess.clone());
			self.set_status(ThinkingStatus::Thinking);
			panel.best.merge(update).cloned()
		};
		if let Some(leader) = leader {
			self.notify(&leader);
		}
	}

	fn finish(&self, generation: u64) {
		let panel = self.panel.lock();
		if panel.generation == generation {
			self.set_status(ThinkingStatus::Done);
		}
	}

	fn notify(&self, leader: &WordStat) {
		tracing::trace!(guess = %leader.guess, avg = leader.avg_guesses, "thinking.leader");
		if let Some(on_selection) = self.on_selection.lock().as_mut() {
			on_selection(leader);
		}
	}
}

/// Controller-side state for one game.
///
/// Clones share the same state and worker connection.
#[derive(Clone)]
pub struct ThinkingSession {
	socket: WorkerSocket,
	cache: Arc<dyn CacheStore>,
	shared: Arc<Shared>,
}

impl ThinkingSession {
	/// Creates a session talking to the worker behind `socket`.
	pub fn new(socket: WorkerSocket, cache: Arc<dyn CacheStore>, best_list_limit: usize) -> Self {
		let (status, _) = watch::channel(ThinkingStatus::Initializing);
		Self {
			socket,
			cache,
			shared: Arc::new(Shared {
				panel: Mutex::new(Panel {
					best: BestList::with_limit(best_list_limit),
					thinking_word: None,
					generation: 0,
				}),
				status,
				on_selection: Mutex::new(None),
			}),
		}
	}

	/// Registers the leader-change callback, replacing any previous one.
	///
	/// The callback runs on the controller's main loop and must not call
	/// back into the session's async methods.
	pub fn on_selection_change(&self, callback: impl FnMut(&WordStat) + Send + 'static) {
		*self.shared.on_selection.lock() = Some(Box::new(callback));
	}

	/// Loads `dictionary` and starts thinking about the opening position.
	pub async fn prepare(&self, dictionary: Dictionary) -> Result<()> {
		tracing::debug!(
			allowed = dictionary.allowed_guesses.len(),
			secrets = dictionary.possible_secrets.len(),
			hard_mode = dictionary.hard_mode,
			"thinking.prepare"
		);
		self.socket
			.load_dict(dictionary.allowed_guesses, dictionary.possible_secrets, dictionary.hard_mode)
			.await?;
		self.schedule_think().await
	}

	/// Fills the panel for the engine's current position.
	///
	/// A cached list is installed as finished. Otherwise the panel is cleared
	/// and a new stream is started.
	pub async fn schedule_think(&self) -> Result<()> {
		let key = self.socket.cache_key().await?;
		if let Some(list) = self.lookup(&key).await {
			tracing::debug!(key, len = list.len(), "thinking.cache.hit");
			self.shared.install(list);
			return Ok(());
		}

		tracing::debug!(key, "thinking.cache.miss");
		let generation = self.shared.reset();
		let on_update = Arc::clone(&self.shared);
		let on_done = Arc::clone(&self.shared);
		self.socket
			.start_thinking(
				Box::new(move |update| on_update.update(generation, update)),
				Box::new(move || on_done.finish(generation)),
			)
			.await
	}

	/// Cache stores may touch the filesystem, so lookups run on the blocking pool.
	async fn lookup(&self, key: &str) -> Option<Vec<WordStat>> {
		let cache = Arc::clone(&self.cache);
		let owned = key.to_owned();
		match tokio::task::spawn_blocking(move || cache.lookup(&owned)).await {
			Ok(list) => list,
			Err(err) => {
				tracing::warn!(key, error = %err, "thinking.cache.lookup_failed");
				None
			}
		}
	}

	/// Plays `word` with feedback `pattern` and thinks about the new position.
	pub async fn select(&self, word: impl Into<String>, pattern: Pattern) -> Result<()> {
		self.socket.make_guess(word.into(), pattern).await?;
		self.schedule_think().await
	}

	/// Undoes the last guess.
	pub async fn back(&self) -> Result<BackOutcome> {
		if !self.socket.back().await? {
			return Ok(BackOutcome::AtStart);
		}
		self.schedule_think().await?;
		Ok(BackOutcome::Rewound)
	}

	/// Asks the worker to stop the current stream.
	pub async fn stop(&self) -> Result<()> {
		self.socket.stop_thinking().await
	}

	/// Current visible state.
	pub fn snapshot(&self) -> Snapshot {
		let panel = self.shared.panel.lock();
		Snapshot {
			best: panel.best.entries().to_vec(),
			leader: panel.best.leader().cloned(),
			status: *self.shared.status.borrow(),
			thinking_word: panel.thinking_word.clone(),
		}
	}

	/// Current search progress.
	pub fn status(&self) -> ThinkingStatus {
		*self.shared.status.borrow()
	}

	/// Watches search progress.
	pub fn subscribe(&self) -> watch::Receiver<ThinkingStatus> {
		self.shared.status.subscribe()
	}
}

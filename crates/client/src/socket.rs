//! Cloneable handle to a running [`MainLoop`](crate::MainLoop).

use botle_primitives::Pattern;
use botle_rpc::{Dispatched, Error, Result};
use futures::future::BoxFuture;
use tokio::sync::{mpsc, oneshot};

use crate::mux::{DoneFn, UpdateFn};

/// Work handed from a [`WorkerSocket`] to the main loop.
pub(crate) enum MainLoopEvent {
	LoadDict {
		allowed_guesses: Vec<String>,
		possible_secrets: Vec<String>,
		hard_mode: bool,
		reply: oneshot::Sender<BoxFuture<'static, Result<()>>>,
	},
	StartThinking {
		on_update: UpdateFn,
		on_done: DoneFn,
		dispatched: oneshot::Sender<Dispatched>,
	},
	StopThinking {
		dispatched: oneshot::Sender<Dispatched>,
	},
	MakeGuess {
		word: String,
		pattern: Pattern,
		reply: oneshot::Sender<BoxFuture<'static, Result<()>>>,
	},
	Back(oneshot::Sender<BoxFuture<'static, Result<bool>>>),
	CacheKey(oneshot::Sender<BoxFuture<'static, Result<String>>>),
}

/// Handle for issuing requests to the worker.
///
/// Requests are applied by the main loop in the order they were issued from
/// all clones. Every method fails with [`Error::ServiceStopped`] once the
/// loop has exited.
#[derive(Debug, Clone)]
pub struct WorkerSocket {
	pub(crate) tx: mpsc::UnboundedSender<MainLoopEvent>,
}

impl WorkerSocket {
	/// Creates a socket whose main loop is already gone.
	pub fn new_closed() -> Self {
		let (tx, _) = mpsc::unbounded_channel();
		Self { tx }
	}

	/// Whether the main loop has exited.
	pub fn is_closed(&self) -> bool {
		self.tx.is_closed()
	}

	/// Loads dictionaries into the engine.
	///
	/// Fails with [`Error::Engine`] when the engine rejects them.
	pub async fn load_dict(
		&self,
		allowed_guesses: Vec<String>,
		possible_secrets: Vec<String>,
		hard_mode: bool,
	) -> Result<()> {
		self.call(|reply| MainLoopEvent::LoadDict {
			allowed_guesses,
			possible_secrets,
			hard_mode,
			reply,
		})
		.await?
		.await
	}

	/// Opens a new thinking stream.
	pub async fn start_thinking(&self, on_update: UpdateFn, on_done: DoneFn) -> Result<()> {
		self.dispatch(|dispatched| MainLoopEvent::StartThinking {
			on_update,
			on_done,
			dispatched,
		})
		.await
	}

	/// Asks the worker to end the current stream.
	pub async fn stop_thinking(&self) -> Result<()> {
		self.dispatch(|dispatched| MainLoopEvent::StopThinking { dispatched }).await
	}

	/// Applies a guess and its feedback.
	///
	/// Fails with [`Error::Engine`] when the engine rejects the guess.
	pub async fn make_guess(&self, word: String, pattern: Pattern) -> Result<()> {
		self.call(|reply| MainLoopEvent::MakeGuess { word, pattern, reply })
			.await?
			.await
	}

	/// Undoes the last guess; returns whether there was one.
	pub async fn back(&self) -> Result<bool> {
		self.call(MainLoopEvent::Back).await?.await
	}

	/// Fetches the engine's current cache key.
	pub async fn cache_key(&self) -> Result<String> {
		self.call(MainLoopEvent::CacheKey).await?.await
	}

	async fn dispatch(&self, event: impl FnOnce(oneshot::Sender<Dispatched>) -> MainLoopEvent) -> Result<()> {
		self.call(event).await?.await
	}

	async fn call<T>(&self, event: impl FnOnce(oneshot::Sender<T>) -> MainLoopEvent) -> Result<T> {
		let (tx, rx) = oneshot::channel();
		self.tx.send(event(tx)).map_err(|_| Error::ServiceStopped)?;
		rx.await.map_err(|_| Error::ServiceStopped)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[tokio::test]
	async fn closed_socket() {
		let socket = WorkerSocket::new_closed();
		assert!(socket.is_closed());
		assert_eq!(socket.stop_thinking().await, Err(Error::ServiceStopped));
		assert_eq!(socket.cache_key().await, Err(Error::ServiceStopped));
		assert_eq!(socket.back().await, Err(Error::ServiceStopped));
		assert_eq!(
			socket.start_thinking(Box::new(|_| {}), Box::new(|| {})).await,
			Err(Error::ServiceStopped)
		);
		assert_eq!(
			socket.load_dict(vec!["CRANE".into()], Vec::new(), false).await,
			Err(Error::ServiceStopped)
		);
		assert_eq!(
			socket.make_guess("CRANE".into(), "XXXXX".parse().unwrap()).await,
			Err(Error::ServiceStopped)
		);
	}
}

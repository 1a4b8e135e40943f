//! Request multiplexer over the controller's pipe.
//!
//! Every request gets a fresh [`RequestId`]. Requests that expect an answer
//! register a one-shot slot in the pending map; streamed `update-think`
//! replies are filtered through the [`ThinkingEpoch`] instead. Starting a
//! stream, undoing, guessing, or reloading replaces the epoch id, so anything
//! the worker produced for an older stream is dropped on arrival.

use std::collections::HashMap;
use std::future::Future;

use botle_primitives::{Pattern, WordStat};
use botle_rpc::{
	CounterIdGen, Dispatched, Error, Frame, Pipe, RawSender, Reply, Request, RequestId, Result,
};
use tokio::sync::oneshot;

/// Receives each accepted partial result of the current stream.
pub type UpdateFn = Box<dyn FnMut(WordStat) + Send>;

/// Invoked once when the current stream ends.
pub type DoneFn = Box<dyn FnOnce() + Send>;

/// Which stream the controller currently listens to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ThinkingEpoch {
	/// Id of the most recent epoch-changing request.
	pub id: Option<RequestId>,
	/// Whether a stream tagged with `id` is expected to be running.
	pub active: bool,
}

impl ThinkingEpoch {
	/// Whether an `update-think` tagged `id` belongs to the live stream.
	pub fn accepts(&self, id: RequestId) -> bool {
		self.active && self.id == Some(id)
	}
}

/// Controller-side request layer.
///
/// Like [`Pipe`], this is a plain state machine driven from one sequential
/// context: calls produce frames on `Tx`, and every frame read from the
/// worker goes through [`Multiplexer::handle_frame`].
pub struct Multiplexer<Tx> {
	pipe: Pipe<Request, Tx>,
	ids: CounterIdGen,
	epoch: ThinkingEpoch,
	pending: HashMap<RequestId, oneshot::Sender<Reply>>,
	on_update: Option<UpdateFn>,
	on_done: Option<DoneFn>,
}

impl<Tx> Multiplexer<Tx>
where
	Tx: RawSender<Frame<Request>>,
{
	/// Creates a multiplexer over a pipe with the default window.
	pub fn new(tx: Tx) -> Self {
		Self::from_pipe(Pipe::new(tx))
	}

	/// Creates a multiplexer over a pipe allowing `window` payloads in flight.
	pub fn with_window(tx: Tx, window: usize) -> Self {
		Self::from_pipe(Pipe::with_window(tx, window))
	}

	fn from_pipe(pipe: Pipe<Request, Tx>) -> Self {
		Self {
			pipe,
			ids: CounterIdGen::new(),
			epoch: ThinkingEpoch::default(),
			pending: HashMap::new(),
			on_update: None,
			on_done: None,
		}
	}

	/// Loads the dictionaries. Ends any running stream without notification.
	///
	/// Resolves once the engine has accepted or rejected the dictionary.
	pub fn load_dict(
		&mut self,
		allowed_guesses: Vec<String>,
		possible_secrets: Vec<String>,
		hard_mode: bool,
	) -> impl Future<Output = Result<()>> + Send + 'static {
		let id = self.supersede();
		let (dispatched, reply) = self.correlated(Request::LoadDict {
			allowed_guesses,
			possible_secrets,
			hard_mode,
			id,
		});
		applied("load-dict", dispatched, reply)
	}

	/// Opens a new stream and routes its updates to `on_update`.
	///
	/// Any previous stream is superseded; its `on_done` is never called.
	pub fn start_thinking(&mut self, on_update: UpdateFn, on_done: DoneFn) -> Dispatched {
		if self.epoch.active {
			tracing::debug!(previous = ?self.epoch.id, "client.stream.superseded");
		}
		let id = self.supersede();
		self.epoch.active = true;
		self.on_update = Some(on_update);
		self.on_done = Some(on_done);
		tracing::debug!(%id, "client.stream.start");
		self.pipe.send(Request::StartThinking { id })
	}

	/// Asks the worker to end the current stream.
	///
	/// Updates stop being accepted immediately. The stream's `on_done` runs
	/// when the worker confirms with `stopped-thinking`, which it only sends
	/// if a stream was running.
	pub fn stop_thinking(&mut self) -> Dispatched {
		let id = self.ids.next();
		self.epoch.id = Some(id);
		self.pipe.send(Request::StopThinking { id })
	}

	/// Applies a guess and its feedback.
	///
	/// Resolves to [`Error::Engine`] if the engine rejects the guess.
	pub fn make_guess(&mut self, word: String, pattern: Pattern) -> impl Future<Output = Result<()>> + Send + 'static {
		let id = self.supersede();
		let (dispatched, reply) = self.correlated(Request::MakeGuess { word, pattern, id });
		applied("make-guess", dispatched, reply)
	}

	/// Undoes the last guess; resolves to whether there was one.
	pub fn back(&mut self) -> impl Future<Output = Result<bool>> + Send + 'static {
		let id = self.supersede();
		let (dispatched, reply) = self.correlated(Request::Back { id });
		async move {
			match settle(dispatched, reply).await? {
				Reply::Back { did_go_back, .. } => Ok(did_go_back),
				other => Err(mismatch("back", other)),
			}
		}
	}

	/// Resolves to the engine's current cache key.
	pub fn cache_key(&mut self) -> impl Future<Output = Result<String>> + Send + 'static {
		let id = self.ids.next();
		let (dispatched, reply) = self.correlated(Request::CacheKey { id });
		async move {
			match settle(dispatched, reply).await? {
				Reply::CacheKey { key, .. } => Ok(key),
				other => Err(mismatch("cache-key", other)),
			}
		}
	}

	/// Processes one frame from the worker.
	pub fn handle_frame(&mut self, frame: Frame<Reply>) {
		if let Some(reply) = self.pipe.handle_frame(frame) {
			self.dispatch(reply);
		}
	}

	/// Current epoch.
	pub fn epoch(&self) -> ThinkingEpoch {
		self.epoch
	}

	/// Number of requests still waiting for their answer.
	pub fn pending_requests(&self) -> usize {
		self.pending.len()
	}

	/// Underlying pipe.
	pub fn pipe(&self) -> &Pipe<Request, Tx> {
		&self.pipe
	}

	fn supersede(&mut self) -> RequestId {
		let id = self.ids.next();
		self.epoch = ThinkingEpoch { id: Some(id), active: false };
		self.on_update = None;
		self.on_done = None;
		id
	}

	fn correlated(&mut self, request: Request) -> (Dispatched, oneshot::Receiver<Reply>) {
		// Slots whose caller gave up, including after a refused dispatch.
		self.pending.retain(|_, slot| !slot.is_closed());

		let (tx, rx) = oneshot::channel();
		let id = request.id();
		if let Some(id) = id {
			self.pending.insert(id, tx);
		}
		let mut dispatched = self.pipe.send(request);
		if let Some(Err(err)) = dispatched.try_dispatched()
			&& let Some(id) = id
		{
			tracing::debug!(%id, error = %err, "client.request.undispatched");
			self.pending.remove(&id);
		}
		(dispatched, rx)
	}

	fn dispatch(&mut self, reply: Reply) {
		if let Some(id) = reply.id()
			&& let Some(slot) = self.pending.remove(&id)
		{
			// The caller may have dropped its future.
			let _ = slot.send(reply);
			return;
		}

		match reply {
			Reply::UpdateThink { update, id } if self.epoch.accepts(id) => {
				if let Some(on_update) = self.on_update.as_mut() {
					on_update(update);
				}
			}
			Reply::StoppedThinking { id, .. } if self.epoch.id == Some(id) => {
				tracing::debug!(%id, "client.stream.stopped");
				self.epoch.active = false;
				self.on_update = None;
				if let Some(on_done) = self.on_done.take() {
					on_done();
				}
			}
			Reply::UpdateThink { id, .. } | Reply::StoppedThinking { id, .. } => {
				tracing::trace!(%id, current = ?self.epoch.id, "client.reply.stale");
			}
			Reply::Failed { message, id } => {
				tracing::error!(%id, error = %message, "client.request.failed");
			}
			other => {
				tracing::warn!(action = other.action(), id = ?other.id(), "client.reply.unexpected");
			}
		}
	}
}

async fn settle(dispatched: Dispatched, reply: oneshot::Receiver<Reply>) -> Result<Reply> {
	dispatched.await?;
	match reply.await.map_err(|_| Error::ServiceStopped)? {
		Reply::Failed { message, .. } => Err(Error::Engine(message)),
		reply => Ok(reply),
	}
}

async fn applied(action: &'static str, dispatched: Dispatched, reply: oneshot::Receiver<Reply>) -> Result<()> {
	match settle(dispatched, reply).await? {
		Reply::Applied { .. } => Ok(()),
		other => Err(mismatch(action, other)),
	}
}

fn mismatch(expected: &'static str, got: Reply) -> Error {
	Error::UnexpectedReply { expected, got: got.action() }
}

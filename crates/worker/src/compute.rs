use botle_rpc::{DEFAULT_WINDOW, Dispatched, Frame, Pipe, RawSender, Reply, Request, RequestId};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::engine::{Engine, EngineError};
use crate::epoch::StreamEpoch;

/// Worker main loop: answers requests and streams engine suggestions.
///
/// Requests and steps share one sequential timeline. A step runs only after
/// the loop has yielded and drained every frame that arrived in the meantime,
/// and the next step is scheduled only once the previous update has been
/// accepted by the pipe, so a controller that stops acknowledging also stops
/// the engine.
pub struct ComputeLoop<E, Tx> {
	engine: E,
	pipe: Pipe<Reply, Tx>,
	epoch: StreamEpoch,
	next_step: Option<RequestId>,
	in_flight_update: Option<(RequestId, Dispatched)>,
}

impl<E, Tx> ComputeLoop<E, Tx>
where
	E: Engine,
	Tx: RawSender<Frame<Reply>>,
{
	/// Creates a compute loop posting replies to `tx` with the default window.
	pub fn new(engine: E, tx: Tx) -> Self {
		Self::with_window(engine, tx, DEFAULT_WINDOW)
	}

	/// Creates a compute loop with an explicit pipe window.
	pub fn with_window(engine: E, tx: Tx, window: usize) -> Self {
		Self {
			engine,
			pipe: Pipe::with_window(tx, window),
			epoch: StreamEpoch::default(),
			next_step: None,
			in_flight_update: None,
		}
	}

	/// The driven engine.
	pub fn engine(&self) -> &E {
		&self.engine
	}

	/// Current stream state.
	pub fn epoch(&self) -> StreamEpoch {
		self.epoch
	}

	/// Drives the loop until the inbound channel closes.
	pub async fn run(self, inbound: mpsc::UnboundedReceiver<Frame<Request>>) {
		self.run_until(inbound, CancellationToken::new()).await;
	}

	/// Drives the loop until the inbound channel closes or `shutdown` fires.
	pub async fn run_until(mut self, mut inbound: mpsc::UnboundedReceiver<Frame<Request>>, shutdown: CancellationToken) {
		tracing::debug!(window = self.pipe.window(), "worker.loop.start");
		loop {
			tokio::select! {
				biased;

				_ = shutdown.cancelled() => break,

				frame = inbound.recv() => match frame {
					Some(frame) => self.handle_frame(frame),
					None => break,
				},

				(id, res) = update_dispatched(&mut self.in_flight_update), if self.in_flight_update.is_some() => {
					self.in_flight_update = None;
					match res {
						Ok(()) if self.epoch.is_current(id) => self.next_step = Some(id),
						Ok(()) => {}
						Err(err) => tracing::warn!(%id, error = %err, "worker.update.undelivered"),
					}
				}

				_ = tokio::task::yield_now(), if self.next_step.is_some() => {
					if let Some(id) = self.next_step.take() {
						self.step(id);
					}
				}
			}
		}
		tracing::debug!("worker.loop.stop");
	}

	fn handle_frame(&mut self, frame: Frame<Request>) {
		if let Some(request) = self.pipe.handle_frame(frame) {
			self.handle_request(request);
		}
	}

	fn handle_request(&mut self, request: Request) {
		match request {
			Request::StartThinking { id } => {
				tracing::debug!(%id, "worker.thinking.start");
				self.epoch.start(id);
				self.in_flight_update = None;
				self.next_step = Some(id);
			}
			Request::StopThinking { id } => {
				if self.epoch.is_thinking() {
					self.epoch.stop();
					self.reply(Reply::StoppedThinking { update: None, id });
				}
			}
			Request::LoadDict {
				allowed_guesses,
				possible_secrets,
				hard_mode,
				id,
			} => {
				let res = self.engine.load_dict(&allowed_guesses, &possible_secrets, hard_mode);
				self.epoch.stop();
				match res {
					Ok(()) => {
						tracing::debug!(
							%id,
							allowed = allowed_guesses.len(),
							secrets = possible_secrets.len(),
							hard_mode,
							"worker.dict.loaded"
						);
						self.reply(Reply::Applied { id });
					}
					Err(err) => self.report_failure(id, "load-dict", err),
				}
			}
			Request::MakeGuess { word, pattern, id } => {
				let res = self.engine.make_guess(&word, pattern);
				self.epoch.stop();
				match res {
					Ok(()) => self.reply(Reply::Applied { id }),
					Err(err) => self.report_failure(id, "make-guess", err),
				}
			}
			Request::CacheKey { id } => {
				let key = self.engine.cache_key();
				self.reply(Reply::CacheKey { key, id });
			}
			Request::Back { id } => {
				let did_go_back = self.engine.back();
				self.epoch.stop();
				self.reply(Reply::Back { did_go_back, id });
			}
			Request::Unknown => tracing::warn!("worker.request.unknown"),
		}
	}

	fn step(&mut self, id: RequestId) {
		if !self.epoch.is_current(id) {
			tracing::trace!(%id, "worker.step.abandoned");
			return;
		}
		match self.engine.compute_next_suggestion() {
			Ok(Some(update)) => {
				let signal = self.pipe.send(Reply::UpdateThink { update, id });
				self.in_flight_update = Some((id, signal));
			}
			Ok(None) => {
				tracing::debug!(%id, "worker.thinking.exhausted");
				self.epoch.stop();
				self.reply(Reply::StoppedThinking { update: None, id });
			}
			// The stream halts here without a terminal reply.
			Err(err) => tracing::error!(%id, error = %err, "worker.step.failed"),
		}
	}

	fn report_failure(&mut self, id: RequestId, action: &'static str, err: EngineError) {
		tracing::error!(%id, action, error = %err, "worker.engine.failed");
		self.reply(Reply::Failed { message: err.0, id });
	}

	fn reply(&mut self, reply: Reply) {
		drop(self.pipe.send(reply));
	}
}

async fn update_dispatched(slot: &mut Option<(RequestId, Dispatched)>) -> (RequestId, botle_rpc::Result<()>) {
	match slot {
		Some((id, signal)) => (*id, signal.await),
		None => std::future::pending().await,
	}
}

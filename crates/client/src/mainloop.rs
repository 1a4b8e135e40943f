//! Single-task driver for a [`Multiplexer`].

use botle_rpc::{Frame, RawSender, Reply, Request};
use futures::FutureExt;
use tokio::sync::mpsc;

use crate::mux::Multiplexer;
use crate::socket::{MainLoopEvent, WorkerSocket};

/// Owns the controller's multiplexer and feeds it from two sources: requests
/// from [`WorkerSocket`]s and frames from the worker.
pub struct MainLoop<Tx> {
	mux: Multiplexer<Tx>,
	rx: mpsc::UnboundedReceiver<MainLoopEvent>,
}

impl<Tx> MainLoop<Tx>
where
	Tx: RawSender<Frame<Request>>,
{
	/// Creates a main loop posting to `tx` with the default pipe window.
	pub fn new(tx: Tx) -> (Self, WorkerSocket) {
		Self::from_mux(Multiplexer::new(tx))
	}

	/// Creates a main loop whose pipe allows `window` payloads in flight.
	pub fn with_window(tx: Tx, window: usize) -> (Self, WorkerSocket) {
		Self::from_mux(Multiplexer::with_window(tx, window))
	}

	fn from_mux(mux: Multiplexer<Tx>) -> (Self, WorkerSocket) {
		let (tx, rx) = mpsc::unbounded_channel();
		(Self { mux, rx }, WorkerSocket { tx })
	}

	/// Drives the multiplexer until every socket is dropped or the worker's
	/// channel closes.
	///
	/// Socket requests are taken before inbound frames. A request that moves
	/// the epoch is therefore applied before any update still queued behind
	/// it, and that update is dropped as stale.
	pub async fn run(mut self, mut inbound: mpsc::UnboundedReceiver<Frame<Reply>>) {
		loop {
			tokio::select! {
				biased;

				event = self.rx.recv() => match event {
					Some(event) => self.dispatch_event(event),
					None => break,
				},

				frame = inbound.recv() => match frame {
					Some(frame) => self.mux.handle_frame(frame),
					None => {
						tracing::debug!("client.worker.closed");
						break;
					}
				},
			}
		}
		tracing::debug!(pending = self.mux.pending_requests(), "client.mainloop.exit");
	}

	fn dispatch_event(&mut self, event: MainLoopEvent) {
		// Callers may stop waiting at any point; their requests still go out.
		match event {
			MainLoopEvent::LoadDict {
				allowed_guesses,
				possible_secrets,
				hard_mode,
				reply,
			} => {
				let _ = reply.send(self.mux.load_dict(allowed_guesses, possible_secrets, hard_mode).boxed());
			}
			MainLoopEvent::StartThinking {
				on_update,
				on_done,
				dispatched,
			} => {
				let _ = dispatched.send(self.mux.start_thinking(on_update, on_done));
			}
			MainLoopEvent::StopThinking { dispatched } => {
				let _ = dispatched.send(self.mux.stop_thinking());
			}
			MainLoopEvent::MakeGuess { word, pattern, reply } => {
				let _ = reply.send(self.mux.make_guess(word, pattern).boxed());
			}
			MainLoopEvent::Back(reply) => {
				let _ = reply.send(self.mux.back().boxed());
			}
			MainLoopEvent::CacheKey(reply) => {
				let _ = reply.send(self.mux.cache_key().boxed());
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use botle_rpc::{Error, RequestId, duplex};
	use pretty_assertions::assert_eq;

	use super::*;

	#[tokio::test]
	async fn requests_are_answered_through_the_loop() {
		let (controller, mut worker) = duplex::<Request, Reply>();
		let (main_loop, socket) = MainLoop::new(controller.tx);
		let task = tokio::spawn(main_loop.run(controller.rx));

		let key = tokio::spawn({
			let socket = socket.clone();
			async move { socket.cache_key().await }
		});

		let frame = worker.rx.recv().await.unwrap();
		assert_eq!(
			frame,
			Frame::Payload {
				payload: Request::CacheKey { id: RequestId(1) },
				seq_num: 1
			}
		);
		worker
			.tx
			.send(Frame::Payload {
				payload: Reply::CacheKey {
					key: "root".into(),
					id: RequestId(1),
				},
				seq_num: 1,
			})
			.unwrap();

		assert_eq!(key.await.unwrap(), Ok("root".to_owned()));
		assert_eq!(worker.rx.recv().await.unwrap(), Frame::Ack { seq_num: 1 });

		drop(socket);
		task.await.unwrap();
	}

	#[tokio::test]
	async fn worker_hangup_stops_the_loop() {
		let (controller, worker) = duplex::<Request, Reply>();
		let (main_loop, socket) = MainLoop::new(controller.tx);
		let task = tokio::spawn(main_loop.run(controller.rx));

		drop(worker);
		task.await.unwrap();

		assert!(socket.is_closed());
		assert_eq!(socket.cache_key().await, Err(Error::ServiceStopped));
	}
}

//! Flow-controlled pipe over a raw, ordered message channel.
//!
//! The raw channel is fire-and-forget: posting never blocks and never tells
//! the sender anything. The pipe numbers every outbound payload, keeps at most
//! `window` of them unacknowledged, and queues the rest locally. The receiving
//! pipe acknowledges each payload as it arrives, and each acknowledgement
//! frees one slot of the sender's window.
//!
//! There is no retransmission and no timeout. A lost acknowledgement holds its
//! slot forever; after `window` such losses the pipe stops sending. The
//! in-process channel this runs over does not lose frames.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::{mpsc, oneshot};

use crate::frame::Frame;
use crate::queue::OrderedQueue;
use crate::{Error, Result};

/// Default number of unacknowledged payloads allowed in flight.
pub const DEFAULT_WINDOW: usize = 5;

/// Raw send primitive of the underlying channel.
pub trait RawSender<F>: Send + 'static {
	/// Hands one frame to the channel without waiting.
	fn post(&self, frame: F) -> Result<()>;
}

impl<F: Send + 'static> RawSender<F> for mpsc::UnboundedSender<F> {
	fn post(&self, frame: F) -> Result<()> {
		self.send(frame).map_err(|_| Error::ChannelClosed)
	}
}

/// Completion signal for [`Pipe::send`].
///
/// Resolves once the payload has been handed to the raw channel, which may be
/// long before the peer acknowledges it. Resolves to
/// [`Error::ChannelClosed`] if the channel refused the frame or the pipe was
/// dropped with the payload still queued.
#[derive(Debug)]
pub struct Dispatched {
	rx: oneshot::Receiver<()>,
	settled: Option<Result<()>>,
}

impl Dispatched {
	fn new(rx: oneshot::Receiver<()>) -> Self {
		Self { rx, settled: None }
	}

	/// Polls the signal without waiting.
	///
	/// Returns `None` while the payload is still queued behind a full window.
	/// The signal can still be awaited afterwards.
	pub fn try_dispatched(&mut self) -> Option<Result<()>> {
		if self.settled.is_none() {
			self.settled = match self.rx.try_recv() {
				Ok(()) => Some(Ok(())),
				Err(oneshot::error::TryRecvError::Empty) => None,
				Err(oneshot::error::TryRecvError::Closed) => Some(Err(Error::ChannelClosed)),
			};
		}
		self.settled.clone()
	}
}

impl Future for Dispatched {
	type Output = Result<()>;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		if let Some(res) = self.settled.clone() {
			return Poll::Ready(res);
		}
		let res = std::task::ready!(Pin::new(&mut self.rx).poll(cx)).map_err(|_| Error::ChannelClosed);
		self.settled = Some(res.clone());
		Poll::Ready(res)
	}
}

struct Queued<P> {
	payload: P,
	dispatched: oneshot::Sender<()>,
}

/// One endpoint of a flow-controlled pipe.
///
/// `P` is the outbound payload type and `Tx` the raw channel it posts
/// [`Frame<P>`] values to. The pipe is a plain state machine: it is driven by
/// [`Pipe::send`] and [`Pipe::handle_frame`] from a single sequential context
/// and needs no locking.
pub struct Pipe<P, Tx> {
	tx: Tx,
	queue: OrderedQueue<Queued<P>>,
	outstanding: HashSet<u64>,
	seq_num: u64,
	window: usize,
}

impl<P, Tx> Pipe<P, Tx>
where
	Tx: RawSender<Frame<P>>,
{
	/// Creates a pipe with the default window.
	pub fn new(tx: Tx) -> Self {
		Self::with_window(tx, DEFAULT_WINDOW)
	}

	/// Creates a pipe allowing `window` unacknowledged payloads.
	pub fn with_window(tx: Tx, window: usize) -> Self {
		assert!(window > 0, "pipe window must be > 0");
		Self {
			tx,
			queue: OrderedQueue::new(),
			outstanding: HashSet::with_capacity(window),
			seq_num: 0,
			window,
		}
	}

	/// Queues `payload` and dispatches as much of the queue as the window allows.
	///
	/// The returned signal means "accepted into flight", not "delivered".
	pub fn send(&mut self, payload: P) -> Dispatched {
		let (dispatched, rx) = oneshot::channel();
		self.queue.push(Queued { payload, dispatched });
		self.pump();
		Dispatched::new(rx)
	}

	/// Processes one frame from the raw channel.
	///
	/// Payload frames are acknowledged before they are returned for delivery,
	/// so every received payload produces exactly one ack. Ack frames free a
	/// window slot and return `None`.
	pub fn handle_frame<In>(&mut self, frame: Frame<In>) -> Option<In> {
		match frame {
			Frame::Payload { payload, seq_num } => {
				if self.tx.post(Frame::Ack { seq_num }).is_err() {
					tracing::warn!(seq_num, "pipe.ack.closed");
				}
				Some(payload)
			}
			Frame::Ack { seq_num } => {
				if !self.outstanding.remove(&seq_num) {
					tracing::warn!(seq_num, outstanding = self.outstanding.len(), "pipe.ack.unknown");
					return None;
				}
				self.pump();
				None
			}
			Frame::Unknown => {
				tracing::warn!("pipe.frame.unknown");
				None
			}
		}
	}

	/// Number of payloads sent but not yet acknowledged.
	pub fn in_flight(&self) -> usize {
		self.outstanding.len()
	}

	/// Number of payloads waiting for window capacity.
	pub fn queued(&self) -> usize {
		self.queue.len()
	}

	/// Configured window size.
	pub fn window(&self) -> usize {
		self.window
	}

	fn pump(&mut self) {
		while self.outstanding.len() < self.window {
			let Some(Queued { payload, dispatched }) = self.queue.pop() else {
				break;
			};
			self.seq_num += 1;
			let seq_num = self.seq_num;
			match self.tx.post(Frame::Payload { payload, seq_num }) {
				Ok(()) => {
					self.outstanding.insert(seq_num);
					let _ = dispatched.send(());
				}
				Err(_) => {
					// Dropping `dispatched` reports the closed channel to the caller.
					tracing::warn!(seq_num, "pipe.send.closed");
				}
			}
		}
	}
}

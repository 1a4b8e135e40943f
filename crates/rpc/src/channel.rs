//! In-process raw channel between two pipe endpoints.

use tokio::sync::mpsc;

use crate::frame::Frame;

/// One side of a raw duplex channel: posts `Frame<Out>`, receives `Frame<In>`.
///
/// Each direction is ordered and loss-free, and posting never blocks.
pub struct Endpoint<Out, In> {
	/// Raw send primitive; hand this to a [`Pipe`](crate::Pipe).
	pub tx: mpsc::UnboundedSender<Frame<Out>>,
	/// Frames arriving from the peer, in send order.
	pub rx: mpsc::UnboundedReceiver<Frame<In>>,
}

/// Creates a connected pair of endpoints.
pub fn duplex<A, B>() -> (Endpoint<A, B>, Endpoint<B, A>) {
	let (a_tx, a_rx) = mpsc::unbounded_channel();
	let (b_tx, b_rx) = mpsc::unbounded_channel();
	(Endpoint { tx: a_tx, rx: b_rx }, Endpoint { tx: b_tx, rx: a_rx })
}

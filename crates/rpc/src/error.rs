//! Error type shared by the pipe and the request layer.

use thiserror::Error;

/// A convenient type alias for `Result` with `E` = [`enum@Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Possible errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
	/// The raw channel to the peer is gone; the payload never left.
	#[error("channel closed")]
	ChannelClosed,
	/// The endpoint main loop stopped before the operation completed.
	#[error("service stopped")]
	ServiceStopped,
	/// The engine on the worker side failed the request.
	#[error("engine error: {0}")]
	Engine(String),
	/// The peer answered a correlated request with the wrong action.
	#[error("unexpected reply: expected {expected}, got {got}")]
	UnexpectedReply {
		/// Action the request expects back.
		expected: &'static str,
		/// Action that actually arrived.
		got: &'static str,
	},
}

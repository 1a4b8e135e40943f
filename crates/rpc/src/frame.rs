//! Pipe-level wire frames.

use serde::{Deserialize, Serialize};

/// The unit the pipe hands to the raw channel.
///
/// Serializes as `{"action": "payload", "payload": .., "seq_num": n}` or
/// `{"action": "ack", "seq_num": n}`. Sequence numbers belong to the pipe and
/// are unrelated to request ids carried inside payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Frame<P> {
	/// Application payload awaiting acknowledgement.
	Payload {
		/// The carried envelope.
		payload: P,
		/// Sender-assigned sequence number.
		seq_num: u64,
	},
	/// Acknowledges receipt of the payload with `seq_num`.
	Ack {
		/// Sequence number being acknowledged.
		seq_num: u64,
	},
	/// Any action this pipe does not understand.
	#[serde(other)]
	Unknown,
}

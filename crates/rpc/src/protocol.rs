//! Action envelopes exchanged between the controller and the worker.
//!
//! Envelopes travel as pipe payloads. Every envelope carries a [`RequestId`]
//! from the controller's id space; the worker echoes the id of the request it
//! is answering, and tags stream updates with the id of the `start-thinking`
//! request that opened the stream.

use std::fmt;

use botle_primitives::{Pattern, WordStat};
use serde::{Deserialize, Serialize};

/// Identifier correlating requests, replies and thinking epochs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

/// Counter-based id generator.
///
/// Ids start at 1 and are never reused by the endpoint that owns the counter.
#[derive(Debug, Default, Clone, Copy)]
pub struct CounterIdGen(u64);

impl CounterIdGen {
	/// Creates a new counter; the first id handed out is 1.
	#[must_use]
	pub const fn new() -> Self {
		Self(0)
	}

	/// Generates the next unique id.
	#[allow(clippy::should_implement_trait, reason = "convention")]
	pub fn next(&mut self) -> RequestId {
		self.0 += 1;
		RequestId(self.0)
	}

	/// Most recently issued id, if any.
	pub fn last(&self) -> Option<RequestId> {
		(self.0 > 0).then_some(RequestId(self.0))
	}
}

/// Controller-to-worker envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Request {
	/// Replace the engine's dictionary; answered by `applied` or `failed`.
	LoadDict {
		/// Words the player may guess.
		allowed_guesses: Vec<String>,
		/// Words that may be the secret.
		possible_secrets: Vec<String>,
		/// Whether revealed hints must be reused.
		hard_mode: bool,
		/// Request id.
		id: RequestId,
	},
	/// Open a thinking stream tagged with `id`.
	StartThinking {
		/// Request id, which becomes the stream's epoch id.
		id: RequestId,
	},
	/// End the current stream; answered by `stopped-thinking` if one was running.
	StopThinking {
		/// Request id.
		id: RequestId,
	},
	/// Apply a guess and its feedback to the engine; answered by `applied` or `failed`.
	MakeGuess {
		/// The guessed word.
		word: String,
		/// Feedback received for it.
		pattern: Pattern,
		/// Request id.
		id: RequestId,
	},
	/// Ask for the engine's current cache key.
	CacheKey {
		/// Request id.
		id: RequestId,
	},
	/// Undo the last guess.
	Back {
		/// Request id.
		id: RequestId,
	},
	/// Any action the worker does not understand.
	#[serde(other)]
	Unknown,
}

impl Request {
	/// Id carried by the envelope.
	pub fn id(&self) -> Option<RequestId> {
		match self {
			Self::LoadDict { id, .. }
			| Self::StartThinking { id }
			| Self::StopThinking { id }
			| Self::MakeGuess { id, .. }
			| Self::CacheKey { id }
			| Self::Back { id } => Some(*id),
			Self::Unknown => None,
		}
	}

	/// Wire action name.
	pub const fn action(&self) -> &'static str {
		match self {
			Self::LoadDict { .. } => "load-dict",
			Self::StartThinking { .. } => "start-thinking",
			Self::StopThinking { .. } => "stop-thinking",
			Self::MakeGuess { .. } => "make-guess",
			Self::CacheKey { .. } => "cache-key",
			Self::Back { .. } => "back",
			Self::Unknown => "unknown",
		}
	}
}

/// Worker-to-controller envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Reply {
	/// One streamed partial result.
	UpdateThink {
		/// The engine's latest figures for one guess.
		update: WordStat,
		/// Epoch id of the stream.
		id: RequestId,
	},
	/// The stream ended because the search space is exhausted or it was stopped.
	StoppedThinking {
		/// Always `null` on the wire.
		update: Option<WordStat>,
		/// Epoch id of the stream, or of the `stop-thinking` request.
		id: RequestId,
	},
	/// Answer to `cache-key`.
	CacheKey {
		/// Stable identifier of the engine state.
		key: String,
		/// Id of the request being answered.
		id: RequestId,
	},
	/// Answer to `back`.
	Back {
		/// Whether there was a guess to undo.
		#[serde(rename = "did-go-back")]
		did_go_back: bool,
		/// Id of the request being answered.
		id: RequestId,
	},
	/// The engine accepted the `load-dict` or `make-guess` with this id.
	Applied {
		/// Id of the request being answered.
		id: RequestId,
	},
	/// The engine rejected the request with this id.
	Failed {
		/// Engine error message.
		message: String,
		/// Id of the failed request.
		id: RequestId,
	},
	/// Any action the controller does not understand.
	#[serde(other)]
	Unknown,
}

impl Reply {
	/// Id carried by the envelope.
	pub fn id(&self) -> Option<RequestId> {
		match self {
			Self::UpdateThink { id, .. }
			| Self::StoppedThinking { id, .. }
			| Self::CacheKey { id, .. }
			| Self::Back { id, .. }
			| Self::Applied { id }
			| Self::Failed { id, .. } => Some(*id),
			Self::Unknown => None,
		}
	}

	/// Wire action name.
	pub const fn action(&self) -> &'static str {
		match self {
			Self::UpdateThink { .. } => "update-think",
			Self::StoppedThinking { .. } => "stopped-thinking",
			Self::CacheKey { .. } => "cache-key",
			Self::Back { .. } => "back",
			Self::Applied { .. } => "applied",
			Self::Failed { .. } => "failed",
			Self::Unknown => "unknown",
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;
	use crate::Frame;

	#[test]
	fn ids_start_at_one_and_increase() {
		let mut ids = CounterIdGen::new();
		assert_eq!(ids.last(), None);
		assert_eq!(ids.next(), RequestId(1));
		assert_eq!(ids.next(), RequestId(2));
		assert_eq!(ids.last(), Some(RequestId(2)));
	}

	#[test]
	fn request_wire_shape() {
		let req = Request::MakeGuess {
			word: "CRANE".into(),
			pattern: Pattern::parse("X?!XX").unwrap(),
			id: RequestId(4),
		};
		assert_eq!(
			serde_json::to_value(&req).unwrap(),
			json!({"action": "make-guess", "word": "CRANE", "pattern": "X?!XX", "id": 4})
		);
		let load = Request::LoadDict {
			allowed_guesses: vec!["CRANE".into()],
			possible_secrets: vec![],
			hard_mode: true,
			id: RequestId(1),
		};
		assert_eq!(
			serde_json::to_value(&load).unwrap(),
			json!({"action": "load-dict", "allowed_guesses": ["CRANE"], "possible_secrets": [], "hard_mode": true, "id": 1})
		);
	}

	#[test]
	fn reply_wire_shape() {
		let back = Reply::Back {
			did_go_back: true,
			id: RequestId(7),
		};
		assert_eq!(
			serde_json::to_value(&back).unwrap(),
			json!({"action": "back", "did-go-back": true, "id": 7})
		);
		assert_eq!(
			serde_json::to_value(Reply::Applied { id: RequestId(3) }).unwrap(),
			json!({"action": "applied", "id": 3})
		);
		let stopped = Reply::StoppedThinking {
			update: None,
			id: RequestId(2),
		};
		assert_eq!(
			serde_json::to_value(&stopped).unwrap(),
			json!({"action": "stopped-thinking", "update": null, "id": 2})
		);
	}

	#[test]
	fn decodes_nested_in_a_payload_frame() {
		let wire = json!({
			"action": "payload",
			"seq_num": 12,
			"payload": {
				"action": "update-think",
				"id": 3,
				"update": {"guess": "SLATE", "avg_guesses": 3.6, "worst_num_guesses": 6, "max_depth": 1}
			}
		});
		let frame: Frame<Reply> = serde_json::from_value(wire).unwrap();
		assert_eq!(
			frame,
			Frame::Payload {
				payload: Reply::UpdateThink {
					update: WordStat::new("SLATE", 3.6, 6, 1),
					id: RequestId(3),
				},
				seq_num: 12,
			}
		);
	}

	#[test]
	fn unknown_actions_decode_without_id() {
		let req: Request = serde_json::from_value(json!({"action": "compute-multiple", "id": 1})).unwrap();
		assert_eq!(req, Request::Unknown);
		assert_eq!(req.id(), None);
		let reply: Reply = serde_json::from_value(json!({"action": "progress", "id": 1})).unwrap();
		assert_eq!(reply.action(), "unknown");
	}
}

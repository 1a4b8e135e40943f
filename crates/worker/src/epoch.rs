use botle_rpc::RequestId;

/// Worker-side mirror of the controller's thinking epoch.
///
/// A scheduled step captures the epoch id it was scheduled for and runs only
/// if that id is still current and the stream has not been ended. This check,
/// made once per step, is the only cancellation mechanism: steps already
/// inside the engine always finish.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamEpoch {
	thinking_id: Option<RequestId>,
	is_thinking: bool,
}

impl StreamEpoch {
	/// Opens a stream tagged with `id`, superseding any previous one.
	pub fn start(&mut self, id: RequestId) {
		self.thinking_id = Some(id);
		self.is_thinking = true;
	}

	/// Ends the current stream, if any.
	pub fn stop(&mut self) {
		self.is_thinking = false;
	}

	/// Returns true when a step captured for `id` may run.
	pub fn is_current(&self, id: RequestId) -> bool {
		self.is_thinking && self.thinking_id == Some(id)
	}

	/// Returns true while a stream is open.
	pub const fn is_thinking(&self) -> bool {
		self.is_thinking
	}

	/// Id of the most recently opened stream.
	pub const fn thinking_id(&self) -> Option<RequestId> {
		self.thinking_id
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn newer_stream_supersedes_older() {
		let mut epoch = StreamEpoch::default();
		assert!(!epoch.is_current(RequestId(1)));

		epoch.start(RequestId(1));
		assert!(epoch.is_current(RequestId(1)));

		epoch.start(RequestId(4));
		assert!(!epoch.is_current(RequestId(1)));
		assert!(epoch.is_current(RequestId(4)));

		epoch.stop();
		assert!(!epoch.is_current(RequestId(4)));
		assert_eq!(epoch.thinking_id(), Some(RequestId(4)));
	}
}

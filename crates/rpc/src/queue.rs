//! FIFO queue of pending outbound payloads.

/// FIFO queue built from two stacks.
///
/// Pushes go onto the inbox; pops drain the outbox, refilling it by reversing
/// the inbox only once it runs dry. Both operations are amortized O(1).
#[derive(Debug)]
pub struct OrderedQueue<T> {
	inbox: Vec<T>,
	outbox: Vec<T>,
}

impl<T> Default for OrderedQueue<T> {
	fn default() -> Self {
		Self {
			inbox: Vec::new(),
			outbox: Vec::new(),
		}
	}
}

impl<T> OrderedQueue<T> {
	/// Creates an empty queue.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends an element at the back.
	pub fn push(&mut self, element: T) {
		self.inbox.push(element);
	}

	/// Removes the element at the front, or `None` when empty.
	pub fn pop(&mut self) -> Option<T> {
		if self.outbox.is_empty() {
			self.outbox.extend(self.inbox.drain(..).rev());
		}
		self.outbox.pop()
	}

	/// Number of queued elements.
	pub fn len(&self) -> usize {
		self.inbox.len() + self.outbox.len()
	}

	/// Returns true when nothing is queued.
	pub fn is_empty(&self) -> bool {
		self.inbox.is_empty() && self.outbox.is_empty()
	}
}

//! Flow-controlled message pipe and the envelopes exchanged between the
//! controller and the worker.
//!
//! This crate provides the transport layer of the thinking pipeline:
//! * `OrderedQueue`: two-stack FIFO of pending outbound payloads
//! * `Pipe`: sequence numbers, acknowledgements and a bounded in-flight window
//!   over a raw, ordered, fire-and-forget channel
//! * `Request` / `Reply`: the action envelopes carried as pipe payloads
//! * `CounterIdGen`: per-endpoint monotonically increasing request ids
//! * `duplex`: an in-process raw channel pair

#![warn(missing_docs)]

pub mod channel;
pub mod error;
pub mod frame;
pub mod pipe;
pub mod protocol;
pub mod queue;

pub use channel::{Endpoint, duplex};
pub use error::{Error, Result};
pub use frame::Frame;
pub use pipe::{DEFAULT_WINDOW, Dispatched, Pipe, RawSender};
pub use protocol::{CounterIdGen, Reply, Request, RequestId};
pub use queue::OrderedQueue;

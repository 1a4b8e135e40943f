//! Controller side of the thinking pipeline.
//!
//! [`Multiplexer`] is the request layer: it assigns request ids, correlates
//! one-shot replies, and tracks the thinking epoch so that updates from a
//! superseded stream are dropped. [`MainLoop`] drives a multiplexer from a
//! single task and [`WorkerSocket`] is the cloneable handle callers use.

#![warn(missing_docs)]

mod mainloop;
mod mux;
mod socket;

pub use mainloop::MainLoop;
pub use mux::{DoneFn, Multiplexer, ThinkingEpoch, UpdateFn};
pub use socket::WorkerSocket;

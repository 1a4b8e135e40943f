//! Worker side of the thinking pipeline.
//!
//! The worker owns the solving engine. It answers controller requests over a
//! flow-controlled pipe and, while a thinking stream is open, asks the engine
//! for one suggestion per step, yielding to incoming messages between steps.

#![warn(missing_docs)]

mod compute;
mod engine;
mod epoch;
mod spawn;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use compute::ComputeLoop;
pub use engine::{Engine, EngineError};
pub use epoch::StreamEpoch;
pub use spawn::spawn_worker_thread;

//! Best-suggestion aggregation and the session that drives it.
//!
//! [`launch`] starts a worker thread around an [`Engine`](botle_worker::Engine)
//! and returns a [`ThinkingSession`] connected to it. The session keeps a
//! [`BestList`] of the strongest guesses for the current position, fed either
//! by the worker's stream or by a [`CacheStore`] hit.

#![warn(missing_docs)]

mod best;
mod cache;
mod error;
mod launch;
mod session;

pub use best::BestList;
pub use cache::{CacheStore, DirCacheStore, MemoryCacheStore};
pub use error::{CacheError, LaunchError};
pub use launch::{Launched, WorkerHandle, launch, launch_with_cache};
pub use session::{BackOutcome, Dictionary, SelectionFn, Snapshot, ThinkingSession, ThinkingStatus, parse_word_list};

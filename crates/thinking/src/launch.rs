//! Wires an engine, a worker thread, a controller main loop, and a session.

use std::sync::Arc;
use std::thread::JoinHandle;

use botle_client::MainLoop;
use botle_config::Config;
use botle_rpc::{Reply, Request, duplex};
use botle_worker::{ComputeLoop, Engine, spawn_worker_thread};
use tokio_util::sync::CancellationToken;

use crate::cache::{CacheStore, DirCacheStore, MemoryCacheStore};
use crate::error::LaunchError;
use crate::session::ThinkingSession;

/// A running pipeline.
pub struct Launched {
	/// Controller-side session.
	pub session: ThinkingSession,
	/// The worker thread.
	pub worker: WorkerHandle,
}

/// Owner of the worker thread. Dropping it stops the worker without waiting.
#[derive(Debug)]
pub struct WorkerHandle {
	shutdown: CancellationToken,
	thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
	/// Stops the worker and waits for its thread to exit.
	pub fn shutdown(mut self) -> std::thread::Result<()> {
		self.shutdown.cancel();
		self.thread.take().map_or(Ok(()), JoinHandle::join)
	}
}

impl Drop for WorkerHandle {
	fn drop(&mut self) {
		self.shutdown.cancel();
	}
}

/// Starts the pipeline with the cache named by `config`.
///
/// Without a configured cache directory every lookup misses. Must be called
/// from within a tokio runtime, which will host the controller's main loop.
pub fn launch<E: Engine>(engine: E, config: &Config) -> Result<Launched, LaunchError> {
	let cache: Arc<dyn CacheStore> = match &config.cache.dir {
		Some(dir) => Arc::new(DirCacheStore::new(dir)),
		None => Arc::new(MemoryCacheStore::new()),
	};
	launch_with_cache(engine, config, cache)
}

/// Starts the pipeline with an explicit cache store.
pub fn launch_with_cache<E: Engine>(
	engine: E,
	config: &Config,
	cache: Arc<dyn CacheStore>,
) -> Result<Launched, LaunchError> {
	config.validate()?;
	let runtime = tokio::runtime::Handle::try_current()?;
	let window = config.pipe.window;

	let (controller, worker) = duplex::<Request, Reply>();
	let shutdown = CancellationToken::new();
	let compute = ComputeLoop::with_window(engine, worker.tx, window);
	let thread = spawn_worker_thread("botle-worker", compute, worker.rx, shutdown.clone())?;

	let (main_loop, socket) = MainLoop::with_window(controller.tx, window);
	runtime.spawn(main_loop.run(controller.rx));
	tracing::debug!(window, limit = config.thinking.best_list_limit, "thinking.launch");

	Ok(Launched {
		session: ThinkingSession::new(socket, cache, config.thinking.best_list_limit),
		worker: WorkerHandle {
			shutdown,
			thread: Some(thread),
		},
	})
}

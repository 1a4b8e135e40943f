use botle_rpc::{Frame, RawSender, Reply, Request};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::compute::ComputeLoop;
use crate::engine::Engine;

/// Runs a compute loop on a dedicated named OS thread.
///
/// The thread gets its own current-thread runtime, so long engine steps never
/// hold up the controller's runtime. The thread exits when the inbound
/// channel closes or `shutdown` fires.
pub fn spawn_worker_thread<E, Tx>(
	name: impl Into<String>,
	compute: ComputeLoop<E, Tx>,
	inbound: mpsc::UnboundedReceiver<Frame<Request>>,
	shutdown: CancellationToken,
) -> std::io::Result<std::thread::JoinHandle<()>>
where
	E: Engine,
	Tx: RawSender<Frame<Reply>>,
{
	let name = name.into();
	let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
	tracing::trace!(thread = %name, "worker.spawn_named_thread");
	std::thread::Builder::new()
		.name(name)
		.spawn(move || runtime.block_on(compute.run_until(inbound, shutdown)))
}

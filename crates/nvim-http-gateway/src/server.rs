//! Server lifecycle: runtime sizing, binding and serving

use crate::config::StartOptions;
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::Gateway;
use nvim_http_core::{ApiInfo, RpcSession};
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::runtime::Runtime;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Build the worker runtime, sized by `thread_count`
pub fn build_runtime(options: &StartOptions) -> std::io::Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(options.worker_threads())
        .thread_name("nvim-http-worker")
        .enable_all()
        .build()
}

/// Serve `gateway` on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, gateway: Gateway, shutdown: F) -> GatewayResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!("Gateway listening on {}", addr);

    axum::serve(listener, gateway.router())
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| {
            error!("Error serving {}: {}", addr, e);
            GatewayError::Server(e.to_string())
        })
}

/// Bind `0.0.0.0:<port>` and serve in the background on a dedicated
/// runtime. Returns once the listener is bound.
pub fn start<S>(options: &StartOptions, info: &ApiInfo, session: S) -> GatewayResult<RunningGateway>
where
    S: RpcSession + 'static,
{
    let runtime = build_runtime(options)?;
    let gateway = Gateway::new(info, session, options);

    let listener = std::net::TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], options.port)))?;
    listener.set_nonblocking(true)?;
    let local_addr = listener.local_addr()?;

    if let Some(root_url) = &options.root_url {
        info!("Gateway root URL: {}", root_url);
    }
    info!(
        "Starting gateway on {} with {} worker threads",
        local_addr,
        options.worker_threads()
    );

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let task = {
        let _guard = runtime.enter();
        let listener = TcpListener::from_std(listener)?;
        runtime.spawn(serve(listener, gateway, async move {
            let _ = shutdown_rx.await;
        }))
    };

    Ok(RunningGateway {
        local_addr,
        shutdown: Some(shutdown_tx),
        task: Some(task),
        runtime: Some(runtime),
    })
}

/// Handle to a gateway started with [`start`].
///
/// Dropping the handle stops the server without waiting for in-flight
/// requests.
pub struct RunningGateway {
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<GatewayResult<()>>>,
    runtime: Option<Runtime>,
}

impl RunningGateway {
    /// Address the listener is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and wait for in-flight requests.
    ///
    /// Blocks the calling thread; must not be called from async code.
    pub fn shutdown(mut self) -> GatewayResult<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        let (Some(runtime), Some(task)) = (self.runtime.take(), self.task.take()) else {
            return Ok(());
        };

        let result = runtime.block_on(task);
        runtime.shutdown_timeout(Duration::from_secs(1));
        info!("Gateway on {} stopped", self.local_addr);

        result.map_err(|e| GatewayError::Server(e.to_string()))?
    }
}

impl Drop for RunningGateway {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_uses_thread_count() {
        let runtime = build_runtime(&StartOptions::new(0).thread_count(2)).unwrap();
        assert_eq!(runtime.metrics().num_workers(), 2);
    }
}

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tokio::runtime::{Builder, EnterGuard, Handle, Runtime};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::asset::sync::error::{Result, SyncError};
use crate::asset::sync::io::content_api::decode;

/// Background runtime owned by an HTTP adapter. Requests run on its worker
/// thread, so callers may block on them or await them from any executor,
/// inside or outside another tokio runtime.
pub(crate) struct HttpRuntime {
    runtime: Option<Runtime>,
    handle: Handle,
}

impl HttpRuntime {
    pub(crate) fn new() -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("asset-sync-http")
            .enable_all()
            .build()?;
        let handle = runtime.handle().clone();
        Ok(Self {
            runtime: Some(runtime),
            handle,
        })
    }

    /// Makes the runtime current while HTTP clients are built.
    pub(crate) fn enter(&self) -> EnterGuard<'_> {
        self.handle.enter()
    }

    /// Sends `request` on the background runtime and decodes the JSON body.
    pub(crate) fn spawn_json<T>(&self, url: String, request: RequestBuilder) -> JoinHandle<Result<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.handle.spawn(async move {
            let response = request.send().await.map_err(|err| unavailable(&url, err))?;
            let status = response.status();
            let body = response.text().await.map_err(|err| unavailable(&url, err))?;
            debug!(%url, %status, bytes = body.len(), "response received");
            decode(status, &body)
        })
    }

    /// Blocks the calling thread until the request finishes.
    pub(crate) fn wait<T>(&self, task: JoinHandle<Result<T>>) -> Result<T> {
        futures::executor::block_on(joined(task))
    }
}

impl Drop for HttpRuntime {
    fn drop(&mut self) {
        // Shutting down in the background is allowed from async contexts.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// Awaits a spawned request. A task that panicked or was cancelled counts as
/// the service being unreachable.
pub(crate) async fn joined<T>(task: JoinHandle<Result<T>>) -> Result<T> {
    task.await
        .map_err(|err| SyncError::RemoteUnavailable(format!("request task failed: {err}")))?
}

pub(crate) fn unavailable(url: &str, err: reqwest::Error) -> SyncError {
    SyncError::RemoteUnavailable(format!("{url}: {err}"))
}

//! Event handlers.

use async_trait::async_trait;
use std::future::Future;

/// Receives the data of one event. Errors are logged by the listener and
/// never stop it.
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    async fn handle(&self, data: Vec<u8>) -> anyhow::Result<()>;
}

/// Adapter turning an async closure into an [`EventHandler`].
#[derive(Clone)]
pub struct HandlerFn<F>(F);

/// Wrap `f` as an event handler.
pub fn handler_fn<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(Vec<u8>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    HandlerFn(f)
}

#[async_trait]
impl<F, Fut> EventHandler for HandlerFn<F>
where
    F: Fn(Vec<u8>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn handle(&self, data: Vec<u8>) -> anyhow::Result<()> {
        (self.0)(data).await
    }
}

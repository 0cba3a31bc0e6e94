//! Queue Dispatcher
//!
//! The sole consumer of an [`EventQueue`]. Pulls one item at a time, routes it
//! by its discriminant and awaits the handler before pulling the next, so
//! processing of item N+1 never starts before item N has finished.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::EventQueue;

/// An item that can be routed by the dispatcher.
pub trait Dispatchable: Send + 'static {
    /// Discriminant used to select a handler (command keyword, event type).
    fn kind(&self) -> Option<&str>;
}

/// Async handler for a dequeued item.
///
/// Implemented for any `Fn(T) -> impl Future<Output = anyhow::Result<()>>`.
pub trait Handler<T>: Send + Sync + 'static {
    fn call(&self, item: T) -> BoxFuture<'static, anyhow::Result<()>>;
}

impl<T, F, Fut> Handler<T> for F
where
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn call(&self, item: T) -> BoxFuture<'static, anyhow::Result<()>> {
        Box::pin(self(item))
    }
}

/// Routes items from one queue to registered handlers.
pub struct Dispatcher<T> {
    name: &'static str,
    queue: EventQueue<T>,
    routes: HashMap<String, Box<dyn Handler<T>>>,
    fallback: Option<Box<dyn Handler<T>>>,
}

impl<T: Dispatchable> Dispatcher<T> {
    /// Create a dispatcher consuming `queue`. `name` labels log lines.
    pub fn new(name: &'static str, queue: EventQueue<T>) -> Self {
        Self {
            name,
            queue,
            routes: HashMap::new(),
            fallback: None,
        }
    }

    /// Register the handler for items whose discriminant equals `kind`.
    #[must_use]
    pub fn route(mut self, kind: &str, handler: impl Handler<T>) -> Self {
        self.routes.insert(kind.to_owned(), Box::new(handler));
        self
    }

    /// Register the handler for items no route matches.
    #[must_use]
    pub fn fallback(mut self, handler: impl Handler<T>) -> Self {
        self.fallback = Some(Box::new(handler));
        self
    }

    /// Consume the queue forever.
    pub async fn run(self) {
        info!(queue = self.name, routes = self.routes.len(), "Dispatcher started");

        loop {
            let item = self.queue.next().await;
            self.dispatch(item).await;
        }
    }

    /// Run the dispatcher on a background task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn dispatch(&self, item: T) {
        let kind = item.kind().map(str::to_owned);

        let handler = kind
            .as_deref()
            .and_then(|k| self.routes.get(k))
            .or(self.fallback.as_ref());

        let Some(handler) = handler else {
            warn!(queue = self.name, kind = ?kind, "Unrecognized item with no fallback, dropping");
            return;
        };

        let kind = kind.as_deref().unwrap_or("<none>");
        debug!(queue = self.name, kind, "Processing item");

        // Building the future happens inside the guarded block too, so a
        // handler that panics before its first await is caught as well.
        let outcome = AssertUnwindSafe(async move { handler.call(item).await })
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(())) => debug!(queue = self.name, kind, "Item processed"),
            Ok(Err(e)) => error!(
                queue = self.name,
                kind,
                error = %format!("{e:#}"),
                "Handler failed, dropping item"
            ),
            Err(panic) => error!(
                queue = self.name,
                kind,
                panic = panic_message(panic.as_ref()),
                "Handler panicked, dropping item"
            ),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

//! # In-Process Remote Context
//!
//! Pairs the controller half with a [`PageRuntime`] over direct calls,
//! standing in for a real browser page. Used by the test suite and as the
//! reference wiring of the two bridge halves.
//!
//! Boot can be delayed to exercise readiness waits, and the page can be
//! closed to exercise unavailability handling.

use std::sync::Arc;
use std::sync::Weak;
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::sync::watch;

use stagerpc::DISPATCH_BINDING;
use stagerpc::Request;

use crate::context;
use crate::context::ExposedFunction;
use crate::context::RemoteContext;
use crate::page::PageRuntime;
use crate::page::framework::Framework;
use crate::page::registry::ComponentRegistry;
use crate::page::unmarshal::DispatchSink;

/// An in-process page hosting the remote half of the bridge.
#[derive(Clone)]
pub struct InProcessPage {
    inner: Arc<Inner>,
}

struct Inner {
    framework: Arc<dyn Framework>,
    registry: Arc<ComponentRegistry>,
    boot_delay: Option<Duration>,
    runtime: Mutex<Option<PageRuntime>>,
    exposed: DashMap<String, ExposedFunction>,
    ready: watch::Sender<bool>,
}

impl InProcessPage {
    pub fn new(framework: Arc<dyn Framework>, registry: Arc<ComponentRegistry>) -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                framework,
                registry,
                boot_delay: None,
                runtime: Mutex::new(None),
                exposed: DashMap::new(),
                ready,
            }),
        }
    }

    /// Delays runtime installation after navigation, so readiness waits have
    /// something to wait for.
    pub fn with_boot_delay(mut self, delay: Duration) -> Self {
        let inner = Arc::get_mut(&mut self.inner);
        match inner {
            Some(inner) => inner.boot_delay = Some(delay),
            // Already shared; a late delay change would race the boot task.
            None => tracing::warn!("boot delay ignored on a shared page"),
        }
        self
    }

    /// Simulates the page going away (navigation to an unrelated site, or a
    /// crash): the runtime and its root node are dropped.
    pub async fn close(&self) {
        self.inner.ready.send_replace(false);
        *self.inner.runtime.lock().await = None;
    }

    /// Simulates a user interaction: finds a handler by name in the mounted
    /// component and invokes it with `args`.
    pub async fn trigger(&self, handler: &str, args: Vec<Value>) -> context::Result<()> {
        let callback = {
            let runtime = self.inner.runtime.lock().await;
            let runtime = runtime
                .as_ref()
                .ok_or_else(|| context::Error::Unavailable("no document loaded".into()))?;
            let root = runtime
                .root()
                .ok_or_else(|| context::Error::Script("no root node to interact with".into()))?;
            let component = root
                .component()
                .ok_or_else(|| context::Error::Script("nothing mounted under the root".into()))?;
            component.find_callback(handler).ok_or_else(|| {
                context::Error::Script(format!("no handler named '{}' in the mounted tree", handler))
            })?
        };

        callback(args);
        Ok(())
    }

    /// Runs a closure against the live page runtime, if a document is
    /// loaded. The lock is released when the closure completes.
    pub async fn inspect<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&PageRuntime) -> R,
    {
        let runtime = self.inner.runtime.lock().await;
        runtime.as_ref().map(f)
    }

    async fn boot(inner: &Arc<Inner>) {
        let sink = dispatch_sink(Arc::downgrade(inner));
        let runtime = PageRuntime::new(
            Arc::clone(&inner.framework),
            Arc::clone(&inner.registry),
            sink,
        );
        *inner.runtime.lock().await = Some(runtime);
        inner.ready.send_replace(true);
        tracing::debug!("page runtime installed");
    }
}

/// Routes page-side dispatches to the exposed controller binding.
///
/// Holds the page weakly: a dispatch arriving after the page is dropped is
/// dropped with it.
fn dispatch_sink(inner: Weak<Inner>) -> DispatchSink {
    Arc::new(move |call| {
        let Some(inner) = inner.upgrade() else {
            return;
        };
        let function = inner
            .exposed
            .get(DISPATCH_BINDING)
            .map(|entry| entry.value().clone());
        match function {
            Some(function) => {
                if let Err(e) = function(call.into_args()) {
                    tracing::error!(error = %e, "dispatch rejected by controller");
                }
            }
            None => tracing::error!("no dispatch binding exposed on this page"),
        }
    })
}

#[async_trait::async_trait]
impl RemoteContext for InProcessPage {
    async fn goto(&self, location: &str) -> context::Result<()> {
        tracing::debug!(location, "navigating in-process page");

        // Navigation tears down the current document first.
        self.inner.ready.send_replace(false);
        *self.inner.runtime.lock().await = None;

        match self.inner.boot_delay {
            Some(delay) => {
                let inner = Arc::clone(&self.inner);
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    Self::boot(&inner).await;
                });
            }
            None => Self::boot(&self.inner).await,
        }
        Ok(())
    }

    async fn wait_ready(&self) -> context::Result<()> {
        let mut ready = self.inner.ready.subscribe();
        ready
            .wait_for(|installed| *installed)
            .await
            .map_err(|_| context::Error::Unavailable("page closed".into()))?;
        Ok(())
    }

    async fn evaluate(&self, payload: Value) -> context::Result<Value> {
        let mut runtime = self.inner.runtime.lock().await;
        let runtime = runtime.as_mut().ok_or_else(|| {
            context::Error::Unavailable("no document loaded; navigate to the bootstrap first".into())
        })?;

        let request: Request = serde_json::from_value(payload)
            .map_err(|e| context::Error::Script(format!("malformed payload: {}", e)))?;

        let response = runtime.handle(request);
        serde_json::to_value(&response)
            .map_err(|e| context::Error::Io(format!("unencodable reply: {}", e)))
    }

    async fn expose_function(&self, name: &str, function: ExposedFunction) -> context::Result<()> {
        if self.inner.exposed.contains_key(name) {
            return Err(context::Error::Binding(format!(
                "function '{}' is already exposed",
                name
            )));
        }
        self.inner.exposed.insert(name.to_string(), function);
        Ok(())
    }
}

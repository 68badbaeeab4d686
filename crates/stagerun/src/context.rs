//! # Remote Context Abstraction
//!
//! A minimal, async interface over the remotely-controlled execution context
//! the bridge rides on.
//!
//! ## Philosophy
//!
//! - **Pre-existing capability**: the bridge defines no transport of its own.
//!   It consumes exactly three capabilities the context already has: navigate
//!   to a bootstrap location, evaluate a payload and await a structured
//!   result, and expose a controller-reachable function.
//! - **Opaque payloads**: the context moves JSON values. It knows nothing
//!   about descriptors, tokens, or the mount lifecycle.
//! - **No internal timeouts**: a wait that never resolves never resolves;
//!   timeout policy belongs to the surrounding test-execution layer.

use std::sync::Arc;

use serde_json::Value;

/// Errors that occur at the context/transport layer.
#[derive(Debug, Clone)]
pub enum Error {
    /// The context is gone: navigated away, crashed, or closed.
    Unavailable(String),
    /// Evaluation of a payload failed inside the context.
    Script(String),
    /// A function could not be exposed under the requested name.
    Binding(String),
    /// Generic I/O or internal context failure.
    Io(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "Remote context unavailable: {}", msg),
            Self::Script(msg) => write!(f, "Evaluation failed: {}", msg),
            Self::Binding(msg) => write!(f, "Binding error: {}", msg),
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

/// A controller-reachable function callable from inside the remote context.
///
/// Invocations are one-way notifications from the context's point of view;
/// the `Result` is for the controller side to observe protocol violations.
pub type ExposedFunction = Arc<dyn Fn(Vec<Value>) -> crate::dispatch::Result<()> + Send + Sync>;

/// The remotely-controlled execution context the bridge operates against.
///
/// Designed to be object-safe (`Arc<dyn RemoteContext>`).
#[async_trait::async_trait]
pub trait RemoteContext: Send + Sync + 'static {
    /// Navigates the context to a location (the bridge uses this once, for
    /// the bootstrap page).
    async fn goto(&self, location: &str) -> Result<()>;

    /// Resolves when the context's mount entry point is installed and ready.
    ///
    /// # invariants
    /// - Must not resolve before the entry point can accept a transfer.
    /// - Blocks indefinitely if readiness never arrives.
    async fn wait_ready(&self) -> Result<()>;

    /// Transfers a payload into the context, evaluates it, and returns the
    /// structured result.
    async fn evaluate(&self, payload: Value) -> Result<Value>;

    /// Exposes a controller function callable from inside the context.
    async fn expose_function(&self, name: &str, function: ExposedFunction) -> Result<()>;
}

//! # Callback Dispatch
//!
//! Controller-side half of the callback channel. The marshaller registers
//! functions here as it walks a descriptor; the page later invokes them by
//! ordinal through the exposed dispatch binding.
//!
//! ## Invariants
//! - One registry per mount session; a new session always starts empty.
//! - Ordinals are append-only within a session and are never reclaimed.
//! - An unknown ordinal is a protocol violation (a stale token from a prior
//!   session), never a silent no-op.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use dashmap::DashMap;
use serde_json::Value;

use stagerpc::CallbackToken;
use stagerpc::DispatchCall;

use crate::value::Callback;

#[derive(Debug, Clone)]
pub enum Error {
    /// The ordinal was never registered in the current session.
    UnknownOrdinal(u64),
    /// The dispatch envelope could not be decoded.
    MalformedEnvelope(String),
    /// A dispatch arrived while no mount session was active.
    NoActiveSession,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownOrdinal(ordinal) => write!(
                f,
                "Protocol violation: no callback registered for ordinal {} (stale token from a previous session?)",
                ordinal
            ),
            Self::MalformedEnvelope(msg) => {
                write!(f, "Protocol violation: malformed dispatch envelope: {}", msg)
            }
            Self::NoActiveSession => {
                write!(f, "Protocol violation: dispatch received with no active mount session")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<stagerpc::Error> for Error {
    fn from(e: stagerpc::Error) -> Self {
        Self::MalformedEnvelope(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Ordinal-indexed table of the callbacks marshalled during one session.
///
/// Appended to only from the controller side, under the session's
/// single-threaded call discipline; lookups may come from the dispatch
/// binding concurrently.
pub struct CallbackRegistry {
    slots: DashMap<u64, Callback>,
    next_ordinal: AtomicU64,
}

impl CallbackRegistry {
    /// Creates an empty registry. The first registered callback gets
    /// ordinal 0.
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
            next_ordinal: AtomicU64::new(0),
        }
    }

    /// Allocates the next ordinal and registers the callback under it.
    pub fn register(&self, callback: Callback) -> CallbackToken {
        let ordinal = self.next_ordinal.fetch_add(1, Ordering::Relaxed);
        self.slots.insert(ordinal, callback);
        CallbackToken(ordinal)
    }

    /// Number of callbacks registered so far in this session.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Invokes the callback registered under `ordinal` with `args`.
    ///
    /// The callback runs exactly once per dispatch, with the argument list
    /// unchanged in order and value.
    pub fn dispatch(&self, ordinal: u64, args: Vec<Value>) -> Result<()> {
        let callback = self
            .slots
            .get(&ordinal)
            .map(|entry| entry.value().clone())
            .ok_or(Error::UnknownOrdinal(ordinal))?;

        tracing::trace!(ordinal, argc = args.len(), "dispatching callback");
        callback(args);
        Ok(())
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Binds the exposed dispatch function to the registry of the *current*
/// session.
///
/// The binding is installed once per remote context, but registries come and
/// go with sessions; the slot is swapped on mount and cleared on unmount, so
/// a dispatch carrying a stale ordinal fails instead of reaching a dead
/// session's callbacks.
pub struct DispatchSlot {
    active: Mutex<Option<Arc<CallbackRegistry>>>,
}

impl DispatchSlot {
    pub fn new() -> Self {
        Self {
            active: Mutex::new(None),
        }
    }

    /// Makes `registry` the dispatch target for subsequent calls.
    pub fn install(&self, registry: Arc<CallbackRegistry>) {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        *active = Some(registry);
    }

    /// Detaches the current registry; subsequent dispatches fail.
    pub fn clear(&self) {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        *active = None;
    }

    /// Routes an inbound dispatch envelope to the active session.
    pub fn dispatch(&self, call: DispatchCall) -> Result<()> {
        let registry = {
            let active = self.active.lock().unwrap_or_else(|e| e.into_inner());
            active.clone().ok_or(Error::NoActiveSession)?
        };
        registry.dispatch(call.ordinal, call.args)
    }
}

impl Default for DispatchSlot {
    fn default() -> Self {
        Self::new()
    }
}

//! # Remote Bridge, Controller Half
//!
//! Prepares a remote context for mounting (dispatch binding + bootstrap
//! navigation) and pushes protocol frames through its evaluate channel,
//! mapping page-reported failures into the controller's error taxonomy.

use std::sync::Arc;

use stagerpc::DISPATCH_BINDING;
use stagerpc::DispatchCall;
use stagerpc::ErrorKind;
use stagerpc::Request;
use stagerpc::Response;

use crate::context;
use crate::context::RemoteContext;
use crate::dispatch;
use crate::dispatch::DispatchSlot;

#[derive(Debug, Clone)]
pub enum Error {
    /// Required configuration was missing; reported before any remote
    /// interaction.
    Config(String),
    /// The context/transport layer failed (includes "environment is gone").
    Context(context::Error),
    /// The reply frame violated the protocol.
    Protocol(String),
    /// The page could not resolve a module/export reference.
    Resolution(String),
    /// The page had no root node for an operation that requires one.
    RootMissing(String),
    /// The page framework rejected the operation.
    Framework(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Context(e) => write!(f, "Context error: {}", e),
            Self::Protocol(msg) => write!(f, "Protocol violation: {}", msg),
            Self::Resolution(msg) => write!(f, "Resolution failed: {}", msg),
            Self::RootMissing(msg) => write!(f, "Root node missing: {}", msg),
            Self::Framework(msg) => write!(f, "Framework error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<context::Error> for Error {
    fn from(e: context::Error) -> Self {
        Self::Context(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Bridge configuration supplied by the surrounding test framework.
#[derive(Clone, Debug, Default)]
pub struct BridgeConfig {
    /// Location of the bootstrap page that installs the mount entry points.
    pub bootstrap: Option<String>,
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bootstrap(mut self, location: impl Into<String>) -> Self {
        self.bootstrap = Some(location.into());
        self
    }

    fn validated_bootstrap(&self) -> Result<&str> {
        self.bootstrap.as_deref().ok_or_else(|| {
            Error::Config(
                "component mounting requires a bootstrap location; set BridgeConfig::bootstrap \
                 to the page that installs the mount entry points"
                    .into(),
            )
        })
    }
}

/// The controller half of the bridge: one per remote context.
///
/// Cheap to clone; clones share the context and the dispatch slot.
#[derive(Clone)]
pub struct Bridge {
    context: Arc<dyn RemoteContext>,
    slot: Arc<DispatchSlot>,
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge").finish_non_exhaustive()
    }
}

impl Bridge {
    /// Validates configuration, installs the dispatch binding, and navigates
    /// the context to the bootstrap location.
    ///
    /// Configuration problems fail here, before any remote interaction.
    pub async fn prepare(context: Arc<dyn RemoteContext>, config: &BridgeConfig) -> Result<Self> {
        let bootstrap = config.validated_bootstrap()?;

        let slot = Arc::new(DispatchSlot::new());
        let binding_slot = Arc::clone(&slot);
        context
            .expose_function(
                DISPATCH_BINDING,
                Arc::new(move |args| {
                    let call = DispatchCall::from_args(&args).map_err(dispatch::Error::from)?;
                    binding_slot.dispatch(call)
                }),
            )
            .await?;

        tracing::debug!(bootstrap, "navigating to bootstrap location");
        context.goto(bootstrap).await?;

        Ok(Self { context, slot })
    }

    pub(crate) fn slot(&self) -> &Arc<DispatchSlot> {
        &self.slot
    }

    /// Transfers a request frame and decodes the reply.
    ///
    /// Page-reported errors come back as `Err` mapped by kind; a reply that
    /// is not a recognizable frame is a protocol violation.
    pub(crate) async fn transfer(&self, request: &Request) -> Result<Response> {
        let payload = serde_json::to_value(request)
            .map_err(|e| Error::Protocol(format!("unencodable request frame: {}", e)))?;

        let reply = self.context.evaluate(payload).await?;

        let response: Response = serde_json::from_value(reply)
            .map_err(|e| Error::Protocol(format!("unrecognizable reply frame: {}", e)))?;

        match response {
            Response::Error { kind, message } => Err(match kind {
                ErrorKind::Resolution => Error::Resolution(message),
                ErrorKind::RootMissing => Error::RootMissing(message),
                ErrorKind::Framework => Error::Framework(message),
            }),
            ok => Ok(ok),
        }
    }

    /// Awaits the context's mount entry point before a first transfer.
    pub(crate) async fn wait_ready(&self) -> Result<()> {
        self.context.wait_ready().await?;
        Ok(())
    }
}

/// Payload shape check used by the session layer: a reply that succeeded but
/// carries the wrong frame for the operation is a protocol violation.
pub(crate) fn unexpected_reply(operation: &str, response: &Response) -> Error {
    Error::Protocol(format!("unexpected reply to {}: {:?}", operation, frame_name(response)))
}

fn frame_name(response: &Response) -> &'static str {
    match response {
        Response::Mounted { .. } => "mounted",
        Response::Updated => "updated",
        Response::Unmounted => "unmounted",
        Response::Error { .. } => "error",
    }
}

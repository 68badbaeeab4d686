//! # Mount Session
//!
//! The public operation surface: mount a component into a prepared bridge and
//! drive it through update and unmount via the returned handle.
//!
//! The lifecycle state machine is enforced by ownership: a handle only exists
//! post-mount, `update` takes `&mut self`, and `unmount` consumes the handle,
//! so post-unmount operations and overlapping lifecycle calls on one session
//! do not compile.

use std::sync::Arc;

use stagerpc::Request;
use stagerpc::Response;

use crate::bridge;
use crate::bridge::Bridge;
use crate::component;
use crate::component::ComponentRef;
use crate::component::MountOptions;
use crate::dispatch::CallbackRegistry;
use crate::marshal;

pub use crate::bridge::Error;
pub use crate::bridge::Result;

/// Input to `update`: a full new component, or an options-only patch that
/// reuses the original reference.
#[derive(Clone, Debug)]
pub enum UpdatePatch {
    Component(ComponentRef, MountOptions),
    Options(MountOptions),
}

impl From<MountOptions> for UpdatePatch {
    fn from(options: MountOptions) -> Self {
        Self::Options(options)
    }
}

impl From<ComponentRef> for UpdatePatch {
    fn from(reference: ComponentRef) -> Self {
        Self::Component(reference, MountOptions::new())
    }
}

impl From<(ComponentRef, MountOptions)> for UpdatePatch {
    fn from((reference, options): (ComponentRef, MountOptions)) -> Self {
        Self::Component(reference, options)
    }
}

/// Controller-side handle to one mounted component.
///
/// Combines the selector addressing the rendered output with `update` and
/// `unmount` bound to this session's callback registry and root node.
pub struct MountHandle {
    bridge: Bridge,
    registry: Arc<CallbackRegistry>,
    reference: ComponentRef,
    selector: String,
}

impl std::fmt::Debug for MountHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountHandle")
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}

impl MountHandle {
    /// Mounts a component and returns the session handle.
    ///
    /// Starts a fresh callback registry (tokens from any previous session
    /// become invalid), awaits remote readiness, and transfers the marshalled
    /// descriptor together with the optional hooks configuration.
    pub async fn mount(
        bridge: &Bridge,
        reference: ComponentRef,
        mut options: MountOptions,
    ) -> Result<Self> {
        let registry = Arc::new(CallbackRegistry::new());
        bridge.slot().install(Arc::clone(&registry));

        bridge.wait_ready().await?;

        let hooks_config = options.hooks_config.take();
        let component = component::build(reference.clone(), options);
        let wire = marshal::marshal_component(&component, &registry);

        tracing::debug!(callbacks = registry.len(), "mounting component");
        let response = bridge
            .transfer(&Request::Mount {
                descriptor: wire,
                hooks_config,
            })
            .await?;

        match response {
            Response::Mounted { selector } => Ok(Self {
                bridge: bridge.clone(),
                registry,
                reference,
                selector,
            }),
            other => Err(bridge::unexpected_reply("mount", &other)),
        }
    }

    /// Selector addressing the framework-rendered output of this session.
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Re-renders the mounted component against the existing root node.
    ///
    /// Functions in the patch are marshalled fresh: each call appends a new
    /// ordinal sub-range to the session registry, never reusing earlier
    /// indices. A hooks configuration in the patch is ignored; hooks ride
    /// only the mount transfer.
    pub async fn update(&mut self, patch: impl Into<UpdatePatch>) -> Result<()> {
        let (reference, options) = match patch.into() {
            UpdatePatch::Component(reference, options) => {
                self.reference = reference.clone();
                (reference, options)
            }
            UpdatePatch::Options(options) => (self.reference.clone(), options),
        };

        let component = component::build(reference, options);
        let wire = marshal::marshal_component(&component, &self.registry);

        tracing::debug!(callbacks = self.registry.len(), "updating component");
        let response = self.bridge.transfer(&Request::Update { component: wire }).await?;

        match response {
            Response::Updated => Ok(()),
            other => Err(bridge::unexpected_reply("update", &other)),
        }
    }

    /// Unmounts the component and ends the session.
    ///
    /// Consumes the handle; the registry and the root node are torn down
    /// together. The dispatch slot is cleared first, so late dispatches fail
    /// as protocol violations rather than reaching a dead session.
    pub async fn unmount(self) -> Result<()> {
        self.bridge.slot().clear();

        tracing::debug!("unmounting component");
        let response = self.bridge.transfer(&Request::Unmount).await?;

        match response {
            Response::Unmounted => Ok(()),
            other => Err(bridge::unexpected_reply("unmount", &other)),
        }
    }
}

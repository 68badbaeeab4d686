//! # Remote Bridge, Page Half
//!
//! The runtime that lives inside the remote context. Once per transfer it
//! un-marshals the descriptor, resolves type references against the page
//! registry, ensures the root node exists, and drives the framework stub.

pub mod framework;
pub mod registry;
pub mod root;
pub mod unmarshal;

use std::sync::Arc;

use serde_json::Value;

use stagerpc::ErrorKind;
use stagerpc::Request;
use stagerpc::Response;
use stagerpc::WireComponent;
use stagerpc::mounted_selector;

use crate::page::framework::Framework;
use crate::page::registry::ComponentRegistry;
use crate::page::registry::RegisteredType;
use crate::page::root::RootNode;
use crate::page::unmarshal::DispatchSink;
use crate::value::Callback;
use crate::value::Prop;

#[derive(Debug, Clone)]
pub enum Error {
    Resolution(registry::Error),
    RootMissing(&'static str),
    Framework(framework::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolution(e) => write!(f, "Resolution error: {}", e),
            Self::RootMissing(operation) => {
                write!(f, "No root node present for {}", operation)
            }
            Self::Framework(e) => write!(f, "Framework error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<registry::Error> for Error {
    fn from(e: registry::Error) -> Self {
        Self::Resolution(e)
    }
}

impl From<framework::Error> for Error {
    fn from(e: framework::Error) -> Self {
        Self::Framework(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    fn into_response(self) -> Response {
        let kind = match &self {
            Self::Resolution(_) => ErrorKind::Resolution,
            Self::RootMissing(_) => ErrorKind::RootMissing,
            Self::Framework(_) => ErrorKind::Framework,
        };
        Response::Error {
            kind,
            message: self.to_string(),
        }
    }
}

/// A component after un-marshalling and import resolution: tokens replaced
/// by dispatching closures, type references replaced by live handles.
#[derive(Clone)]
pub enum PageComponent {
    Declarative(Prop),
    Object {
        ty: Arc<RegisteredType>,
        props: Vec<(String, Prop)>,
        slots: Vec<(String, Prop)>,
        on: Vec<(String, Prop)>,
    },
}

impl PageComponent {
    /// Finds a handler by name anywhere in the component: event bag first,
    /// then props and slots, then a declarative tree walk.
    pub fn find_callback(&self, name: &str) -> Option<Callback> {
        match self {
            Self::Declarative(tree) => tree.find_callback(name),
            Self::Object { props, slots, on, .. } => [on, props, slots]
                .into_iter()
                .find_map(|bag| find_in_bag(bag, name)),
        }
    }
}

fn find_in_bag(bag: &[(String, Prop)], name: &str) -> Option<Callback> {
    for (key, value) in bag {
        if key == name {
            if let Prop::Callback(cb) = value {
                return Some(cb.clone());
            }
        }
        if let Some(cb) = value.find_callback(name) {
            return Some(cb);
        }
    }
    None
}

/// The per-page mount runtime.
pub struct PageRuntime {
    framework: Arc<dyn Framework>,
    registry: Arc<ComponentRegistry>,
    sink: DispatchSink,
    root: Option<RootNode>,
    roots_created: u64,
}

impl PageRuntime {
    pub fn new(
        framework: Arc<dyn Framework>,
        registry: Arc<ComponentRegistry>,
        sink: DispatchSink,
    ) -> Self {
        Self {
            framework,
            registry,
            sink,
            root: None,
            roots_created: 0,
        }
    }

    /// Serves one transferred frame, mapping failures into error replies.
    pub fn handle(&mut self, request: Request) -> Response {
        match request {
            Request::Mount {
                descriptor,
                hooks_config,
            } => match self.mount(descriptor, hooks_config) {
                Ok(selector) => Response::Mounted { selector },
                Err(e) => e.into_response(),
            },
            Request::Update { component } => match self.update(component) {
                Ok(()) => Response::Updated,
                Err(e) => e.into_response(),
            },
            Request::Unmount => match self.unmount() {
                Ok(()) => Response::Unmounted,
                Err(e) => e.into_response(),
            },
        }
    }

    /// The current root node, if one is attached.
    pub fn root(&self) -> Option<&RootNode> {
        self.root.as_ref()
    }

    /// How many root nodes this runtime has created. Stays at 1 across any
    /// number of updates within a session.
    pub fn roots_created(&self) -> u64 {
        self.roots_created
    }

    fn mount(&mut self, descriptor: WireComponent, hooks_config: Option<Value>) -> Result<String> {
        let component = self.resolve_imports(descriptor)?;
        let framework = Arc::clone(&self.framework);
        let root = self.ensure_root();
        framework.mount(root, component, hooks_config)?;
        tracing::debug!("component mounted");
        Ok(mounted_selector())
    }

    fn update(&mut self, component: WireComponent) -> Result<()> {
        let component = self.resolve_imports(component)?;
        let root = self.root.as_mut().ok_or(Error::RootMissing("update"))?;
        self.framework.update(root, component)?;
        tracing::debug!("component updated");
        Ok(())
    }

    fn unmount(&mut self) -> Result<()> {
        let root = self.root.as_mut().ok_or(Error::RootMissing("unmount"))?;
        self.framework.unmount(root)?;
        self.root = None;
        tracing::debug!("component unmounted, root detached");
        Ok(())
    }

    /// Un-marshals a wire component and substitutes live types for type
    /// references. Declarative components need no resolution.
    fn resolve_imports(&self, component: WireComponent) -> Result<PageComponent> {
        match component {
            WireComponent::Declarative { tree } => Ok(PageComponent::Declarative(
                unmarshal::unmarshal(&tree, &self.sink),
            )),
            WireComponent::Object {
                type_ref,
                props,
                slots,
                on,
            } => {
                let ty = self.registry.resolve(&type_ref)?;
                Ok(PageComponent::Object {
                    ty,
                    props: unmarshal::unmarshal_bag(&props, &self.sink),
                    slots: unmarshal::unmarshal_bag(&slots, &self.sink),
                    on: unmarshal::unmarshal_bag(&on, &self.sink),
                })
            }
        }
    }

    /// Creates the root node with its stable id if absent; reused otherwise.
    ///
    /// Always re-ensures rather than assuming prior state, so a
    /// freshly-booted and a reused context behave identically.
    fn ensure_root(&mut self) -> &mut RootNode {
        if self.root.is_none() {
            self.roots_created += 1;
        }
        self.root.get_or_insert_with(RootNode::new)
    }
}

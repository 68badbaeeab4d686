//! # Framework Stub Contract
//!
//! The page-resident framework glue the runtime drives: mount, update, and
//! unmount against the root node. Import resolution happens before these are
//! called; the framework always receives a resolved component.

use serde_json::Value;

use crate::page::PageComponent;
use crate::page::root::RootNode;

#[derive(Debug, Clone)]
pub enum Error {
    Mount(String),
    Update(String),
    Unmount(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mount(msg) => write!(f, "mount failed: {}", msg),
            Self::Update(msg) => write!(f, "update failed: {}", msg),
            Self::Unmount(msg) => write!(f, "unmount failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

/// The framework entry points consumed by the page runtime.
pub trait Framework: Send + Sync + 'static {
    /// Instantiates the component under the root node.
    fn mount(
        &self,
        root: &mut RootNode,
        component: PageComponent,
        hooks_config: Option<Value>,
    ) -> Result<()>;

    /// Re-renders the existing root node's component in place.
    fn update(&self, root: &mut RootNode, component: PageComponent) -> Result<()>;

    /// Tears the component down ahead of root detachment.
    fn unmount(&self, root: &mut RootNode) -> Result<()>;
}

/// Reference framework: renders by attaching the component tree directly to
/// the root node.
#[derive(Clone)]
pub struct StubFramework;

impl StubFramework {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StubFramework {
    fn default() -> Self {
        Self::new()
    }
}

impl Framework for StubFramework {
    fn mount(
        &self,
        root: &mut RootNode,
        component: PageComponent,
        hooks_config: Option<Value>,
    ) -> Result<()> {
        root.attach(component, hooks_config);
        Ok(())
    }

    fn update(&self, root: &mut RootNode, component: PageComponent) -> Result<()> {
        root.replace(component);
        Ok(())
    }

    fn unmount(&self, root: &mut RootNode) -> Result<()> {
        root.clear();
        Ok(())
    }
}

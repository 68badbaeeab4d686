//! # Root Node
//!
//! The single stable attachment point a page mounts under. The page owns the
//! node; the controller only ever holds its selector.

use serde_json::Value;

use stagerpc::ROOT_NODE_ID;

use crate::page::PageComponent;

/// The attachment point for one mount session: created on first mount,
/// reused by updates, detached on unmount.
pub struct RootNode {
    id: String,
    component: Option<PageComponent>,
    hooks_config: Option<Value>,
}

impl RootNode {
    /// Creates a detached root with the well-known stable id.
    pub(crate) fn new() -> Self {
        Self {
            id: ROOT_NODE_ID.to_string(),
            component: None,
            hooks_config: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The component currently rendered under this node, if any.
    pub fn component(&self) -> Option<&PageComponent> {
        self.component.as_ref()
    }

    /// The hooks configuration captured at mount time.
    pub fn hooks_config(&self) -> Option<&Value> {
        self.hooks_config.as_ref()
    }

    /// Attaches a freshly mounted component tree.
    pub fn attach(&mut self, component: PageComponent, hooks_config: Option<Value>) {
        self.component = Some(component);
        self.hooks_config = hooks_config;
    }

    /// Replaces the rendered tree in place; node identity is unchanged.
    pub fn replace(&mut self, component: PageComponent) {
        self.component = Some(component);
    }

    /// Clears the rendered tree ahead of detachment.
    pub fn clear(&mut self) {
        self.component = None;
        self.hooks_config = None;
    }
}

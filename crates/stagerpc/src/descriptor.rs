//! # Component Descriptors
//!
//! The transferable representation of "what component, with what props and
//! slots, to mount". The union is an explicit serde-tagged sum type: the tag
//! alone determines how the page reconstructs the component, with no runtime
//! shape-guessing.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// Reference to a named export of a known module, resolvable in the
/// page-resident registry.
#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    pub module: String,
    pub export: String,
}

impl TypeRef {
    pub fn new(module: impl Into<String>, export: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            export: export.into(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.module, self.export)
    }
}

/// The tagged descriptor union, with callback tokens already substituted in
/// place of functions.
///
/// Exactly one variant tag is present on the wire (`"kind"`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WireComponent {
    /// An opaque tree already expressed in the page's native UI syntax;
    /// transferred unchanged apart from token substitution.
    Declarative { tree: Value },
    /// A type reference plus property, slot, and event-listener bags.
    Object {
        #[serde(rename = "type")]
        type_ref: TypeRef,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        props: Map<String, Value>,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        slots: Map<String, Value>,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        on: Map<String, Value>,
    },
}

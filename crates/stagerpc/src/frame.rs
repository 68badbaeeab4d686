//! # Protocol Frames
//!
//! The envelope shapes exchanged over the remote context's evaluate channel,
//! and the inbound dispatch envelope carried over the exposed binding. This
//! is deliberately not a general RPC layer: the frames below are the complete
//! message set.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::Error;
use crate::Result;
use crate::descriptor::WireComponent;

/// Element id of the single root node the page mounts under.
pub const ROOT_NODE_ID: &str = "__stage_root__";

/// Name of the controller function exposed into the page for callback
/// dispatch.
pub const DISPATCH_BINDING: &str = "__stage_dispatch__";

/// Selector addressing the framework-rendered subtree under the root node.
pub fn mounted_selector() -> String {
    format!("#{} > *", ROOT_NODE_ID)
}

/// Controller-to-page frames.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Mount {
        descriptor: WireComponent,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hooks_config: Option<Value>,
    },
    Update {
        component: WireComponent,
    },
    Unmount,
}

/// Page-to-controller frames.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Mounted { selector: String },
    Updated,
    Unmounted,
    Error { kind: ErrorKind, message: String },
}

/// Classification of a page-reported failure, so the controller can tell
/// "my component is wrong" from "my environment is gone".
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The module/export pair was not found in the page registry.
    Resolution,
    /// The operation needed an existing root node and none was present.
    RootMissing,
    /// The page framework rejected the operation.
    Framework,
}

/// Inbound callback invocation: ordinal plus the full argument list, always
/// delivered together.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DispatchCall {
    pub ordinal: u64,
    pub args: Vec<Value>,
}

impl DispatchCall {
    pub fn new(ordinal: u64, args: Vec<Value>) -> Self {
        Self { ordinal, args }
    }

    /// Encodes the envelope as the argument list of the exposed binding.
    pub fn into_args(self) -> Vec<Value> {
        vec![Value::from(self.ordinal), Value::Array(self.args)]
    }

    /// Decodes the envelope from the exposed binding's argument list.
    pub fn from_args(args: &[Value]) -> Result<Self> {
        let [ordinal, list] = args else {
            return Err(Error::MalformedEnvelope(format!(
                "expected 2 arguments, got {}",
                args.len()
            )));
        };

        let ordinal = ordinal
            .as_u64()
            .ok_or_else(|| Error::MalformedEnvelope("ordinal is not a non-negative integer".into()))?;

        let Value::Array(args) = list else {
            return Err(Error::MalformedEnvelope("argument list is not an array".into()));
        };

        Ok(Self {
            ordinal,
            args: args.clone(),
        })
    }
}

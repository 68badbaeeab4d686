//! Wire protocol for mounting components into a remote context.
//!
//! Everything in this crate is pure data: the token format that stands in for
//! callback functions on the wire, the tagged component descriptor, and the
//! request/response frames exchanged between the controller and the page.

mod descriptor;
mod frame;
mod token;


pub use crate::descriptor::TypeRef;
pub use crate::descriptor::WireComponent;

pub use crate::frame::DISPATCH_BINDING;
pub use crate::frame::DispatchCall;
pub use crate::frame::ErrorKind;
pub use crate::frame::ROOT_NODE_ID;
pub use crate::frame::Request;
pub use crate::frame::Response;
pub use crate::frame::mounted_selector;

pub use crate::token::CallbackToken;
pub use crate::token::TOKEN_PREFIX;

/// Failures while interpreting protocol data.
#[derive(Debug, Clone)]
pub enum Error {
    /// The dispatch envelope did not have the expected shape.
    MalformedEnvelope(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedEnvelope(msg) => write!(f, "Malformed dispatch envelope: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

//! # Function Un-marshaller
//!
//! Inverse of the controller-side marshaller: every string matching the
//! token format becomes a closure that fires the dispatch envelope back to
//! the controller and returns immediately — fire-and-forget, no result
//! channel. All other values are reconstructed as-is, keys verbatim.

use std::sync::Arc;

use serde_json::Map;
use serde_json::Value;

use stagerpc::CallbackToken;
use stagerpc::DispatchCall;

use crate::value::Prop;

/// Outbound half of the callback channel, as seen from the page: delivers
/// one dispatch envelope to the controller's exposed binding.
pub type DispatchSink = Arc<dyn Fn(DispatchCall) + Send + Sync>;

/// Reconstructs a prop tree from its wire form, substituting dispatching
/// closures for callback tokens.
pub fn unmarshal(value: &Value, sink: &DispatchSink) -> Prop {
    match value {
        Value::Null => Prop::Null,
        Value::Bool(b) => Prop::Bool(*b),
        Value::Number(n) => Prop::Number(n.as_f64().unwrap_or(0.0)),
        Value::String(s) => match CallbackToken::parse(s) {
            Some(token) => dispatching_callback(token, sink),
            None => Prop::String(s.clone()),
        },
        Value::Array(items) => {
            Prop::List(items.iter().map(|item| unmarshal(item, sink)).collect())
        }
        Value::Object(entries) => Prop::Map(unmarshal_bag(entries, sink)),
    }
}

/// Reconstructs a keyed bag (props, slots, or event listeners).
pub fn unmarshal_bag(entries: &Map<String, Value>, sink: &DispatchSink) -> Vec<(String, Prop)> {
    entries
        .iter()
        .map(|(key, value)| (key.clone(), unmarshal(value, sink)))
        .collect()
}

fn dispatching_callback(token: CallbackToken, sink: &DispatchSink) -> Prop {
    let sink = Arc::clone(sink);
    let ordinal = token.ordinal();
    Prop::callback(move |args| {
        sink(DispatchCall::new(ordinal, args));
    })
}

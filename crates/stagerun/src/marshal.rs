//! # Function Marshaller
//!
//! Walks a prop tree and replaces every callback with a token, registering
//! the function in the session's callback registry as it goes. Lists and
//! keyed maps take the same uniform walk — children are visited in place,
//! keys preserved verbatim — and scalars pass through unchanged.
//!
//! Ordinals are allocated in walk order, so token assignment is
//! deterministic for a given input.

use serde_json::Map;
use serde_json::Value;

use stagerpc::WireComponent;

use crate::component::Component;
use crate::dispatch::CallbackRegistry;
use crate::value::Prop;

/// Replaces every callback in `prop` with the next token from `registry`.
pub fn marshal(prop: &Prop, registry: &CallbackRegistry) -> Value {
    match prop {
        Prop::Null => Value::Null,
        Prop::Bool(b) => Value::Bool(*b),
        Prop::Number(n) => serde_json::Number::from_f64(*n)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Prop::String(s) => Value::String(s.clone()),
        Prop::List(items) => Value::Array(items.iter().map(|item| marshal(item, registry)).collect()),
        Prop::Map(entries) => Value::Object(marshal_bag(entries, registry)),
        Prop::Callback(callback) => {
            let token = registry.register(callback.clone());
            Value::String(token.to_string())
        }
    }
}

/// Marshals a keyed bag (props, slots, or event listeners).
pub fn marshal_bag(entries: &[(String, Prop)], registry: &CallbackRegistry) -> Map<String, Value> {
    entries
        .iter()
        .map(|(key, value)| (key.clone(), marshal(value, registry)))
        .collect()
}

/// Marshals a normalized component into its transferable form.
pub fn marshal_component(component: &Component, registry: &CallbackRegistry) -> WireComponent {
    match component {
        Component::Declarative(tree) => WireComponent::Declarative {
            tree: marshal(tree, registry),
        },
        Component::Object {
            type_ref,
            props,
            slots,
            on,
        } => WireComponent::Object {
            type_ref: type_ref.clone(),
            props: marshal_bag(props, registry),
            slots: marshal_bag(slots, registry),
            on: marshal_bag(on, registry),
        },
    }
}

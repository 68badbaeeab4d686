//! # Component Descriptor Builder
//!
//! Normalizes the two accepted input shapes — a declarative tree, or a type
//! reference plus options — into one descriptor ready for marshalling.

use serde_json::Value;

use stagerpc::TypeRef;

use crate::value::Prop;

/// The two input shapes accepted by `mount`.
#[derive(Clone, Debug)]
pub enum ComponentRef {
    /// A tree already expressed in the page's native UI syntax.
    Declarative(Prop),
    /// A reference to a named export of a known module.
    Type(TypeRef),
}

impl From<TypeRef> for ComponentRef {
    fn from(type_ref: TypeRef) -> Self {
        Self::Type(type_ref)
    }
}

/// Options accompanying a mount or update: property, slot, and
/// event-listener bags, plus an optional hooks configuration transferred at
/// mount time.
///
/// Every bag defaults to empty; absent options never produce an error.
#[derive(Clone, Debug, Default)]
pub struct MountOptions {
    pub props: Vec<(String, Prop)>,
    pub slots: Vec<(String, Prop)>,
    pub on: Vec<(String, Prop)>,
    pub hooks_config: Option<Value>,
}

impl MountOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prop(mut self, name: impl Into<String>, value: impl Into<Prop>) -> Self {
        self.props.push((name.into(), value.into()));
        self
    }

    pub fn slot(mut self, name: impl Into<String>, value: impl Into<Prop>) -> Self {
        self.slots.push((name.into(), value.into()));
        self
    }

    pub fn on(mut self, event: impl Into<String>, handler: impl Into<Prop>) -> Self {
        self.on.push((event.into(), handler.into()));
        self
    }

    pub fn hooks_config(mut self, config: Value) -> Self {
        self.hooks_config = Some(config);
        self
    }
}

/// The normalized descriptor, ready for the marshaller.
#[derive(Clone, Debug)]
pub enum Component {
    Declarative(Prop),
    Object {
        type_ref: TypeRef,
        props: Vec<(String, Prop)>,
        slots: Vec<(String, Prop)>,
        on: Vec<(String, Prop)>,
    },
}

/// Normalizes an input reference and its options into a descriptor.
///
/// A declarative reference pre-encodes its own data, so it is returned
/// unchanged and `options` is ignored for that shape. A type reference picks
/// up the option bags as given.
pub fn build(reference: ComponentRef, options: MountOptions) -> Component {
    match reference {
        ComponentRef::Declarative(tree) => Component::Declarative(tree),
        ComponentRef::Type(type_ref) => Component::Object {
            type_ref,
            props: options.props,
            slots: options.slots,
            on: options.on,
        },
    }
}

//! # Prop Values
//!
//! The value tree accepted in props, slots, and event bags. This is the only
//! place live callback functions appear; everything else is plain data.
//!
//! Keyed maps are stored as insertion-ordered pairs so that the marshaller's
//! walk order — and therefore token allocation — is deterministic for a given
//! input.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// A controller-side callback invoked when the page dispatches its ordinal.
///
/// Fire-and-forget: no return value crosses back to the page.
pub type Callback = Arc<dyn Fn(Vec<Value>) + Send + Sync>;

/// A single prop value: scalar, composite, or callable.
#[derive(Clone)]
pub enum Prop {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Prop>),
    Map(Vec<(String, Prop)>),
    Callback(Callback),
}

impl Prop {
    /// Wraps a function as a callback prop.
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(Vec<Value>) + Send + Sync + 'static,
    {
        Self::Callback(Arc::new(f))
    }

    /// Builds a keyed map from entries, preserving entry order.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Prop>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn is_callback(&self) -> bool {
        matches!(self, Self::Callback(_))
    }

    /// Looks up a callback by key in this value's map entries, recursively.
    ///
    /// Used by page-side interaction simulation to find a handler inside a
    /// mounted tree.
    pub fn find_callback(&self, name: &str) -> Option<Callback> {
        match self {
            Self::Map(entries) => {
                for (key, value) in entries {
                    if key == name {
                        if let Self::Callback(cb) = value {
                            return Some(cb.clone());
                        }
                    }
                    if let Some(cb) = value.find_callback(name) {
                        return Some(cb);
                    }
                }
                None
            }
            Self::List(items) => items.iter().find_map(|item| item.find_callback(name)),
            _ => None,
        }
    }
}

impl fmt::Debug for Prop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::Bool(b) => write!(f, "Bool({})", b),
            Self::Number(n) => write!(f, "Number({})", n),
            Self::String(s) => write!(f, "String({:?})", s),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
            Self::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
            Self::Callback(_) => write!(f, "Callback(..)"),
        }
    }
}

impl From<bool> for Prop {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Prop {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<i32> for Prop {
    fn from(n: i32) -> Self {
        Self::Number(n as f64)
    }
}

impl From<f64> for Prop {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Prop {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Prop {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl<T: Into<Prop>> From<Vec<T>> for Prop {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<Value> for Prop {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n.as_f64().unwrap_or(0.0)),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(items.into_iter().map(Prop::from).collect()),
            Value::Object(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Prop::from(v)))
                    .collect(),
            ),
        }
    }
}

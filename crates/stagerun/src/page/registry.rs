//! # Page Component Registry
//!
//! The page-resident table of importable component types. Resolution
//! substitutes a live type handle for a module/export reference; an unknown
//! pair fails loudly and the failure propagates to the controller.

use std::sync::Arc;

use dashmap::DashMap;

use stagerpc::TypeRef;

#[derive(Debug, Clone)]
pub enum Error {
    /// The module/export pair is not registered on this page.
    UnknownType(TypeRef),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownType(type_ref) => {
                write!(f, "no component registered for {}", type_ref)
            }
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

/// A live component type resolved from the registry.
///
/// The handle's identity is the resolution result: the framework receives
/// this in place of the wire-level reference.
#[derive(Debug)]
pub struct RegisteredType {
    type_ref: TypeRef,
}

impl RegisteredType {
    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }
}

/// Registry of the component types a page can mount.
pub struct ComponentRegistry {
    types: DashMap<TypeRef, Arc<RegisteredType>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self {
            types: DashMap::new(),
        }
    }

    /// Registers an importable type and returns its live handle.
    pub fn register(
        &self,
        module: impl Into<String>,
        export: impl Into<String>,
    ) -> Arc<RegisteredType> {
        let type_ref = TypeRef::new(module, export);
        let registered = Arc::new(RegisteredType {
            type_ref: type_ref.clone(),
        });
        self.types.insert(type_ref, Arc::clone(&registered));
        registered
    }

    /// Substitutes the live type for a reference.
    pub fn resolve(&self, type_ref: &TypeRef) -> Result<Arc<RegisteredType>> {
        self.types
            .get(type_ref)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| Error::UnknownType(type_ref.clone()))
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

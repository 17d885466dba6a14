//! Capability handles produced by an isolated arena.
//!
//! A [`TypeHandle`] stands for one class loaded in one arena; a
//! [`MethodHandle`] stands for one invocable member. Handles keep the opened
//! bundle alive, and their identity is scoped to the arena that produced
//! them - handles from different arenas are never compatible, even for the
//! same class name.

use std::fmt;
use std::sync::Arc;

use visionforge_bundle_api::{BundleError, ClassSpec, MethodSpec, Value};

use crate::loader::{ArenaId, OpenedBundle};

/// Handle to one class loaded in an arena.
#[derive(Clone)]
pub struct TypeHandle {
    arena: ArenaId,
    class: ClassSpec,
    bundle: Arc<OpenedBundle>,
}

impl TypeHandle {
    pub(crate) fn new(arena: ArenaId, class: ClassSpec, bundle: Arc<OpenedBundle>) -> Self {
        Self {
            arena,
            class,
            bundle,
        }
    }

    /// Arena this handle belongs to.
    pub fn arena(&self) -> ArenaId {
        self.arena
    }

    /// Qualified display name, "namespace.Name".
    pub fn qualified_name(&self) -> String {
        self.class.qualified_name()
    }

    /// Whether the class exposes at least one public constructor.
    pub fn is_constructible(&self) -> bool {
        self.class.is_constructible()
    }

    /// The class specification backing this handle.
    pub fn spec(&self) -> &ClassSpec {
        &self.class
    }

    /// Public invocable members of the class.
    pub fn list_members(&self) -> &[MethodSpec] {
        &self.class.methods
    }

    /// Construct an instance.
    ///
    /// The returned value is the receiver for subsequent instance-method
    /// invocations.
    pub fn construct(&self, args: &[Value]) -> Result<Value, BundleError> {
        if !self.is_constructible() {
            return Err(BundleError::NotConstructible(self.qualified_name()));
        }
        self.bundle
            .instance()
            .construct(&self.qualified_name(), args)
    }

    /// Callable handle for the first member named `name`.
    pub fn method(&self, name: &str) -> Option<MethodHandle> {
        self.class
            .methods
            .iter()
            .find(|m| m.name == name)
            .cloned()
            .map(|m| self.member_handle(m))
    }

    pub(crate) fn member_handle(&self, method: MethodSpec) -> MethodHandle {
        MethodHandle {
            arena: self.arena,
            class: self.qualified_name(),
            method,
            bundle: Arc::clone(&self.bundle),
        }
    }

    /// Whether two handles denote the same type.
    ///
    /// Requires the same arena and the same qualified name; handles obtained
    /// under different loaders are never interchangeable.
    pub fn is_compatible(&self, other: &TypeHandle) -> bool {
        self.arena == other.arena && self.qualified_name() == other.qualified_name()
    }
}

impl fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeHandle")
            .field("class", &self.qualified_name())
            .field("arena", &self.arena)
            .finish()
    }
}

/// Handle to one invocable method of a loaded class.
#[derive(Clone)]
pub struct MethodHandle {
    arena: ArenaId,
    class: String,
    method: MethodSpec,
    bundle: Arc<OpenedBundle>,
}

impl MethodHandle {
    /// Arena this handle belongs to.
    pub fn arena(&self) -> ArenaId {
        self.arena
    }

    /// Qualified name of the declaring class.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Method name.
    pub fn name(&self) -> &str {
        &self.method.name
    }

    /// The method specification backing this handle.
    pub fn spec(&self) -> &MethodSpec {
        &self.method
    }

    /// Index display key, "namespace.Class.method".
    pub fn display_key(&self) -> String {
        format!("{}.{}", self.class, self.method.name)
    }

    /// Display signature, e.g. "resize(int, int) -> Image".
    pub fn signature(&self) -> String {
        self.method.signature()
    }

    /// Invoke the method.
    ///
    /// Instance methods take the constructed receiver as `args[0]`, followed
    /// by the declared parameters; static methods take the parameters only.
    pub fn invoke(&self, args: &[Value]) -> Result<Value, BundleError> {
        self.bundle.instance().invoke(&self.class, &self.method.name, args)
    }
}

impl fmt::Debug for MethodHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodHandle")
            .field("method", &self.display_key())
            .field("arena", &self.arena)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::BundleLoader;
    use crate::testutil::{CatalogBundle, demo_catalog};
    use serde_json::json;

    fn loader() -> BundleLoader {
        BundleLoader::with_bundle("plugins", Box::new(CatalogBundle::new(demo_catalog())))
    }

    #[test]
    fn test_type_handle_exposes_members() {
        let handle = loader().resolve("core.Image").unwrap();
        assert!(handle.is_constructible());
        assert!(handle.list_members().iter().any(|m| m.name == "resize"));
    }

    #[test]
    fn test_construct_rejects_non_constructible_class() {
        let handle = loader().resolve("core.Runtime").unwrap();
        assert!(!handle.is_constructible());
        let err = handle.construct(&[]).unwrap_err();
        assert!(matches!(err, BundleError::NotConstructible(_)));
    }

    #[test]
    fn test_construct_and_invoke_roundtrip() {
        let handle = loader().resolve("core.Image").unwrap();
        let instance = handle.construct(&[json!(640), json!(480)]).unwrap();

        let width = handle.method("width").unwrap();
        let result = width.invoke(&[instance]).unwrap();
        assert_eq!(result, json!(640));
    }

    #[test]
    fn test_method_handle_display_key_and_signature() {
        let handle = loader().resolve("filters.Blur").unwrap();
        let apply = handle.method("apply").unwrap();
        assert_eq!(apply.display_key(), "filters.Blur.apply");
        assert!(apply.signature().starts_with("apply("));
    }

    #[test]
    fn test_unknown_method_lookup_is_none() {
        let handle = loader().resolve("filters.Blur").unwrap();
        assert!(handle.method("sharpen").is_none());
    }
}

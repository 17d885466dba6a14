//! Catalog types - the registration table a bundle publishes

use serde::{Deserialize, Serialize};

use crate::error::BundleError;

/// Bundle manifest containing metadata about one cvlib build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleManifest {
    /// Library this bundle is a build of (e.g. "cvlib")
    pub library: String,
    /// Build version (semver)
    pub version: String,
    /// ABI version this bundle was built against
    pub abi_version: u32,
    /// Human-readable description
    pub description: String,
    /// Build vendor
    pub vendor: String,
}

impl Default for BundleManifest {
    fn default() -> Self {
        Self {
            library: String::new(),
            version: "0.0.1".to_string(),
            abi_version: crate::ABI_VERSION,
            description: String::new(),
            vendor: String::new(),
        }
    }
}

/// The full registration table of classes a bundle exposes.
///
/// Catalog order is fixed per build and doubles as the host's enumeration
/// order, so index construction is deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiCatalog {
    /// Every class the managed side of the bundle exposes
    pub classes: Vec<ClassSpec>,
}

impl ApiCatalog {
    /// Number of classes in the catalog
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the catalog exposes no classes at all
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Look up a class by qualified name (e.g. "filters.Blur")
    pub fn class(&self, qualified: &str) -> Option<&ClassSpec> {
        self.classes.iter().find(|c| c.qualified_name() == qualified)
    }
}

/// Specification for one class in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSpec {
    /// Namespace the class lives in (e.g. "filters")
    pub namespace: String,
    /// Simple class name (e.g. "Blur")
    pub name: String,
    /// Public constructors; empty means the class is not constructible
    pub constructors: Vec<CtorSpec>,
    /// Public invocable methods
    pub methods: Vec<MethodSpec>,
}

impl ClassSpec {
    /// Qualified display name, "namespace.Name"
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }

    /// Whether the class exposes at least one public constructor
    pub fn is_constructible(&self) -> bool {
        !self.constructors.is_empty()
    }

    /// Check that the entry is well-formed enough to index.
    ///
    /// Third-party catalogs may carry helper entries the host cannot use;
    /// callers skip invalid entries rather than aborting a scan.
    pub fn validate(&self) -> Result<(), BundleError> {
        if self.namespace.is_empty() || self.name.is_empty() {
            return Err(BundleError::Malformed(format!(
                "class entry with empty name: {:?}.{:?}",
                self.namespace, self.name
            )));
        }
        if let Some(m) = self.methods.iter().find(|m| m.name.is_empty()) {
            return Err(BundleError::Malformed(format!(
                "{} declares a method with an empty name ({} params)",
                self.qualified_name(),
                m.params.len()
            )));
        }
        Ok(())
    }
}

/// Specification for one public constructor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CtorSpec {
    /// Constructor parameters
    pub params: Vec<ParamSpec>,
}

impl CtorSpec {
    /// Display signature, e.g. "new(int, int)"
    pub fn signature(&self) -> String {
        let params: Vec<&str> = self.params.iter().map(|p| p.ty.as_str()).collect();
        format!("new({})", params.join(", "))
    }
}

/// Specification for one public method
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodSpec {
    /// Method name
    pub name: String,
    /// Declared parameters, receiver excluded
    pub params: Vec<ParamSpec>,
    /// Declared return type name; empty for no return value
    pub returns: String,
    /// Whether the method is invoked without a receiver
    pub is_static: bool,
}

impl MethodSpec {
    /// Display signature, e.g. "resize(int, int) -> Image"
    pub fn signature(&self) -> String {
        let params: Vec<&str> = self.params.iter().map(|p| p.ty.as_str()).collect();
        if self.returns.is_empty() {
            format!("{}({})", self.name, params.join(", "))
        } else {
            format!("{}({}) -> {}", self.name, params.join(", "), self.returns)
        }
    }
}

/// Specification for one declared parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name
    pub name: String,
    /// Parameter type name
    pub ty: String,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

//! In-memory bundle fixtures shared across module tests.

use serde_json::json;
use visionforge_bundle_api::{
    ApiCatalog, BundleError, BundleManifest, ClassSpec, CtorSpec, MethodSpec, ParamSpec, Value,
    VisionBundle,
};

fn method(name: &str, params: &[(&str, &str)], returns: &str, is_static: bool) -> MethodSpec {
    MethodSpec {
        name: name.to_string(),
        params: params
            .iter()
            .map(|(name, ty)| ParamSpec::new(*name, *ty))
            .collect(),
        returns: returns.to_string(),
        is_static,
    }
}

/// Small fixed catalog: two constructible classes and one static-only class.
pub(crate) fn demo_catalog() -> ApiCatalog {
    ApiCatalog {
        classes: vec![
            ClassSpec {
                namespace: "core".to_string(),
                name: "Image".to_string(),
                constructors: vec![CtorSpec {
                    params: vec![ParamSpec::new("width", "int"), ParamSpec::new("height", "int")],
                }],
                methods: vec![
                    method("width", &[], "int", false),
                    method("height", &[], "int", false),
                    method("resize", &[("width", "int"), ("height", "int")], "Image", false),
                ],
            },
            ClassSpec {
                namespace: "filters".to_string(),
                name: "Blur".to_string(),
                constructors: vec![CtorSpec {
                    params: vec![ParamSpec::new("radius", "int")],
                }],
                methods: vec![method("apply", &[("image", "Image")], "Image", false)],
            },
            ClassSpec {
                namespace: "core".to_string(),
                name: "Runtime".to_string(),
                constructors: vec![],
                methods: vec![method("version", &[], "string", true)],
            },
        ],
    }
}

/// Bundle fixture serving an arbitrary catalog with echo-style behaviors.
pub(crate) struct CatalogBundle {
    catalog: ApiCatalog,
}

impl CatalogBundle {
    pub(crate) fn new(catalog: ApiCatalog) -> Self {
        Self { catalog }
    }
}

impl VisionBundle for CatalogBundle {
    fn manifest(&self) -> BundleManifest {
        BundleManifest {
            library: "cvlib".to_string(),
            version: "0.0.0-test".to_string(),
            ..Default::default()
        }
    }

    fn catalog(&self) -> ApiCatalog {
        self.catalog.clone()
    }

    fn construct(&self, class: &str, args: &[Value]) -> Result<Value, BundleError> {
        let spec = self
            .catalog
            .class(class)
            .ok_or_else(|| BundleError::UnknownClass(class.to_string()))?;
        if !spec.is_constructible() {
            return Err(BundleError::NotConstructible(class.to_string()));
        }
        match class {
            "core.Image" => Ok(json!({
                "width": args.first().cloned().unwrap_or(json!(0)),
                "height": args.get(1).cloned().unwrap_or(json!(0)),
            })),
            _ => Ok(json!({ "class": class, "args": args })),
        }
    }

    fn invoke(&self, class: &str, method: &str, args: &[Value]) -> Result<Value, BundleError> {
        let spec = self
            .catalog
            .class(class)
            .ok_or_else(|| BundleError::UnknownClass(class.to_string()))?;
        if !spec.methods.iter().any(|m| m.name == method) {
            return Err(BundleError::UnknownMethod {
                class: class.to_string(),
                method: method.to_string(),
            });
        }
        match (class, method) {
            ("core.Image", "width") => Ok(args
                .first()
                .and_then(|v| v.get("width"))
                .cloned()
                .unwrap_or(Value::Null)),
            ("core.Image", "height") => Ok(args
                .first()
                .and_then(|v| v.get("height"))
                .cloned()
                .unwrap_or(Value::Null)),
            ("core.Image", "resize") => Ok(json!({
                "width": args.get(1).cloned().unwrap_or(json!(0)),
                "height": args.get(2).cloned().unwrap_or(json!(0)),
            })),
            ("filters.Blur", "apply") => Ok(args.get(1).cloned().unwrap_or(Value::Null)),
            ("core.Runtime", "version") => Ok(json!("0.0.0-test")),
            _ => Ok(json!({ "class": class, "method": method, "args": args })),
        }
    }
}

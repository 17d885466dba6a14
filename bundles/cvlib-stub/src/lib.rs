//! cvlib-stub - Stub cvlib build
//!
//! A tiny self-contained bundle implementing a handful of cvlib classes in
//! pure Rust over JSON values. It exists so VisionForge can be developed and
//! demoed without a real cvlib build installed; the catalog shape matches
//! what real builds publish.

use serde_json::json;
use visionforge_bundle_api::{
    ApiCatalog, BundleError, BundleManifest, ClassSpec, CtorSpec, MethodSpec, ParamSpec, Value,
    VisionBundle, export_bundle,
};

const STUB_VERSION: &str = "0.0.0-stub";

/// The stub build. Images are JSON objects `{width, height, fill}`.
#[derive(Default)]
pub struct CvlibStub;

impl CvlibStub {
    fn construct_image(args: &[Value]) -> Result<Value, BundleError> {
        let width = int_arg(args, 0)?;
        let height = int_arg(args, 1)?;
        Ok(json!({ "width": width, "height": height, "fill": 0 }))
    }

    fn image_method(method: &str, args: &[Value]) -> Result<Value, BundleError> {
        let receiver = receiver_arg(args)?;
        match method {
            "width" => Ok(receiver["width"].clone()),
            "height" => Ok(receiver["height"].clone()),
            "resize" => {
                let width = int_arg(args, 1)?;
                let height = int_arg(args, 2)?;
                Ok(json!({
                    "width": width,
                    "height": height,
                    "fill": receiver["fill"].clone(),
                }))
            }
            "fill" => {
                let value = int_arg(args, 1)?;
                Ok(json!({
                    "width": receiver["width"].clone(),
                    "height": receiver["height"].clone(),
                    "fill": value,
                }))
            }
            _ => unknown_method("core.Image", method),
        }
    }

    fn blur_method(method: &str, args: &[Value]) -> Result<Value, BundleError> {
        match method {
            // The stub has no pixels to convolve; blurring is the identity.
            "apply" => args
                .get(1)
                .cloned()
                .ok_or_else(|| BundleError::Arity {
                    expected: 2,
                    got: args.len(),
                }),
            _ => unknown_method("filters.Blur", method),
        }
    }

    fn runtime_method(method: &str) -> Result<Value, BundleError> {
        match method {
            "version" => Ok(json!(STUB_VERSION)),
            _ => unknown_method("core.Runtime", method),
        }
    }
}

impl VisionBundle for CvlibStub {
    fn manifest(&self) -> BundleManifest {
        BundleManifest {
            library: "cvlib".to_string(),
            version: STUB_VERSION.to_string(),
            description: "Stub cvlib build with software-only behaviors".to_string(),
            vendor: "VisionForge project".to_string(),
            ..Default::default()
        }
    }

    fn catalog(&self) -> ApiCatalog {
        ApiCatalog {
            classes: vec![
                ClassSpec {
                    namespace: "core".to_string(),
                    name: "Image".to_string(),
                    constructors: vec![CtorSpec {
                        params: vec![
                            ParamSpec::new("width", "int"),
                            ParamSpec::new("height", "int"),
                        ],
                    }],
                    methods: vec![
                        method("width", &[], "int"),
                        method("height", &[], "int"),
                        method("resize", &[("width", "int"), ("height", "int")], "Image"),
                        method("fill", &[("value", "int")], "Image"),
                    ],
                },
                ClassSpec {
                    namespace: "filters".to_string(),
                    name: "Blur".to_string(),
                    constructors: vec![CtorSpec {
                        params: vec![ParamSpec::new("radius", "int")],
                    }],
                    methods: vec![method("apply", &[("image", "Image")], "Image")],
                },
                ClassSpec {
                    namespace: "core".to_string(),
                    name: "Runtime".to_string(),
                    constructors: vec![],
                    methods: vec![MethodSpec {
                        name: "version".to_string(),
                        params: vec![],
                        returns: "string".to_string(),
                        is_static: true,
                    }],
                },
            ],
        }
    }

    fn construct(&self, class: &str, args: &[Value]) -> Result<Value, BundleError> {
        match class {
            "core.Image" => Self::construct_image(args),
            "filters.Blur" => {
                let radius = int_arg(args, 0)?;
                Ok(json!({ "radius": radius }))
            }
            "core.Runtime" => Err(BundleError::NotConstructible(class.to_string())),
            _ => Err(BundleError::UnknownClass(class.to_string())),
        }
    }

    fn invoke(&self, class: &str, method: &str, args: &[Value]) -> Result<Value, BundleError> {
        match class {
            "core.Image" => Self::image_method(method, args),
            "filters.Blur" => Self::blur_method(method, args),
            "core.Runtime" => Self::runtime_method(method),
            _ => Err(BundleError::UnknownClass(class.to_string())),
        }
    }
}

export_bundle!(CvlibStub);

fn method(name: &str, params: &[(&str, &str)], returns: &str) -> MethodSpec {
    MethodSpec {
        name: name.to_string(),
        params: params
            .iter()
            .map(|(name, ty)| ParamSpec::new(*name, *ty))
            .collect(),
        returns: returns.to_string(),
        is_static: false,
    }
}

fn receiver_arg(args: &[Value]) -> Result<&Value, BundleError> {
    args.first()
        .filter(|v| v.is_object())
        .ok_or_else(|| BundleError::invalid_argument("missing receiver"))
}

fn int_arg(args: &[Value], index: usize) -> Result<i64, BundleError> {
    args.get(index)
        .and_then(Value::as_i64)
        .ok_or_else(|| BundleError::invalid_argument(format!("argument {index} must be an integer")))
}

fn unknown_method(class: &str, method: &str) -> Result<Value, BundleError> {
    Err(BundleError::UnknownMethod {
        class: class.to_string(),
        method: method.to_string(),
    })
}

//! Reflective API indexing over a loaded bundle.
//!
//! Both indexes enumerate the bundle through the loader's managed-class
//! sequence. The catalog order is fixed per build, so index construction is
//! deterministic.

use std::collections::HashMap;
use std::path::Path;

use crate::error::InspectError;
use crate::handle::{MethodHandle, TypeHandle};
use crate::loader::BundleLoader;

/// Mapping of display name ("namespace.Class.method") to callable handle.
pub type MethodIndex = HashMap<String, MethodHandle>;

/// Mapping of qualified class name to constructible type handle.
pub type ClassIndex = HashMap<String, TypeHandle>;

/// Enumerate every public invocable method across the bundle's classes.
///
/// If two members map to the same display key, the later-enumerated one
/// wins. Callers that need a specific overload must disambiguate with a key
/// that also encodes arity.
pub fn build_method_index(
    bundle_path: &Path,
    loader: &mut BundleLoader,
) -> Result<MethodIndex, InspectError> {
    let classes = loader.load_managed_classes(bundle_path)?;
    let mut index = MethodIndex::new();
    let mut skipped = 0usize;
    for handle in classes {
        if skip_invalid(&handle, &mut skipped) {
            continue;
        }
        for method in handle.spec().methods.clone() {
            let entry = handle.member_handle(method);
            index.insert(entry.display_key(), entry);
        }
    }
    log_skipped("method scan", skipped);
    Ok(index)
}

/// Enumerate the bundle's constructible classes.
pub fn build_class_index(
    bundle_path: &Path,
    loader: &mut BundleLoader,
) -> Result<ClassIndex, InspectError> {
    let classes = loader.load_managed_classes(bundle_path)?;
    let mut index = ClassIndex::new();
    let mut skipped = 0usize;
    for handle in classes {
        if skip_invalid(&handle, &mut skipped) {
            continue;
        }
        if handle.is_constructible() {
            index.insert(handle.qualified_name(), handle);
        }
    }
    log_skipped("class scan", skipped);
    Ok(index)
}

/// A single bad class must not abort the whole scan: third-party bundles may
/// carry unloadable helper entries. Skipped classes are counted and logged.
fn skip_invalid(handle: &TypeHandle, skipped: &mut usize) -> bool {
    match handle.spec().validate() {
        Ok(()) => false,
        Err(err) => {
            tracing::warn!(
                class = %handle.qualified_name(),
                error = %err,
                "Skipping unloadable class"
            );
            *skipped += 1;
            true
        }
    }
}

fn log_skipped(scan: &str, skipped: usize) {
    if skipped > 0 {
        tracing::warn!(scan, skipped, "Classes skipped during inspection");
    }
}

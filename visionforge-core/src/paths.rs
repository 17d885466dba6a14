//! Managed directory layout and bundle naming.
//!
//! The managed plugin directory lives under the process working directory,
//! with native binaries segregated by pointer width. Bundle files follow the
//! `cvlib-<version>` naming convention and their native image name is derived
//! by a fixed transform.

use std::env;
use std::path::{Component, Path, PathBuf};

/// Settings file name, resolved in the process working directory.
pub const CONFIG_FILE: &str = "visionforge.config";

/// Managed plugin directory name under the process working directory.
pub const PLUGIN_DIR: &str = "plugins";

/// File name prefix shared by every cvlib bundle.
pub const BUNDLE_PREFIX: &str = "cvlib-";

/// File name prefix of the native image a bundle binds against.
const NATIVE_PREFIX: &str = "cvlib_native";

/// Default managed plugin directory: `<cwd>/plugins`.
pub fn plugin_dir() -> PathBuf {
    env::current_dir()
        .map(|cwd| cwd.join(PLUGIN_DIR))
        .unwrap_or_else(|_| PathBuf::from(PLUGIN_DIR))
}

/// Pointer-width-specific subfolder for native binaries.
pub fn arch_dir() -> &'static str {
    if cfg!(target_pointer_width = "64") {
        "x64"
    } else {
        "x86"
    }
}

/// Whether a path names a bundle file (`cvlib-<version>.<dll-ext>`).
pub fn is_bundle_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.starts_with(BUNDLE_PREFIX)
        && path.extension().and_then(|e| e.to_str()) == Some(env::consts::DLL_EXTENSION)
}

/// Native image file name for a bundle:
/// `cvlib-<v>.<ext>` -> `cvlib_native<v>.<ext>`.
pub fn native_binary_name(bundle: &Path) -> String {
    let stem = bundle
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let stem = stem.replacen(BUNDLE_PREFIX, NATIVE_PREFIX, 1);
    format!("{}.{}", stem, env::consts::DLL_EXTENSION)
}

/// Path of a bundle's native image inside the managed plugin directory.
pub fn native_binary_path(plugin_dir: &Path, bundle: &Path) -> PathBuf {
    plugin_dir.join(arch_dir()).join(native_binary_name(bundle))
}

/// Lexically normalized absolute path.
///
/// Backs the uniqueness invariant of the available-bundle collection. Does
/// not touch the filesystem, so references to missing bundles normalize too.
pub fn normalize(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

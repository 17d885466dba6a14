//! Bundle installation into the managed plugin directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::InstallError;
use crate::paths;

/// Copy `source` into the managed plugin directory and return the normalized
/// managed path.
///
/// Idempotent: installing an already-managed path is a no-op success, and an
/// existing bundle of the same name is overwritten with a warning. A native
/// image found next to the source is installed as well, best effort.
pub fn install(source: &Path, plugin_dir: &Path) -> Result<PathBuf, InstallError> {
    let Some(file_name) = source.file_name().filter(|_| paths::is_bundle_file(source)) else {
        return Err(InstallError::NotABundle {
            path: source.to_path_buf(),
        });
    };
    let dest = paths::normalize(&plugin_dir.join(file_name));
    let source = paths::normalize(source);
    if source == dest {
        return Ok(dest);
    }

    fs::create_dir_all(plugin_dir).map_err(|err| InstallError::Io {
        path: plugin_dir.to_path_buf(),
        source: err,
    })?;
    if dest.exists() {
        tracing::warn!(bundle = %dest.display(), "Overwriting existing bundle");
    }
    fs::copy(&source, &dest).map_err(|err| InstallError::Io {
        path: source.clone(),
        source: err,
    })?;
    install_native_binary(&source, plugin_dir);
    tracing::info!(bundle = %dest.display(), "Bundle installed");
    Ok(dest)
}

/// Best-effort install of the native image shipped next to the bundle, from
/// either a pointer-width subfolder or the source directory itself.
fn install_native_binary(source: &Path, plugin_dir: &Path) {
    let name = paths::native_binary_name(source);
    let Some(source_dir) = source.parent() else {
        return;
    };
    let candidates = [
        source_dir.join(paths::arch_dir()).join(&name),
        source_dir.join(&name),
    ];
    let Some(found) = candidates.iter().find(|p| p.exists()) else {
        tracing::debug!(image = %name, "No native image found next to bundle source");
        return;
    };

    let native_dir = plugin_dir.join(paths::arch_dir());
    let result = fs::create_dir_all(&native_dir)
        .and_then(|_| fs::copy(found, native_dir.join(&name)).map(|_| ()));
    match result {
        Ok(()) => tracing::info!(image = %name, "Native image installed"),
        Err(err) => {
            tracing::warn!(image = %name, error = %err, "Failed to install native image");
        }
    }
}

/// Discover installed bundles in the managed plugin directory.
///
/// Returns sorted normalized paths; a missing directory yields no bundles.
pub fn discover(plugin_dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(plugin_dir) else {
        return Vec::new();
    };
    let mut found: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && paths::is_bundle_file(path))
        .map(|path| paths::normalize(&path))
        .collect();
    found.sort();
    found
}

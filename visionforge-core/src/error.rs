//! Error types for visionforge-core

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for a load sequence
#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Inspection error: {0}")]
    Inspect(#[from] InspectError),

    #[error("Tree build error: {0}")]
    Tree(#[from] TreeError),

    #[error("Install error: {0}")]
    Install(#[from] InstallError),
}

/// Errors reading or writing the settings file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors binding a bundle into an isolated loading arena
#[derive(Error, Debug)]
pub enum LoadError {
    /// The derived native image is not installed for this pointer width
    #[error("Native binary not found: {path}")]
    NativeMissing { path: PathBuf },

    /// The image name is already bound from a different source; a native
    /// image cannot be re-bound until the process restarts
    #[error("Native image {name} already loaded from {loaded_from}, refusing {requested}")]
    NativeConflict {
        name: String,
        loaded_from: PathBuf,
        requested: PathBuf,
    },

    /// dlopen or symbol lookup failed (covers architecture mismatches)
    #[error("Failed to load library: {0}")]
    Library(#[from] libloading::Error),

    /// Bundle was built against a different ABI version
    #[error("Bundle ABI mismatch: host expects {expected}, bundle has {found}")]
    AbiMismatch { expected: u32, found: u32 },

    /// Bundle entry point returned no instance
    #[error("Bundle {path} returned a null instance")]
    NullInstance { path: PathBuf },

    /// Class name not resolvable within the arena's scope
    #[error("Class not resolvable in this arena: {name}")]
    ClassResolution { name: String },
}

/// Errors scanning a bundle's API.
///
/// Per-class failures are skipped and counted during a scan; only failure to
/// open the bundle itself aborts.
#[derive(Error, Debug)]
pub enum InspectError {
    #[error("Failed to open bundle for inspection: {0}")]
    Open(#[from] LoadError),
}

/// Errors deriving the display tree
#[derive(Error, Debug)]
pub enum TreeError {
    #[error("Failed to open bundle for tree building: {0}")]
    Open(#[from] LoadError),
}

/// Errors registering a bundle into the managed plugin directory
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("Source is not a cvlib bundle: {path}")]
    NotABundle { path: PathBuf },

    #[error("Failed to copy {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

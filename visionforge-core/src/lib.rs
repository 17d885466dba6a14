//! visionforge-core: Core library for the VisionForge bundle manager
//!
//! VisionForge manages versioned builds ("bundles") of the cvlib computer
//! vision library at runtime. This crate provides the foundational
//! components:
//!
//! - **Settings** - [`Config`] for the flat key=value settings file
//! - **Isolated loading** - [`BundleLoader`] arenas that keep class identity
//!   scoped per load, plus the process-wide native-image registry
//! - **API indexing** - [`build_method_index`]/[`build_class_index`] over a
//!   bundle's self-describing catalog
//! - **Display projection** - [`ApiTree`] for an external renderer
//! - **Installation** - [`installer`] for the managed plugin directory
//! - **Orchestration** - [`LibraryManager`] tying it all together
//!
//! # Quick Start
//!
//! ```ignore
//! use visionforge_core::{LibraryManager, ManagerConfig};
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut manager = LibraryManager::new(ManagerConfig::default());
//!     manager.initialize();
//!
//!     if let Some(bundle) = manager.available_libraries().first().cloned() {
//!         manager.load_library(&bundle)?;
//!         println!("{} methods indexed", manager.method_index().len());
//!     }
//!
//!     manager.save_settings();
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod handle;
pub mod host;
pub mod inspector;
pub mod installer;
pub mod loader;
pub mod manager;
pub mod paths;
pub mod tree;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export key types for convenience
pub use config::Config;
pub use error::{ConfigError, ForgeError, InspectError, InstallError, LoadError, TreeError};
pub use handle::{MethodHandle, TypeHandle};
pub use host::{ExecutorBridge, HostCallbacks, NullBridge, TracingHost};
pub use inspector::{ClassIndex, MethodIndex, build_class_index, build_method_index};
pub use loader::{ArenaId, BundleLoader, ManagedClasses};
pub use manager::{LibraryManager, ManagerConfig};
pub use tree::{ApiTree, TreeNode, build_tree};

/// Product version string, shown by embedding hosts.
pub const VERSION: &str = concat!("VisionForge v", env!("CARGO_PKG_VERSION"));

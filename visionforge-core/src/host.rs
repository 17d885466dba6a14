//! Outward interfaces consumed by the core.
//!
//! [`HostCallbacks`] is the only surface through which the core talks to the
//! embedding application; [`ExecutorBridge`] is the downstream script
//! executor re-initialized after each successful load. Both default to
//! tracing-backed implementations so the core runs headless.

use std::path::Path;

use crate::handle::TypeHandle;
use crate::loader::BundleLoader;

/// Callbacks into the embedding host application.
pub trait HostCallbacks {
    /// A class became available in the active arena.
    fn register_class(&self, class: &TypeHandle);

    /// Short user-visible status line.
    fn show_status(&self, message: &str);

    /// Detailed log line.
    fn log(&self, message: &str);

    /// Audible error cue.
    fn beep(&self);
}

/// Host surface for embedders without a UI; everything goes to tracing.
#[derive(Debug, Default)]
pub struct TracingHost;

impl HostCallbacks for TracingHost {
    fn register_class(&self, class: &TypeHandle) {
        tracing::debug!(class = %class.qualified_name(), "Class registered");
    }

    fn show_status(&self, message: &str) {
        tracing::info!(status = message, "Status");
    }

    fn log(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn beep(&self) {}
}

/// Downstream script executor.
pub trait ExecutorBridge {
    /// Called once per successful load with a non-empty method index.
    fn initialize(&mut self, bundle_path: &Path, loader: &BundleLoader);
}

/// Bridge for embedders without a script executor.
#[derive(Debug, Default)]
pub struct NullBridge;

impl ExecutorBridge for NullBridge {
    fn initialize(&mut self, bundle_path: &Path, _loader: &BundleLoader) {
        tracing::debug!(bundle = %bundle_path.display(), "No script executor attached");
    }
}

//! Isolated bundle-loading arenas.
//!
//! Each load attempt gets a fresh [`BundleLoader`] with its own [`ArenaId`].
//! Every handle produced by a loader carries that id, so class identity is
//! scoped to the arena: two loaders never share identity, even when they
//! open the same bundle file. Native images are a separate, process-wide
//! concern - once bound they stay bound until the process exits.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use libloading::Library;
use visionforge_bundle_api::{ABI_VERSION, ApiCatalog, VisionBundle};

use crate::error::LoadError;
use crate::handle::TypeHandle;
use crate::paths;

/// Identity of one isolated loading arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaId(u64);

static NEXT_ARENA: AtomicU64 = AtomicU64::new(1);

impl ArenaId {
    fn next() -> Self {
        ArenaId(NEXT_ARENA.fetch_add(1, Ordering::Relaxed))
    }
}

/// A native image bound into the process.
///
/// Native images cannot be unloaded, so entries live for the process
/// lifetime; the registry only ever grows.
struct NativeImage {
    source: PathBuf,
    _library: Library,
}

fn native_registry() -> &'static Mutex<HashMap<String, NativeImage>> {
    static REGISTRY: OnceLock<Mutex<HashMap<String, NativeImage>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// A bundle's managed side, opened inside one arena.
pub(crate) struct OpenedBundle {
    path: PathBuf,
    /// The bundle instance; declared before the library so it drops first.
    instance: Box<dyn VisionBundle>,
    _library: Option<Library>,
    /// Catalog snapshot taken at open time; the enumeration order for this
    /// arena.
    catalog: ApiCatalog,
}

impl OpenedBundle {
    pub(crate) fn instance(&self) -> &dyn VisionBundle {
        self.instance.as_ref()
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    pub(crate) fn in_memory(instance: Box<dyn VisionBundle>) -> Self {
        let catalog = instance.catalog();
        Self {
            path: PathBuf::from("<in-memory>"),
            instance,
            _library: None,
            catalog,
        }
    }
}

/// Isolated loading context for exactly one bundle.
///
/// Selecting a new active bundle must construct a new loader - loaders are
/// never reused across bundles.
pub struct BundleLoader {
    arena: ArenaId,
    plugin_dir: PathBuf,
    bundle: Option<Arc<OpenedBundle>>,
}

impl BundleLoader {
    pub fn new(plugin_dir: impl Into<PathBuf>) -> Self {
        Self {
            arena: ArenaId::next(),
            plugin_dir: plugin_dir.into(),
            bundle: None,
        }
    }

    /// Identity of this loader's arena.
    pub fn arena(&self) -> ArenaId {
        self.arena
    }

    /// Bind the bundle's native image into the process.
    ///
    /// The bind is process-wide and one-time per image: re-requesting the
    /// same image from the same source is a no-op, and the same image name
    /// from a different source is refused until the process restarts.
    pub fn load_native_binary(&self, bundle_path: &Path) -> Result<(), LoadError> {
        let name = paths::native_binary_name(bundle_path);
        let native_path = paths::native_binary_path(&self.plugin_dir, bundle_path);

        let mut registry = native_registry()
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(image) = registry.get(&name) {
            if image.source == native_path {
                tracing::debug!(image = %name, "Native image already bound, skipping");
                return Ok(());
            }
            return Err(LoadError::NativeConflict {
                name,
                loaded_from: image.source.clone(),
                requested: native_path,
            });
        }

        if !native_path.exists() {
            return Err(LoadError::NativeMissing { path: native_path });
        }

        // SAFETY: binding the native image runs its initializers; the image
        // ships with the bundle the user explicitly selected for loading.
        let library = unsafe { Library::new(&native_path)? };
        tracing::info!(image = %name, path = %native_path.display(), "Native image bound");
        registry.insert(
            name,
            NativeImage {
                source: native_path,
                _library: library,
            },
        );
        Ok(())
    }

    /// Open the bundle's managed side in this arena, if not already open.
    fn open(&mut self, bundle_path: &Path) -> Result<Arc<OpenedBundle>, LoadError> {
        if let Some(bundle) = &self.bundle {
            return Ok(Arc::clone(bundle));
        }

        // SAFETY: loading a bundle the user explicitly selected. The bundle
        // is expected to follow the VisionBundle ABI contract.
        let library = unsafe { Library::new(bundle_path)? };

        // SAFETY: calling a C function exported by the bundle.
        let abi_version_fn: libloading::Symbol<extern "C" fn() -> u32> =
            unsafe { library.get(b"_visionforge_bundle_abi_version")? };
        let found = abi_version_fn();
        if found != ABI_VERSION {
            return Err(LoadError::AbiMismatch {
                expected: ABI_VERSION,
                found,
            });
        }

        // SAFETY: the create function returns a raw pointer we own from here
        // on and convert back into a Box<dyn VisionBundle>.
        let create_fn: libloading::Symbol<extern "C" fn() -> *mut dyn VisionBundle> =
            unsafe { library.get(b"_visionforge_bundle_create")? };
        let raw = create_fn();
        if raw.is_null() {
            return Err(LoadError::NullInstance {
                path: bundle_path.to_path_buf(),
            });
        }
        // SAFETY: non-null pointer from the bundle's create entry point.
        let instance = unsafe { Box::from_raw(raw) };

        let catalog = instance.catalog();
        tracing::info!(
            bundle = %bundle_path.display(),
            classes = catalog.len(),
            "Bundle opened"
        );
        let bundle = Arc::new(OpenedBundle {
            path: bundle_path.to_path_buf(),
            instance,
            _library: Some(library),
            catalog,
        });
        self.bundle = Some(Arc::clone(&bundle));
        Ok(bundle)
    }

    /// Enumerate every loadable class in the bundle as type handles.
    ///
    /// The sequence is lazy, finite, and consumed by value - it cannot be
    /// restarted. Call again for a fresh pass.
    pub fn load_managed_classes(
        &mut self,
        bundle_path: &Path,
    ) -> Result<ManagedClasses, LoadError> {
        let bundle = self.open(bundle_path)?;
        Ok(ManagedClasses {
            arena: self.arena,
            bundle,
            index: 0,
        })
    }

    /// Resolve a class by qualified name within this arena's scope.
    pub fn resolve(&self, class_name: &str) -> Result<TypeHandle, LoadError> {
        let Some(bundle) = &self.bundle else {
            return Err(LoadError::ClassResolution {
                name: class_name.to_string(),
            });
        };
        bundle
            .catalog
            .class(class_name)
            .map(|spec| TypeHandle::new(self.arena, spec.clone(), Arc::clone(bundle)))
            .ok_or_else(|| LoadError::ClassResolution {
                name: class_name.to_string(),
            })
    }

    /// Path of the bundle opened in this arena, if any.
    pub fn bundle_path(&self) -> Option<&Path> {
        self.bundle.as_deref().map(OpenedBundle::path)
    }

    #[cfg(test)]
    pub(crate) fn with_bundle(
        plugin_dir: impl Into<PathBuf>,
        instance: Box<dyn VisionBundle>,
    ) -> Self {
        Self {
            arena: ArenaId::next(),
            plugin_dir: plugin_dir.into(),
            bundle: Some(Arc::new(OpenedBundle::in_memory(instance))),
        }
    }
}

/// Lazy enumeration of a bundle's loadable classes.
pub struct ManagedClasses {
    arena: ArenaId,
    bundle: Arc<OpenedBundle>,
    index: usize,
}

impl Iterator for ManagedClasses {
    type Item = TypeHandle;

    fn next(&mut self) -> Option<TypeHandle> {
        let spec = self.bundle.catalog.classes.get(self.index)?.clone();
        self.index += 1;
        Some(TypeHandle::new(self.arena, spec, Arc::clone(&self.bundle)))
    }
}

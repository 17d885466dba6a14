//! LibraryManager - discovery, selection, and activation of cvlib bundles.
//!
//! The manager owns the configuration, the available-bundle collection, the
//! active selection, the isolated loader, and the derived indexes and tree.
//! All state lives in this struct - there is no ambient global instance; the
//! embedding host creates one, calls [`LibraryManager::initialize`], and
//! saves it at shutdown with [`LibraryManager::save_settings`].

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::ForgeError;
use crate::host::{ExecutorBridge, HostCallbacks, NullBridge, TracingHost};
use crate::inspector::{self, ClassIndex, MethodIndex};
use crate::installer;
use crate::loader::BundleLoader;
use crate::paths;
use crate::tree::{self, ApiTree};

/// Locations the manager works against.
pub struct ManagerConfig {
    /// Settings file path
    pub config_path: PathBuf,
    /// Managed plugin directory
    pub plugin_dir: PathBuf,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(paths::CONFIG_FILE),
            plugin_dir: paths::plugin_dir(),
        }
    }
}

/// Orchestrator over bundle activation.
///
/// At most one bundle is active at a time. A load replaces the whole loaded
/// state - arena, indexes, and tree - and a failed load never leaves the
/// manager referencing a bundle that did not fully load.
pub struct LibraryManager {
    config_path: PathBuf,
    plugin_dir: PathBuf,
    config: Config,
    verbose: bool,
    active: Option<PathBuf>,
    available: Vec<PathBuf>,
    loader: Option<BundleLoader>,
    methods: MethodIndex,
    classes: ClassIndex,
    tree: ApiTree,
    host: Box<dyn HostCallbacks>,
    bridge: Box<dyn ExecutorBridge>,
}

impl LibraryManager {
    /// Manager wired to the tracing host and a disconnected executor.
    pub fn new(config: ManagerConfig) -> Self {
        Self::with_host(config, Box::new(TracingHost), Box::new(NullBridge))
    }

    /// Manager wired to an embedding host application and script executor.
    pub fn with_host(
        config: ManagerConfig,
        host: Box<dyn HostCallbacks>,
        bridge: Box<dyn ExecutorBridge>,
    ) -> Self {
        Self {
            config_path: config.config_path,
            plugin_dir: config.plugin_dir,
            config: Config::default(),
            verbose: true,
            active: None,
            available: Vec::new(),
            loader: None,
            methods: MethodIndex::default(),
            classes: ClassIndex::default(),
            tree: ApiTree::placeholder(),
            host,
            bridge,
        }
    }

    /// Restore settings, discover installed bundles, and default the
    /// selection to the first available bundle when none is configured.
    ///
    /// Loads nothing; settings-file failures are reported and defaults
    /// applied.
    pub fn initialize(&mut self) {
        self.config = match Config::load(&self.config_path) {
            Ok(config) => config,
            Err(err) => {
                self.host
                    .log(&format!("Failed to read settings, using defaults: {err}"));
                Config::default()
            }
        };
        self.verbose = self.config.verbose();

        let mut available = Vec::new();
        for entry in self.config.installed() {
            push_unique(&mut available, paths::normalize(Path::new(&entry)));
        }
        for found in installer::discover(&self.plugin_dir) {
            push_unique(&mut available, found);
        }
        self.available = available;

        self.active = self
            .config
            .lib_path()
            .map(|p| paths::normalize(Path::new(p)))
            .or_else(|| self.available.first().cloned());
    }

    /// Activate `bundle`: bind its native image, rebuild the API indexes and
    /// display tree, and re-initialize the executor bridge.
    ///
    /// The new state is committed only after the whole sequence succeeds, so
    /// a failed switch keeps a previously loaded bundle fully intact. The
    /// native-image bind is process-wide and is not rolled back.
    pub fn load_library(&mut self, bundle: &Path) -> Result<(), ForgeError> {
        let bundle = paths::normalize(bundle);
        let mut loader = BundleLoader::new(&self.plugin_dir);

        match self.run_load_sequence(&bundle, &mut loader) {
            Ok((methods, classes)) => {
                // A broken tree falls back to the placeholder; the load
                // itself still succeeds.
                let tree = match tree::build_tree(&bundle, &mut loader) {
                    Ok(tree) => tree,
                    Err(err) => {
                        self.report(&format!("Failed to build library tree: {err}"));
                        ApiTree::placeholder()
                    }
                };
                if !methods.is_empty() {
                    self.bridge.initialize(&bundle, &loader);
                }

                self.config.set_lib_path(&bundle.to_string_lossy());
                push_unique(&mut self.available, bundle.clone());
                if self.verbose {
                    self.host
                        .show_status(&format!("Loaded {}", bundle.display()));
                }
                self.methods = methods;
                self.classes = classes;
                self.tree = tree;
                self.loader = Some(loader);
                self.active = Some(bundle);
                Ok(())
            }
            Err(err) => {
                self.report(&format!("Failed to load {}: {err}", bundle.display()));
                if self.loader.is_none() {
                    // Nothing good to keep - reset to the unloaded state.
                    self.active = None;
                    self.methods = MethodIndex::default();
                    self.classes = ClassIndex::default();
                    self.tree = ApiTree::placeholder();
                }
                Err(err)
            }
        }
    }

    fn run_load_sequence(
        &mut self,
        bundle: &Path,
        loader: &mut BundleLoader,
    ) -> Result<(MethodIndex, ClassIndex), ForgeError> {
        loader.load_native_binary(bundle)?;
        let methods = inspector::build_method_index(bundle, loader)?;
        let classes = inspector::build_class_index(bundle, loader)?;
        for handle in loader.load_managed_classes(bundle)? {
            self.host.register_class(&handle);
        }
        Ok((methods, classes))
    }

    /// Install and remember a bundle.
    ///
    /// The managed path becomes the next configured selection and is
    /// persisted at save time. Failures are logged, never raised.
    pub fn install_library(&mut self, source: &Path) -> bool {
        match installer::install(source, &self.plugin_dir) {
            Ok(managed) => {
                self.config.set_lib_path(&managed.to_string_lossy());
                push_unique(&mut self.available, managed);
                true
            }
            Err(err) => {
                self.host
                    .log(&format!("Installation of bundle failed: {err}"));
                false
            }
        }
    }

    /// Persist settings; write failures are reported, not fatal.
    pub fn save_settings(&mut self) {
        let installed: Vec<String> = self
            .available
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        self.config.set_installed(&installed);
        self.config.set_verbose(self.verbose);
        if let Err(err) = self.config.save(&self.config_path) {
            self.host.log(&format!("Failed to save settings: {err}"));
        }
    }

    /// Currently selected bundle reference, if any.
    pub fn active_library(&self) -> Option<&Path> {
        self.active.as_deref()
    }

    /// Known bundles, normalized and duplicate-free.
    pub fn available_libraries(&self) -> &[PathBuf] {
        &self.available
    }

    /// Display tree of the loaded bundle, or the placeholder.
    pub fn api_tree(&self) -> &ApiTree {
        &self.tree
    }

    /// Method index of the loaded bundle; empty when nothing is loaded.
    pub fn method_index(&self) -> &MethodIndex {
        &self.methods
    }

    /// Constructible-class index of the loaded bundle; empty when nothing is
    /// loaded.
    pub fn class_index(&self) -> &ClassIndex {
        &self.classes
    }

    /// The active isolated loader.
    ///
    /// Use with caution: resolving classes through it couples callers to the
    /// current arena, which is replaced on every load.
    pub fn loader(&self) -> Option<&BundleLoader> {
        self.loader.as_ref()
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.config.set_verbose(verbose);
        self.verbose = verbose;
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Surface a failure through the host's status, log, and beep cues.
    fn report(&self, message: &str) {
        self.host.beep();
        self.host.show_status(message);
        self.host.log(message);
    }

    #[cfg(test)]
    pub(crate) fn seed_loaded(
        &mut self,
        active: PathBuf,
        loader: BundleLoader,
        methods: MethodIndex,
        classes: ClassIndex,
        tree: ApiTree,
    ) {
        self.active = Some(active);
        self.loader = Some(loader);
        self.methods = methods;
        self.classes = classes;
        self.tree = tree;
    }
}

fn push_unique(list: &mut Vec<PathBuf>, path: PathBuf) {
    if !list.contains(&path) {
        list.push(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspector::{build_class_index, build_method_index};
    use crate::testutil::{CatalogBundle, demo_catalog};
    use std::env;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Host that records every outward call for assertions.
    #[derive(Default, Clone)]
    struct RecordingHost {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingHost {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl HostCallbacks for RecordingHost {
        fn register_class(&self, class: &crate::handle::TypeHandle) {
            self.events
                .lock()
                .unwrap()
                .push(format!("register:{}", class.qualified_name()));
        }

        fn show_status(&self, message: &str) {
            self.events.lock().unwrap().push(format!("status:{message}"));
        }

        fn log(&self, message: &str) {
            self.events.lock().unwrap().push(format!("log:{message}"));
        }

        fn beep(&self) {
            self.events.lock().unwrap().push("beep".to_string());
        }
    }

    fn bundle_name(version: &str) -> String {
        format!("cvlib-{}.{}", version, env::consts::DLL_EXTENSION)
    }

    fn manager_in(dir: &TempDir) -> (LibraryManager, RecordingHost) {
        let host = RecordingHost::default();
        let manager = LibraryManager::with_host(
            ManagerConfig {
                config_path: dir.path().join("visionforge.config"),
                plugin_dir: dir.path().join("plugins"),
            },
            Box::new(host.clone()),
            Box::new(NullBridge),
        );
        (manager, host)
    }

    #[test]
    fn test_initialize_without_config_or_bundles() {
        let dir = TempDir::new().unwrap();
        let (mut manager, _host) = manager_in(&dir);

        manager.initialize();

        assert!(manager.available_libraries().is_empty());
        assert_eq!(manager.active_library(), None);
        assert!(manager.api_tree().is_placeholder());
        assert!(manager.is_verbose());
    }

    #[test]
    fn test_initialize_discovers_and_defaults_selection() {
        let dir = TempDir::new().unwrap();
        let plugin_dir = dir.path().join("plugins");
        fs::create_dir_all(&plugin_dir).unwrap();
        fs::write(plugin_dir.join(bundle_name("3.0.0")), "a").unwrap();
        fs::write(plugin_dir.join(bundle_name("4.2.0")), "b").unwrap();

        let (mut manager, _host) = manager_in(&dir);
        manager.initialize();

        assert_eq!(manager.available_libraries().len(), 2);
        let first = manager.available_libraries()[0].clone();
        assert_eq!(manager.active_library(), Some(first.as_path()));
    }

    #[test]
    fn test_initialize_merges_config_with_discovery() {
        let dir = TempDir::new().unwrap();
        let plugin_dir = dir.path().join("plugins");
        fs::create_dir_all(&plugin_dir).unwrap();
        let on_disk = plugin_dir.join(bundle_name("4.2.0"));
        fs::write(&on_disk, "b").unwrap();

        let config_path = dir.path().join("visionforge.config");
        let recorded = plugin_dir.join(bundle_name("3.0.0"));
        fs::write(
            &config_path,
            format!(
                "installed-0={}\ninstalled-1={}\nlibPath={}\n",
                recorded.display(),
                on_disk.display(),
                recorded.display()
            ),
        )
        .unwrap();

        let (mut manager, _host) = manager_in(&dir);
        manager.initialize();

        // Both entries present, the on-disk one not duplicated.
        assert_eq!(manager.available_libraries().len(), 2);
        assert_eq!(
            manager.active_library(),
            Some(paths::normalize(&recorded).as_path())
        );
    }

    #[test]
    fn test_load_missing_bundle_resets_to_unloaded() {
        let dir = TempDir::new().unwrap();
        let (mut manager, host) = manager_in(&dir);
        manager.initialize();

        let missing = dir.path().join("plugins").join(bundle_name("9.9.9"));
        let result = manager.load_library(&missing);

        assert!(result.is_err());
        assert_eq!(manager.active_library(), None);
        assert!(manager.method_index().is_empty());
        assert!(manager.class_index().is_empty());
        assert!(manager.api_tree().is_placeholder());
        assert!(host.events().iter().any(|e| e == "beep"));
    }

    #[test]
    fn test_failed_switch_keeps_prior_loaded_state() {
        let dir = TempDir::new().unwrap();
        let (mut manager, _host) = manager_in(&dir);
        manager.initialize();

        // Seed a loaded state as if a bundle had activated successfully.
        let mut loader =
            BundleLoader::with_bundle("plugins", Box::new(CatalogBundle::new(demo_catalog())));
        let source = Path::new("<in-memory>");
        let methods = build_method_index(source, &mut loader).unwrap();
        let classes = build_class_index(source, &mut loader).unwrap();
        let tree = crate::tree::build_tree(source, &mut loader).unwrap();
        let active = paths::normalize(&dir.path().join("plugins").join(bundle_name("4.2.0")));
        let method_count = methods.len();
        manager.seed_loaded(active.clone(), loader, methods, classes, tree);

        let missing = dir.path().join("plugins").join(bundle_name("9.9.9"));
        assert!(manager.load_library(&missing).is_err());

        // The working prior state is not clobbered by the failed switch.
        assert_eq!(manager.active_library(), Some(active.as_path()));
        assert_eq!(manager.method_index().len(), method_count);
        assert!(!manager.api_tree().is_placeholder());
    }

    #[test]
    fn test_install_library_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let source_dir = TempDir::new().unwrap();
        let source = source_dir.path().join(bundle_name("4.2.0"));
        fs::write(&source, "bundle-bytes").unwrap();

        let (mut manager, _host) = manager_in(&dir);
        manager.initialize();

        assert!(manager.install_library(&source));
        assert!(manager.install_library(&source));

        assert_eq!(manager.available_libraries().len(), 1);
    }

    #[test]
    fn test_install_failure_returns_false_and_logs() {
        let dir = TempDir::new().unwrap();
        let (mut manager, host) = manager_in(&dir);
        manager.initialize();

        let bogus = dir.path().join("notes.txt");
        fs::write(&bogus, "not a bundle").unwrap();

        assert!(!manager.install_library(&bogus));
        assert!(host.events().iter().any(|e| e.starts_with("log:")));
        assert!(manager.available_libraries().is_empty());
    }

    #[test]
    fn test_save_settings_roundtrips_state() {
        let dir = TempDir::new().unwrap();
        let source_dir = TempDir::new().unwrap();
        let source = source_dir.path().join(bundle_name("4.2.0"));
        fs::write(&source, "bundle-bytes").unwrap();

        let (mut manager, _host) = manager_in(&dir);
        manager.initialize();
        manager.install_library(&source);
        manager.set_verbose(false);
        manager.save_settings();

        let (mut restored, _host) = manager_in(&dir);
        restored.initialize();

        assert!(!restored.is_verbose());
        assert_eq!(restored.available_libraries().len(), 1);
        assert_eq!(
            restored.active_library(),
            manager.available_libraries().first().map(PathBuf::as_path)
        );
    }

    #[test]
    fn test_verbose_toggle() {
        let dir = TempDir::new().unwrap();
        let (mut manager, _host) = manager_in(&dir);

        assert!(manager.is_verbose());
        manager.set_verbose(false);
        assert!(!manager.is_verbose());
    }
}

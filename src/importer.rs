//! `importorskip`: load a module or skip.
//!
//! Test modules use this to declare soft dependencies. The host's module
//! system is reached only through [`ModuleLoader`]; [`ModuleRegistry`] is
//! the in-memory loader used by the driver and the tests.
//!
//! ## Registry Invariant
//! A registry is built once at the entry point and passed by reference to
//! every `importorskip` call. Loading never mutates it: importing the same
//! name twice hands back the same `Arc<Module>`.

use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::errors::{ImportError, ImportErrorKind, Interrupt, InvalidVersion, UsageError};
use crate::signal::Skipped;
use crate::version::Version;

static MODULE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*$").unwrap()
});

// ============================================================================
// MODULES AND LOADERS
// ============================================================================

/// A loaded module handle.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    attributes: BTreeMap<String, Value>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Sets `__version__`.
    pub fn with_version(self, version: impl Into<String>) -> Self {
        self.with_attribute("__version__", Value::String(version.into()))
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// `__version__` when it is present and a string. `importorskip`
    /// inspects the raw attribute so that a non-string value is reported
    /// rather than taken for a missing one.
    pub fn version(&self) -> Option<&str> {
        self.attribute("__version__").and_then(Value::as_str)
    }
}

/// A warning raised while a module loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportWarning {
    pub module: String,
    pub message: String,
}

/// The host's dynamic module loading facility.
pub trait ModuleLoader {
    /// Loads `name`, pushing any warnings raised during loading into
    /// `warnings`.
    fn import_module(
        &self,
        name: &str,
        warnings: &mut Vec<ImportWarning>,
    ) -> Result<Arc<Module>, ImportError>;

    /// Names the loader can resolve, for listings.
    fn module_names(&self) -> Vec<String> {
        Vec::new()
    }
}

#[derive(Debug, Clone)]
enum Entry {
    Loaded(Arc<Module>),
    Broken(String),
}

#[derive(Debug, Clone)]
struct Registered {
    entry: Entry,
    warnings: Vec<String>,
}

/// In-memory [`ModuleLoader`].
///
/// Dotted names load their parents first, so `a.b` fails with
/// `No module named 'a'` when `a` itself is unknown.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: BTreeMap<String, Registered>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with unversioned standard modules.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for name in ["math", "sys", "os", "os.path", "json"] {
            registry.register(Module::new(name));
        }
        registry
    }

    pub fn register(&mut self, module: Module) -> &mut Self {
        self.modules.insert(
            module.name.clone(),
            Registered {
                entry: Entry::Loaded(Arc::new(module)),
                warnings: Vec::new(),
            },
        );
        self
    }

    /// Registers a module that exists but fails while loading.
    pub fn register_broken(
        &mut self,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> &mut Self {
        self.modules.insert(
            name.into(),
            Registered {
                entry: Entry::Broken(message.into()),
                warnings: Vec::new(),
            },
        );
        self
    }

    /// Attaches a warning emitted whenever `name` is loaded. Unknown names
    /// are ignored.
    pub fn warn_on_import(&mut self, name: &str, message: impl Into<String>) -> &mut Self {
        if let Some(registered) = self.modules.get_mut(name) {
            registered.warnings.push(message.into());
        }
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    fn load_one(
        &self,
        name: &str,
        warnings: &mut Vec<ImportWarning>,
    ) -> Result<Arc<Module>, ImportError> {
        let registered = self
            .modules
            .get(name)
            .ok_or_else(|| ImportError::not_found(name))?;
        warnings.extend(registered.warnings.iter().map(|message| ImportWarning {
            module: name.to_string(),
            message: message.clone(),
        }));
        match &registered.entry {
            Entry::Loaded(module) => Ok(Arc::clone(module)),
            Entry::Broken(message) => Err(ImportError::failed(name, message.clone())),
        }
    }
}

impl ModuleLoader for ModuleRegistry {
    fn import_module(
        &self,
        name: &str,
        warnings: &mut Vec<ImportWarning>,
    ) -> Result<Arc<Module>, ImportError> {
        let mut module = None;
        let mut end = 0;
        for part in name.split('.') {
            end += part.len();
            module = Some(self.load_one(&name[..end], warnings)?);
            end += 1;
        }
        module.ok_or_else(|| ImportError::not_found(name))
    }

    fn module_names(&self) -> Vec<String> {
        self.modules.keys().cloned().collect()
    }
}

// ============================================================================
// IMPORTORSKIP
// ============================================================================

/// Which import failures turn into a skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportFilter {
    /// Every import failure, including a missing module.
    #[default]
    AnyImportError,
    /// Only a missing module; a module that exists but fails to load
    /// propagates as an error.
    ModuleNotFound,
}

impl ImportFilter {
    pub fn matches(&self, kind: ImportErrorKind) -> bool {
        match self {
            ImportFilter::AnyImportError => true,
            ImportFilter::ModuleNotFound => kind == ImportErrorKind::ModuleNotFound,
        }
    }
}

/// Arguments for [`importorskip_with`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOrSkip {
    pub module_name: String,
    /// Smallest acceptable `__version__`.
    pub min_version: Option<String>,
    /// Replaces the default skip reason when the import fails.
    pub reason: Option<String>,
    pub catch: ImportFilter,
}

impl ImportOrSkip {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            ..Default::default()
        }
    }

    pub fn min_version(mut self, version: impl Into<String>) -> Self {
        self.min_version = Some(version.into());
        self
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn catch(mut self, filter: ImportFilter) -> Self {
        self.catch = filter;
        self
    }
}

/// Imports `module_name` or skips the current module.
#[track_caller]
pub fn importorskip<L>(loader: &L, module_name: &str) -> Result<Arc<Module>, Interrupt>
where
    L: ModuleLoader + ?Sized,
{
    importorskip_with(loader, ImportOrSkip::new(module_name))
}

/// Imports a module, turning a matching import failure or a too-old
/// version into a module-level skip.
///
/// Import failures that the filter does not match propagate as
/// [`Interrupt::Import`]. A name that is not a dotted identifier path is a
/// usage error, and an unparseable version propagates as
/// [`Interrupt::Version`].
#[track_caller]
pub fn importorskip_with<L>(loader: &L, request: ImportOrSkip) -> Result<Arc<Module>, Interrupt>
where
    L: ModuleLoader + ?Sized,
{
    let name = request.module_name.as_str();
    if !MODULE_NAME.is_match(name) {
        return Err(UsageError::new(format!(
            "importorskip() got an invalid module name: {:?}",
            name
        ))
        .into());
    }

    let mut warnings = Vec::new();
    let loaded = loader.import_module(name, &mut warnings);
    for warning in &warnings {
        tracing::trace!(
            module = %warning.module,
            "suppressed import warning: {}",
            warning.message
        );
    }

    let module = match loaded {
        Ok(module) => module,
        Err(err) if request.catch.matches(err.kind) => {
            let reason = match request.reason {
                Some(reason) => reason,
                None => format!("could not import '{}': {}", name, err),
            };
            tracing::debug!(
                module = name,
                kind = %err.kind,
                "import failed, skipping module"
            );
            return Err(module_skip(reason).into());
        }
        Err(err) => return Err(err.into()),
    };

    let Some(min_version) = request.min_version.as_deref() else {
        return Ok(module);
    };
    let required = Version::parse(min_version)?;
    let found = match module.attribute("__version__") {
        None | Some(Value::Null) => None,
        Some(Value::String(v)) => Some(v.as_str()),
        Some(other) => return Err(InvalidVersion(other.to_string()).into()),
    };
    let too_old = match found {
        Some(found) => Version::parse(found)? < required,
        None => true,
    };
    if too_old {
        let found = match found {
            Some(v) => format!("'{}'", v),
            None => "None".to_string(),
        };
        tracing::debug!(
            module = name,
            found = %found,
            required = min_version,
            "version too old, skipping module"
        );
        return Err(module_skip(format!(
            "module '{}' has __version__ {}, required is: '{}'",
            name, found, min_version
        ))
        .into());
    }
    Ok(module)
}

#[track_caller]
fn module_skip(reason: String) -> Skipped {
    Skipped::with_message(reason).with_allow_module_level(true)
}

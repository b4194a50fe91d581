//! Driver configuration and the module registry manifest.
//!
//! A manifest is a YAML file describing the modules the driver's
//! [`ModuleRegistry`] can load:
//!
//! ```yaml
//! builtins: true              # optional, defaults to true
//! modules:
//!   - name: docutils
//!     version: "0.18.1"
//!     warnings: ["docutils is noisy"]
//!   - name: needs_six
//!     error: "No module named 'six'"   # exists but fails to load
//!   - name: pkg
//!     attributes: { flavor: "mint" }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

use crate::importer::{Module, ModuleRegistry};

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read registry manifest {}", .path.display())]
    #[diagnostic(code(verdict::config::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse registry manifest {}", .path.display())]
    #[diagnostic(
        code(verdict::config::parse),
        help("the manifest is a YAML map with a `modules` list")
    )]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Settings for the `verdict` driver.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Manifest to build the module registry from; builtins only when unset.
    pub registry: Option<PathBuf>,
    pub use_colors: bool,
    /// Print verdicts as JSON instead of colored text.
    pub json: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            registry: None,
            use_colors: atty::is(atty::Stream::Stdout),
            json: false,
        }
    }
}

impl DriverConfig {
    pub fn load_registry(&self) -> Result<ModuleRegistry, ConfigError> {
        match &self.registry {
            Some(path) => {
                RegistryManifest::load(path).map(RegistryManifest::into_registry)
            }
            None => Ok(ModuleRegistry::with_builtins()),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RegistryManifest {
    #[serde(default = "default_true")]
    pub builtins: bool,
    #[serde(default)]
    pub modules: Vec<ModuleSpec>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ModuleSpec {
    pub name: String,
    pub version: Option<String>,
    /// When set, the module exists but loading it fails with this message.
    pub error: Option<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl RegistryManifest {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub fn into_registry(self) -> ModuleRegistry {
        let mut registry = if self.builtins {
            ModuleRegistry::with_builtins()
        } else {
            ModuleRegistry::new()
        };
        for spec in self.modules {
            match spec.error {
                Some(message) => {
                    registry.register_broken(spec.name.clone(), message);
                }
                None => {
                    let mut module = Module::new(spec.name.clone());
                    if let Some(version) = spec.version {
                        module = module.with_version(version);
                    }
                    for (key, value) in spec.attributes {
                        module = module.with_attribute(key, value);
                    }
                    registry.register(module);
                }
            }
            for warning in spec.warnings {
                registry.warn_on_import(&spec.name, warning);
            }
        }
        tracing::debug!(modules = registry.len(), "module registry built");
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::ModuleLoader;

    const MANIFEST: &str = r#"
modules:
  - name: docutils
    version: "0.18.1"
    warnings: ["noisy"]
  - name: needs_six
    error: "No module named 'six'"
  - name: pkg
    attributes: { flavor: "mint" }
"#;

    #[test]
    fn test_manifest_builds_registry() {
        let registry = RegistryManifest::from_yaml(MANIFEST)
            .unwrap()
            .into_registry();
        let mut warnings = Vec::new();
        let docutils = registry.import_module("docutils", &mut warnings).unwrap();
        assert_eq!(docutils.version(), Some("0.18.1"));
        assert_eq!(warnings.len(), 1);
        assert!(registry.import_module("needs_six", &mut warnings).is_err());
        let pkg = registry.import_module("pkg", &mut warnings).unwrap();
        assert_eq!(pkg.attribute("flavor"), Some(&serde_json::json!("mint")));
        assert!(registry.contains("math"));
    }

    #[test]
    fn test_builtins_can_be_disabled() {
        let registry = RegistryManifest::from_yaml("builtins: false\n")
            .unwrap()
            .into_registry();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let err = RegistryManifest::from_yaml("modules:\n  - name: x\n    verison: '1'\n");
        assert!(err.is_err());
    }

    #[test]
    fn test_missing_manifest_reports_path() {
        let config = DriverConfig {
            registry: Some(PathBuf::from("does/not/exist.yaml")),
            ..DriverConfig::default()
        };
        let err = config.load_registry().unwrap_err();
        assert!(err.to_string().contains("does/not/exist.yaml"));
    }
}

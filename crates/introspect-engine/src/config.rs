//! Engine configuration, loaded from TOML.
//!
//! ```toml
//! [engine]
//! max_inheritance_depth = 256
//! null_arguments = "match-reference"   # or "reject"
//!
//! [reflect.permissions]
//! global = "ALL"
//! sealed = ["Vault"]
//!
//! [reflect.permissions.types]
//! "Vault" = "PUBLIC_ONLY"
//! "Animal" = "READ_PUBLIC|INVOKE_ALL"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Default bound on inheritance walks
pub const DEFAULT_MAX_INHERITANCE_DEPTH: usize = 256;

/// Errors while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the config file failed
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The TOML did not parse into the expected shape
    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A permission string did not parse
    #[error("Invalid permission value for {key}: {value}")]
    InvalidPermission {
        /// Config key (`global` or a type name)
        key: String,
        /// Offending value
        value: String,
    },
}

/// How a null actual argument is matched against a declared parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NullArgumentPolicy {
    /// Null matches any non-primitive parameter
    #[default]
    MatchReference,
    /// Null matches nothing
    Reject,
}

/// `[engine]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Upper bound on the generic-argument inheritance walk
    pub max_inheritance_depth: usize,
    /// Null argument matching policy
    pub null_arguments: NullArgumentPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_inheritance_depth: DEFAULT_MAX_INHERITANCE_DEPTH,
            null_arguments: NullArgumentPolicy::default(),
        }
    }
}

/// `[reflect.permissions]` section. Values are permission strings such as
/// `"PUBLIC_ONLY"` or `"READ_PUBLIC|INVOKE_PUBLIC"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PermissionsConfig {
    /// Global default
    pub global: Option<String>,
    /// Per-type overrides keyed by type name
    pub types: BTreeMap<String, String>,
    /// Types whose permissions cannot be changed after loading
    pub sealed: Vec<String>,
}

/// `[reflect]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReflectSettings {
    /// Access permissions
    pub permissions: PermissionsConfig,
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Resolution settings
    pub engine: EngineSettings,
    /// Reflection access settings
    pub reflect: ReflectSettings,
}

impl EngineConfig {
    /// Parse from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Bound on inheritance walks
    pub fn max_inheritance_depth(&self) -> usize {
        self.engine.max_inheritance_depth
    }

    /// Null argument policy
    pub fn null_arguments(&self) -> NullArgumentPolicy {
        self.engine.null_arguments
    }

    /// Permission settings
    pub fn permissions(&self) -> &PermissionsConfig {
        &self.reflect.permissions
    }
}

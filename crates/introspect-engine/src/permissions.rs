//! Reflection Access Permissions
//!
//! Before touching a member the engine tries to relax its access
//! restrictions. The [`PermissionStore`] decides whether that is allowed:
//! a per-type override wins over the global default.
//!
//! A refused relaxation is not fatal by itself. The invoker logs it and
//! carries on under normal visibility rules, which still permit public
//! members and reject non-public ones.
//!
//! Permissions are usually loaded from the `[reflect.permissions]` section
//! of the engine configuration (see [`crate::config`]).

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::config::{ConfigError, PermissionsConfig};
use crate::error::{ReflectError, ReflectResult};

/// Reflection permission flags (bitflags)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReflectionPermission(u8);

impl ReflectionPermission {
    /// No reflection allowed
    pub const NONE: Self = Self(0x00);
    /// Read public fields
    pub const READ_PUBLIC: Self = Self(0x01);
    /// Read non-public fields
    pub const READ_PRIVATE: Self = Self(0x02);
    /// Write public fields
    pub const WRITE_PUBLIC: Self = Self(0x04);
    /// Write non-public fields
    pub const WRITE_PRIVATE: Self = Self(0x08);
    /// Invoke public methods
    pub const INVOKE_PUBLIC: Self = Self(0x10);
    /// Invoke non-public methods
    pub const INVOKE_PRIVATE: Self = Self(0x20);

    // Common combinations
    /// READ_PUBLIC | READ_PRIVATE
    pub const READ_ALL: Self = Self(0x03);
    /// WRITE_PUBLIC | WRITE_PRIVATE
    pub const WRITE_ALL: Self = Self(0x0C);
    /// INVOKE_PUBLIC | INVOKE_PRIVATE
    pub const INVOKE_ALL: Self = Self(0x30);
    /// READ_PUBLIC | WRITE_PUBLIC | INVOKE_PUBLIC
    pub const PUBLIC_ONLY: Self = Self(0x15);
    /// Everything
    pub const ALL: Self = Self(0x3F);

    /// Create from raw bits
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Get raw bits
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Check if permission contains a flag
    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Union of permissions
    pub const fn union(&self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Parse a single flag name, or a hex/decimal literal
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "NONE" => Some(Self::NONE),
            "READ_PUBLIC" => Some(Self::READ_PUBLIC),
            "READ_PRIVATE" => Some(Self::READ_PRIVATE),
            "WRITE_PUBLIC" => Some(Self::WRITE_PUBLIC),
            "WRITE_PRIVATE" => Some(Self::WRITE_PRIVATE),
            "INVOKE_PUBLIC" => Some(Self::INVOKE_PUBLIC),
            "INVOKE_PRIVATE" => Some(Self::INVOKE_PRIVATE),
            "READ_ALL" => Some(Self::READ_ALL),
            "WRITE_ALL" => Some(Self::WRITE_ALL),
            "INVOKE_ALL" => Some(Self::INVOKE_ALL),
            "PUBLIC_ONLY" => Some(Self::PUBLIC_ONLY),
            "ALL" => Some(Self::ALL),
            _ => {
                if let Some(hex) = s.strip_prefix("0x") {
                    u8::from_str_radix(hex, 16).ok().map(Self::from_bits)
                } else {
                    s.parse::<u8>().ok().map(Self::from_bits)
                }
            }
        }
    }

    /// Parse combined flags from pipe-separated string (e.g., "READ_PUBLIC|WRITE_PUBLIC")
    pub fn from_combined_str(s: &str) -> Option<Self> {
        let mut result = Self::NONE;
        for part in s.split('|') {
            let perm = Self::from_name(part.trim())?;
            result = result.union(perm);
        }
        Some(result)
    }

    /// The flag required to read, write, or invoke a member
    pub fn required(action: Action, is_private: bool) -> Self {
        match (action, is_private) {
            (Action::Read, false) => Self::READ_PUBLIC,
            (Action::Read, true) => Self::READ_PRIVATE,
            (Action::Write, false) => Self::WRITE_PUBLIC,
            (Action::Write, true) => Self::WRITE_PRIVATE,
            (Action::Invoke, false) => Self::INVOKE_PUBLIC,
            (Action::Invoke, true) => Self::INVOKE_PRIVATE,
        }
    }
}

impl Default for ReflectionPermission {
    fn default() -> Self {
        Self::ALL
    }
}

impl fmt::Display for ReflectionPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NONE => write!(f, "NONE"),
            Self::READ_PUBLIC => write!(f, "READ_PUBLIC"),
            Self::READ_PRIVATE => write!(f, "READ_PRIVATE"),
            Self::WRITE_PUBLIC => write!(f, "WRITE_PUBLIC"),
            Self::WRITE_PRIVATE => write!(f, "WRITE_PRIVATE"),
            Self::INVOKE_PUBLIC => write!(f, "INVOKE_PUBLIC"),
            Self::INVOKE_PRIVATE => write!(f, "INVOKE_PRIVATE"),
            Self::READ_ALL => write!(f, "READ_ALL"),
            Self::WRITE_ALL => write!(f, "WRITE_ALL"),
            Self::INVOKE_ALL => write!(f, "INVOKE_ALL"),
            Self::PUBLIC_ONLY => write!(f, "PUBLIC_ONLY"),
            Self::ALL => write!(f, "ALL"),
            _ => write!(f, "0x{:02X}", self.0),
        }
    }
}

/// What the engine is about to do with a member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Read a field
    Read,
    /// Write a field
    Write,
    /// Invoke a method
    Invoke,
}

/// Store for reflection permissions
#[derive(Debug)]
pub struct PermissionStore {
    /// Global default permissions
    global_default: ReflectionPermission,

    /// Type-level permissions: type name -> permissions
    type_permissions: HashMap<String, ReflectionPermission>,

    /// Sealed types
    sealed_types: HashSet<String>,
}

impl Default for PermissionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionStore {
    /// Create a new permission store with default (ALL) permissions
    pub fn new() -> Self {
        Self {
            global_default: ReflectionPermission::ALL,
            type_permissions: HashMap::new(),
            sealed_types: HashSet::new(),
        }
    }

    /// Build a store from the `[reflect.permissions]` section
    pub fn from_config(config: &PermissionsConfig) -> Result<Self, ConfigError> {
        let mut store = Self::new();

        if let Some(global) = &config.global {
            store.global_default = parse_flags("global", global)?;
        }
        for (type_name, value) in &config.types {
            let perms = parse_flags(type_name, value)?;
            store.type_permissions.insert(type_name.clone(), perms);
        }
        for type_name in &config.sealed {
            store.seal_type(type_name);
        }

        Ok(store)
    }

    // ===== Type Permissions =====

    /// Set type-level permissions
    pub fn set_type(&mut self, type_name: &str, permissions: ReflectionPermission) -> ReflectResult<()> {
        if self.sealed_types.contains(type_name) {
            return Err(ReflectError::InvalidArgument(format!(
                "Cannot modify sealed permissions of {}",
                type_name
            )));
        }
        self.type_permissions.insert(type_name.to_string(), permissions);
        Ok(())
    }

    /// Get type-level permissions (not resolved)
    pub fn get_type(&self, type_name: &str) -> Option<ReflectionPermission> {
        self.type_permissions.get(type_name).copied()
    }

    /// Seal type permissions
    pub fn seal_type(&mut self, type_name: &str) {
        self.sealed_types.insert(type_name.to_string());
    }

    // ===== Permission Resolution =====

    /// Resolve permissions for a type, falling back to the global default
    pub fn resolve(&self, type_name: &str) -> ReflectionPermission {
        self.get_type(type_name).unwrap_or(self.global_default)
    }

    /// Check if a specific permission is allowed
    pub fn check_permission(&self, type_name: &str, required: ReflectionPermission) -> bool {
        self.resolve(type_name).contains(required)
    }

    fn check(&self, type_name: &str, action: Action, is_private: bool) -> ReflectResult<()> {
        let required = ReflectionPermission::required(action, is_private);
        if !self.check_permission(type_name, required) {
            return Err(ReflectError::AccessDenied {
                type_name: type_name.to_string(),
                permission: required,
            });
        }
        Ok(())
    }
}

fn parse_flags(key: &str, value: &str) -> Result<ReflectionPermission, ConfigError> {
    ReflectionPermission::from_combined_str(value).ok_or_else(|| ConfigError::InvalidPermission {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Check field read permission
pub fn check_field_read(store: &PermissionStore, type_name: &str, is_private: bool) -> ReflectResult<()> {
    store.check(type_name, Action::Read, is_private)
}

/// Check field write permission
pub fn check_field_write(store: &PermissionStore, type_name: &str, is_private: bool) -> ReflectResult<()> {
    store.check(type_name, Action::Write, is_private)
}

/// Check method invocation permission
pub fn check_invoke(store: &PermissionStore, type_name: &str, is_private: bool) -> ReflectResult<()> {
    store.check(type_name, Action::Invoke, is_private)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn store_with_global(global: ReflectionPermission) -> PermissionStore {
        PermissionStore {
            global_default: global,
            ..PermissionStore::new()
        }
    }

    #[test]
    fn test_permission_flags() {
        assert_eq!(ReflectionPermission::NONE.bits(), 0x00);
        assert_eq!(ReflectionPermission::ALL.bits(), 0x3F);
        assert_eq!(ReflectionPermission::READ_ALL.bits(), 0x03);
    }

    #[test]
    fn test_permission_contains() {
        assert!(ReflectionPermission::ALL.contains(ReflectionPermission::INVOKE_PRIVATE));
        assert!(!ReflectionPermission::PUBLIC_ONLY.contains(ReflectionPermission::READ_PRIVATE));
        assert!(ReflectionPermission::PUBLIC_ONLY.contains(ReflectionPermission::INVOKE_PUBLIC));
    }

    #[test]
    fn test_permission_parsing() {
        assert_eq!(ReflectionPermission::from_name("all"), Some(ReflectionPermission::ALL));
        assert_eq!(ReflectionPermission::from_name("0x3F"), Some(ReflectionPermission::ALL));
        assert_eq!(ReflectionPermission::from_name("16"), Some(ReflectionPermission::INVOKE_PUBLIC));
        assert_eq!(ReflectionPermission::from_name("bogus"), None);

        let perms = ReflectionPermission::from_combined_str("READ_PUBLIC | INVOKE_PUBLIC").unwrap();
        assert_eq!(perms.bits(), 0x11);
        assert_eq!(perms.to_string(), "0x11");
    }

    #[test]
    fn test_type_resolution() {
        let mut store = store_with_global(ReflectionPermission::PUBLIC_ONLY);
        store.set_type("Animal", ReflectionPermission::ALL).unwrap();

        assert_eq!(store.resolve("Animal"), ReflectionPermission::ALL);
        assert_eq!(store.resolve("Dog"), ReflectionPermission::PUBLIC_ONLY);
        assert!(store.check_permission("Animal", ReflectionPermission::INVOKE_PRIVATE));
        assert!(!store.check_permission("Dog", ReflectionPermission::INVOKE_PRIVATE));
    }

    #[test]
    fn test_sealed_types() {
        let mut store = PermissionStore::new();
        store.set_type("Vault", ReflectionPermission::NONE).unwrap();
        store.seal_type("Vault");

        assert!(store.set_type("Vault", ReflectionPermission::ALL).is_err());
        assert_eq!(store.get_type("Vault"), Some(ReflectionPermission::NONE));
    }

    #[test]
    fn test_check_helpers() {
        let store = store_with_global(ReflectionPermission::PUBLIC_ONLY);

        assert!(check_field_read(&store, "Animal", false).is_ok());
        assert!(check_field_read(&store, "Animal", true).is_err());
        assert!(check_field_write(&store, "Animal", false).is_ok());
        assert!(check_field_write(&store, "Animal", true).is_err());
        assert!(check_invoke(&store, "Animal", false).is_ok());

        let err = check_invoke(&store, "Animal", true).unwrap_err();
        assert_eq!(
            err,
            ReflectError::AccessDenied {
                type_name: "Animal".to_string(),
                permission: ReflectionPermission::INVOKE_PRIVATE,
            }
        );
    }

    #[test]
    fn test_from_config() {
        let config = EngineConfig::from_toml_str(
            r#"
[reflect.permissions]
global = "PUBLIC_ONLY"
sealed = ["Vault"]

[reflect.permissions.types]
"Vault" = "NONE"
"Animal" = "READ_PUBLIC|INVOKE_ALL"
"#,
        )
        .unwrap();

        let mut store = PermissionStore::from_config(config.permissions()).unwrap();
        assert_eq!(store.resolve("Dog"), ReflectionPermission::PUBLIC_ONLY);
        assert_eq!(store.resolve("Animal").bits(), 0x31);
        assert_eq!(store.resolve("Vault"), ReflectionPermission::NONE);
        assert!(store.set_type("Vault", ReflectionPermission::ALL).is_err());
    }

    #[test]
    fn test_from_config_rejects_bad_flags() {
        let config = EngineConfig::from_toml_str("[reflect.permissions]\nglobal = \"SOMETIMES\"\n").unwrap();
        let err = PermissionStore::from_config(config.permissions()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPermission { ref key, .. } if key == "global"));
    }
}

//! Reflection Engine
//!
//! [`Reflector`] answers introspection queries against a [`TypeSystem`]:
//!
//! - **resolver**: Member lookup by name and argument compatibility
//! - **invoker**: Invocation with access relaxation and fault capture
//! - **metadata**: Tag values on types, fields and methods
//! - **generics**: Type arguments a subtype binds onto a generic ancestor
//! - **property**: Field access with `getX`/`setX` fallback
//!
//! Nothing is cached: every query is answered from the live type system.
//!
//! ## Failure reporting
//!
//! Lookups that can fail for a structural reason return [`ReflectResult`].
//! Best-effort entry points (`invoke`, the tag value readers, property
//! access) report faults through the [`ReflectLog`] and yield `None` or a
//! default instead.
//!
//! [`ReflectResult`]: crate::error::ReflectResult

mod generics;
mod invoker;
mod metadata;
mod property;
mod resolver;

pub use generics::ResolvedType;
pub use metadata::TagFilter;

use std::sync::Arc;

use crate::access::TypeSystem;
use crate::config::{ConfigError, EngineConfig};
use crate::log::{ReflectLog, TracingLog};
use crate::permissions::PermissionStore;
use crate::types::TypeId;
use crate::value::Value;

/// Introspection engine over a shared type system
#[derive(Clone)]
pub struct Reflector {
    types: Arc<dyn TypeSystem>,
    log: Arc<dyn ReflectLog>,
    permissions: Arc<PermissionStore>,
    config: EngineConfig,
}

impl Reflector {
    /// Create an engine with default configuration, logging to `tracing`
    pub fn new(types: Arc<dyn TypeSystem>) -> Self {
        Self {
            types,
            log: Arc::new(TracingLog),
            permissions: Arc::new(PermissionStore::new()),
            config: EngineConfig::default(),
        }
    }

    /// Create an engine from configuration; permissions are loaded from the
    /// `[reflect.permissions]` section
    pub fn with_config(types: Arc<dyn TypeSystem>, config: EngineConfig) -> Result<Self, ConfigError> {
        let permissions = PermissionStore::from_config(config.permissions())?;
        Ok(Self {
            permissions: Arc::new(permissions),
            config,
            ..Self::new(types)
        })
    }

    /// Replace the log collaborator
    pub fn with_log(mut self, log: Arc<dyn ReflectLog>) -> Self {
        self.log = log;
        self
    }

    /// Replace the permission store
    pub fn with_permissions(mut self, permissions: PermissionStore) -> Self {
        self.permissions = Arc::new(permissions);
        self
    }

    /// The type system being queried
    pub fn types(&self) -> &dyn TypeSystem {
        self.types.as_ref()
    }

    /// The log collaborator
    pub fn log(&self) -> &dyn ReflectLog {
        self.log.as_ref()
    }

    /// The permission store
    pub fn permissions(&self) -> &PermissionStore {
        &self.permissions
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Type whose members a receiver exposes. A `Value::Type` stands for
    /// the type itself; null has none.
    pub(crate) fn lookup_type(&self, receiver: &Value) -> Option<TypeId> {
        match receiver {
            Value::Type(ty) => Some(*ty),
            other => self.types.runtime_type_of(other),
        }
    }

    /// Log origin for events concerning a receiver
    pub(crate) fn origin_of(&self, receiver: &Value) -> String {
        match self.lookup_type(receiver) {
            Some(ty) => self.types.type_name(ty),
            None => "null".to_string(),
        }
    }
}

impl std::fmt::Debug for Reflector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reflector")
            .field("types", &self.types.type_count())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

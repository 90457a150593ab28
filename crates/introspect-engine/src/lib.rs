//! Introspect Engine
//!
//! Reflective type introspection over a runtime type registry:
//!
//! - **types**: Type descriptors, tags, and the [`TypeRegistry`] a host builds at startup
//! - **access**: The [`TypeSystem`] capability the engine queries
//! - **reflect**: Member resolution, invocation, metadata extraction,
//!   generic-argument resolution, and property access on a [`Reflector`]
//! - **permissions**: Access relaxation rules for non-public members
//! - **log**: The injectable logging collaborator
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut registry = TypeRegistry::new();
//! let animal = registry.register(
//!     ClassBuilder::new("Animal")
//!         .field(FieldDefinition::new("name", builtin::STRING))
//!         .method(MethodDefinition::native("speak", vec![], |_, _| Ok(Value::from("..."))))
//! )?;
//!
//! let rex = registry.instantiate(animal)?;
//! let reflector = Reflector::new(Arc::new(registry));
//! reflector.set_field_value(&rex, "name", Value::from("Rex"));
//! assert_eq!(reflector.get_field_value(&rex, "name"), Some(Value::from("Rex")));
//! ```

pub mod access;
pub mod config;
pub mod error;
pub mod log;
pub mod object;
pub mod permissions;
pub mod reflect;
pub mod types;
pub mod value;

pub use access::TypeSystem;
pub use config::{ConfigError, EngineConfig, NullArgumentPolicy};
pub use error::{Fault, ReflectError, ReflectResult};
pub use log::{LogRecord, MemoryLog, ReflectLog, Severity, TracingLog};
pub use object::{Object, ObjectRef};
pub use permissions::{PermissionStore, ReflectionPermission};
pub use reflect::{ResolvedType, Reflector, TagFilter};
pub use types::{
    builtin, ClassBuilder, FieldDefinition, FieldDescriptor, GenericRef, MethodDefinition,
    MethodDescriptor, Tag, TagAttribute, TypeArg, TypeDescriptor, TypeId, TypeKind, TypeRegistry,
    TypeVar, Visibility,
};
pub use value::{compare_stringified, Value};

//! Runtime Type Descriptors
//!
//! The host describes its types once at startup through a [`TypeRegistry`].
//! After that the registry is read-only and shared with the engine.
//!
//! ## Generic references
//!
//! Superclass and interface references keep their type arguments:
//!
//! ```text
//! class Container<T>
//! class Box<T> extends Container<T>     superclass = Parameterized(Container, [Var(Box.0)])
//! class StringBox extends Box<string>   superclass = Parameterized(Box, [Raw(string)])
//! ```
//!
//! A [`TypeVar`] identifies a declared type parameter by its owning type and
//! position, so `Box.T` and `Container.T` are distinct even though both are
//! spelled `T`.

mod builder;
mod registry;
mod tag;

pub use builder::{ClassBuilder, FieldDefinition, MethodDefinition, TypeArg};
pub use registry::{builtin, TypeRegistry};
pub use tag::{AttributeFn, Tag, TagAttribute};

use std::fmt;
use std::sync::Arc;

use crate::error::Fault;
use crate::value::Value;

/// Unique identifier for a registered type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    /// Position of the type in its registry
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Type kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Instantiable class
    Class,
    /// Interface (no instance state)
    Interface,
    /// Value type (bool, int, float)
    Primitive,
    /// Array of a component type
    Array {
        /// Element type
        component: TypeId,
    },
}

/// Member visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Visible everywhere, inherited
    #[default]
    Public,
    /// Visible to subclasses
    Protected,
    /// Visible to the declaring type only
    Private,
}

impl Visibility {
    /// Check for public visibility
    pub fn is_public(self) -> bool {
        self == Visibility::Public
    }
}

/// Identity of a declared type parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeVar {
    /// Generic type declaring the parameter
    pub owner: TypeId,
    /// Position in the owner's parameter list
    pub index: usize,
}

/// A possibly-parameterized reference to a type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GenericRef {
    /// Plain reference with no type arguments
    Raw(TypeId),
    /// Generic type applied to arguments
    Parameterized {
        /// The generic type
        raw: TypeId,
        /// Actual type arguments, in the generic type's parameter order
        args: Vec<GenericRef>,
    },
    /// A type parameter
    Var(TypeVar),
    /// Array whose component is itself generic
    Array(Box<GenericRef>),
}

impl GenericRef {
    /// The referenced type for raw and parameterized references
    pub fn raw_type(&self) -> Option<TypeId> {
        match self {
            GenericRef::Raw(id) => Some(*id),
            GenericRef::Parameterized { raw, .. } => Some(*raw),
            GenericRef::Var(_) | GenericRef::Array(_) => None,
        }
    }
}

/// Native implementation of a method: `(receiver, args) -> result`
pub type NativeFn = Arc<dyn Fn(&Value, &[Value]) -> Result<Value, Fault> + Send + Sync>;

/// A declared field
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name
    pub name: String,
    /// Declared type
    pub ty: TypeId,
    /// Declaring type
    pub declaring: TypeId,
    /// Visibility
    pub visibility: Visibility,
    /// Slot in instance storage
    pub slot: usize,
    /// Attached tags (at most one per kind)
    pub tags: Vec<Tag>,
}

impl FieldDescriptor {
    /// Find the tag of the given kind
    pub fn tag(&self, kind: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.kind() == kind)
    }
}

/// A declared method
#[derive(Clone)]
pub struct MethodDescriptor {
    /// Method name
    pub name: String,
    /// Parameter types, in order
    pub params: Vec<TypeId>,
    /// Declaring type
    pub declaring: TypeId,
    /// Visibility
    pub visibility: Visibility,
    /// Attached tags (at most one per kind)
    pub tags: Vec<Tag>,
    /// Implementation; `None` for abstract methods
    pub body: Option<NativeFn>,
}

impl MethodDescriptor {
    /// Find the tag of the given kind
    pub fn tag(&self, kind: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.kind() == kind)
    }

    /// Check if the method has no implementation
    pub fn is_abstract(&self) -> bool {
        self.body.is_none()
    }

    /// Same name and parameter types
    pub fn same_signature(&self, other: &MethodDescriptor) -> bool {
        self.name == other.name && self.params == other.params
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("declaring", &self.declaring)
            .field("visibility", &self.visibility)
            .field("tags", &self.tags)
            .field("abstract", &self.is_abstract())
            .finish()
    }
}

/// A registered type
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    /// Type id
    pub id: TypeId,
    /// Type name (unique within the registry)
    pub name: String,
    /// Kind
    pub kind: TypeKind,
    /// Declared type parameter names
    pub type_params: Vec<String>,
    /// Generic superclass reference (None for roots, primitives and interfaces)
    pub superclass: Option<GenericRef>,
    /// Implemented (or, for interfaces, extended) interfaces
    pub interfaces: Vec<GenericRef>,
    /// Declared fields
    pub fields: Vec<FieldDescriptor>,
    /// Declared methods
    pub methods: Vec<MethodDescriptor>,
    /// Attached tags (at most one per kind)
    pub tags: Vec<Tag>,
    /// Instance slots, including inherited ones
    pub slot_count: usize,
}

impl TypeDescriptor {
    /// Find the tag of the given kind
    pub fn tag(&self, kind: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.kind() == kind)
    }

    /// Check if this is a primitive type
    pub fn is_primitive(&self) -> bool {
        self.kind == TypeKind::Primitive
    }

    /// Identities of the declared type parameters, in order
    pub fn type_vars(&self) -> Vec<TypeVar> {
        (0..self.type_params.len())
            .map(|index| TypeVar { owner: self.id, index })
            .collect()
    }

    /// Raw superclass id
    pub fn superclass_id(&self) -> Option<TypeId> {
        self.superclass.as_ref().and_then(GenericRef::raw_type)
    }

    /// Find a declared field
    pub fn declared_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

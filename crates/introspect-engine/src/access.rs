//! Type System Access
//!
//! The engine never walks registry internals directly. Every query goes
//! through [`TypeSystem`], so a host with its own notion of types only has to
//! implement this trait. [`TypeRegistry`] is the stock implementation.

use parking_lot::MutexGuard;

use crate::error::ReflectResult;
use crate::types::{
    FieldDescriptor, GenericRef, MethodDescriptor, TypeDescriptor, TypeId, TypeRegistry, TypeVar,
};
use crate::value::Value;

/// Capabilities the engine needs from a live type system
pub trait TypeSystem: Send + Sync {
    /// Look up a type descriptor
    fn descriptor(&self, ty: TypeId) -> Option<&TypeDescriptor>;

    /// Look up a type by name
    fn type_by_name(&self, name: &str) -> Option<TypeId>;

    /// Runtime type of a value; `None` for null
    fn runtime_type_of(&self, value: &Value) -> Option<TypeId>;

    /// Public members reachable through inheritance, in enumeration order
    fn public_methods(&self, ty: TypeId) -> Vec<&MethodDescriptor>;

    /// Members declared directly on the type, any visibility
    fn declared_methods(&self, ty: TypeId) -> &[MethodDescriptor];

    /// Public fields reachable through inheritance, own first
    fn public_fields(&self, ty: TypeId) -> Vec<&FieldDescriptor>;

    /// Fields declared directly on the type, any visibility
    fn declared_fields(&self, ty: TypeId) -> &[FieldDescriptor];

    /// Check whether a value of type `from` may be used where `to` is declared
    fn is_assignable(&self, from: TypeId, to: TypeId) -> bool;

    /// Read a field of an instance
    fn read_field(&self, instance: &Value, field: &FieldDescriptor) -> ReflectResult<Value>;

    /// Write a field of an instance; the value must fit the field type
    fn write_field(&self, instance: &Value, field: &FieldDescriptor, value: Value) -> ReflectResult<()>;

    /// Generic superclass reference of a type
    fn generic_superclass(&self, ty: TypeId) -> Option<&GenericRef>;

    /// Generic references to the interfaces a type implements (or, for an
    /// interface, extends)
    fn generic_interfaces(&self, ty: TypeId) -> &[GenericRef];

    /// Declared type parameters of a type, in order
    fn type_parameters(&self, ty: TypeId) -> Vec<TypeVar>;

    /// Registered array type with the given component
    fn array_type_of(&self, component: TypeId) -> Option<TypeId>;

    /// Acquire the per-type enumeration lock
    fn enumeration_lock(&self, ty: TypeId) -> Option<MutexGuard<'_, ()>>;

    /// Number of known types
    fn type_count(&self) -> usize;

    /// Name of a type, or its id when unknown
    fn type_name(&self, ty: TypeId) -> String {
        self.descriptor(ty)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| ty.to_string())
    }
}

impl TypeSystem for TypeRegistry {
    fn descriptor(&self, ty: TypeId) -> Option<&TypeDescriptor> {
        self.get(ty)
    }

    fn type_by_name(&self, name: &str) -> Option<TypeId> {
        TypeRegistry::type_by_name(self, name)
    }

    fn runtime_type_of(&self, value: &Value) -> Option<TypeId> {
        self.runtime_type(value)
    }

    fn public_methods(&self, ty: TypeId) -> Vec<&MethodDescriptor> {
        TypeRegistry::public_methods(self, ty)
    }

    fn declared_methods(&self, ty: TypeId) -> &[MethodDescriptor] {
        self.get(ty).map(|d| d.methods.as_slice()).unwrap_or(&[])
    }

    fn public_fields(&self, ty: TypeId) -> Vec<&FieldDescriptor> {
        TypeRegistry::public_fields(self, ty)
    }

    fn declared_fields(&self, ty: TypeId) -> &[FieldDescriptor] {
        self.get(ty).map(|d| d.fields.as_slice()).unwrap_or(&[])
    }

    fn is_assignable(&self, from: TypeId, to: TypeId) -> bool {
        TypeRegistry::is_assignable(self, from, to)
    }

    fn read_field(&self, instance: &Value, field: &FieldDescriptor) -> ReflectResult<Value> {
        TypeRegistry::read_field(self, instance, field)
    }

    fn write_field(&self, instance: &Value, field: &FieldDescriptor, value: Value) -> ReflectResult<()> {
        TypeRegistry::write_field(self, instance, field, value)
    }

    fn generic_superclass(&self, ty: TypeId) -> Option<&GenericRef> {
        self.get(ty).and_then(|d| d.superclass.as_ref())
    }

    fn generic_interfaces(&self, ty: TypeId) -> &[GenericRef] {
        self.get(ty).map(|d| d.interfaces.as_slice()).unwrap_or(&[])
    }

    fn type_parameters(&self, ty: TypeId) -> Vec<TypeVar> {
        self.get(ty).map(TypeDescriptor::type_vars).unwrap_or_default()
    }

    fn array_type_of(&self, component: TypeId) -> Option<TypeId> {
        self.array_type(component)
    }

    fn enumeration_lock(&self, ty: TypeId) -> Option<MutexGuard<'_, ()>> {
        self.lock(ty).map(|lock| lock.lock())
    }

    fn type_count(&self) -> usize {
        self.len()
    }
}

//! Type registry for managing runtime type descriptors

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use super::{ClassBuilder, FieldDescriptor, GenericRef, MethodDescriptor, TypeDescriptor, TypeId, TypeKind};
use crate::error::{ReflectError, ReflectResult};
use crate::object::Object;
use crate::value::Value;

/// Types present in every registry
pub mod builtin {
    use super::TypeId;

    /// Root of the class hierarchy
    pub const OBJECT: TypeId = TypeId(0);
    /// Boolean primitive
    pub const BOOL: TypeId = TypeId(1);
    /// 64-bit integer primitive
    pub const INT: TypeId = TypeId(2);
    /// 64-bit float primitive
    pub const FLOAT: TypeId = TypeId(3);
    /// Immutable string
    pub const STRING: TypeId = TypeId(4);
    /// Type handle
    pub const TYPE: TypeId = TypeId(5);
}

/// Registry of every type known to the host
#[derive(Debug)]
pub struct TypeRegistry {
    /// Types indexed by ID
    types: Vec<TypeDescriptor>,
    /// Per-type enumeration locks, parallel to `types`
    locks: Vec<Mutex<()>>,
    /// Type name to ID mapping
    name_to_id: FxHashMap<String, TypeId>,
    /// Component to array type mapping
    arrays: FxHashMap<TypeId, TypeId>,
}

impl TypeRegistry {
    /// Create a registry holding only the builtin types
    pub fn new() -> Self {
        let mut registry = Self {
            types: Vec::new(),
            locks: Vec::new(),
            name_to_id: FxHashMap::default(),
            arrays: FxHashMap::default(),
        };

        registry.insert_builtin("object", TypeKind::Class, None);
        registry.insert_builtin("bool", TypeKind::Primitive, None);
        registry.insert_builtin("int", TypeKind::Primitive, None);
        registry.insert_builtin("float", TypeKind::Primitive, None);
        registry.insert_builtin("string", TypeKind::Class, Some(builtin::OBJECT));
        registry.insert_builtin("type", TypeKind::Class, Some(builtin::OBJECT));
        registry
    }

    fn insert_builtin(&mut self, name: &str, kind: TypeKind, superclass: Option<TypeId>) {
        let id = self.next_type_id();
        self.insert(TypeDescriptor {
            id,
            name: name.to_string(),
            kind,
            type_params: Vec::new(),
            superclass: superclass.map(GenericRef::Raw),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            tags: Vec::new(),
            slot_count: 0,
        });
    }

    fn insert(&mut self, descriptor: TypeDescriptor) -> TypeId {
        let id = descriptor.id;
        self.name_to_id.insert(descriptor.name.clone(), id);
        self.types.push(descriptor);
        self.locks.push(Mutex::new(()));
        id
    }

    /// Register a class or interface
    pub fn register(&mut self, builder: ClassBuilder) -> ReflectResult<TypeId> {
        let id = self.next_type_id();
        let descriptor = builder.build(id, self)?;
        debug!(
            name = %descriptor.name,
            id = id.0,
            fields = descriptor.fields.len(),
            methods = descriptor.methods.len(),
            "registered type"
        );
        Ok(self.insert(descriptor))
    }

    /// Get (registering on first use) the array type of `component`
    pub fn array_of(&mut self, component: TypeId) -> ReflectResult<TypeId> {
        if let Some(id) = self.arrays.get(&component) {
            return Ok(*id);
        }
        let name = format!("{}[]", self.get(component).ok_or(ReflectError::UnknownType(component))?.name);
        let id = self.next_type_id();
        self.insert(TypeDescriptor {
            id,
            name,
            kind: TypeKind::Array { component },
            type_params: Vec::new(),
            superclass: Some(GenericRef::Raw(builtin::OBJECT)),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            tags: Vec::new(),
            slot_count: 0,
        });
        self.arrays.insert(component, id);
        Ok(id)
    }

    /// Array type of `component`, if one was registered
    pub fn array_type(&self, component: TypeId) -> Option<TypeId> {
        self.arrays.get(&component).copied()
    }

    /// Get next available type ID
    pub fn next_type_id(&self) -> TypeId {
        TypeId(self.types.len() as u32)
    }

    /// Get type by ID
    pub fn get(&self, id: TypeId) -> Option<&TypeDescriptor> {
        self.types.get(id.index())
    }

    /// Get type ID by name
    pub fn type_by_name(&self, name: &str) -> Option<TypeId> {
        self.name_to_id.get(name).copied()
    }

    /// Number of registered types, builtins included
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the registry holds no types
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate over all types
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.iter()
    }

    /// Create an instance of a class, with primitive fields zeroed
    pub fn instantiate(&self, ty: TypeId) -> ReflectResult<Value> {
        let descriptor = self.get(ty).ok_or(ReflectError::UnknownType(ty))?;
        if descriptor.kind != TypeKind::Class || ty == builtin::STRING || ty == builtin::TYPE {
            return Err(ReflectError::InvalidArgument(format!(
                "{} cannot be instantiated",
                descriptor.name
            )));
        }

        let object = Object::new(ty, descriptor.slot_count);
        for class in self.hierarchy(ty) {
            let Some(class) = self.get(class) else { continue };
            for field in &class.fields {
                if let Some(zero) = zero_value(field.ty) {
                    object.set(field.slot, zero);
                }
            }
        }
        Ok(Value::Object(Arc::new(object)))
    }

    /// The type followed by its superclass chain, up to the root
    pub fn hierarchy(&self, ty: TypeId) -> Vec<TypeId> {
        let mut chain = Vec::new();
        let mut current = self.get(ty).map(|d| d.id);
        while let Some(id) = current {
            if chain.len() > self.types.len() {
                break;
            }
            chain.push(id);
            current = self.get(id).and_then(TypeDescriptor::superclass_id);
        }
        chain
    }

    /// Raw supertypes of a type: its superclass then its interfaces
    fn supertypes(&self, ty: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        self.get(ty).into_iter().flat_map(|d| {
            d.superclass
                .iter()
                .chain(d.interfaces.iter())
                .filter_map(GenericRef::raw_type)
        })
    }

    /// Public methods of a type, own first, then inherited along the
    /// superclass chain, then interface members. Methods overridden by an
    /// identical signature earlier in the order are skipped.
    pub fn public_methods(&self, ty: TypeId) -> Vec<&MethodDescriptor> {
        let mut result: Vec<&MethodDescriptor> = Vec::new();

        let chain = self.hierarchy(ty);
        for class in &chain {
            if let Some(descriptor) = self.get(*class) {
                collect_public(descriptor, &mut result);
            }
        }

        let mut visited: FxHashSet<TypeId> = chain.iter().copied().collect();
        let mut queue: VecDeque<TypeId> = chain
            .iter()
            .filter_map(|c| self.get(*c))
            .flat_map(|d| d.interfaces.iter().filter_map(GenericRef::raw_type))
            .collect();
        while let Some(interface) = queue.pop_front() {
            if !visited.insert(interface) {
                continue;
            }
            if let Some(descriptor) = self.get(interface) {
                collect_public(descriptor, &mut result);
                queue.extend(descriptor.interfaces.iter().filter_map(GenericRef::raw_type));
            }
        }
        result
    }

    /// Public fields of a type, own first, then inherited
    pub fn public_fields(&self, ty: TypeId) -> Vec<&FieldDescriptor> {
        self.hierarchy(ty)
            .into_iter()
            .filter_map(|class| self.get(class))
            .flat_map(|d| d.fields.iter().filter(|f| f.visibility.is_public()))
            .collect()
    }

    /// Check whether a value of type `from` may be used where `to` is declared
    pub fn is_assignable(&self, from: TypeId, to: TypeId) -> bool {
        if from == to {
            return true;
        }
        let (Some(source), Some(target)) = (self.get(from), self.get(to)) else {
            return false;
        };
        if to == builtin::OBJECT {
            return true;
        }
        if source.is_primitive() || target.is_primitive() {
            return false;
        }
        if let (TypeKind::Array { component: a }, TypeKind::Array { component: b }) = (source.kind, target.kind) {
            let primitive = |c: TypeId| self.get(c).is_some_and(TypeDescriptor::is_primitive);
            if primitive(a) || primitive(b) {
                return a == b;
            }
            return self.is_assignable(a, b);
        }

        let mut visited = FxHashSet::default();
        let mut queue: VecDeque<TypeId> = self.supertypes(from).collect();
        while let Some(current) = queue.pop_front() {
            if current == to {
                return true;
            }
            if visited.insert(current) {
                queue.extend(self.supertypes(current));
            }
        }
        false
    }

    /// Runtime type of a value; `None` for null
    pub fn runtime_type(&self, value: &Value) -> Option<TypeId> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(builtin::BOOL),
            Value::Int(_) => Some(builtin::INT),
            Value::Float(_) => Some(builtin::FLOAT),
            Value::Str(_) => Some(builtin::STRING),
            Value::Object(obj) => Some(obj.class()),
            Value::Type(_) => Some(builtin::TYPE),
        }
    }

    /// Check whether `value` can be stored where `ty` is declared
    pub fn accepts(&self, ty: TypeId, value: &Value) -> bool {
        match self.runtime_type(value) {
            Some(actual) => self.is_assignable(actual, ty),
            None => self.get(ty).is_some_and(|d| !d.is_primitive()),
        }
    }

    /// Read a field from an instance of its declaring type (or a subtype)
    pub fn read_field(&self, instance: &Value, field: &FieldDescriptor) -> ReflectResult<Value> {
        let object = self.instance_of(instance, field)?;
        object.get(field.slot).ok_or_else(|| missing_slot(field))
    }

    /// Write a field on an instance of its declaring type (or a subtype)
    pub fn write_field(&self, instance: &Value, field: &FieldDescriptor, value: Value) -> ReflectResult<()> {
        let object = self.instance_of(instance, field)?;
        if !self.accepts(field.ty, &value) {
            return Err(ReflectError::InvalidArgument(format!(
                "field {} cannot hold {}",
                field.name, value
            )));
        }
        if object.set(field.slot, value) {
            Ok(())
        } else {
            Err(missing_slot(field))
        }
    }

    fn instance_of<'v>(&self, instance: &'v Value, field: &FieldDescriptor) -> ReflectResult<&'v Object> {
        match instance {
            Value::Object(obj) if self.is_assignable(obj.class(), field.declaring) => Ok(obj.as_ref()),
            _ => Err(ReflectError::InvalidArgument(format!(
                "{} is not an instance declaring field {}",
                instance, field.name
            ))),
        }
    }

    /// Enumeration lock of a type
    pub fn lock(&self, ty: TypeId) -> Option<&Mutex<()>> {
        self.locks.get(ty.index())
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_public<'a>(descriptor: &'a TypeDescriptor, result: &mut Vec<&'a MethodDescriptor>) {
    for method in descriptor.methods.iter().filter(|m| m.visibility.is_public()) {
        if !result.iter().any(|m| m.same_signature(method)) {
            result.push(method);
        }
    }
}

fn zero_value(ty: TypeId) -> Option<Value> {
    match ty {
        builtin::BOOL => Some(Value::Bool(false)),
        builtin::INT => Some(Value::Int(0)),
        builtin::FLOAT => Some(Value::Float(0.0)),
        _ => None,
    }
}

fn missing_slot(field: &FieldDescriptor) -> ReflectError {
    ReflectError::InvalidArgument(format!("instance has no slot {} for field {}", field.slot, field.name))
}

//! Type Builder
//!
//! Declarative definitions the host hands to [`TypeRegistry::register`].
//! The registry validates a definition and lays out its instance slots.
//!
//! [`TypeRegistry::register`]: super::TypeRegistry::register

use std::sync::Arc;

use rustc_hash::FxHashSet;

use super::{
    FieldDescriptor, GenericRef, MethodDescriptor, NativeFn, Tag, TypeDescriptor, TypeId, TypeKind,
    TypeRegistry, TypeVar, Visibility,
};
use crate::error::{Fault, ReflectError, ReflectResult};
use crate::value::Value;

/// A type argument as written in a definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArg {
    /// A concrete type
    Type(TypeId),
    /// One of the defining type's own parameters, by name
    Param(String),
    /// A generic type applied to arguments
    Generic(TypeId, Vec<TypeArg>),
    /// Array of the inner argument
    Array(Box<TypeArg>),
}

impl TypeArg {
    /// Reference a type parameter of the type being defined
    pub fn param(name: impl Into<String>) -> Self {
        TypeArg::Param(name.into())
    }

    /// Apply a generic type to arguments
    pub fn generic(raw: TypeId, args: Vec<TypeArg>) -> Self {
        TypeArg::Generic(raw, args)
    }

    /// Array of the given argument
    pub fn array(component: TypeArg) -> Self {
        TypeArg::Array(Box::new(component))
    }
}

impl From<TypeId> for TypeArg {
    fn from(id: TypeId) -> Self {
        TypeArg::Type(id)
    }
}

/// Definition for a field
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    /// Field name
    pub name: String,
    /// Declared type
    pub ty: TypeId,
    /// Visibility
    pub visibility: Visibility,
    /// Attached tags
    pub tags: Vec<Tag>,
}

impl FieldDefinition {
    /// Create a public field definition
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
            visibility: Visibility::Public,
            tags: Vec::new(),
        }
    }

    /// Mark as private
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    /// Mark as protected
    pub fn protected(mut self) -> Self {
        self.visibility = Visibility::Protected;
        self
    }

    /// Attach a tag
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }
}

/// Definition for a method
#[derive(Clone)]
pub struct MethodDefinition {
    /// Method name
    pub name: String,
    /// Parameter types
    pub params: Vec<TypeId>,
    /// Visibility
    pub visibility: Visibility,
    /// Attached tags
    pub tags: Vec<Tag>,
    /// Implementation
    pub body: Option<NativeFn>,
}

impl MethodDefinition {
    /// Create a public abstract method definition
    pub fn new(name: impl Into<String>, params: Vec<TypeId>) -> Self {
        Self {
            name: name.into(),
            params,
            visibility: Visibility::Public,
            tags: Vec::new(),
            body: None,
        }
    }

    /// Create a public method implemented by a native closure
    pub fn native<F>(name: impl Into<String>, params: Vec<TypeId>, body: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, Fault> + Send + Sync + 'static,
    {
        Self::new(name, params).body(body)
    }

    /// Set the implementation
    pub fn body<F>(mut self, body: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, Fault> + Send + Sync + 'static,
    {
        self.body = Some(Arc::new(body));
        self
    }

    /// Mark as private
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    /// Mark as protected
    pub fn protected(mut self) -> Self {
        self.visibility = Visibility::Protected;
        self
    }

    /// Attach a tag
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }
}

/// Definition of a class or interface
#[derive(Clone)]
pub struct ClassBuilder {
    name: String,
    kind: TypeKind,
    type_params: Vec<String>,
    superclass: Option<TypeArg>,
    interfaces: Vec<TypeArg>,
    fields: Vec<FieldDefinition>,
    methods: Vec<MethodDefinition>,
    tags: Vec<Tag>,
}

impl ClassBuilder {
    /// Start a class definition
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Class,
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Start an interface definition
    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::Interface,
            ..Self::new(name)
        }
    }

    /// Declare a type parameter
    pub fn type_param(mut self, name: impl Into<String>) -> Self {
        self.type_params.push(name.into());
        self
    }

    /// Extend a class through a raw reference
    pub fn extends(mut self, superclass: TypeId) -> Self {
        self.superclass = Some(TypeArg::Type(superclass));
        self
    }

    /// Extend a generic class with type arguments
    pub fn extends_generic(mut self, superclass: TypeId, args: Vec<TypeArg>) -> Self {
        self.superclass = Some(TypeArg::Generic(superclass, args));
        self
    }

    /// Implement an interface through a raw reference
    pub fn implements(mut self, interface: TypeId) -> Self {
        self.interfaces.push(TypeArg::Type(interface));
        self
    }

    /// Implement a generic interface with type arguments
    pub fn implements_generic(mut self, interface: TypeId, args: Vec<TypeArg>) -> Self {
        self.interfaces.push(TypeArg::Generic(interface, args));
        self
    }

    /// Add a field
    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a method
    pub fn method(mut self, method: MethodDefinition) -> Self {
        self.methods.push(method);
        self
    }

    /// Attach a tag to the type
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Name of the type being defined
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Validate against the registry and produce the descriptor for `id`
    pub(crate) fn build(self, id: TypeId, registry: &TypeRegistry) -> ReflectResult<TypeDescriptor> {
        if registry.type_by_name(&self.name).is_some() {
            return Err(invalid(format!("type {} is already registered", self.name)));
        }
        check_unique_tags(&self.name, &self.tags)?;

        let mut seen = FxHashSet::default();
        for param in &self.type_params {
            if !seen.insert(param.as_str()) {
                return Err(invalid(format!("{} declares type parameter {} twice", self.name, param)));
            }
        }

        let superclass = match (&self.superclass, self.kind) {
            (Some(_), TypeKind::Interface) => {
                return Err(invalid(format!("interface {} cannot extend a class", self.name)));
            }
            (Some(arg), _) => {
                let reference = self.lower(id, arg, registry)?;
                let raw = reference.raw_type().ok_or_else(|| {
                    invalid(format!("{} must extend a class, not a type parameter or array", self.name))
                })?;
                if registry.get(raw).map(|d| d.kind) != Some(TypeKind::Class) {
                    return Err(invalid(format!("{} cannot extend non-class {}", self.name, raw)));
                }
                Some(reference)
            }
            (None, TypeKind::Class) => Some(GenericRef::Raw(builtin_object())),
            (None, _) => None,
        };

        let mut interfaces = Vec::with_capacity(self.interfaces.len());
        for arg in &self.interfaces {
            let reference = self.lower(id, arg, registry)?;
            let is_interface = reference
                .raw_type()
                .and_then(|raw| registry.get(raw))
                .is_some_and(|d| d.kind == TypeKind::Interface);
            if !is_interface {
                return Err(invalid(format!("{} can only implement interfaces", self.name)));
            }
            interfaces.push(reference);
        }

        if self.kind == TypeKind::Interface && !self.fields.is_empty() {
            return Err(invalid(format!("interface {} cannot declare fields", self.name)));
        }

        let base_slots = superclass
            .as_ref()
            .and_then(GenericRef::raw_type)
            .and_then(|raw| registry.get(raw))
            .map_or(0, |d| d.slot_count);

        let mut fields = Vec::with_capacity(self.fields.len());
        for (index, def) in self.fields.into_iter().enumerate() {
            check_known(registry, def.ty, &self.name)?;
            if fields.iter().any(|f: &FieldDescriptor| f.name == def.name) {
                return Err(invalid(format!("{} declares field {} twice", self.name, def.name)));
            }
            check_unique_tags(&def.name, &def.tags)?;
            fields.push(FieldDescriptor {
                name: def.name,
                ty: def.ty,
                declaring: id,
                visibility: def.visibility,
                slot: base_slots + index,
                tags: def.tags,
            });
        }

        let mut methods: Vec<MethodDescriptor> = Vec::with_capacity(self.methods.len());
        for def in self.methods {
            for param in &def.params {
                check_known(registry, *param, &self.name)?;
            }
            if methods.iter().any(|m| m.name == def.name && m.params == def.params) {
                return Err(invalid(format!("{} declares {} twice with one signature", self.name, def.name)));
            }
            check_unique_tags(&def.name, &def.tags)?;
            methods.push(MethodDescriptor {
                name: def.name,
                params: def.params,
                declaring: id,
                visibility: def.visibility,
                tags: def.tags,
                body: def.body,
            });
        }

        let slot_count = base_slots + fields.len();
        Ok(TypeDescriptor {
            id,
            name: self.name,
            kind: self.kind,
            type_params: self.type_params,
            superclass,
            interfaces,
            fields,
            methods,
            tags: self.tags,
            slot_count,
        })
    }

    /// Turn a written argument into a generic reference, resolving parameter
    /// names against the type being defined
    fn lower(&self, id: TypeId, arg: &TypeArg, registry: &TypeRegistry) -> ReflectResult<GenericRef> {
        match arg {
            TypeArg::Type(ty) => {
                check_known(registry, *ty, &self.name)?;
                Ok(GenericRef::Raw(*ty))
            }
            TypeArg::Param(name) => self
                .type_params
                .iter()
                .position(|p| p == name)
                .map(|index| GenericRef::Var(TypeVar { owner: id, index }))
                .ok_or_else(|| invalid(format!("{} has no type parameter {}", self.name, name))),
            TypeArg::Generic(raw, args) => {
                let generic = registry
                    .get(*raw)
                    .ok_or_else(|| invalid(format!("{} references unknown {}", self.name, raw)))?;
                if generic.type_params.len() != args.len() {
                    return Err(invalid(format!(
                        "{} expects {} type argument(s), got {}",
                        generic.name,
                        generic.type_params.len(),
                        args.len()
                    )));
                }
                let args = args
                    .iter()
                    .map(|a| self.lower(id, a, registry))
                    .collect::<ReflectResult<Vec<_>>>()?;
                Ok(GenericRef::Parameterized { raw: *raw, args })
            }
            TypeArg::Array(component) => Ok(GenericRef::Array(Box::new(self.lower(id, component, registry)?))),
        }
    }
}

fn builtin_object() -> TypeId {
    super::builtin::OBJECT
}

fn check_known(registry: &TypeRegistry, ty: TypeId, owner: &str) -> ReflectResult<()> {
    if registry.get(ty).is_none() {
        return Err(invalid(format!("{} references unknown {}", owner, ty)));
    }
    Ok(())
}

fn check_unique_tags(owner: &str, tags: &[Tag]) -> ReflectResult<()> {
    let mut kinds = FxHashSet::default();
    for tag in tags {
        if !kinds.insert(tag.kind()) {
            return Err(invalid(format!("{} carries more than one {} tag", owner, tag.kind())));
        }
    }
    Ok(())
}

fn invalid(message: String) -> ReflectError {
    ReflectError::InvalidDescriptor(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::builtin;

    #[test]
    fn test_field_definition() {
        let field = FieldDefinition::new("secret", builtin::STRING)
            .private()
            .tag(Tag::new("Column"));
        assert_eq!(field.name, "secret");
        assert_eq!(field.visibility, Visibility::Private);
        assert_eq!(field.tags.len(), 1);
    }

    #[test]
    fn test_method_definition() {
        let abstract_method = MethodDefinition::new("speak", vec![]);
        assert!(abstract_method.body.is_none());

        let method = MethodDefinition::native("feed", vec![builtin::INT], |_, args| Ok(args[0].clone()))
            .protected();
        assert!(method.body.is_some());
        assert_eq!(method.visibility, Visibility::Protected);
        assert_eq!(method.params, vec![builtin::INT]);
    }

    #[test]
    fn test_slot_layout_follows_superclass() {
        let mut registry = TypeRegistry::new();
        let animal = registry
            .register(
                ClassBuilder::new("Animal")
                    .field(FieldDefinition::new("name", builtin::STRING))
                    .field(FieldDefinition::new("age", builtin::INT)),
            )
            .unwrap();
        let dog = registry
            .register(
                ClassBuilder::new("Dog")
                    .extends(animal)
                    .field(FieldDefinition::new("breed", builtin::STRING)),
            )
            .unwrap();

        let dog = registry.get(dog).unwrap();
        assert_eq!(dog.slot_count, 3);
        assert_eq!(dog.declared_field("breed").unwrap().slot, 2);
        assert_eq!(dog.superclass, Some(GenericRef::Raw(animal)));
    }

    #[test]
    fn test_generic_superclass_lowering() {
        let mut registry = TypeRegistry::new();
        let container = registry.register(ClassBuilder::new("Container").type_param("T")).unwrap();
        let boxed = registry
            .register(
                ClassBuilder::new("Box")
                    .type_param("T")
                    .extends_generic(container, vec![TypeArg::param("T")]),
            )
            .unwrap();

        let descriptor = registry.get(boxed).unwrap();
        assert_eq!(
            descriptor.superclass,
            Some(GenericRef::Parameterized {
                raw: container,
                args: vec![GenericRef::Var(TypeVar { owner: boxed, index: 0 })],
            })
        );
    }

    #[test]
    fn test_rejects_invalid_definitions() {
        let mut registry = TypeRegistry::new();
        let container = registry.register(ClassBuilder::new("Container").type_param("T")).unwrap();
        let named = registry.register(ClassBuilder::interface("Named")).unwrap();

        let cases = vec![
            ClassBuilder::new("Container"),
            ClassBuilder::new("Wrong").extends_generic(container, vec![]),
            ClassBuilder::new("Unbound").extends_generic(container, vec![TypeArg::param("U")]),
            ClassBuilder::new("NotAClass").extends(named),
            ClassBuilder::new("NotAnInterface").implements(container),
            ClassBuilder::interface("Stateful").field(FieldDefinition::new("x", builtin::INT)),
            ClassBuilder::new("Twice")
                .field(FieldDefinition::new("x", builtin::INT))
                .field(FieldDefinition::new("x", builtin::INT)),
            ClassBuilder::new("Tagged").tag(Tag::new("Entity")).tag(Tag::new("Entity")),
            ClassBuilder::new("Overloaded")
                .method(MethodDefinition::new("m", vec![builtin::INT]))
                .method(MethodDefinition::new("m", vec![builtin::INT])),
            ClassBuilder::new("Dangling").field(FieldDefinition::new("x", TypeId(9999))),
        ];

        for builder in cases {
            let name = builder.name().to_string();
            assert!(
                matches!(registry.register(builder), Err(ReflectError::InvalidDescriptor(_))),
                "{} should be rejected",
                name
            );
        }
    }
}

//! Metadata Extraction
//!
//! Reads tag values attached to types, fields and methods. Tags or
//! attributes that are missing, or whose accessors fault, read as absent;
//! faults are logged at trace level.
//!
//! The type's enumeration lock is held only while a tag is looked up or
//! members are enumerated. Attribute accessors run after it is released and
//! may query the same type again.

use std::cmp::Ordering;

use super::Reflector;
use crate::error::ReflectError;
use crate::log::Severity;
use crate::types::{FieldDescriptor, Tag, TypeId};
use crate::value::{compare_stringified, Value};

/// Selects tagged members by kind and, optionally, by attribute value
#[derive(Debug, Clone, PartialEq)]
pub struct TagFilter {
    /// Required tag kind
    pub kind: String,
    /// Attribute to compare; `None` accepts any tag of the kind
    pub attribute: Option<String>,
    /// Expected attribute value; `None` expects the attribute to be absent
    pub expected: Option<Value>,
}

impl TagFilter {
    /// Accept any tag of `kind`
    pub fn present(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attribute: None,
            expected: None,
        }
    }

    /// Accept tags of `kind` whose `attribute` stringifies equal to `expected`
    pub fn attribute_equals(kind: impl Into<String>, attribute: impl Into<String>, expected: impl Into<Value>) -> Self {
        Self {
            kind: kind.into(),
            attribute: Some(attribute.into()),
            expected: Some(expected.into()),
        }
    }

    /// Accept tags of `kind` where `attribute` is missing or null
    pub fn attribute_absent(kind: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attribute: Some(attribute.into()),
            expected: None,
        }
    }
}

impl Reflector {
    /// Read an attribute of a type-level tag, or `default`
    pub fn class_tag_value(&self, ty: TypeId, kind: &str, attribute: &str, default: Value) -> Value {
        let tag = {
            let _guard = self.types.enumeration_lock(ty);
            self.types.descriptor(ty).and_then(|d| d.tag(kind)).cloned()
        };
        let Some(tag) = tag else {
            return default;
        };
        self.read_attribute(&self.types.type_name(ty), &tag, attribute)
            .unwrap_or(default)
    }

    /// Read an attribute of a tag on a public field
    pub fn field_tag_value(&self, ty: TypeId, field: &str, kind: &str, attribute: &str) -> Option<Value> {
        let tag = self.field_tag(ty, field, kind)?;
        self.read_attribute(&self.member_target(ty, field), tag, attribute)
    }

    /// Read an attribute of a tag on the public method with exactly `params`
    pub fn method_tag_value(
        &self,
        ty: TypeId,
        method: &str,
        kind: &str,
        attribute: &str,
        params: &[TypeId],
    ) -> Option<Value> {
        let tag = self.find_exact_method(ty, method, params)?.tag(kind)?;
        self.read_attribute(&self.member_target(ty, method), tag, attribute)
    }

    /// The tag of `kind` on a public field
    pub fn field_tag(&self, ty: TypeId, field: &str, kind: &str) -> Option<&Tag> {
        self.types
            .public_fields(ty)
            .into_iter()
            .find(|f| f.name == field)?
            .tag(kind)
    }

    /// Names of public fields whose tag matches `filter`
    pub fn tagged_fields(&self, ty: TypeId, filter: &TagFilter) -> Vec<String> {
        let fields = {
            let _guard = self.types.enumeration_lock(ty);
            self.types.public_fields(ty)
        };

        let mut names: Vec<String> = Vec::new();
        for field in fields {
            if field.tag(&filter.kind).is_none() || names.contains(&field.name) {
                continue;
            }
            let tag = self.field_tag(ty, &field.name, &filter.kind);
            if self.filter_matches(filter, tag, &self.member_target(ty, &field.name)) {
                names.push(field.name.clone());
            }
        }
        names
    }

    /// Names of public methods tagged with `filter.kind`. When the filter
    /// compares an attribute, the value is read from the overload with
    /// exactly `params`.
    pub fn tagged_methods(&self, ty: TypeId, filter: &TagFilter, params: &[TypeId]) -> Vec<String> {
        let methods = {
            let _guard = self.types.enumeration_lock(ty);
            self.types.public_methods(ty)
        };

        let mut names: Vec<String> = Vec::new();
        for method in methods {
            if method.tag(&filter.kind).is_none() || names.contains(&method.name) {
                continue;
            }
            let matched = filter.attribute.is_none() || {
                let tag = self
                    .find_exact_method(ty, &method.name, params)
                    .and_then(|m| m.tag(&filter.kind));
                self.filter_matches(filter, tag, &self.member_target(ty, &method.name))
            };
            if matched {
                names.push(method.name.clone());
            }
        }
        names
    }

    /// Public fields whose declared type is assignable to `target`
    pub fn fields_implementing(&self, ty: TypeId, target: TypeId) -> Vec<&FieldDescriptor> {
        self.types
            .public_fields(ty)
            .into_iter()
            .filter(|f| self.types.is_assignable(f.ty, target))
            .collect()
    }

    /// Names of public fields whose declared type is assignable to `target`
    pub fn field_names_implementing(&self, ty: TypeId, target: TypeId) -> Vec<String> {
        self.fields_implementing(ty, target)
            .into_iter()
            .map(|f| f.name.clone())
            .collect()
    }

    /// Names of methods declared on the receiver's type that have an
    /// overload declared there with exactly `params`
    pub fn enumerate_methods(&self, receiver: &Value, params: &[TypeId]) -> Vec<String> {
        let Some(ty) = self.lookup_type(receiver) else {
            return Vec::new();
        };
        let declared = self.types.declared_methods(ty);

        let mut names: Vec<String> = Vec::new();
        for method in declared {
            if names.contains(&method.name) {
                continue;
            }
            if declared.iter().any(|m| m.name == method.name && m.params == params) {
                names.push(method.name.clone());
            }
        }
        names
    }

    /// Order two optional values: absent (or null) first, then by display
    /// form. Type values display as their registered names.
    pub fn compare_values(&self, a: Option<&Value>, b: Option<&Value>) -> Ordering {
        compare_stringified(self.named(a).as_ref(), self.named(b).as_ref())
    }

    fn named(&self, value: Option<&Value>) -> Option<Value> {
        match value? {
            Value::Type(ty) => Some(Value::from(self.types.type_name(*ty))),
            other => Some(other.clone()),
        }
    }

    fn filter_matches(&self, filter: &TagFilter, tag: Option<&Tag>, target: &str) -> bool {
        match &filter.attribute {
            None => tag.is_some(),
            Some(attribute) => {
                let actual = tag.and_then(|t| self.read_attribute(target, t, attribute));
                self.compare_values(filter.expected.as_ref(), actual.as_ref()) == Ordering::Equal
            }
        }
    }

    fn read_attribute(&self, target: &str, tag: &Tag, attribute: &str) -> Option<Value> {
        match tag.attribute(attribute) {
            Ok(value) => Some(value),
            Err(err) => {
                let err = match err {
                    ReflectError::MetadataFault { kind, reason, .. } => ReflectError::MetadataFault {
                        target: target.to_string(),
                        kind,
                        reason,
                    },
                    other => other,
                };
                self.log.log(Severity::Trace, target, "Cannot read tag attribute", Some(&err), false);
                None
            }
        }
    }

    fn member_target(&self, ty: TypeId, member: &str) -> String {
        format!("{}.{}", self.types.type_name(ty), member)
    }
}

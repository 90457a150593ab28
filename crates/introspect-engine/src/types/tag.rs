//! Metadata tags attached to types, fields and methods

use std::fmt;
use std::sync::Arc;

use crate::error::{Fault, ReflectError, ReflectResult};
use crate::value::Value;

/// Computes an attribute value on demand; may fault
pub type AttributeFn = Arc<dyn Fn() -> Result<Value, Fault> + Send + Sync>;

/// A named attribute of a tag
#[derive(Clone)]
pub enum TagAttribute {
    /// Stored value
    Value(Value),
    /// Computed value
    Accessor(AttributeFn),
}

impl fmt::Debug for TagAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagAttribute::Value(v) => f.debug_tuple("Value").field(v).finish(),
            TagAttribute::Accessor(_) => f.write_str("Accessor(..)"),
        }
    }
}

/// A kind-identified marker carrying named attributes
#[derive(Debug, Clone)]
pub struct Tag {
    kind: String,
    attributes: Vec<(String, TagAttribute)>,
}

impl Tag {
    /// Create a tag with no attributes
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attributes: Vec::new(),
        }
    }

    /// Add (or replace) a stored attribute
    pub fn with(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_attribute(name.into(), TagAttribute::Value(value.into()))
    }

    /// Add (or replace) a computed attribute
    pub fn with_accessor<F>(self, name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn() -> Result<Value, Fault> + Send + Sync + 'static,
    {
        self.with_attribute(name.into(), TagAttribute::Accessor(Arc::new(accessor)))
    }

    fn with_attribute(mut self, name: String, attribute: TagAttribute) -> Self {
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = attribute,
            None => self.attributes.push((name, attribute)),
        }
        self
    }

    /// Tag kind
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Attribute names, in declaration order
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|(n, _)| n.as_str())
    }

    /// Read an attribute. Missing attributes and faulting accessors are
    /// reported as `MetadataFault`.
    pub fn attribute(&self, name: &str) -> ReflectResult<Value> {
        let attribute = self
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, a)| a)
            .ok_or_else(|| self.fault(format!("no attribute {}", name)))?;

        match attribute {
            TagAttribute::Value(v) => Ok(v.clone()),
            TagAttribute::Accessor(accessor) => {
                accessor().map_err(|fault| self.fault(format!("attribute {}: {}", name, fault)))
            }
        }
    }

    fn fault(&self, reason: String) -> ReflectError {
        ReflectError::MetadataFault {
            target: String::new(),
            kind: self.kind.clone(),
            reason,
        }
    }
}

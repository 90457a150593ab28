//! Dynamic values passed to and returned from reflective calls

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::object::ObjectRef;
use crate::types::TypeId;

/// A runtime value
#[derive(Debug, Clone)]
pub enum Value {
    /// Absent value
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// String
    Str(Arc<str>),
    /// Instance of a registered class
    Object(ObjectRef),
    /// A type handle (static receivers, tag attributes)
    Type(TypeId),
}

impl Value {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get as object reference
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Get as type handle
    pub fn as_type(&self) -> Option<TypeId> {
        match self {
            Value::Type(ty) => Some(*ty),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Type(a), Value::Type(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::Object(obj) => write!(f, "object@{:p}", Arc::as_ptr(obj)),
            Value::Type(ty) => write!(f, "{}", ty),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Value::Object(obj)
    }
}

impl From<TypeId> for Value {
    fn from(ty: TypeId) -> Self {
        Value::Type(ty)
    }
}

/// Compare two possibly-absent values by their string forms.
///
/// `None` and `Value::Null` are both absent. Two absent values are equal, an
/// absent value sorts before a present one, and present values compare by
/// their `Display` strings, so `Int(1)` equals `Str("1")`.
pub fn compare_stringified(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.to_string().cmp(&b.to_string()),
    }
}

//! Engine errors

use thiserror::Error;

use crate::permissions::ReflectionPermission;
use crate::types::TypeId;

/// A failure raised by code the engine calls into: a native member body or
/// a tag attribute accessor.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct Fault {
    message: String,
    #[source]
    cause: Option<Box<Fault>>,
}

impl Fault {
    /// Create a fault with no underlying cause
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// Create a fault wrapping an underlying cause
    pub fn caused_by(message: impl Into<String>, cause: Fault) -> Self {
        Self {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// The fault message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The underlying cause, if any
    pub fn cause(&self) -> Option<&Fault> {
        self.cause.as_deref()
    }
}

/// Errors produced by introspection queries
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReflectError {
    /// No member with the requested name accepts the supplied arguments
    #[error("Cannot find method {member} accepting {arity} argument(s) on {type_name}")]
    MemberNotFound {
        /// Type that was searched
        type_name: String,
        /// Requested member name
        member: String,
        /// Number of actual arguments
        arity: usize,
    },

    /// The queried ancestor is not in the descendant's inheritance chain
    #[error("{descendant} does not inherit from {ancestor}")]
    AncestorNotFound {
        /// Type the walk started from
        descendant: String,
        /// Generic ancestor that was never reached
        ancestor: String,
    },

    /// The invoked member (or the invocation machinery) failed
    #[error("Error calling {member}: {fault}")]
    InvocationFault {
        /// Invoked member name
        member: String,
        /// Underlying fault
        #[source]
        fault: Fault,
    },

    /// A tag or one of its attributes could not be read
    #[error("Cannot read tag {kind} on {target}: {reason}")]
    MetadataFault {
        /// Tagged type, field, or method
        target: String,
        /// Tag kind
        kind: String,
        /// What went wrong
        reason: String,
    },

    /// A non-public member was invoked without relaxed access
    #[error("{member} on {type_name} is not accessible")]
    IllegalAccess {
        /// Declaring type
        type_name: String,
        /// Member name
        member: String,
    },

    /// The permission store refused to relax access
    #[error("Permission denied: {permission} on {type_name}")]
    AccessDenied {
        /// Type whose permissions were consulted
        type_name: String,
        /// Required permission
        permission: ReflectionPermission,
    },

    /// Field lookup failed
    #[error("No field {field} on {type_name}")]
    FieldNotFound {
        /// Searched type
        type_name: String,
        /// Requested field
        field: String,
    },

    /// Type id not registered
    #[error("Unknown type: {0}")]
    UnknownType(TypeId),

    /// Receiver or argument does not fit the member
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Registry rejected a type definition
    #[error("Invalid type descriptor: {0}")]
    InvalidDescriptor(String),
}

/// Result alias for introspection queries
pub type ReflectResult<T> = Result<T, ReflectError>;

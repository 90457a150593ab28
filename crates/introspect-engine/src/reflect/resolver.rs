//! Member Resolution
//!
//! A member matches when its name is equal, its parameter count equals the
//! argument count, and every parameter type is assignable from the runtime
//! type of the corresponding argument. The first match in enumeration order
//! wins; there is no most-specific selection among overloads.
//!
//! Public members reachable through inheritance are searched first. Only if
//! none match are the members declared on the exact runtime type searched,
//! non-public ones included.

use super::Reflector;
use crate::config::NullArgumentPolicy;
use crate::error::{ReflectError, ReflectResult};
use crate::types::{MethodDescriptor, TypeId};
use crate::value::Value;

impl Reflector {
    /// Find a public (possibly inherited) member accepting `args`
    pub fn find_method(&self, receiver: &Value, name: &str, args: &[Value]) -> Option<&MethodDescriptor> {
        let ty = self.lookup_type(receiver)?;
        self.types
            .public_methods(ty)
            .into_iter()
            .find(|m| m.name == name && self.arguments_match(&m.params, args))
    }

    /// Find a member declared on the receiver's exact type accepting `args`
    pub fn find_declared_method(&self, receiver: &Value, name: &str, args: &[Value]) -> Option<&MethodDescriptor> {
        let ty = self.lookup_type(receiver)?;
        self.types
            .declared_methods(ty)
            .iter()
            .find(|m| m.name == name && self.arguments_match(&m.params, args))
    }

    /// Resolve a member, public phase first, then declared phase
    pub fn resolve_method(&self, receiver: &Value, name: &str, args: &[Value]) -> ReflectResult<&MethodDescriptor> {
        self.find_method(receiver, name, args)
            .or_else(|| self.find_declared_method(receiver, name, args))
            .ok_or_else(|| ReflectError::MemberNotFound {
                type_name: self.origin_of(receiver),
                member: name.to_string(),
                arity: args.len(),
            })
    }

    /// Find a public member by its exact parameter types
    pub fn find_exact_method(&self, ty: TypeId, name: &str, params: &[TypeId]) -> Option<&MethodDescriptor> {
        self.types
            .public_methods(ty)
            .into_iter()
            .find(|m| m.name == name && m.params == params)
    }

    pub(crate) fn arguments_match(&self, params: &[TypeId], args: &[Value]) -> bool {
        params.len() == args.len() && params.iter().zip(args).all(|(p, a)| self.argument_matches(*p, a))
    }

    /// Whether one actual argument fits one declared parameter
    pub(crate) fn argument_matches(&self, param: TypeId, arg: &Value) -> bool {
        match self.types.runtime_type_of(arg) {
            Some(actual) => self.types.is_assignable(actual, param),
            None => match self.config.null_arguments() {
                NullArgumentPolicy::MatchReference => {
                    self.types.descriptor(param).is_some_and(|d| !d.is_primitive())
                }
                NullArgumentPolicy::Reject => false,
            },
        }
    }
}

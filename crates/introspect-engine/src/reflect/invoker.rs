//! Member Invocation

use std::panic::{self, AssertUnwindSafe};

use super::Reflector;
use crate::error::{Fault, ReflectError, ReflectResult};
use crate::log::Severity;
use crate::permissions::check_invoke;
use crate::types::MethodDescriptor;
use crate::value::Value;

impl Reflector {
    /// Invoke a resolved member.
    ///
    /// Access is relaxed through the permission store first. A refusal is
    /// logged as a warning and the call proceeds under normal visibility,
    /// so a non-public member then fails with `IllegalAccess`.
    pub fn try_invoke(&self, receiver: &Value, method: &MethodDescriptor, args: &[Value]) -> ReflectResult<Value> {
        let declaring = self.types.type_name(method.declaring);
        let is_private = !method.visibility.is_public();

        if let Err(denied) = check_invoke(&self.permissions, &declaring, is_private) {
            self.log.warn(
                &declaring,
                &format!("Cannot make {} accessible", method.name),
                Some(&denied),
            );
            if is_private {
                return Err(ReflectError::IllegalAccess {
                    type_name: declaring,
                    member: method.name.clone(),
                });
            }
        }

        if !self.arguments_match(&method.params, args) {
            return Err(ReflectError::InvalidArgument(format!(
                "{} does not accept {} argument(s) of the supplied types",
                method.name,
                args.len()
            )));
        }

        let receiver_fits = self
            .lookup_type(receiver)
            .is_some_and(|ty| self.types.is_assignable(ty, method.declaring));
        if !receiver_fits {
            return Err(ReflectError::InvalidArgument(format!(
                "{} is not an instance of {}",
                self.origin_of(receiver),
                declaring
            )));
        }

        let body = method.body.as_ref().ok_or_else(|| ReflectError::InvocationFault {
            member: method.name.clone(),
            fault: Fault::new(format!("{}.{} is abstract", declaring, method.name)),
        })?;

        match panic::catch_unwind(AssertUnwindSafe(|| body(receiver, args))) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(fault)) => Err(ReflectError::InvocationFault {
                member: method.name.clone(),
                fault,
            }),
            Err(payload) => Err(ReflectError::InvocationFault {
                member: method.name.clone(),
                fault: Fault::new(format!("panicked: {}", panic_message(payload.as_ref()))),
            }),
        }
    }

    /// Invoke a resolved member, logging any failure as an error and
    /// yielding `None`. A fault raised by the body is logged through its
    /// cause.
    pub fn invoke(&self, receiver: &Value, method: &MethodDescriptor, args: &[Value]) -> Option<Value> {
        match self.try_invoke(receiver, method, args) {
            Ok(value) => Some(value),
            Err(err) => {
                let use_cause = matches!(err, ReflectError::InvocationFault { .. });
                self.log.log(
                    Severity::Error,
                    &self.origin_of(receiver),
                    &format!("Error calling {}", method.name),
                    Some(&err),
                    use_cause,
                );
                None
            }
        }
    }

    /// Resolve a member by name and arguments, then invoke it best-effort.
    /// Resolution failures surface; invocation failures yield `Ok(None)`.
    pub fn call_method(&self, receiver: &Value, name: &str, args: &[Value]) -> ReflectResult<Option<Value>> {
        let method = self.resolve_method(receiver, name, args)?;
        Ok(self.invoke(receiver, method, args))
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

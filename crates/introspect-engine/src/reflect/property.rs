//! Property Access
//!
//! A property `name` is read from a public field called `name` or, failing
//! that, by calling a public zero-argument `getName`. Writes go to the
//! public field, else to a public `setName` whose single parameter type is
//! exactly the runtime type of the value.

use super::Reflector;
use crate::error::ReflectError;
use crate::permissions::{check_field_read, check_field_write};
use crate::types::FieldDescriptor;
use crate::value::Value;

impl Reflector {
    /// Read a property; `None` when neither the field nor a getter works
    pub fn get_field_value(&self, target: &Value, name: &str) -> Option<Value> {
        let ty = self.lookup_type(target)?;

        if let Some(field) = self.public_field(target, name) {
            let declaring = self.types.type_name(field.declaring);
            let read = check_field_read(&self.permissions, &declaring, false)
                .and_then(|()| self.types.read_field(target, field));
            if let Ok(value) = read {
                return Some(value);
            }
        }

        let getter = self.find_exact_method(ty, &accessor_name("get", name), &[])?;
        self.try_invoke(target, getter, &[]).ok()
    }

    /// Write a property. Failures are ignored.
    pub fn set_field_value(&self, target: &Value, name: &str, value: Value) {
        let Some(ty) = self.lookup_type(target) else {
            return;
        };

        if let Some(field) = self.public_field(target, name) {
            let declaring = self.types.type_name(field.declaring);
            let written = check_field_write(&self.permissions, &declaring, false)
                .and_then(|()| self.types.write_field(target, field, value.clone()));
            if written.is_ok() {
                return;
            }
        }

        let Some(value_type) = self.types.runtime_type_of(&value) else {
            return;
        };
        if let Some(setter) = self.find_exact_method(ty, &accessor_name("set", name), &[value_type]) {
            let _ = self.try_invoke(target, setter, &[value]);
        }
    }

    /// Read several properties, in order
    pub fn get_field_values(&self, target: &Value, names: &[&str]) -> Vec<Option<Value>> {
        names.iter().map(|name| self.get_field_value(target, name)).collect()
    }

    /// Read a field declared on the target's exact type, whatever its
    /// visibility. Failures are logged as warnings.
    pub fn get_declared_field_value(&self, target: &Value, name: &str) -> Option<Value> {
        let ty = self.lookup_type(target)?;
        let origin = self.types.type_name(ty);

        let Some(field) = self.types.declared_fields(ty).iter().find(|f| f.name == name) else {
            let err = ReflectError::FieldNotFound {
                type_name: origin.clone(),
                field: name.to_string(),
            };
            self.log.warn(&origin, &format!("Cannot read field {}", name), Some(&err));
            return None;
        };

        let is_private = !field.visibility.is_public();
        let read = check_field_read(&self.permissions, &origin, is_private)
            .and_then(|()| self.types.read_field(target, field));
        match read {
            Ok(value) => Some(value),
            Err(err) => {
                self.log.warn(&origin, &format!("Cannot read field {}", name), Some(&err));
                None
            }
        }
    }

    /// Call `method` once per input, resolving it against each string
    /// argument the way `call_method` does
    pub fn get_method_values(&self, target: &Value, inputs: &[&str], method: &str) -> Vec<Option<Value>> {
        inputs
            .iter()
            .map(|input| {
                let args = [Value::from(*input)];
                let resolved = self.find_method(target, method, &args)?;
                self.try_invoke(target, resolved, &args).ok()
            })
            .collect()
    }

    fn public_field(&self, target: &Value, name: &str) -> Option<&FieldDescriptor> {
        let ty = self.lookup_type(target)?;
        self.types.public_fields(ty).into_iter().find(|f| f.name == name)
    }
}

/// `getName` / `setName` style accessor name for a property
pub(crate) fn accessor_name(prefix: &str, property: &str) -> String {
    let mut chars = property.chars();
    match chars.next() {
        Some(first) => format!("{}{}{}", prefix, first.to_uppercase(), chars.as_str()),
        None => prefix.to_string(),
    }
}

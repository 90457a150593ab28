//! Registry-typed instances
//!
//! An [`Object`] is an instance of a registered class. Fields live in slots
//! laid out by the registry: a subclass's declared fields follow the slots of
//! its superclass, so a slot index is stable across the whole chain.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::types::TypeId;
use crate::value::Value;

/// Shared handle to an instance
pub type ObjectRef = Arc<Object>;

/// Instance of a registered class
pub struct Object {
    /// Runtime class of the instance
    class: TypeId,
    /// Field slots (including inherited fields)
    slots: RwLock<Vec<Value>>,
}

impl Object {
    /// Create an instance with every slot set to null
    pub fn new(class: TypeId, slot_count: usize) -> Self {
        Self {
            class,
            slots: RwLock::new(vec![Value::Null; slot_count]),
        }
    }

    /// Runtime class of the instance
    pub fn class(&self) -> TypeId {
        self.class
    }

    /// Number of field slots
    pub fn slot_count(&self) -> usize {
        self.slots.read().len()
    }

    /// Read a slot
    pub fn get(&self, slot: usize) -> Option<Value> {
        self.slots.read().get(slot).cloned()
    }

    /// Write a slot, returning false if the slot does not exist
    pub fn set(&self, slot: usize, value: Value) -> bool {
        match self.slots.write().get_mut(slot) {
            Some(current) => {
                *current = value;
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("class", &self.class)
            .field("slots", &self.slot_count())
            .finish()
    }
}

//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::sync::Arc;

use introspect_engine::{
    builtin, ClassBuilder, Fault, FieldDefinition, MemoryLog, MethodDefinition, Reflector, Tag, TypeId,
    TypeRegistry, Value,
};

/// Slots laid out by the registry for `Animal`
pub const NAME_SLOT: usize = 0;
pub const AGE_SLOT: usize = 1;
pub const NICKNAME_SLOT: usize = 4;

/// `Named` interface, `Animal implements Named`, `Dog extends Animal`
pub struct Zoo {
    pub registry: Arc<TypeRegistry>,
    pub named: TypeId,
    pub animal: TypeId,
    pub dog: TypeId,
}

impl Zoo {
    pub fn reflector(&self) -> Reflector {
        Reflector::new(self.registry.clone())
    }

    pub fn reflector_with_log(&self) -> (Reflector, Arc<MemoryLog>) {
        let log = Arc::new(MemoryLog::new());
        (self.reflector().with_log(log.clone()), log)
    }

    /// An instance of `ty` with `name` set
    pub fn named_instance(&self, ty: TypeId, name: &str) -> Value {
        let instance = self.registry.instantiate(ty).expect("instantiable");
        instance
            .as_object()
            .expect("object")
            .set(NAME_SLOT, Value::from(name));
        instance
    }

    /// The `Dog` called Rex
    pub fn rex(&self) -> Value {
        self.named_instance(self.dog, "Rex")
    }
}

fn slot(receiver: &Value, index: usize) -> Result<Value, Fault> {
    receiver
        .as_object()
        .and_then(|obj| obj.get(index))
        .ok_or_else(|| Fault::new("receiver has no such slot"))
}

fn column(name: &str, order: i64) -> Tag {
    Tag::new("Column").with("name", name).with("order", order)
}

pub fn zoo() -> Zoo {
    let mut registry = TypeRegistry::new();

    let named = registry
        .register(ClassBuilder::interface("Named").method(MethodDefinition::new("getName", vec![])))
        .expect("Named");

    let animal = registry
        .register(
            ClassBuilder::new("Animal")
                .implements(named)
                .tag(Tag::new("Entity").with("table", "animals"))
                .field(FieldDefinition::new("name", builtin::STRING).tag(column("animal_name", 1)))
                .field(FieldDefinition::new("age", builtin::INT).tag(column("age", 2)))
                .field(FieldDefinition::new("legs", builtin::INT))
                .field(FieldDefinition::new("secret", builtin::STRING).private().tag(column("secret", 3)))
                .field(FieldDefinition::new("nickname", builtin::STRING).private())
                .method(MethodDefinition::native("getName", vec![], |this, _| slot(this, NAME_SLOT)))
                .method(
                    MethodDefinition::native("speak", vec![], |_, _| Ok(Value::from("...")))
                        .tag(Tag::new("Command").with("name", "speak")),
                )
                .method(
                    MethodDefinition::native("greet", vec![builtin::STRING], |_, args| {
                        Ok(Value::from(format!("Hello, {}", args[0])))
                    })
                    .tag(Tag::new("Command").with("name", "greet")),
                )
                .method(MethodDefinition::native("greet", vec![builtin::OBJECT], |_, _| {
                    Ok(Value::from("Hello, object"))
                }))
                .method(MethodDefinition::native("feed", vec![builtin::INT], |this, args| {
                    let age = slot(this, AGE_SLOT)?.as_int().unwrap_or(0);
                    Ok(Value::Int(age + args[0].as_int().unwrap_or(0)))
                }))
                .method(MethodDefinition::native("whisper", vec![], |_, _| Ok(Value::from("psst"))).private())
                .method(MethodDefinition::native("fail", vec![], |_, _| {
                    Err(Fault::caused_by("fail failed", Fault::new("root cause")))
                }))
                .method(MethodDefinition::native("getNickname", vec![], |this, _| slot(this, NICKNAME_SLOT)))
                .method(MethodDefinition::native("setNickname", vec![builtin::STRING], |this, args| {
                    let obj = this.as_object().ok_or_else(|| Fault::new("not an object"))?;
                    obj.set(NICKNAME_SLOT, args[0].clone());
                    Ok(Value::Null)
                })),
        )
        .expect("Animal");

    let dog = registry
        .register(
            ClassBuilder::new("Dog")
                .extends(animal)
                .field(FieldDefinition::new("breed", builtin::STRING).tag(column("breed", 4)))
                .method(MethodDefinition::native("speak", vec![], |_, _| Ok(Value::from("Woof"))))
                .method(
                    MethodDefinition::native("speak", vec![builtin::INT], |_, args| {
                        Ok(Value::from(format!("Woof x{}", args[0])))
                    })
                    .private(),
                )
                .method(MethodDefinition::native("fetch", vec![builtin::OBJECT], |_, args| {
                    Ok(Value::from(format!("fetched {}", args[0])))
                })),
        )
        .expect("Dog");

    Zoo {
        registry: Arc::new(registry),
        named,
        animal,
        dog,
    }
}

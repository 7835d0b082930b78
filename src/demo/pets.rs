//! Native types exposed by the `mylib_object` module.

use crate::value::NativeEnum;
use std::any::Any;

#[derive(Clone, Debug, PartialEq)]
pub struct Pet {
    pub name: String,
}

impl Pet {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }
}

/// A `Pet` by composition; the binding upcasts through `pet`.
#[derive(Clone, Debug)]
pub struct Dog {
    pub pet: Pet,
}

impl Dog {
    pub fn new(name: impl Into<String>) -> Self {
        Self { pet: Pet::new(name) }
    }

    pub fn bark(&self) -> &'static str {
        "woof!"
    }
}

/// Base owned and destroyed through dynamic dispatch.
pub trait PolymorphicPet: Any + Send {
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

#[derive(Debug, Default)]
pub struct PolymorphicDog;

impl PolymorphicDog {
    pub fn bark(&self) -> &'static str {
        "woof!"
    }
}

impl PolymorphicPet for PolymorphicDog {
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

/// Pet with overloaded setters.
#[derive(Clone, Debug)]
pub struct PetOL {
    pub name: String,
    pub age: i32,
}

impl PetOL {
    pub fn new(name: impl Into<String>, age: i32) -> Self {
        Self {
            name: name.into(),
            age,
        }
    }

    pub fn set_age(&mut self, age: i32) {
        self.age = age;
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Dog = 0,
    Cat = 1,
}

impl NativeEnum for Kind {
    fn to_repr(self) -> i64 {
        self as i64
    }

    fn from_repr(value: i64) -> Option<Self> {
        match value {
            0 => Some(Kind::Dog),
            1 => Some(Kind::Cat),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes {
    pub age: f32,
}

/// Pet with a nested enumeration and a nested value type.
#[derive(Clone, Debug)]
pub struct PetEi {
    pub name: String,
    pub kind: Kind,
    pub attr: Attributes,
}

impl PetEi {
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            kind,
            attr: Attributes::default(),
        }
    }
}

/// A `Dog` handed out as a plain `Pet`.
pub fn pet_store() -> Dog {
    Dog::new("Molly")
}

pub fn pet_store2() -> Box<dyn PolymorphicPet> {
    Box::new(PolymorphicDog::default())
}

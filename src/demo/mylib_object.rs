//! The `mylib_object` module: four object-binding patterns.
//!
//! 1. `Pet` / `Dog`: inheritance by composition, plus a factory that returns
//!    a `Dog` through the non-polymorphic `Pet`.
//! 2. `PolymorphicPet` / `PolymorphicDog`: a trait-object base.
//! 3. `PetOL`: a method overload set.
//! 4. `Pet_EI`: a nested enumeration and a nested value type.

use super::pets::{
    pet_store, pet_store2, Attributes, Dog, Kind, Pet, PetEi, PetOL, PolymorphicDog,
    PolymorphicPet,
};
use crate::binding::{ArgLiteral, ClassBuilder, EnumBuilder, Function, ModuleBuilder, Opaque};
use crate::error::BindResult;
use crate::value::TypeSpec;
use std::any::{Any, TypeId};

pub fn register(m: &mut ModuleBuilder) -> BindResult<()> {
    m.class(
        ClassBuilder::<Pet>::new("Pet")
            .dynamic_attr()
            .init(["name".typed(TypeSpec::Str)], |a| Ok(Pet::new(a.get::<String>(0)?)))
            .def("setName", ["name".typed(TypeSpec::Str)], |p: &mut Pet, a| {
                p.set_name(a.get::<String>(0)?);
                Ok(())
            })
            .def("getName", [], |p: &mut Pet, _| Ok(p.get_name().to_string()))
            .repr(|p: &Pet| format!("<example.Pet named '{}'>", p.name))
            .def_readwrite("name", |p: &mut Pet| &mut p.name),
    )?;

    m.def(Function::factory("pet_store", "Pet", TypeId::of::<Dog>(), || {
        Box::new(pet_store()) as Box<dyn Any + Send>
    }))?;

    m.class(
        ClassBuilder::<Dog>::new("Dog")
            .extends("Pet", |d: &mut Dog| &mut d.pet)
            .init(["name".typed(TypeSpec::Str)], |a| Ok(Dog::new(a.get::<String>(0)?)))
            .def("bark", [], |d: &mut Dog, _| Ok(d.bark())),
    )?;

    m.class(ClassBuilder::<Opaque>::abstract_class("PolymorphicPet").polymorphic())?;
    m.class(
        ClassBuilder::<PolymorphicDog>::new("PolymorphicDog")
            .extends_dyn("PolymorphicPet")
            .init([], |_| Ok(PolymorphicDog::default()))
            .def("bark", [], |d: &mut PolymorphicDog, _| Ok(d.bark())),
    )?;

    m.def(Function::factory(
        "pet_store2",
        "PolymorphicPet",
        TypeId::of::<PolymorphicDog>(),
        || pet_store2().into_any(),
    ))?;

    m.class(
        ClassBuilder::<PetOL>::new("PetOL")
            .init(
                ["name".typed(TypeSpec::Str), "age".typed(TypeSpec::Int)],
                |a| Ok(PetOL::new(a.get::<String>(0)?, a.get::<i32>(1)?)),
            )
            .def_with_doc(
                "set",
                Some("Set the pet's age"),
                ["age".typed(TypeSpec::Int)],
                |p: &mut PetOL, a| {
                    p.set_age(a.get::<i32>(0)?);
                    Ok(())
                },
            )
            .def_with_doc(
                "set",
                Some("Set the pet's name"),
                ["name".typed(TypeSpec::Str)],
                |p: &mut PetOL, a| {
                    p.set_name(a.get::<String>(0)?);
                    Ok(())
                },
            )
            .def_readwrite("name", |p: &mut PetOL| &mut p.name)
            .def_readwrite("age", |p: &mut PetOL| &mut p.age),
    )?;

    let pet_ei = m.class(
        ClassBuilder::<PetEi>::new("Pet_EI")
            .init(
                [
                    "name".typed(TypeSpec::Str),
                    "type".typed(TypeSpec::enumeration("Pet_EI.Kind")),
                ],
                |a| Ok(PetEi::new(a.get::<String>(0)?, a.get_enum::<Kind>(1)?)),
            )
            .def_readwrite("name", |p: &mut PetEi| &mut p.name)
            .def_readwrite_enum("type", |p: &mut PetEi| &mut p.kind)
            .def_readwrite_nested("attr", |p: &mut PetEi| &mut p.attr),
    )?;
    m.nested_enum(
        pet_ei,
        EnumBuilder::new("Kind")
            .value("Dog", Kind::Dog)
            .value("Cat", Kind::Cat)
            .export_values(),
    )?;
    m.nested_class(
        pet_ei,
        ClassBuilder::<Attributes>::new("Attributes")
            .init([], |_| Ok(Attributes::default()))
            .def_readwrite("age", |a: &mut Attributes| &mut a.age),
    )?;
    Ok(())
}

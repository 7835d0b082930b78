//! The `mylib` module: one function bound twice plus two attributes.

use crate::binding::{ArgLiteral, Function, ModuleBuilder, Param};
use crate::error::{BindError, BindResult};
use crate::value::{TypeSpec, Value};

/// Sum of two host integers; a sum outside `i64` is a `TypeError`.
pub fn add(i: i64, j: i64) -> BindResult<i64> {
    i.checked_add(j)
        .ok_or_else(|| BindError::type_error(format!("{} + {} overflows int64", i, j)))
}

pub fn register(m: &mut ModuleBuilder) -> BindResult<()> {
    m.doc("my pybind11 demo");

    m.def(
        Function::new(
            "add",
            [
                Param::new("i", TypeSpec::Int).default(1),
                Param::new("j", TypeSpec::Int).default(2),
            ],
            |a| add(a.get(0)?, a.get(1)?),
        )
        .doc("A function that adds two numbers")
        .returns(TypeSpec::Int),
    )?;

    m.def(
        Function::new(
            "add_1",
            ["i".with_default(1), "j".with_default(2)],
            |a| add(a.get(0)?, a.get(1)?),
        )
        .returns(TypeSpec::Int),
    )?;

    m.attr("export_attr1", 66)?;
    m.attr("export_attr2", Value::cast("World"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BindingConfig;
    use crate::registry;

    fn module() -> crate::binding::Module {
        registry::build("mylib", register, BindingConfig::default()).unwrap()
    }

    #[test]
    fn test_add_variants_agree() {
        let m = module();
        for (i, j) in [(0, 0), (3, 4), (-7, 2)] {
            let args = [Value::Int(i), Value::Int(j)];
            assert_eq!(m.call("add", &args).unwrap(), Value::Int(i + j));
            assert_eq!(m.call("add_1", &args).unwrap(), Value::Int(i + j));
        }
    }

    #[test]
    fn test_defaults_and_keywords() {
        let m = module();
        assert_eq!(m.call("add", &[]).unwrap(), Value::Int(3));
        assert_eq!(m.call("add_1", &[Value::Int(10)]).unwrap(), Value::Int(12));
        assert_eq!(
            m.call_kw("add", &[], &[("j", Value::Int(5))]).unwrap(),
            Value::Int(6)
        );
    }

    #[test]
    fn test_argument_errors() {
        let m = module();
        assert!(matches!(
            m.call_kw("add", &[], &[("k", Value::Int(1))]),
            Err(BindError::Argument(_))
        ));
        assert!(matches!(
            m.call("add", &[Value::from("one")]),
            Err(BindError::Type(_))
        ));
    }

    #[test]
    fn test_overflowing_sum_is_type_error() {
        let m = module();
        let args = [Value::Int(i64::MAX), Value::Int(1)];
        assert!(matches!(m.call("add", &args), Err(BindError::Type(_))));
        assert!(matches!(m.call("add_1", &args), Err(BindError::Type(_))));
        assert!(matches!(
            m.call_kw("add_1", &[Value::Int(i64::MIN)], &[("j", Value::Int(-1))]),
            Err(BindError::Type(_))
        ));
        assert_eq!(
            m.call("add", &[Value::Int(i64::MAX), Value::Int(-1)]).unwrap(),
            Value::Int(i64::MAX - 1)
        );
    }

    #[test]
    fn test_attributes_and_doc() {
        let m = module();
        assert_eq!(m.doc(), Some("my pybind11 demo"));
        assert_eq!(m.attr("export_attr1").unwrap(), Value::Int(66));
        assert_eq!(m.attr("export_attr2").unwrap(), Value::from("World"));
        assert_eq!(
            m.functions("add")[0].doc_str(),
            Some("A function that adds two numbers")
        );
        assert_eq!(
            m.functions("add")[0].signature(),
            m.functions("add_1")[0].signature()
        );
    }
}

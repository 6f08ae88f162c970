use std::collections::HashMap;
use std::io::{self, BufRead};

use itertools::Itertools;
use lazy_static::lazy_static;
use maplit::hashmap;

use crate::error::{Error, Result};
use crate::interpreter::Interpreter;
use crate::value::{Builtin, NativeFn, Value};

lazy_static! {
    static ref REGISTRY: HashMap<&'static str, NativeFn> = hashmap! {
        "print" => print as NativeFn,
        "input" => input as NativeFn,
        "len" => len as NativeFn,
        "str" => stringify as NativeFn,
        "int" => to_int as NativeFn,
        "float" => to_float as NativeFn,
    };
}

/// The host-provided callables seeded into every fresh environment.
pub fn all() -> impl Iterator<Item = (&'static str, Builtin)> {
    REGISTRY
        .iter()
        .map(|(&name, &call)| (name, Builtin { name, call }))
}

/// Space-joins the stringified arguments and writes one line to stdout.
fn print(_: &mut Interpreter, args: Vec<Value>) -> Result<Option<Value>> {
    println!("{}", args.iter().map(Value::to_string).join(" "));
    Ok(None)
}

/// Reads one line from the console, without its trailing newline.
fn input(_: &mut Interpreter, _args: Vec<Value>) -> Result<Option<Value>> {
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|err| Error::InputFailed {
            reason: err.to_string(),
        })?;
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(Some(Value::Str(line)))
}

fn len(_: &mut Interpreter, args: Vec<Value>) -> Result<Option<Value>> {
    match single("len", &args)? {
        Value::Str(value) => Ok(Some(Value::Int(value.chars().count() as i64))),
        Value::List(values) => Ok(Some(Value::Int(values.len() as i64))),
        other => Err(Error::NoLength {
            found: other.type_name().to_owned(),
        }),
    }
}

fn stringify(_: &mut Interpreter, args: Vec<Value>) -> Result<Option<Value>> {
    let value = single("str", &args)?;
    Ok(Some(Value::Str(value.to_string())))
}

fn to_int(_: &mut Interpreter, args: Vec<Value>) -> Result<Option<Value>> {
    let value = match single("int", &args)? {
        Value::Int(value) => *value,
        Value::Float(value) => *value as i64,
        Value::Bool(value) => i64::from(*value),
        Value::Str(text) => {
            text.trim()
                .parse::<i64>()
                .map_err(|_| Error::InvalidConversion {
                    target: "int".to_owned(),
                    text: text.clone(),
                })?
        }
        other => {
            return Err(Error::InvalidConversion {
                target: "int".to_owned(),
                text: other.to_string(),
            })
        }
    };
    Ok(Some(Value::Int(value)))
}

fn to_float(_: &mut Interpreter, args: Vec<Value>) -> Result<Option<Value>> {
    let value = match single("float", &args)? {
        Value::Int(value) => *value as f64,
        Value::Float(value) => *value,
        Value::Bool(value) => f64::from(u8::from(*value)),
        Value::Str(text) => {
            text.trim()
                .parse::<f64>()
                .map_err(|_| Error::InvalidConversion {
                    target: "float".to_owned(),
                    text: text.clone(),
                })?
        }
        other => {
            return Err(Error::InvalidConversion {
                target: "float".to_owned(),
                text: other.to_string(),
            })
        }
    };
    Ok(Some(Value::Float(value)))
}

fn single<'a>(name: &str, args: &'a [Value]) -> Result<&'a Value> {
    match args {
        [value] => Ok(value),
        _ => Err(Error::WrongArgumentCount {
            name: name.to_owned(),
            expected: 1,
            got: args.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Category;

    fn call(name: &str, args: Vec<Value>) -> Result<Option<Value>> {
        Interpreter::new().call(name, args)
    }

    #[test]
    fn every_builtin_is_registered() {
        let interp = Interpreter::new();
        for name in &["print", "input", "len", "str", "int", "float"] {
            assert!(
                matches!(interp.environment().get(*name), Some(Value::Builtin(_))),
                "missing builtin {}",
                name
            );
        }
    }

    #[test]
    fn len_of_a_string() {
        assert_eq!(
            call("len", vec![Value::Str("hello".to_owned())]),
            Ok(Some(Value::Int(5)))
        );
        assert_eq!(
            call("len", vec![Value::Str(String::new())]),
            Ok(Some(Value::Int(0)))
        );
    }

    #[test]
    fn len_of_a_number_is_a_type_error() {
        let err = call("len", vec![Value::Int(3)]).unwrap_err();
        assert_eq!(err.category(), Category::Type);
    }

    #[test]
    fn numeric_conversions() {
        assert_eq!(
            call("int", vec![Value::Str(" 42 ".to_owned())]),
            Ok(Some(Value::Int(42)))
        );
        assert_eq!(
            call("int", vec![Value::Float(3.9)]),
            Ok(Some(Value::Int(3)))
        );
        assert_eq!(
            call("float", vec![Value::Str("2.5".to_owned())]),
            Ok(Some(Value::Float(2.5)))
        );
        assert_eq!(call("float", vec![Value::Int(2)]), Ok(Some(Value::Float(2.0))));
    }

    #[test]
    fn non_numeric_text_fails_conversion() {
        let err = call("int", vec![Value::Str("forty-two".to_owned())]).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidConversion {
                target: "int".to_owned(),
                text: "forty-two".to_owned(),
            }
        );
        assert_eq!(err.category(), Category::Value);
    }

    #[test]
    fn stringify_any_value() {
        assert_eq!(
            call("str", vec![Value::Int(7)]),
            Ok(Some(Value::Str("7".to_owned())))
        );
        assert_eq!(
            call("str", vec![Value::Bool(true)]),
            Ok(Some(Value::Str("true".to_owned())))
        );
    }

    #[test]
    fn builtins_take_exactly_one_argument() {
        let err = call("len", vec![]).unwrap_err();
        assert_eq!(
            err,
            Error::WrongArgumentCount {
                name: "len".to_owned(),
                expected: 1,
                got: 0,
            }
        );
    }

    #[test]
    fn print_produces_no_value() {
        assert_eq!(
            call("print", vec![Value::Str("adult".to_owned())]),
            Ok(None)
        );
    }
}

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use itertools::Itertools;

use crate::ast::{CompareOp, Stmt};
use crate::error::{Error, Result};
use crate::interpreter::Interpreter;

/// A user-defined function: parameter names and the body to run when called.
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}

pub type NativeFn = fn(&mut Interpreter, Vec<Value>) -> Result<Option<Value>>;

/// A host-provided callable pre-registered in every environment.
#[derive(Clone, Copy, Debug)]
pub struct Builtin {
    pub name: &'static str,
    pub call: NativeFn,
}

#[derive(Clone, Debug)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Builtin(Builtin),
    Function(Rc<Function>),

    // Not a language value: the ordered collection of non-empty results a
    // program's top-level statements produced.
    List(Vec<Value>),
}

impl Value {
    /// Empty string, zero, and false are falsy; everything else is truthy.
    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            Value::Bool(value) => *value,
            Value::Int(value) => *value != 0,
            Value::Float(value) => *value != 0.0,
            Value::Str(value) => !value.is_empty(),
            _ => true,
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Builtin(_) => "builtin function",
            Value::Function(_) => "function",
            Value::List(_) => "list",
        }
    }

    /// Applies a comparison operator with standard ordering semantics: numeric
    /// for numbers (mixed int/float compares as float), lexicographic for
    /// strings. Comparing incompatible types is a type error.
    pub fn compare(&self, op: CompareOp, other: &Value) -> Result<bool> {
        let ordering = self
            .partial_cmp(other)
            .ok_or_else(|| Error::IncomparableValues {
                op: op.to_string(),
                lhs: self.type_name().to_owned(),
                rhs: other.type_name().to_owned(),
            })?;

        Ok(match op {
            CompareOp::Greater => ordering == Ordering::Greater,
            CompareOp::Less => ordering == Ordering::Less,
            CompareOp::GreaterEqual => ordering != Ordering::Less,
            CompareOp::LessEqual => ordering != Ordering::Greater,
            CompareOp::Equal => ordering == Ordering::Equal,
            CompareOp::NotEqual => ordering != Ordering::Equal,
        })
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(lhs), Value::Int(rhs)) => lhs == rhs,
            (Value::Float(lhs), Value::Float(rhs)) => lhs == rhs,
            (Value::Int(lhs), Value::Float(rhs)) => (*lhs as f64) == *rhs,
            (Value::Float(lhs), Value::Int(rhs)) => *lhs == (*rhs as f64),
            (Value::Str(lhs), Value::Str(rhs)) => lhs == rhs,
            (Value::Bool(lhs), Value::Bool(rhs)) => lhs == rhs,
            (Value::Builtin(lhs), Value::Builtin(rhs)) => lhs.name == rhs.name,
            (Value::Function(lhs), Value::Function(rhs)) => Rc::ptr_eq(lhs, rhs),
            (Value::List(lhs), Value::List(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(lhs), Value::Int(rhs)) => lhs.partial_cmp(rhs),
            (Value::Float(lhs), Value::Float(rhs)) => lhs.partial_cmp(rhs),
            (Value::Int(lhs), Value::Float(rhs)) => (*lhs as f64).partial_cmp(rhs),
            (Value::Float(lhs), Value::Int(rhs)) => lhs.partial_cmp(&(*rhs as f64)),
            (Value::Str(lhs), Value::Str(rhs)) => lhs.partial_cmp(rhs),
            (Value::Bool(lhs), Value::Bool(rhs)) => lhs.partial_cmp(rhs),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{}", value),
            Value::Float(value) => write!(f, "{}", value),
            Value::Str(value) => write!(f, "{}", value),
            Value::Bool(value) => write!(f, "{}", value),
            Value::Builtin(builtin) => write!(f, "<builtin fun {}>", builtin.name),
            Value::Function(function) => write!(
                f,
                "<fun {}({})>",
                function.name,
                function.params.iter().join(", ")
            ),
            Value::List(values) => {
                write!(f, "[{}]", values.iter().map(Value::to_string).join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(!Value::Int(0).truthy());
        assert!(!Value::Float(0.0).truthy());
        assert!(!Value::Str(String::new()).truthy());
        assert!(!Value::Bool(false).truthy());

        assert!(Value::Int(-3).truthy());
        assert!(Value::Str("x".to_owned()).truthy());
        assert!(Value::Bool(true).truthy());
    }

    #[test]
    fn comparisons() {
        let (lhs, rhs) = (Value::Int(20), Value::Int(18));
        assert_eq!(lhs.compare(CompareOp::GreaterEqual, &rhs), Ok(true));
        assert_eq!(lhs.compare(CompareOp::Less, &rhs), Ok(false));

        // Mixed numeric operands compare as floats.
        assert_eq!(Value::Int(2).compare(CompareOp::Equal, &Value::Float(2.0)), Ok(true));

        // Strings order lexicographically.
        let (lhs, rhs) = (Value::Str("abc".to_owned()), Value::Str("abd".to_owned()));
        assert_eq!(lhs.compare(CompareOp::Less, &rhs), Ok(true));
    }

    #[test]
    fn incompatible_comparison_is_a_type_error() {
        let err = Value::Int(1)
            .compare(CompareOp::Greater, &Value::Str("1".to_owned()))
            .unwrap_err();
        assert_eq!(err.category(), crate::error::Category::Type);
    }

    #[test]
    fn display_is_unquoted() {
        assert_eq!(Value::Str("adult".to_owned()).to_string(), "adult");
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::Str("a".to_owned())]).to_string(),
            "[1, a]"
        );
    }
}

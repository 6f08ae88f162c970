#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
pub mod builtins;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod value;

use crate::error::Result;
use crate::interpreter::Interpreter;
use crate::value::Value;

/// Runs one unit of source through the whole pipeline in a fresh environment:
/// text, to tokens, to an AST, to a result value.
pub fn run(source: &str) -> Result<Option<Value>> {
    let tokens = lexer::tokenize(source)?;
    let program = parser::parse(tokens)?;
    Interpreter::new().interpret(&program)
}

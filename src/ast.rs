use std::convert::TryFrom;
use std::fmt;

use itertools::Itertools;

use crate::token::{self, Token};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Greater,
    Less,
    GreaterEqual,
    LessEqual,
    Equal,
    NotEqual,
}

impl TryFrom<token::Kind> for CompareOp {
    type Error = String;

    fn try_from(kind: token::Kind) -> Result<Self, Self::Error> {
        Ok(match kind {
            token::Greater => CompareOp::Greater,
            token::Less => CompareOp::Less,
            token::GreaterEqual => CompareOp::GreaterEqual,
            token::LessEqual => CompareOp::LessEqual,
            token::Equal => CompareOp::Equal,
            token::NotEqual => CompareOp::NotEqual,
            k => return Err(format!("Token kind {:?} is not a comparison operator.", k)),
        })
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted_op = match self {
            CompareOp::Greater => ">",
            CompareOp::Less => "<",
            CompareOp::GreaterEqual => ">=",
            CompareOp::LessEqual => "<=",
            CompareOp::Equal => "==",
            CompareOp::NotEqual => "!=",
        };
        write!(f, "{}", formatted_op)
    }
}

/// The expression grammar is a leaf grammar: literals, identifier references,
/// and a single comparison layer for conditions. There is deliberately no
/// operator-precedence arithmetic.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    Comparison(CompareOp, Box<Expr>, Box<Expr>),
}

impl TryFrom<&Token> for Expr {
    type Error = String;

    fn try_from(tok: &Token) -> Result<Self, Self::Error> {
        Ok(match tok.kind {
            token::Int => Expr::Int(
                tok.text
                    .parse::<i64>()
                    .map_err(|_| format!("Token {} is not a valid integer.", tok))?,
            ),
            token::Float => Expr::Float(
                tok.text
                    .parse::<f64>()
                    .map_err(|_| format!("Token {} is not a valid float.", tok))?,
            ),
            token::Str => Expr::Str(tok.text.clone()),
            token::Identifier => Expr::Ident(tok.text.clone()),
            _ => return Err(format!("Token {} cannot be converted into an expression.", tok)),
        })
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Int(value) => write!(f, "{}", value),
            Expr::Float(value) => write!(f, "{}", value),
            Expr::Str(value) => write!(f, "\"{}\"", value),
            Expr::Ident(name) => write!(f, "{}", name),
            Expr::Comparison(op, lhs, rhs) => write!(f, "({} {} {})", lhs, op, rhs),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Case {
    pub value: Expr,
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Assign(String, Expr),
    If(Expr, Vec<Stmt>, Option<Vec<Stmt>>),
    While(Expr, Vec<Stmt>),
    For(Option<Box<Stmt>>, Option<Expr>, Option<Box<Stmt>>, Vec<Stmt>),
    Switch(Expr, Vec<Case>, Option<Vec<Stmt>>),
    Function(String, Vec<String>, Vec<Stmt>),
    Call(String, Vec<Expr>),
    Return(Option<Expr>),
    Goto(String),
    Break,
    Continue,
}

/// The root of every parse: an ordered sequence of top-level statements.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

fn format_block(stmts: &[Stmt], level: usize) -> String {
    stmts.iter().map(|stmt| stmt.format_level(level)).join("")
}

fn format_braced(stmts: &[Stmt], level: usize) -> String {
    let indent = "  ".repeat(level);
    format!("{{\n{}{}}}", format_block(stmts, level + 1), indent)
}

impl Stmt {
    #[must_use]
    pub fn format(&self) -> String {
        self.format_level(0)
    }

    fn format_level(&self, level: usize) -> String {
        #![allow(clippy::enum_glob_use)]
        use Stmt::*;

        let indent = "  ".repeat(level);
        let stmt = match self {
            Assign(name, expr) => format!("{} = {}", name, expr),
            If(cond, then_block, else_block) => {
                let then_block = format_braced(then_block, level);
                match else_block {
                    Some(else_block) => format!(
                        "if ({}) {} otherwise {}",
                        cond,
                        then_block,
                        format_braced(else_block, level)
                    ),
                    None => format!("if ({}) {}", cond, then_block),
                }
            }
            While(cond, body) => format!("while ({}) {}", cond, format_braced(body, level)),
            For(init, cond, increment, body) => {
                let part = |stmt: &Option<Box<Stmt>>| {
                    stmt.as_ref()
                        .map(|stmt| stmt.format_level(0).trim().to_owned())
                        .unwrap_or_default()
                };
                let cond = cond.as_ref().map(Expr::to_string).unwrap_or_default();
                format!(
                    "for ({}; {}; {}) {}",
                    part(init),
                    cond,
                    part(increment),
                    format_braced(body, level)
                )
            }
            Switch(subject, cases, default) => {
                let inner = "  ".repeat(level + 1);
                let mut body = cases
                    .iter()
                    .map(|case| {
                        format!("{}case {}\n{}", inner, case.value, format_block(&case.body, level + 2))
                    })
                    .join("");
                if let Some(default) = default {
                    body.push_str(&format!("{}default\n{}", inner, format_block(default, level + 2)));
                }
                format!("switch ({}) {{\n{}{}}}", subject, body, indent)
            }
            Function(name, params, body) => format!(
                "fun {}({}) {}",
                name,
                params.iter().join(", "),
                format_braced(body, level)
            ),
            Call(name, args) => {
                format!("{}({})", name, args.iter().map(Expr::to_string).join(", "))
            }
            Return(Some(expr)) => format!("return {}", expr),
            Return(None) => "bailout".to_owned(),
            Goto(label) => format!("goto {}", label),
            Break => "break".to_owned(),
            Continue => "continue".to_owned(),
        };

        format!("{}{}\n", indent, stmt)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.statements
            .iter()
            .try_for_each(|stmt| write!(f, "{}", stmt.format()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_statement() {
        let stmt = Stmt::If(
            Expr::Comparison(
                CompareOp::GreaterEqual,
                Box::new(Expr::Ident("age".to_owned())),
                Box::new(Expr::Int(18)),
            ),
            vec![Stmt::Call("print".to_owned(), vec![Expr::Str("adult".to_owned())])],
            Some(vec![Stmt::Call("print".to_owned(), vec![Expr::Str("minor".to_owned())])]),
        );

        assert_eq!(
            stmt.format(),
            r#"if ((age >= 18)) {
  print("adult")
} otherwise {
  print("minor")
}
"#
        );
    }

    #[test]
    fn format_loops() {
        let stmt = Stmt::While(
            Expr::Int(1),
            vec![Stmt::Assign("x".to_owned(), Expr::Int(2)), Stmt::Break],
        );

        assert_eq!(
            stmt.format(),
            r#"while (1) {
  x = 2
  break
}
"#
        );
    }

    #[test]
    fn literal_conversion() {
        use std::convert::TryInto;

        use crate::token::{Kind, Token};

        let tok = Token::new(Kind::Int, "42", 1, 1);
        let expr: Expr = (&tok).try_into().unwrap();
        assert_eq!(expr, Expr::Int(42));

        let tok = Token::new(Kind::Str, "abc", 1, 1);
        let expr: Expr = (&tok).try_into().unwrap();
        assert_eq!(expr, Expr::Str("abc".to_owned()));

        let tok = Token::new(Kind::LBrace, "{", 1, 1);
        assert!(Expr::try_from(&tok).is_err());
    }
}

use std::convert::TryFrom;

use itertools::Itertools;

use crate::ast::{Case, CompareOp, Expr, Program, Stmt};
use crate::error::{Error, Result};
use crate::token::{self, Kind, Token};

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn current_kind(&self) -> Option<Kind> {
        self.current().map(|tok| tok.kind)
    }

    fn peek_kind(&self) -> Option<Kind> {
        self.tokens.get(self.pos + 1).map(|tok| tok.kind)
    }

    fn check(&self, kind: Kind) -> bool {
        self.current_kind() == Some(kind)
    }

    fn consume(&mut self) -> Result<Token> {
        let tok = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| Error::UnexpectedEnd {
                expected: "another token".to_owned(),
            })?;
        self.pos += 1;
        Ok(tok)
    }

    fn expect(&mut self, kind: Kind) -> Result<Token> {
        match self.current() {
            Some(tok) if tok.kind == kind => self.consume(),
            Some(tok) => Err(Error::UnexpectedToken {
                expected: kind.to_string(),
                found: tok.to_string(),
            }),
            None => Err(Error::UnexpectedEnd {
                expected: kind.to_string(),
            }),
        }
    }

    fn parse_program(&mut self) -> Result<Program> {
        let statements = self.parse_statements()?;
        match self.current() {
            None => Ok(Program { statements }),
            Some(tok) => Err(Error::UnexpectedToken {
                expected: "a statement".to_owned(),
                found: tok.to_string(),
            }),
        }
    }

    /// Parses statements until a block-ending `}` or the end of the stream.
    fn parse_statements(&mut self) -> Result<Vec<Stmt>> {
        let mut stmts = vec![];
        while let Some(kind) = self.current_kind() {
            if kind == token::RBrace {
                break;
            }
            stmts.push(self.parse_statement()?);
        }
        Ok(stmts)
    }

    /// Statement dispatch: the kind of the current token selects the
    /// production. Anything without a registered production is unfamiliar.
    fn parse_statement(&mut self) -> Result<Stmt> {
        let tok = self.current().ok_or_else(|| Error::UnexpectedEnd {
            expected: "a statement".to_owned(),
        })?;

        match tok.kind {
            token::Identifier => self.parse_identifier_statement(),
            token::Fun => self.parse_function(),
            token::If => self.parse_if(),
            token::While => self.parse_while(),
            token::For => self.parse_for(),
            token::Switch => self.parse_switch(),
            token::Return => self.parse_return(),
            token::Goto => self.parse_goto(),
            token::Bailout => {
                self.consume()?;
                Ok(Stmt::Return(None))
            }
            token::Break => {
                self.consume()?;
                Ok(Stmt::Break)
            }
            token::Continue => {
                self.consume()?;
                Ok(Stmt::Continue)
            }
            _ => Err(Error::UnfamiliarToken {
                found: tok.to_string(),
            }),
        }
    }

    /// An identifier opens either an assignment or a call statement; one token
    /// of lookahead decides which.
    fn parse_identifier_statement(&mut self) -> Result<Stmt> {
        match self.peek_kind() {
            Some(token::Assign) => self.parse_assignment(),
            Some(token::LParen) => self.parse_call(),
            _ => {
                let found = match self.tokens.get(self.pos + 1) {
                    Some(tok) => tok.to_string(),
                    None => "end of input".to_owned(),
                };
                Err(Error::UnexpectedToken {
                    expected: describe_kinds(expected_after(token::Identifier)),
                    found,
                })
            }
        }
    }

    fn parse_assignment(&mut self) -> Result<Stmt> {
        let target = self.expect(token::Identifier)?;
        self.expect(token::Assign)?;

        let value = match self.current() {
            Some(tok) if tok.kind.is_literal() || tok.kind == token::Identifier => {
                ensure_assignable(target.kind, tok.kind)?;
                self.parse_expression()?
            }
            found => {
                // A dangling assignment gets a generated remediation hint
                // listing the token kinds that would have been valid here.
                let found = match found {
                    Some(tok) => tok.to_string(),
                    None => "end of input".to_owned(),
                };
                return Err(Error::UnterminatedAssignment {
                    target: target.text,
                    found,
                    suggestion: describe_kinds(expected_after(token::Assign)),
                });
            }
        };

        Ok(Stmt::Assign(target.text, value))
    }

    fn parse_call(&mut self) -> Result<Stmt> {
        let name = self.expect(token::Identifier)?;
        self.expect(token::LParen)?;

        let mut args = vec![];
        if !self.check(token::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.check(token::Comma) {
                    break;
                }
                // A comma must be followed by another argument.
                self.consume()?;
            }
        }
        self.expect(token::RParen)?;

        Ok(Stmt::Call(name.text, args))
    }

    fn parse_if(&mut self) -> Result<Stmt> {
        self.expect(token::If)?;
        self.expect(token::LParen)?;
        let cond = self.parse_condition()?;
        self.expect(token::RParen)?;
        let then_block = self.parse_block()?;

        // A dangling 'otherwise' attaches to the nearest unclosed 'if'.
        let else_block = if self.check(token::Otherwise) {
            self.consume()?;
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Stmt::If(cond, then_block, else_block))
    }

    fn parse_while(&mut self) -> Result<Stmt> {
        self.expect(token::While)?;
        self.expect(token::LParen)?;
        let cond = self.parse_condition()?;
        self.expect(token::RParen)?;
        let body = self.parse_block()?;
        Ok(Stmt::While(cond, body))
    }

    fn parse_for(&mut self) -> Result<Stmt> {
        self.expect(token::For)?;
        self.expect(token::LParen)?;

        let init = if self.check(token::Semicolon) {
            None
        } else {
            Some(Box::new(self.parse_statement()?))
        };
        self.expect(token::Semicolon)?;

        let cond = if self.check(token::Semicolon) {
            None
        } else {
            Some(self.parse_condition()?)
        };
        self.expect(token::Semicolon)?;

        let increment = if self.check(token::RParen) {
            None
        } else {
            Some(Box::new(self.parse_statement()?))
        };
        self.expect(token::RParen)?;

        let body = self.parse_block()?;
        Ok(Stmt::For(init, cond, increment, body))
    }

    fn parse_switch(&mut self) -> Result<Stmt> {
        self.expect(token::Switch)?;
        self.expect(token::LParen)?;
        let subject = self.parse_expression()?;
        self.expect(token::RParen)?;
        self.expect(token::LBrace)?;

        let mut cases = vec![];
        let mut default = None;
        while let Some(kind) = self.current_kind() {
            match kind {
                token::RBrace => break,
                token::Case => {
                    self.consume()?;
                    let value = self.parse_expression()?;
                    cases.push(Case {
                        value,
                        body: self.parse_case_body()?,
                    });
                }
                token::Default => {
                    self.consume()?;
                    default = Some(self.parse_case_body()?);
                }
                _ => {
                    let found = self.consume()?;
                    return Err(Error::UnexpectedToken {
                        expected: "'case' or 'default'".to_owned(),
                        found: found.to_string(),
                    });
                }
            }
        }
        self.expect(token::RBrace)?;

        Ok(Stmt::Switch(subject, cases, default))
    }

    /// A case body runs until the next 'case', 'default', or the switch's
    /// closing brace.
    fn parse_case_body(&mut self) -> Result<Vec<Stmt>> {
        let mut body = vec![];
        while let Some(kind) = self.current_kind() {
            if matches!(kind, token::Case | token::Default | token::RBrace) {
                break;
            }
            body.push(self.parse_statement()?);
        }
        Ok(body)
    }

    fn parse_function(&mut self) -> Result<Stmt> {
        self.expect(token::Fun)?;
        let name = self.expect(token::Identifier)?;
        self.expect(token::LParen)?;

        let mut params = vec![];
        if self.check(token::Identifier) {
            loop {
                params.push(self.expect(token::Identifier)?.text);
                if !self.check(token::Comma) {
                    break;
                }
                self.consume()?;
                if !self.check(token::Identifier) {
                    let found = match self.current() {
                        Some(tok) => tok.to_string(),
                        None => "end of input".to_owned(),
                    };
                    return Err(Error::UnexpectedToken {
                        expected: "a parameter name after ','".to_owned(),
                        found,
                    });
                }
            }
        }
        self.expect(token::RParen)?;

        let body = self.parse_block()?;
        Ok(Stmt::Function(name.text, params, body))
    }

    fn parse_return(&mut self) -> Result<Stmt> {
        self.expect(token::Return)?;

        // Only literal kinds are accepted as a returned value; anything else
        // means a bare return.
        let value = match self.current_kind() {
            Some(kind) if kind.is_literal() => Some(self.parse_expression()?),
            _ => None,
        };
        Ok(Stmt::Return(value))
    }

    fn parse_goto(&mut self) -> Result<Stmt> {
        self.expect(token::Goto)?;
        let label = self.expect(token::Identifier)?;
        Ok(Stmt::Goto(label.text))
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>> {
        self.expect(token::LBrace)?;
        let stmts = self.parse_statements()?;
        self.expect(token::RBrace)?;
        Ok(stmts)
    }

    /// A condition is an expression, optionally followed by one comparison
    /// operator and a second expression. A bare expression gets truthiness
    /// tested at evaluation time.
    fn parse_condition(&mut self) -> Result<Expr> {
        let left = self.parse_expression()?;

        if let Some(kind) = self.current_kind() {
            if let Ok(op) = CompareOp::try_from(kind) {
                self.consume()?;
                let right = self.parse_expression()?;
                return Ok(Expr::Comparison(op, Box::new(left), Box::new(right)));
            }
        }
        Ok(left)
    }

    /// The expression grammar is a leaf grammar: an int, float, or string
    /// literal, or an identifier reference.
    fn parse_expression(&mut self) -> Result<Expr> {
        let tok = self.current().ok_or_else(|| Error::UnexpectedEnd {
            expected: "an expression".to_owned(),
        })?;
        let expr = Expr::try_from(tok).map_err(|_| Error::UnexpectedToken {
            expected: "a literal or an identifier".to_owned(),
            found: tok.to_string(),
        })?;
        self.consume()?;
        Ok(expr)
    }
}

/// An identifier target always accepts a fresh literal kind; any other
/// declared kind must match the assigned kind exactly.
fn ensure_assignable(declared: Kind, assigned: Kind) -> Result<()> {
    if declared == token::Identifier || declared == assigned {
        Ok(())
    } else {
        Err(Error::MismatchedAssignment {
            declared: declared.to_string(),
            assigned: assigned.to_string(),
        })
    }
}

/// The token kinds that are syntactically valid after the given kind. Feeds
/// the remediation hint on dangling assignments.
fn expected_after(kind: Kind) -> &'static [Kind] {
    match kind {
        token::Identifier => &[token::Assign, token::LParen],
        token::Assign => &[token::Identifier, token::Int, token::Float, token::Str],
        _ => &[],
    }
}

fn describe_kinds(kinds: &[Kind]) -> String {
    kinds.iter().map(|kind| kind_example(*kind)).join(", or ")
}

fn kind_example(kind: Kind) -> &'static str {
    match kind {
        token::Identifier => "an identifier naming an existing binding",
        token::Int => "an integer literal such as 42",
        token::Float => "a float literal such as 3.14",
        token::Str => "a string literal such as 'mark'",
        token::Assign => "'='",
        token::LParen => "'('",
        _ => "",
    }
}

/// Recursive descent over the token sequence with one-token lookahead.
/// Consumes the entire stream or fails with the first structural error.
pub fn parse(tokens: Vec<Token>) -> Result<Program> {
    let mut parser = Parser { tokens, pos: 0 };
    parser.parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_source(source: &str) -> Result<Program> {
        parse(tokenize(source).unwrap())
    }

    #[test]
    fn parsing_is_deterministic() {
        let source = "age = 20 if (age >= 18) { print(\"adult\") } otherwise { print(\"minor\") }";
        assert_eq!(parse_source(source), parse_source(source));
    }

    #[test]
    fn literal_round_trip() {
        let program = parse_source("a = 42 b = 3.14 c = 'abc'").unwrap();
        assert_eq!(program.statements, vec![
            Stmt::Assign("a".to_owned(), Expr::Int(42)),
            Stmt::Assign("b".to_owned(), Expr::Float(3.14)),
            Stmt::Assign("c".to_owned(), Expr::Str("abc".to_owned())),
        ]);
    }

    #[test]
    fn if_otherwise_structure() {
        let program = parse_source("if (age >= 18) { x = 1 } otherwise { x = 2 }").unwrap();
        assert_eq!(program.statements, vec![Stmt::If(
            Expr::Comparison(
                CompareOp::GreaterEqual,
                Box::new(Expr::Ident("age".to_owned())),
                Box::new(Expr::Int(18)),
            ),
            vec![Stmt::Assign("x".to_owned(), Expr::Int(1))],
            Some(vec![Stmt::Assign("x".to_owned(), Expr::Int(2))]),
        )]);
    }

    #[test]
    fn empty_blocks_are_not_an_error() {
        let program = parse_source("if (x) {}").unwrap();
        assert_eq!(
            program.statements,
            vec![Stmt::If(Expr::Ident("x".to_owned()), vec![], None)]
        );
    }

    #[test]
    fn switch_structure() {
        let program =
            parse_source("switch (2) { case 1 f(\"one\") case 2 f(\"two\") default f(\"other\") }")
                .unwrap();
        match &program.statements[0] {
            Stmt::Switch(subject, cases, default) => {
                assert_eq!(*subject, Expr::Int(2));
                assert_eq!(cases.len(), 2);
                assert_eq!(cases[1].value, Expr::Int(2));
                assert_eq!(cases[1].body.len(), 1);
                assert!(default.is_some());
            }
            stmt => panic!("expected a switch, got {:?}", stmt),
        }
    }

    #[test]
    fn function_definition_and_call() {
        let program = parse_source("fun greet(name, suffix) { print(name) } greet('bob', '!')").unwrap();
        assert_eq!(program.statements.len(), 2);
        match &program.statements[0] {
            Stmt::Function(name, params, body) => {
                assert_eq!(name, "greet");
                assert_eq!(params, &["name".to_owned(), "suffix".to_owned()]);
                assert_eq!(body.len(), 1);
            }
            stmt => panic!("expected a function definition, got {:?}", stmt),
        }
        assert_eq!(
            program.statements[1],
            Stmt::Call("greet".to_owned(), vec![
                Expr::Str("bob".to_owned()),
                Expr::Str("!".to_owned()),
            ])
        );
    }

    #[test]
    fn for_clauses_are_optional() {
        let program = parse_source("for (;;) { break }").unwrap();
        assert_eq!(
            program.statements,
            vec![Stmt::For(None, None, None, vec![Stmt::Break])]
        );

        let program = parse_source("for (i = 0; i < 10; i = 1) { continue }").unwrap();
        match &program.statements[0] {
            Stmt::For(init, cond, increment, _) => {
                assert!(init.is_some());
                assert!(cond.is_some());
                assert!(increment.is_some());
            }
            stmt => panic!("expected a for loop, got {:?}", stmt),
        }
    }

    #[test]
    fn jump_statements() {
        let program = parse_source("goto start bailout return 5").unwrap();
        assert_eq!(program.statements, vec![
            Stmt::Goto("start".to_owned()),
            Stmt::Return(None),
            Stmt::Return(Some(Expr::Int(5))),
        ]);
    }

    #[test]
    fn dangling_assignment_suggests_alternatives() {
        match parse_source("x =").unwrap_err() {
            Error::UnterminatedAssignment {
                target,
                found,
                suggestion,
            } => {
                assert_eq!(target, "x");
                assert_eq!(found, "end of input");
                assert!(suggestion.contains("integer literal"));
                assert!(suggestion.contains("string literal"));
            }
            err => panic!("expected an unterminated assignment, got {:?}", err),
        }

        // An operator after '=' is just as dangling as nothing at all.
        assert!(matches!(
            parse_source("x = >=").unwrap_err(),
            Error::UnterminatedAssignment { .. }
        ));
    }

    #[test]
    fn unfamiliar_token_has_no_production() {
        let err = parse_source("++").unwrap_err();
        assert!(matches!(err, Error::UnfamiliarToken { .. }));
        assert_eq!(err.category(), crate::error::Category::Syntax);
    }

    #[test]
    fn trailing_commas_are_rejected() {
        assert!(matches!(
            parse_source("f(1,)").unwrap_err(),
            Error::UnexpectedToken { .. }
        ));
        assert!(matches!(
            parse_source("fun f(a,) {}").unwrap_err(),
            Error::UnexpectedToken { .. }
        ));
    }

    #[test]
    fn empty_source_is_an_empty_program() {
        assert_eq!(parse_source("").unwrap(), Program::default());
    }
}

use std::rc::Rc;

use im::HashMap;

use crate::ast::{CompareOp, Expr, Program, Stmt};
use crate::builtins;
use crate::error::{Error, Result};
use crate::value::{Function, Value};

/// Non-local control flow unwinding through statement execution.
enum Branch {
    Return(Option<Value>),
    Break,
    Continue,
    Goto(String),
    Throw(Error),
}

impl From<Error> for Branch {
    fn from(err: Error) -> Self {
        Branch::Throw(err)
    }
}

type Exec<T> = std::result::Result<T, Branch>;

/// Walks the AST depth-first, left-to-right, against a single flat
/// name-to-value environment seeded with the builtins.
pub struct Interpreter {
    env: HashMap<String, Value>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    #[must_use]
    pub fn new() -> Self {
        let mut env = HashMap::new();
        for (name, builtin) in builtins::all() {
            env.insert(name.to_owned(), Value::Builtin(builtin));
        }
        Interpreter { env }
    }

    /// The current name-to-value bindings, builtins included.
    #[must_use]
    pub fn environment(&self) -> &HashMap<String, Value> {
        &self.env
    }

    /// Executes each top-level statement in order, collecting the non-empty
    /// results into an ordered list.
    pub fn interpret(&mut self, program: &Program) -> Result<Option<Value>> {
        match self.execute_body(&program.statements) {
            Ok(result) => Ok(result),
            Err(Branch::Return(value)) => Ok(value),
            Err(Branch::Throw(err)) => Err(err),
            Err(Branch::Break) => Err(Error::BreakOutsideLoop),
            Err(Branch::Continue) => Err(Error::ContinueOutsideLoop),
            Err(Branch::Goto(label)) => Err(Error::UnknownLabel { label }),
        }
    }

    fn execute_body(&mut self, stmts: &[Stmt]) -> Exec<Option<Value>> {
        let mut results = vec![];
        let mut index = 0;
        while index < stmts.len() {
            match self.execute(&stmts[index]) {
                Ok(Some(value)) => results.push(value),
                Ok(None) => (),
                // A goto resolves against the labelled statements of this
                // sequence first, then keeps unwinding outward.
                Err(Branch::Goto(label)) => match find_label(stmts, &label) {
                    Some(target) => {
                        index = target;
                        continue;
                    }
                    None => return Err(Branch::Goto(label)),
                },
                Err(branch) => return Err(branch),
            }
            index += 1;
        }

        Ok(if results.is_empty() {
            None
        } else {
            Some(Value::List(results))
        })
    }

    fn execute(&mut self, stmt: &Stmt) -> Exec<Option<Value>> {
        match stmt {
            Stmt::Assign(name, expr) => {
                let value = self.evaluate(expr)?;
                self.env.insert(name.clone(), value.clone());
                Ok(Some(value))
            }

            Stmt::If(cond, then_block, else_block) => {
                if self.eval_condition(cond)? {
                    self.execute_body(then_block)
                } else if let Some(else_block) = else_block {
                    self.execute_body(else_block)
                } else {
                    Ok(None)
                }
            }

            Stmt::While(cond, body) => {
                while self.eval_condition(cond)? {
                    match self.execute_body(body) {
                        Err(Branch::Break) => break,
                        Err(Branch::Continue) | Ok(_) => (),
                        Err(branch) => return Err(branch),
                    }
                }
                Ok(None)
            }

            Stmt::For(init, cond, increment, body) => {
                if let Some(init) = init {
                    self.execute(init)?;
                }
                loop {
                    let proceed = match cond {
                        Some(cond) => self.eval_condition(cond)?,
                        None => true,
                    };
                    if !proceed {
                        break;
                    }

                    match self.execute_body(body) {
                        Err(Branch::Break) => break,
                        // 'continue' still runs the increment clause.
                        Err(Branch::Continue) | Ok(_) => (),
                        Err(branch) => return Err(branch),
                    }
                    if let Some(increment) = increment {
                        self.execute(increment)?;
                    }
                }
                Ok(None)
            }

            Stmt::Switch(subject, cases, default) => {
                let subject = self.evaluate(subject)?;
                for case in cases {
                    let value = self.evaluate(&case.value)?;
                    if subject.compare(CompareOp::Equal, &value)? {
                        return self.execute_body(&case.body);
                    }
                }
                match default {
                    Some(default) => self.execute_body(default),
                    None => Ok(None),
                }
            }

            Stmt::Function(name, params, body) => {
                let function = Function {
                    name: name.clone(),
                    params: params.clone(),
                    body: body.clone(),
                };
                self.env.insert(name.clone(), Value::Function(Rc::new(function)));
                Ok(None)
            }

            Stmt::Call(name, args) => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.evaluate(arg)?);
                }
                Ok(self.call(name, values)?)
            }

            Stmt::Return(expr) => {
                let value = match expr {
                    Some(expr) => Some(self.evaluate(expr)?),
                    None => None,
                };
                Err(Branch::Return(value))
            }

            Stmt::Goto(label) => Err(Branch::Goto(label.clone())),
            Stmt::Break => Err(Branch::Break),
            Stmt::Continue => Err(Branch::Continue),
        }
    }

    /// Resolves a callee name and invokes it with already-evaluated arguments.
    pub fn call(&mut self, name: &str, args: Vec<Value>) -> Result<Option<Value>> {
        match self.env.get(name).cloned() {
            Some(Value::Builtin(builtin)) => (builtin.call)(self, args),
            Some(Value::Function(function)) => self.call_function(&function, args),
            Some(_) => Err(Error::NotCallable {
                name: name.to_owned(),
            }),
            None => Err(Error::UndefinedName {
                name: name.to_owned(),
            }),
        }
    }

    fn call_function(&mut self, function: &Function, args: Vec<Value>) -> Result<Option<Value>> {
        if args.len() != function.params.len() {
            return Err(Error::WrongArgumentCount {
                name: function.name.clone(),
                expected: function.params.len(),
                got: args.len(),
            });
        }

        // Parameters shadow existing bindings for the duration of the call;
        // every other assignment the body makes persists in the flat
        // environment.
        let shadowed: Vec<(String, Option<Value>)> = function
            .params
            .iter()
            .map(|param| (param.clone(), self.env.get(param).cloned()))
            .collect();
        for (param, arg) in function.params.iter().zip(args) {
            self.env.insert(param.clone(), arg);
        }

        let outcome = self.execute_body(&function.body);

        for (param, previous) in shadowed {
            match previous {
                Some(value) => {
                    self.env.insert(param, value);
                }
                None => {
                    self.env.remove(&param);
                }
            }
        }

        match outcome {
            Ok(_) => Ok(None),
            Err(Branch::Return(value)) => Ok(value),
            Err(Branch::Throw(err)) => Err(err),
            Err(Branch::Break) => Err(Error::BreakOutsideLoop),
            Err(Branch::Continue) => Err(Error::ContinueOutsideLoop),
            // A goto never crosses a call boundary.
            Err(Branch::Goto(label)) => Err(Error::UnknownLabel { label }),
        }
    }

    fn evaluate(&self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Int(value) => Ok(Value::Int(*value)),
            Expr::Float(value) => Ok(Value::Float(*value)),
            Expr::Str(value) => Ok(Value::Str(value.clone())),
            Expr::Ident(name) => {
                self.env
                    .get(name)
                    .cloned()
                    .ok_or_else(|| Error::UndefinedName { name: name.clone() })
            }
            Expr::Comparison(op, lhs, rhs) => {
                let (lhs, rhs) = (self.evaluate(lhs)?, self.evaluate(rhs)?);
                lhs.compare(*op, &rhs).map(Value::Bool)
            }
        }
    }

    fn eval_condition(&self, cond: &Expr) -> Result<bool> {
        match cond {
            Expr::Comparison(op, lhs, rhs) => {
                let (lhs, rhs) = (self.evaluate(lhs)?, self.evaluate(rhs)?);
                lhs.compare(*op, &rhs)
            }
            expr => Ok(self.evaluate(expr)?.truthy()),
        }
    }
}

/// A function definition is the one statement form that carries a name, so it
/// doubles as the jump target for goto.
fn find_label(stmts: &[Stmt], label: &str) -> Option<usize> {
    stmts
        .iter()
        .position(|stmt| matches!(stmt, Stmt::Function(name, _, _) if name == label))
}

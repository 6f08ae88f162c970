use std::fmt;

use thiserror::Error;

/// Broad error classes per the language's diagnostics contract. Lexical and
/// syntax errors abort the current run; the runtime classes let a host react
/// differently to bad types, unknown names, and failed conversions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Lexical,
    Syntax,
    Type,
    Name,
    Value,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Lexical => "lexical error",
            Category::Syntax => "syntax error",
            Category::Type => "type error",
            Category::Name => "name error",
            Category::Value => "value error",
        };
        write!(f, "{}", name)
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum Error {
    // Lexical
    #[error("illegal symbol '{symbol}' at line {line} col {column}")]
    IllegalSymbol {
        symbol: char,
        line: usize,
        column: usize,
    },
    #[error("unterminated string literal starting at line {line} col {column}")]
    UnterminatedString { line: usize, column: usize },

    // Syntax
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEnd { expected: String },
    #[error("the parser is unfamiliar with {found}")]
    UnfamiliarToken { found: String },
    #[error("unterminated assignment to '{target}': {found} cannot follow '='\nsuggestion: {suggestion}")]
    UnterminatedAssignment {
        target: String,
        found: String,
        suggestion: String,
    },

    // Type
    #[error("cannot assign a value of kind {assigned} to a target of kind {declared}")]
    MismatchedAssignment { declared: String, assigned: String },
    #[error("cannot compare {lhs} {op} {rhs}: incompatible types")]
    IncomparableValues {
        op: String,
        lhs: String,
        rhs: String,
    },
    #[error("'{name}' is not callable")]
    NotCallable { name: String },
    #[error("value of type {found} has no length")]
    NoLength { found: String },

    // Name
    #[error("name '{name}' is not defined")]
    UndefinedName { name: String },
    #[error("no statement carries the label '{label}'")]
    UnknownLabel { label: String },

    // Value
    #[error("cannot convert {text:?} to {target}")]
    InvalidConversion { target: String, text: String },
    #[error("'{name}' takes {expected} argument(s), got {got}")]
    WrongArgumentCount {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("'break' outside of a loop")]
    BreakOutsideLoop,
    #[error("'continue' outside of a loop")]
    ContinueOutsideLoop,
    #[error("failed to read from input: {reason}")]
    InputFailed { reason: String },
}

impl Error {
    #[must_use]
    pub fn category(&self) -> Category {
        use Error::*;

        match self {
            IllegalSymbol { .. } | UnterminatedString { .. } => Category::Lexical,
            UnexpectedToken { .. }
            | UnexpectedEnd { .. }
            | UnfamiliarToken { .. }
            | UnterminatedAssignment { .. } => Category::Syntax,
            MismatchedAssignment { .. }
            | IncomparableValues { .. }
            | NotCallable { .. }
            | NoLength { .. } => Category::Type,
            UndefinedName { .. } | UnknownLabel { .. } => Category::Name,
            InvalidConversion { .. }
            | WrongArgumentCount { .. }
            | BreakOutsideLoop
            | ContinueOutsideLoop
            | InputFailed { .. } => Category::Value,
        }
    }

    /// True for conditions the pipeline never recovers from, reported with a
    /// non-zero exit code in file mode.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.category() == Category::Lexical
    }
}

pub type Result<T> = std::result::Result<T, Error>;

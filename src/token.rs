use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use maplit::hashmap;

#[rustfmt::skip]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Identifier, Int, Float, Str,

    Plus, Minus, Star, Slash,
    PlusPlus, MinusMinus,
    PlusAssign, MinusAssign, StarAssign, SlashAssign,

    Greater, Less, GreaterEqual, LessEqual, Equal, NotEqual,
    Assign,
    Ampersand, DoubleAmpersand,

    LParen, RParen,
    LBrace, RBrace,
    Semicolon, Comma,

    // Keywords
    Fun, If, Otherwise, While, For, Return, Goto, Bailout,
    Break, Continue, Switch, Case, Default,
}

pub use Kind::*;

impl Kind {
    /// The literal kinds an assignment or return value may carry.
    #[must_use]
    pub fn is_literal(self) -> bool {
        matches!(self, Int | Float | Str)
    }

    #[must_use]
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Greater | Less | GreaterEqual | LessEqual | Equal | NotEqual
        )
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Identifier => "identifier",
            Int => "integer literal",
            Float => "float literal",
            Str => "string literal",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            PlusPlus => "'++'",
            MinusMinus => "'--'",
            PlusAssign => "'+='",
            MinusAssign => "'-='",
            StarAssign => "'*='",
            SlashAssign => "'/='",
            Greater => "'>'",
            Less => "'<'",
            GreaterEqual => "'>='",
            LessEqual => "'<='",
            Equal => "'=='",
            NotEqual => "'!='",
            Assign => "'='",
            Ampersand => "'&'",
            DoubleAmpersand => "'&&'",
            LParen => "'('",
            RParen => "')'",
            LBrace => "'{'",
            RBrace => "'}'",
            Semicolon => "';'",
            Comma => "','",
            Fun => "'fun'",
            If => "'if'",
            Otherwise => "'otherwise'",
            While => "'while'",
            For => "'for'",
            Return => "'return'",
            Goto => "'goto'",
            Bailout => "'bailout'",
            Break => "'break'",
            Continue => "'continue'",
            Switch => "'switch'",
            Case => "'case'",
            Default => "'default'",
        };
        write!(f, "{}", name)
    }
}

lazy_static! {
    pub static ref KEYWORDS: HashMap<&'static str, Kind> = hashmap! {
        "if" => If,
        "fun" => Fun,
        "for" => For,
        "goto" => Goto,
        "case" => Case,
        "while" => While,
        "break" => Break,
        "return" => Return,
        "switch" => Switch,
        "bailout" => Bailout,
        "default" => Default,
        "continue" => Continue,
        "otherwise" => Otherwise,
    };
}

/// A classified lexical unit. Immutable once the lexer has produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: Kind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: Kind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' ({}) at line {} col {}",
            self.text, self.kind, self.line, self.column
        )
    }
}

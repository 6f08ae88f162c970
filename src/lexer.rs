use crate::error::{Error, Result};
use crate::token::{self, Token, KEYWORDS};

struct Lexer<'a> {
    src: &'a [char],
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn next_token(&mut self) -> Result<Option<Token>> {
        // Skip leading comments or whitespace.
        loop {
            match self.src {
                ['/', '*', ..] => self.skip_bulk_comment(),
                ['#', ..] => self.skip_line_comment(),
                [c, ..] if c.is_ascii_whitespace() => self.skip_whitespace(),
                _ => break,
            }
        }

        let (line, column) = (self.line, self.column);

        // Two-character operators are greedy: they must win over their
        // one-character prefixes, so they are matched first.
        let kind = match self.src {
            ['+', '+', ..] => token::PlusPlus,
            ['-', '-', ..] => token::MinusMinus,
            ['+', '=', ..] => token::PlusAssign,
            ['-', '=', ..] => token::MinusAssign,
            ['*', '=', ..] => token::StarAssign,
            ['/', '=', ..] => token::SlashAssign,
            ['>', '=', ..] => token::GreaterEqual,
            ['<', '=', ..] => token::LessEqual,
            ['=', '=', ..] => token::Equal,
            ['!', '=', ..] => token::NotEqual,
            ['&', '&', ..] => token::DoubleAmpersand,

            ['"', ..] | ['\'', ..] => return self.scan_string().map(Some),
            [c, ..] if c.is_alphanumeric() || *c == '_' => return Ok(Some(self.scan_word())),

            ['>', ..] => token::Greater,
            ['<', ..] => token::Less,
            ['+', ..] => token::Plus,
            ['-', ..] => token::Minus,
            ['*', ..] => token::Star,
            ['/', ..] => token::Slash,
            ['=', ..] => token::Assign,
            ['&', ..] => token::Ampersand,
            ['(', ..] => token::LParen,
            [')', ..] => token::RParen,
            ['{', ..] => token::LBrace,
            ['}', ..] => token::RBrace,
            [';', ..] => token::Semicolon,
            [',', ..] => token::Comma,

            [c, ..] => {
                return Err(Error::IllegalSymbol {
                    symbol: *c,
                    line,
                    column,
                })
            }
            [] => return Ok(None),
        };

        let length = match kind {
            token::PlusPlus
            | token::MinusMinus
            | token::PlusAssign
            | token::MinusAssign
            | token::StarAssign
            | token::SlashAssign
            | token::GreaterEqual
            | token::LessEqual
            | token::Equal
            | token::NotEqual
            | token::DoubleAmpersand => 2,
            _ => 1,
        };
        let text = self.src[..length].iter().collect::<String>();
        self.advance(length);

        Ok(Some(Token::new(kind, text, line, column)))
    }

    fn advance(&mut self, count: usize) {
        for &c in &self.src[..count] {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.src = &self.src[count..];
    }

    fn skip_whitespace(&mut self) {
        let length = self
            .src
            .iter()
            .take_while(|c| c.is_ascii_whitespace())
            .count();
        self.advance(length);
    }

    /// A `#` tag discards everything up to the end of the line.
    fn skip_line_comment(&mut self) {
        let length = self.src.iter().take_while(|&&c| c != '\n').count();
        self.advance(length);
    }

    /// A `/* ... */` pair discards everything up to and including the closing
    /// pair; a comment left open runs to the end of the input.
    fn skip_bulk_comment(&mut self) {
        let mut length = 2;
        while length < self.src.len() {
            if let ['*', '/', ..] = &self.src[length..] {
                length += 2;
                break;
            }
            length += 1;
        }
        self.advance(length.min(self.src.len()));
    }

    fn scan_string(&mut self) -> Result<Token> {
        let (line, column) = (self.line, self.column);
        let quote = self.src[0];

        let mut size = 1;
        loop {
            match self.src.get(size) {
                Some(&c) if c == quote => break,
                Some('\n') | None => {
                    return Err(Error::UnterminatedString { line, column });
                }
                Some(_) => size += 1,
            }
        }

        let text = self.src[1..size].iter().collect::<String>();
        self.advance(size + 1);
        Ok(Token::new(token::Str, text, line, column))
    }

    fn scan_word(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let word = self
            .src
            .iter()
            .take_while(|&&c| c.is_alphanumeric() || c == '_')
            .collect::<String>();
        let mut length = word.chars().count();

        let kind = if let Some(&keyword) = KEYWORDS.get(word.as_str()) {
            keyword
        } else if word.chars().all(|c| c.is_ascii_digit()) {
            // A digit run followed by '.' and more digits is a float literal.
            match &self.src[length..] {
                ['.', c, ..] if c.is_ascii_digit() => {
                    let fraction = self.src[length + 1..]
                        .iter()
                        .take_while(|c| c.is_ascii_digit())
                        .count();
                    length += 1 + fraction;
                    token::Float
                }
                _ => token::Int,
            }
        } else {
            token::Identifier
        };

        let text = self.src[..length].iter().collect::<String>();
        self.advance(length);
        Token::new(kind, text, line, column)
    }
}

/// Turns raw source text into an ordered token sequence. Comments never reach
/// the output stream, and any lexical failure aborts the whole run.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let src = source.trim().chars().collect::<Vec<_>>();
    let mut lexer = Lexer {
        src: &src,
        line: 1,
        column: 1,
    };

    let mut tokens = vec![];
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Kind;

    fn kinds(source: &str) -> Vec<Kind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|tok| tok.kind)
            .collect()
    }

    #[test]
    fn pair_operators_are_greedy() {
        assert_eq!(kinds(">="), vec![Kind::GreaterEqual]);
        assert_eq!(kinds("x>=18"), vec![Kind::Identifier, Kind::GreaterEqual, Kind::Int]);
        assert_eq!(kinds("++ -- += == &&"), vec![
            Kind::PlusPlus,
            Kind::MinusMinus,
            Kind::PlusAssign,
            Kind::Equal,
            Kind::DoubleAmpersand,
        ]);
        // '>' followed by something other than '=' stays a single token.
        assert_eq!(kinds("> ="), vec![Kind::Greater, Kind::Assign]);
    }

    #[test]
    fn keywords_never_lex_as_identifiers() {
        assert_eq!(kinds("if otherwise fun bailout"), vec![
            Kind::If,
            Kind::Otherwise,
            Kind::Fun,
            Kind::Bailout,
        ]);
        // A keyword embedded in a longer word is a plain identifier.
        assert_eq!(kinds("iffy"), vec![Kind::Identifier]);
    }

    #[test]
    fn numbers_and_identifiers() {
        assert_eq!(kinds("42"), vec![Kind::Int]);
        assert_eq!(kinds("3.14"), vec![Kind::Float]);
        assert_eq!(kinds("under_score2"), vec![Kind::Identifier]);

        let tokens = tokenize("3.14").unwrap();
        assert_eq!(tokens[0].text, "3.14");
    }

    #[test]
    fn string_literals() {
        let tokens = tokenize("'abc' \"\"").unwrap();
        assert_eq!(tokens[0].kind, Kind::Str);
        assert_eq!(tokens[0].text, "abc");
        assert_eq!(tokens[1].kind, Kind::Str);
        assert_eq!(tokens[1].text, "");
    }

    #[test]
    fn unterminated_string_is_fatal() {
        assert_eq!(
            tokenize("x = \"oops"),
            Err(Error::UnterminatedString { line: 1, column: 5 })
        );
        assert_eq!(
            tokenize("\"broken\nby a newline\""),
            Err(Error::UnterminatedString { line: 1, column: 1 })
        );
    }

    #[test]
    fn comments_are_discarded() {
        assert_eq!(kinds("# a line comment\nx = 1"), vec![
            Kind::Identifier,
            Kind::Assign,
            Kind::Int,
        ]);
        assert_eq!(kinds("a /* bulk\ncomment */ b"), vec![
            Kind::Identifier,
            Kind::Identifier,
        ]);
        // An open bulk comment swallows the rest of the input.
        assert_eq!(kinds("a /* never closed"), vec![Kind::Identifier]);
    }

    #[test]
    fn illegal_symbol_reports_location() {
        assert_eq!(
            tokenize("x = 1\ny = @"),
            Err(Error::IllegalSymbol {
                symbol: '@',
                line: 2,
                column: 5,
            })
        );
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert_eq!(tokenize(""), Ok(vec![]));
        assert_eq!(tokenize("   \n\t  "), Ok(vec![]));
    }

    #[test]
    fn locations_track_lines_and_columns() {
        let tokens = tokenize("x = 1\n  y = 2").unwrap();
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[3].line, tokens[3].column), (2, 3));
    }
}

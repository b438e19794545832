use super::token::{Token, TokenKind};
use crate::error::{Error, Result};

/// Scanner for S-expression source text
///
/// Produces tokens on demand through [`SExprScanner::next_token`], so a reader
/// can stop after one complete form and hand back the untouched remainder.
pub struct SExprScanner {
    /// Source code as character vector
    source: Vec<char>,
    /// Start position of current token
    start: usize,
    /// Current position in source
    current: usize,
    /// Byte offset matching `current`
    byte_pos: usize,
    /// Current line number (1-indexed)
    line: usize,
    /// Current column number (1-indexed)
    column: usize,
    /// Line where the current token starts
    start_line: usize,
    /// Column where the current token starts
    start_column: usize,
}

impl SExprScanner {
    /// Creates a new S-expression scanner from source code
    pub fn new(source: &str) -> Self {
        SExprScanner {
            source: source.chars().collect(),
            start: 0,
            current: 0,
            byte_pos: 0,
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
        }
    }

    /// Scans all tokens from source code and returns them as a vector
    ///
    /// The final token is always [`TokenKind::Eof`].
    pub fn scan_tokens(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Scans the next token, skipping whitespace, commas and comments
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_separators();
        self.start = self.current;
        self.start_line = self.line;
        self.start_column = self.column;

        if self.is_at_end() {
            return Ok(self.make_token(TokenKind::Eof));
        }

        let c = self.advance();
        let kind = match c {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,

            '\'' => TokenKind::Quote,
            '`' => TokenKind::Backtick,
            '@' => TokenKind::At,
            '~' => {
                if self.match_char('@') {
                    TokenKind::TildeAt
                } else {
                    TokenKind::Tilde
                }
            }
            '#' => self.scan_dispatch()?,

            '"' => TokenKind::String(self.scan_string()?),
            ':' => self.scan_keyword()?,

            _ => self.scan_atom(c)?,
        };

        Ok(self.make_token(kind))
    }

    fn skip_separators(&mut self) {
        while !self.is_at_end() {
            match self.peek() {
                c if c.is_whitespace() || c == ',' => {
                    self.advance();
                }
                ';' => {
                    while !self.is_at_end() && self.peek() != '\n' {
                        self.advance();
                    }
                }
                _ => return,
            }
        }
    }

    fn scan_dispatch(&mut self) -> Result<TokenKind> {
        match self.peek() {
            '(' => {
                self.advance();
                Ok(TokenKind::HashParen)
            }
            '_' => {
                self.advance();
                Ok(TokenKind::HashUnderscore)
            }
            '"' => {
                self.advance();
                self.scan_regex()
            }
            '#' => {
                self.advance();
                let name = self.take_symbol_chars();
                match name.as_str() {
                    "Inf" => Ok(TokenKind::Float(f64::INFINITY)),
                    "-Inf" => Ok(TokenKind::Float(f64::NEG_INFINITY)),
                    "NaN" => Ok(TokenKind::Float(f64::NAN)),
                    _ => Err(self.error(format!("Unknown symbolic value ##{}", name))),
                }
            }
            '\0' if self.is_at_end() => Err(self.error("Unexpected end of input after #")),
            other => Err(self.error(format!("Unsupported dispatch macro #{}", other))),
        }
    }

    fn scan_string(&mut self) -> Result<String> {
        let mut value = String::new();

        while !self.is_at_end() && self.peek() != '"' {
            let c = self.advance();
            if c != '\\' {
                value.push(c);
                continue;
            }
            if self.is_at_end() {
                break;
            }
            let escaped = self.advance();
            match escaped {
                'n' => value.push('\n'),
                't' => value.push('\t'),
                'r' => value.push('\r'),
                '0' => value.push('\0'),
                '\\' => value.push('\\'),
                '"' => value.push('"'),
                _ => {
                    return Err(self.error(format!("Invalid escape sequence \\{}", escaped)));
                }
            }
        }

        if self.is_at_end() {
            return Err(self.error("Unterminated string"));
        }
        self.advance(); // Closing "
        Ok(value)
    }

    // Pattern text is kept raw; escapes belong to the regex engine.
    fn scan_regex(&mut self) -> Result<TokenKind> {
        let mut pattern = String::new();

        while !self.is_at_end() && self.peek() != '"' {
            let c = self.advance();
            pattern.push(c);
            if c == '\\' && !self.is_at_end() {
                pattern.push(self.advance());
            }
        }

        if self.is_at_end() {
            return Err(self.error("Unterminated regex literal"));
        }
        self.advance(); // Closing "
        Ok(TokenKind::Regex(pattern))
    }

    fn scan_keyword(&mut self) -> Result<TokenKind> {
        let name = self.take_symbol_chars();
        if name.is_empty() {
            return Err(self.error("Keyword must have a name"));
        }
        Ok(TokenKind::Keyword(name))
    }

    fn scan_atom(&mut self, first: char) -> Result<TokenKind> {
        let mut text = String::new();
        text.push(first);
        text.push_str(&self.take_symbol_chars());

        let numeric_start = first.is_ascii_digit()
            || (matches!(first, '+' | '-') && text[1..].starts_with(|c: char| c.is_ascii_digit()));
        if numeric_start {
            return self.parse_number(&text);
        }

        Ok(match text.as_str() {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "nil" => TokenKind::Nil,
            _ => TokenKind::Symbol(text),
        })
    }

    fn parse_number(&self, text: &str) -> Result<TokenKind> {
        if let Ok(n) = text.parse::<i64>() {
            return Ok(TokenKind::Integer(n));
        }
        // Integer literals too large for i64 fall back to floats
        let float_chars = |c: char| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-');
        if text.chars().all(float_chars) {
            if let Ok(f) = text.parse::<f64>() {
                return Ok(TokenKind::Float(f));
            }
        }
        Err(self.error(format!("Invalid number: {}", text)))
    }

    fn take_symbol_chars(&mut self) -> String {
        let mut text = String::new();
        while !self.is_at_end() && !is_terminator(self.peek()) {
            text.push(self.advance());
        }
        text
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        self.byte_pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.source[self.current]
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            false
        } else {
            self.advance();
            true
        }
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        let lexeme: String = self.source[self.start..self.current].iter().collect();
        Token::new(kind, lexeme, self.start_line, self.start_column, self.byte_pos)
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::SyntaxError {
            line: self.start_line,
            col: self.start_column,
            message: message.into(),
        }
    }
}

/// Characters that end a symbol, keyword or number
fn is_terminator(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            ',' | '(' | ')' | '[' | ']' | '{' | '}' | '"' | ';' | '\'' | '`' | '~' | '@'
        )
}

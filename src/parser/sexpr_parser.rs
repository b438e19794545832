use std::rc::Rc;

use crate::error::{Error, Result};
use crate::lexer::{SExprScanner, Token, TokenKind};
use crate::runtime::{with_stack, Value};

/// Deepest nesting of forms the reader accepts
pub const MAX_NESTING: usize = 10_000;

/// S-expression reader
///
/// Pulls tokens from an [`SExprScanner`] one at a time and assembles them into
/// forms. Reader macros are desugared here, so the evaluator only ever sees
/// plain lists: `'x` becomes `(quote x)`, `@x` becomes `(deref x)`, and so on.
pub struct SExprParser {
    scanner: SExprScanner,
    peeked: Option<Token>,
    /// Byte offset just past the last token handed out
    consumed: usize,
    /// Forms currently open around the reader position
    depth: usize,
}

impl SExprParser {
    /// Creates a new reader over `source`
    pub fn new(source: &str) -> Self {
        SExprParser {
            scanner: SExprScanner::new(source),
            peeked: None,
            consumed: 0,
            depth: 0,
        }
    }

    /// Reads the next top-level form, or `None` once only whitespace and
    /// comments remain.
    pub fn parse_form(&mut self) -> Result<Option<Value>> {
        if self.peek()?.kind == TokenKind::Eof {
            return Ok(None);
        }
        self.parse_expression().map(Some)
    }

    /// Byte offset of the first unread character
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// True when nothing but whitespace and comments is left
    pub fn at_end(&mut self) -> Result<bool> {
        Ok(self.peek()?.kind == TokenKind::Eof)
    }

    fn parse_expression(&mut self) -> Result<Value> {
        if self.depth >= MAX_NESTING {
            let token = self.peek()?;
            return Err(Self::error_at(
                token,
                format!("Forms nested deeper than {} levels", MAX_NESTING),
            ));
        }
        self.depth += 1;
        let result = with_stack(|| self.parse_token());
        self.depth -= 1;
        result
    }

    fn parse_token(&mut self) -> Result<Value> {
        let token = self.advance()?;
        match token.kind {
            TokenKind::LeftParen => Ok(Value::list(self.parse_sequence(&TokenKind::RightParen)?)),
            TokenKind::LeftBracket => {
                Ok(Value::vector(self.parse_sequence(&TokenKind::RightBracket)?))
            }
            TokenKind::LeftBrace => self.parse_map(&token),
            TokenKind::RightParen | TokenKind::RightBracket | TokenKind::RightBrace => {
                Err(Self::error_at(
                    &token,
                    format!("Unbalanced delimiter {}", token.kind.describe()),
                ))
            }

            TokenKind::Quote => self.wrap("quote"),
            TokenKind::Backtick => self.wrap("quasiquote"),
            TokenKind::Tilde => self.wrap("unquote"),
            TokenKind::TildeAt => self.wrap("splice-unquote"),
            TokenKind::At => self.wrap("deref"),
            TokenKind::HashUnderscore => self.wrap("discard"),
            TokenKind::HashParen => {
                let body = Value::list(self.parse_sequence(&TokenKind::RightParen)?);
                Ok(anonymous_fn(body))
            }

            TokenKind::Integer(n) => Ok(Value::Int(n)),
            TokenKind::Float(f) => Ok(Value::Float(f)),
            TokenKind::String(s) => Ok(Value::string(s)),
            TokenKind::Regex(pattern) => {
                let re = regex::Regex::new(&pattern).map_err(|e| Error::InvalidRegex {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })?;
                Ok(Value::Regex(Rc::new(re)))
            }
            TokenKind::True => Ok(Value::Bool(true)),
            TokenKind::False => Ok(Value::Bool(false)),
            TokenKind::Nil => Ok(Value::Nil),
            TokenKind::Keyword(name) => Ok(Value::keyword(name)),
            TokenKind::Symbol(name) => Ok(Value::symbol(name)),

            TokenKind::Eof => Err(Error::UnexpectedEof),
        }
    }

    /// Reads forms up to the matching closing delimiter
    fn parse_sequence(&mut self, close: &TokenKind) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        loop {
            let next = self.peek()?;
            if &next.kind == close {
                self.advance()?;
                return Ok(items);
            }
            if next.kind == TokenKind::Eof {
                let (line, col) = (next.line, next.column);
                return Err(Error::SyntaxError {
                    line,
                    col,
                    message: format!("Unbalanced input: expected {}", close.describe()),
                });
            }
            items.push(self.parse_expression()?);
        }
    }

    fn parse_map(&mut self, open: &Token) -> Result<Value> {
        let items = self.parse_sequence(&TokenKind::RightBrace)?;
        if items.len() % 2 != 0 {
            return Err(Self::error_at(
                open,
                "Map literal must contain an even number of forms",
            ));
        }
        Value::map_from_pairs(&items, "map literal")
    }

    /// `(name <next form>)`
    fn wrap(&mut self, name: &str) -> Result<Value> {
        let next = self.peek()?;
        if next.kind == TokenKind::Eof {
            let (line, col) = (next.line, next.column);
            return Err(Error::SyntaxError {
                line,
                col,
                message: format!("Expected a form after {}", name),
            });
        }
        let form = self.parse_expression()?;
        Ok(Value::list(vec![Value::symbol(name), form]))
    }

    fn peek(&mut self) -> Result<&Token> {
        if self.peeked.is_none() {
            self.peeked = Some(self.scanner.next_token()?);
        }
        match &self.peeked {
            Some(token) => Ok(token),
            None => Err(Error::UnexpectedEof),
        }
    }

    fn advance(&mut self) -> Result<Token> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.scanner.next_token()?,
        };
        if token.kind != TokenKind::Eof {
            self.consumed = token.end;
        }
        Ok(token)
    }

    fn error_at(token: &Token, message: impl Into<String>) -> Error {
        Error::SyntaxError {
            line: token.line,
            col: token.column,
            message: message.into(),
        }
    }
}

/// Builds `(fn [%1 %2 ...] body)` from the body of a `#(...)` literal.
///
/// Placeholders are gathered from the whole body in first-seen order, with
/// duplicates dropped. A `%&` placeholder becomes the rest parameter.
fn anonymous_fn(body: Value) -> Value {
    let mut params = Vec::new();
    let mut rest = false;
    collect_placeholders(&body, &mut params, &mut rest);

    let mut param_forms: Vec<Value> = params.into_iter().map(Value::Symbol).collect();
    if rest {
        param_forms.push(Value::symbol("&"));
        param_forms.push(Value::symbol("%&"));
    }

    Value::list(vec![
        Value::symbol("fn"),
        Value::vector(param_forms),
        body,
    ])
}

fn collect_placeholders(form: &Value, params: &mut Vec<Rc<str>>, rest: &mut bool) {
    with_stack(|| match form {
        Value::Symbol(name) if &**name == "%&" => *rest = true,
        Value::Symbol(name) if is_placeholder(name) => {
            if !params.contains(name) {
                params.push(Rc::clone(name));
            }
        }
        Value::List(items) | Value::Vector(items) => {
            for item in items.iter() {
                collect_placeholders(item, params, rest);
            }
        }
        Value::Map(entries) => {
            for (k, v) in entries.iter() {
                collect_placeholders(k, params, rest);
                collect_placeholders(v, params, rest);
            }
        }
        _ => {}
    })
}

fn is_placeholder(name: &str) -> bool {
    match name.strip_prefix('%') {
        Some("") => true,
        Some(digits) => digits.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}

/// Reads exactly one form from `source`.
///
/// Anything other than whitespace or comments after the form is a syntax
/// error; input with no form at all is [`Error::UnexpectedEof`].
pub fn read_str(source: &str) -> Result<Value> {
    let mut parser = SExprParser::new(source);
    let form = parser.parse_form()?.ok_or(Error::UnexpectedEof)?;
    if !parser.at_end()? {
        let token = parser.peek()?;
        return Err(SExprParser::error_at(
            token,
            format!("Unexpected trailing content starting at {}", token.lexeme),
        ));
    }
    Ok(form)
}

/// Reads the first form of `source` and returns it with the unread remainder
pub fn read_next(source: &str) -> Result<Option<(Value, &str)>> {
    let mut parser = SExprParser::new(source);
    match parser.parse_form()? {
        Some(form) => Ok(Some((form, &source[parser.consumed()..]))),
        None => Ok(None),
    }
}

/// Reads every top-level form in `source`
pub fn read_all(source: &str) -> Result<Vec<Value>> {
    let mut parser = SExprParser::new(source);
    let mut forms = Vec::new();
    while let Some(form) = parser.parse_form()? {
        forms.push(form);
    }
    Ok(forms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str) -> Value {
        Value::symbol(name)
    }

    #[test]
    fn test_simple_list() {
        let form = read_str("(+ 1 2)").unwrap();
        assert_eq!(form, Value::list(vec![sym("+"), Value::Int(1), Value::Int(2)]));
    }

    #[test]
    fn test_nested_collections() {
        let form = read_str("[1 (a) {:k \"v\"}]").unwrap();
        let map = Value::map_from_pairs(&[Value::keyword("k"), Value::string("v")], "t").unwrap();
        assert_eq!(
            form,
            Value::vector(vec![Value::Int(1), Value::list(vec![sym("a")]), map])
        );
    }

    #[test]
    fn test_quote_family() {
        assert_eq!(
            read_str("'x").unwrap(),
            Value::list(vec![sym("quote"), sym("x")])
        );
        assert_eq!(
            read_str("`(a ~b ~@c)").unwrap(),
            Value::list(vec![
                sym("quasiquote"),
                Value::list(vec![
                    sym("a"),
                    Value::list(vec![sym("unquote"), sym("b")]),
                    Value::list(vec![sym("splice-unquote"), sym("c")]),
                ]),
            ])
        );
        assert_eq!(
            read_str("@a").unwrap(),
            Value::list(vec![sym("deref"), sym("a")])
        );
    }

    #[test]
    fn test_anonymous_fn_params_first_seen_and_deduplicated() {
        let form = read_str("#(+ %2 % (* %2 %1))").unwrap();
        let expected = Value::list(vec![
            sym("fn"),
            Value::vector(vec![sym("%2"), sym("%"), sym("%1")]),
            Value::list(vec![
                sym("+"),
                sym("%2"),
                sym("%"),
                Value::list(vec![sym("*"), sym("%2"), sym("%1")]),
            ]),
        ]);
        assert_eq!(form, expected);
    }

    #[test]
    fn test_anonymous_fn_rest_placeholder() {
        let form = read_str("#(apply + %&)").unwrap();
        let items = form.as_sequence().unwrap();
        assert_eq!(
            items[1],
            Value::vector(vec![sym("&"), sym("%&")])
        );
    }

    #[test]
    fn test_regex_literal() {
        match &read_str(r#"#"\d+""#).unwrap() {
            Value::Regex(re) => assert_eq!(re.as_str(), r"\d+"),
            other => panic!("expected regex, got {:?}", other),
        }
        assert!(matches!(
            read_str(r#"#"(""#),
            Err(Error::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_unbalanced_input_is_syntax_error() {
        assert!(matches!(read_str("(1 2"), Err(Error::SyntaxError { .. })));
        assert!(matches!(read_str(")"), Err(Error::SyntaxError { .. })));
        assert!(matches!(read_str("[1 2)"), Err(Error::SyntaxError { .. })));
    }

    #[test]
    fn test_trailing_content_is_syntax_error() {
        assert!(matches!(read_str("(+ 1 2))"), Err(Error::SyntaxError { .. })));
        assert!(matches!(read_str("1 2"), Err(Error::SyntaxError { .. })));
        assert!(read_str("1 ; fine").is_ok());
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(read_str("  ; nothing"), Err(Error::UnexpectedEof)));
        assert!(read_next("").unwrap().is_none());
    }

    #[test]
    fn test_odd_map_literal() {
        assert!(matches!(read_str("{:a}"), Err(Error::SyntaxError { .. })));
    }

    #[test]
    fn test_nesting_limit() {
        match read_str(&"(".repeat(200_000)) {
            Err(Error::SyntaxError { message, .. }) => assert!(message.contains("nested deeper")),
            other => panic!("expected SyntaxError, got {:?}", other),
        }

        let deepest = format!("{}{}", "[".repeat(MAX_NESTING), "]".repeat(MAX_NESTING));
        assert!(read_str(&deepest).is_ok());
        let too_deep = format!("{}{}", "'".repeat(MAX_NESTING), "x");
        assert!(matches!(read_str(&too_deep), Err(Error::SyntaxError { .. })));
    }

    #[test]
    fn test_read_next_returns_remainder() {
        let (form, rest) = read_next("(a b) (c)").unwrap().unwrap();
        assert_eq!(form, Value::list(vec![sym("a"), sym("b")]));
        assert_eq!(rest, " (c)");
        let (form, rest) = read_next(rest).unwrap().unwrap();
        assert_eq!(form, Value::list(vec![sym("c")]));
        assert_eq!(rest, "");
    }

    #[test]
    fn test_read_all() {
        let forms = read_all("1 :a \"s\" ; done").unwrap();
        assert_eq!(
            forms,
            vec![Value::Int(1), Value::keyword("a"), Value::string("s")]
        );
    }
}

//! Reader and evaluator for the one-line `Date` expressions the binary
//! accepts: `new Date(...)`, `Date(...)`, `Date.now()`, `Date.parse(...)`,
//! `Date.UTC(...)` and the literals that feed them.

use std::fmt;
use std::str::Chars;

use thiserror::Error;

use crate::builtins::date::{DateBuiltin, format};
use crate::coercion::{Coercion, StandardCoercion, radix_digits_value};
use crate::error::DateError;
use crate::types::{JsBigInt, JsObject, JsSymbol, JsValue};

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Identifier(String),
    New,

    NumericLiteral(f64),
    BigIntLiteral(String),
    StringLiteral(String),
    BooleanLiteral(bool),
    NullLiteral,

    LeftParen,  // (
    RightParen, // )
    LeftBrace,  // {
    RightBrace, // }
    Dot,        // .
    Comma,      // ,
    Semicolon,  // ;
    Plus,       // +
    Minus,      // -

    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Identifier(name) => write!(f, "{name}"),
            Token::New => write!(f, "new"),
            Token::NumericLiteral(n) => write!(f, "{}", JsValue::Number(*n)),
            Token::BigIntLiteral(digits) => write!(f, "{digits}n"),
            Token::StringLiteral(s) => write!(f, "{s:?}"),
            Token::BooleanLiteral(b) => write!(f, "{b}"),
            Token::NullLiteral => write!(f, "null"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::Dot => write!(f, "."),
            Token::Comma => write!(f, ","),
            Token::Semicolon => write!(f, ";"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message} (column {column})")]
pub struct LexError {
    pub message: String,
    pub column: u32,
}

pub struct Lexer<'a> {
    chars: Chars<'a>,
    current: Option<char>,
    column: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.chars();
        let current = chars.next();
        Self {
            chars,
            current,
            column: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.current
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current;
        if ch.is_some() {
            self.column += 1;
            self.current = self.chars.next();
        }
        ch
    }

    fn error(&self, message: impl Into<String>) -> LexError {
        LexError {
            message: message.into(),
            column: self.column,
        }
    }

    fn is_identifier_start(ch: char) -> bool {
        ch == '_' || ch == '$' || ch.is_ascii_alphabetic()
    }

    fn is_identifier_continue(ch: char) -> bool {
        ch == '_' || ch == '$' || ch.is_ascii_alphanumeric()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let mut s = String::new();
        loop {
            match self.advance() {
                None | Some('\n' | '\r') => return Err(self.error("Unterminated string literal")),
                Some(ch) if ch == quote => return Ok(s),
                Some('\\') => s.push(self.read_escape_sequence()?),
                Some(ch) => s.push(ch),
            }
        }
    }

    fn read_escape_sequence(&mut self) -> Result<char, LexError> {
        match self.advance() {
            None => Err(self.error("Unterminated escape sequence")),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('t') => Ok('\t'),
            Some('b') => Ok('\u{0008}'),
            Some('f') => Ok('\u{000C}'),
            Some('v') => Ok('\u{000B}'),
            Some('0') if !self.peek().is_some_and(|c| c.is_ascii_digit()) => Ok('\0'),
            Some('x') => self.read_hex_escape(2),
            Some('u') => self.read_hex_escape(4),
            Some(ch) => Ok(ch),
        }
    }

    fn read_hex_escape(&mut self, len: usize) -> Result<char, LexError> {
        let mut val = 0;
        for _ in 0..len {
            let digit = self
                .advance()
                .and_then(|ch| ch.to_digit(16))
                .ok_or_else(|| self.error("Invalid hexadecimal escape sequence"))?;
            val = val * 16 + digit;
        }
        char::from_u32(val).ok_or_else(|| self.error("Invalid Unicode code point"))
    }

    fn read_numeric_literal(&mut self, first: char) -> Result<Token, LexError> {
        if first == '0' {
            match self.peek() {
                Some('x' | 'X') => return self.read_radix_literal(16),
                Some('o' | 'O') => return self.read_radix_literal(8),
                Some('b' | 'B') => return self.read_radix_literal(2),
                _ => {}
            }
        }

        let mut s = String::from(first);
        self.read_decimal_digits(&mut s);

        if first != '.' && self.peek() == Some('.') {
            s.push('.');
            self.advance();
            self.read_decimal_digits(&mut s);
        }

        if let Some(e @ ('e' | 'E')) = self.peek() {
            s.push(e);
            self.advance();
            if let Some(sign @ ('+' | '-')) = self.peek() {
                s.push(sign);
                self.advance();
            }
            self.read_decimal_digits(&mut s);
        }

        let clean: String = s.chars().filter(|&c| c != '_').collect();
        if self.peek() == Some('n') {
            self.advance();
            return Ok(Token::BigIntLiteral(clean));
        }
        clean
            .parse()
            .map(Token::NumericLiteral)
            .map_err(|_| self.error("Invalid numeric literal"))
    }

    fn read_decimal_digits(&mut self, s: &mut String) {
        while let Some(ch) = self.peek().filter(|c| c.is_ascii_digit() || *c == '_') {
            s.push(ch);
            self.advance();
        }
    }

    fn read_radix_literal(&mut self, radix: u32) -> Result<Token, LexError> {
        self.advance(); // prefix letter
        let mut digits = String::new();
        while let Some(ch) = self.peek().filter(|c| c.is_digit(radix) || *c == '_') {
            if ch != '_' {
                digits.push(ch);
            }
            self.advance();
        }
        radix_digits_value(&digits, radix)
            .map(Token::NumericLiteral)
            .ok_or_else(|| self.error("Invalid numeric literal"))
    }

    fn read_identifier(&mut self, first: char) -> Token {
        let mut name = String::from(first);
        while let Some(ch) = self.peek().filter(|&c| Self::is_identifier_continue(c)) {
            name.push(ch);
            self.advance();
        }
        match name.as_str() {
            "true" => Token::BooleanLiteral(true),
            "false" => Token::BooleanLiteral(false),
            "null" => Token::NullLiteral,
            "new" => Token::New,
            _ => Token::Identifier(name),
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();

        let Some(ch) = self.peek() else {
            return Ok(Token::Eof);
        };

        // A line comment runs to the end of the input.
        if ch == '/' && self.peek_next() == Some('/') {
            while self.advance().is_some() {}
            return Ok(Token::Eof);
        }

        self.advance();
        match ch {
            '\'' | '"' => self.read_string(ch).map(Token::StringLiteral),
            '0'..='9' => self.read_numeric_literal(ch),
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => self.read_numeric_literal(ch),
            c if Self::is_identifier_start(c) => Ok(self.read_identifier(c)),
            '(' => Ok(Token::LeftParen),
            ')' => Ok(Token::RightParen),
            '{' => Ok(Token::LeftBrace),
            '}' => Ok(Token::RightBrace),
            '.' => Ok(Token::Dot),
            ',' => Ok(Token::Comma),
            ';' => Ok(Token::Semicolon),
            '+' => Ok(Token::Plus),
            '-' => Ok(Token::Minus),
            _ => Err(self.error(format!("Unexpected character '{ch}'"))),
        }
    }

    pub fn tokenize_all(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Constructor {
    Date,
    Number,
    String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Function {
    Date,
    DateNow,
    DateParse,
    DateUtc,
    Symbol,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number(f64),
    String(String),
    BigInt(String),
    Boolean(bool),
    Null,
    Undefined,
    /// `{}`
    Object,
    Negate(Box<Expr>),
    Plus(Box<Expr>),
    Construct(Constructor, Vec<Expr>),
    Call(Function, Vec<Expr>),
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum EvalError {
    #[error("SyntaxError: {0}")]
    Syntax(String),

    #[error("ReferenceError: {0} is not defined")]
    Reference(String),

    #[error("TypeError: {0}")]
    Type(String),

    #[error(transparent)]
    Date(#[from] DateError),
}

impl From<LexError> for EvalError {
    fn from(e: LexError) -> Self {
        EvalError::Syntax(e.to_string())
    }
}

fn unexpected(token: &Token) -> EvalError {
    EvalError::Syntax(format!("Unexpected {token}"))
}

static EOF: Token = Token::Eof;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, EvalError> {
        Ok(Self {
            tokens: Lexer::new(source).tokenize_all()?,
            pos: 0,
        })
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&EOF)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == token {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), EvalError> {
        match self.advance() {
            ref token if token == expected => Ok(()),
            token => Err(unexpected(&token)),
        }
    }

    /// `None` for input that holds no expression (blank or comment only).
    pub fn parse_program(&mut self) -> Result<Option<Expr>, EvalError> {
        if self.eat(&Token::Eof) {
            return Ok(None);
        }
        let expr = self.parse_unary()?;
        self.eat(&Token::Semicolon);
        self.expect(&Token::Eof)?;
        Ok(Some(expr))
    }

    fn parse_unary(&mut self) -> Result<Expr, EvalError> {
        if self.eat(&Token::Minus) {
            return Ok(Expr::Negate(Box::new(self.parse_unary()?)));
        }
        if self.eat(&Token::Plus) {
            return Ok(Expr::Plus(Box::new(self.parse_unary()?)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, EvalError> {
        match self.advance() {
            Token::NumericLiteral(n) => Ok(Expr::Number(n)),
            Token::StringLiteral(s) => Ok(Expr::String(s)),
            Token::BigIntLiteral(digits) => Ok(Expr::BigInt(digits)),
            Token::BooleanLiteral(b) => Ok(Expr::Boolean(b)),
            Token::NullLiteral => Ok(Expr::Null),
            Token::LeftBrace => {
                self.expect(&Token::RightBrace)?;
                Ok(Expr::Object)
            }
            Token::LeftParen => {
                let expr = self.parse_unary()?;
                self.expect(&Token::RightParen)?;
                Ok(expr)
            }
            Token::New => self.parse_new(),
            Token::Identifier(name) => self.parse_identifier(name),
            token => Err(unexpected(&token)),
        }
    }

    fn parse_new(&mut self) -> Result<Expr, EvalError> {
        let constructor = match self.advance() {
            Token::Identifier(name) => match name.as_str() {
                "Date" => Constructor::Date,
                "Number" => Constructor::Number,
                "String" => Constructor::String,
                _ => return Err(EvalError::Reference(name)),
            },
            token => return Err(unexpected(&token)),
        };
        // `new Date` without an argument list
        let args = if *self.peek() == Token::LeftParen {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        Ok(Expr::Construct(constructor, args))
    }

    fn parse_identifier(&mut self, name: String) -> Result<Expr, EvalError> {
        let function = match name.as_str() {
            "undefined" => return Ok(Expr::Undefined),
            "NaN" => return Ok(Expr::Number(f64::NAN)),
            "Infinity" => return Ok(Expr::Number(f64::INFINITY)),
            "Symbol" => Function::Symbol,
            "Date" if self.eat(&Token::Dot) => match self.advance() {
                Token::Identifier(member) => match member.as_str() {
                    "now" => Function::DateNow,
                    "parse" => Function::DateParse,
                    "UTC" => Function::DateUtc,
                    _ => return Err(EvalError::Type(format!("Date.{member} is not a function"))),
                },
                token => return Err(unexpected(&token)),
            },
            "Date" => Function::Date,
            _ => return Err(EvalError::Reference(name)),
        };
        Ok(Expr::Call(function, self.parse_arguments()?))
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, EvalError> {
        self.expect(&Token::LeftParen)?;
        let mut args = Vec::new();
        while !self.eat(&Token::RightParen) {
            args.push(self.parse_unary()?);
            if !self.eat(&Token::Comma) {
                self.expect(&Token::RightParen)?;
                break;
            }
        }
        Ok(args)
    }
}

/// Evaluates expressions against one [`DateBuiltin`].
pub struct Session {
    date: DateBuiltin,
    coercion: StandardCoercion,
    next_symbol_id: u64,
}

impl Session {
    pub fn new(date: DateBuiltin) -> Self {
        let coercion = date.coercion();
        Self {
            date,
            coercion,
            next_symbol_id: 0,
        }
    }

    pub fn date(&self) -> &DateBuiltin {
        &self.date
    }

    pub fn eval(&mut self, source: &str) -> Result<Option<JsValue>, EvalError> {
        let Some(expr) = Parser::new(source)?.parse_program()? else {
            return Ok(None);
        };
        self.evaluate(&expr).map(Some)
    }

    /// Evaluates `source` and renders the result the way the REPL prints it.
    pub fn eval_line(&mut self, source: &str) -> Result<Option<String>, EvalError> {
        Ok(self.eval(source)?.map(|value| self.render(&value)))
    }

    pub fn render(&self, value: &JsValue) -> String {
        match value {
            JsValue::Object(obj) => match (obj.date_value(), obj.primitive_value()) {
                (Some(t), _) => format::to_string(t, self.date.zone()),
                (None, Some(prim)) => format!("[{}: {}]", obj.class_name(), prim),
                (None, None) => value.to_string(),
            },
            other => other.to_string(),
        }
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<JsValue, EvalError> {
        Ok(match expr {
            Expr::Number(n) => JsValue::Number(*n),
            Expr::String(s) => JsValue::string(s),
            Expr::BigInt(digits) => JsValue::BigInt(JsBigInt {
                value: digits
                    .parse()
                    .map_err(|_| EvalError::Syntax(format!("Invalid BigInt literal {digits}n")))?,
            }),
            Expr::Boolean(b) => JsValue::Boolean(*b),
            Expr::Null => JsValue::Null,
            Expr::Undefined => JsValue::Undefined,
            Expr::Object => JsValue::Object(JsObject::ordinary(None)),
            Expr::Negate(operand) => {
                let value = self.evaluate(operand)?;
                JsValue::Number(-self.coercion.to_number(&value)?)
            }
            Expr::Plus(operand) => {
                let value = self.evaluate(operand)?;
                JsValue::Number(self.coercion.to_number(&value)?)
            }
            Expr::Construct(constructor, args) => {
                let args = self.evaluate_all(args)?;
                self.construct(*constructor, &args)?
            }
            Expr::Call(function, args) => {
                let args = self.evaluate_all(args)?;
                self.call(*function, &args)?
            }
        })
    }

    fn evaluate_all(&mut self, exprs: &[Expr]) -> Result<Vec<JsValue>, EvalError> {
        exprs.iter().map(|expr| self.evaluate(expr)).collect()
    }

    fn construct(&mut self, constructor: Constructor, args: &[JsValue]) -> Result<JsValue, EvalError> {
        Ok(match constructor {
            Constructor::Date => self.date.construct(args, &mut self.coercion)?.into_js_value(),
            Constructor::Number => {
                let n = match args.first() {
                    Some(value) => self.coercion.to_number(value)?,
                    None => 0.0,
                };
                JsValue::Object(JsObject::wrapper("Number", JsValue::Number(n)))
            }
            Constructor::String => {
                let s = match args.first() {
                    Some(value) => self.coercion.to_string(value)?,
                    None => String::new(),
                };
                JsValue::Object(JsObject::wrapper("String", JsValue::string(&s)))
            }
        })
    }

    fn call(&mut self, function: Function, args: &[JsValue]) -> Result<JsValue, EvalError> {
        Ok(match function {
            Function::Date => JsValue::string(&self.date.call()),
            Function::DateNow => JsValue::Number(self.date.now()),
            Function::DateParse => {
                let text = args.first().cloned().unwrap_or(JsValue::Undefined);
                JsValue::Number(self.date.parse_value(&text, &mut self.coercion)?)
            }
            Function::DateUtc => JsValue::Number(self.date.utc(args, &mut self.coercion)?),
            Function::Symbol => {
                let description = match args.first() {
                    Some(value) if !value.is_undefined() => Some(self.coercion.to_string(value)?),
                    _ => None,
                };
                self.next_symbol_id += 1;
                JsValue::Symbol(JsSymbol {
                    id: self.next_symbol_id,
                    description,
                })
            }
        })
    }
}

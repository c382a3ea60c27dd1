//! Module `scanner` implements a one‑pass, streaming lexer for the Lox language.
//!
//! It walks a `&str` one Unicode code point at a time and produces a sequence
//! of [`Token`]s, skipping whitespace and comments, and emitting exactly one
//! `EOF` token at the end. Designed as a `FusedIterator`, it can be chained
//! safely with other iterator adapters.
//!
//! # Public API
//!
//! - `Scanner::new(src: &str) -> Scanner<'_>`
//!   Create a new lexer over the input text.
//!
//! - `impl Iterator for Scanner<'a>`
//!   Yields `Result<Token, LoxError>` on each `.next()`. A lexical error does
//!   not stop the stream: the next call resumes after the offending character
//!   so a single pass reports every bad character.
//!
//! - `Scanner::scan_tokens(self) -> Scanned`
//!   Drains the iterator, splitting tokens from errors.
//!
//! # Token Recognition
//!
//! - Single‑character tokens: `(`, `)`, `{`, `}`, `,`, `.`, `-`, `+`, `;`, `*`.
//! - One/two‑character operators: `!`/`!=`, `=`/`==`, `<`/`<=`, `>`/`>=`.
//! - `//` comments to end of line, skipped with `memchr`.
//! - String literals: `"` … `"`, may span lines, no escape processing.
//! - Numeric literals: digits with an optional `.digits` fraction. A `.` is
//!   only part of the number when a digit follows it.
//! - Identifiers/keywords: `[A-Za-z_][A-Za-z0-9_]*`, resolved via a
//!   perfect‑hash `KEYWORDS` map.

use crate::error::{LoxError, Result};
use crate::token::{Literal, Token, TokenType};
use log::{debug, info};
use memchr::memchr;
use phf::phf_map;
use std::iter::FusedIterator;

// ─────────────────────────────────────────────────────────────────────────────
// Static keyword map (compile‑time perfect hash)
// ─────────────────────────────────────────────────────────────────────────────

static KEYWORDS: phf::Map<&'static str, TokenType> = phf_map! {
    "and"    => TokenType::AND,
    "class"  => TokenType::CLASS,
    "else"   => TokenType::ELSE,
    "false"  => TokenType::FALSE,
    "fun"    => TokenType::FUN,
    "for"    => TokenType::FOR,
    "if"     => TokenType::IF,
    "nil"    => TokenType::NIL,
    "or"     => TokenType::OR,
    "print"  => TokenType::PRINT,
    "return" => TokenType::RETURN,
    "super"  => TokenType::SUPER,
    "this"   => TokenType::THIS,
    "true"   => TokenType::TRUE,
    "var"    => TokenType::VAR,
    "while"  => TokenType::WHILE,
};

/// Looks up a reserved word; `None` for ordinary identifiers.
pub fn keyword(text: &str) -> Option<TokenType> {
    KEYWORDS.get(text).copied()
}

/// Output of a full scan: every token (EOF last) and every lexical error.
#[derive(Debug, Default)]
pub struct Scanned {
    pub tokens: Vec<Token>,
    pub errors: Vec<LoxError>,
}

/// A single pass **scanner / lexer** that converts source text into a
/// sequence of [`Token`]s.
pub struct Scanner<'a> {
    src: &'a str,
    start: usize, // byte offset of the first char of the current lexeme
    curr: usize,  // byte offset one past the last char examined
    line: usize,  // 1‑based line counter (\n increments)
    pending: Option<(TokenType, Option<Literal>)>,
    done: bool,
}

impl<'a> Scanner<'a> {
    /// Create a new lexer over `src`.
    #[inline]
    pub fn new(src: &'a str) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Self {
            src,
            start: 0,
            curr: 0,
            line: 1,
            pending: None,
            done: false,
        }
    }

    /// Scan the whole input, keeping errors separate from tokens.
    pub fn scan_tokens(self) -> Scanned {
        let mut scanned = Scanned::default();

        for item in self {
            match item {
                Ok(token) => scanned.tokens.push(token),
                Err(e) => scanned.errors.push(e),
            }
        }

        info!(
            "Scanned {} token(s) with {} error(s)",
            scanned.tokens.len(),
            scanned.errors.len()
        );

        scanned
    }

    // ───────────────────────────── primitive helpers ────────────────────────

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.src.len()
    }

    /// Advance one code point and return it.  Callers guard with
    /// [`is_at_end`](Self::is_at_end).
    #[inline(always)]
    fn advance(&mut self) -> char {
        let c = self.src[self.curr..].chars().next().unwrap_or('\0');
        self.curr += c.len_utf8();
        c
    }

    /// Peek at the current code point. Returns `'\0'` past EOF.
    #[inline(always)]
    fn peek(&self) -> char {
        self.src[self.curr..].chars().next().unwrap_or('\0')
    }

    /// Peek one code point beyond [`peek`](Self::peek).
    #[inline(always)]
    fn peek_next(&self) -> char {
        let mut chars = self.src[self.curr..].chars();
        chars.next();
        chars.next().unwrap_or('\0')
    }

    /// Consume the next code point iff it matches `expected`.
    #[inline(always)]
    fn match_char(&mut self, expected: char) -> bool {
        if !self.is_at_end() && self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    #[inline(always)]
    fn emit(&mut self, tt: TokenType) {
        self.pending = Some((tt, None));
    }

    // ───────────────────────────── core lexing ─────────────────────────────

    /// Scan a *single* lexeme starting at `self.curr`. Whitespace and comments
    /// return `Ok(())` with `pending = None`.
    fn scan_token(&mut self) -> Result<()> {
        let c = self.advance();

        match c {
            '(' => self.emit(TokenType::LEFT_PAREN),
            ')' => self.emit(TokenType::RIGHT_PAREN),
            '{' => self.emit(TokenType::LEFT_BRACE),
            '}' => self.emit(TokenType::RIGHT_BRACE),
            ',' => self.emit(TokenType::COMMA),
            '.' => self.emit(TokenType::DOT),
            '-' => self.emit(TokenType::MINUS),
            '+' => self.emit(TokenType::PLUS),
            ';' => self.emit(TokenType::SEMICOLON),
            '*' => self.emit(TokenType::STAR),

            '!' => {
                let tt = if self.match_char('=') {
                    TokenType::BANG_EQUAL
                } else {
                    TokenType::BANG
                };

                self.emit(tt);
            }

            '=' => {
                let tt = if self.match_char('=') {
                    TokenType::EQUAL_EQUAL
                } else {
                    TokenType::EQUAL
                };

                self.emit(tt);
            }

            '<' => {
                let tt = if self.match_char('=') {
                    TokenType::LESS_EQUAL
                } else {
                    TokenType::LESS
                };

                self.emit(tt);
            }

            '>' => {
                let tt = if self.match_char('=') {
                    TokenType::GREATER_EQUAL
                } else {
                    TokenType::GREATER
                };

                self.emit(tt);
            }

            ' ' | '\r' | '\t' => {}

            '\n' => {
                self.line += 1;
            }

            '/' => {
                if self.match_char('/') {
                    // The newline itself is left for the main loop so the
                    // line counter stays in one place.
                    match memchr(b'\n', &self.src.as_bytes()[self.curr..]) {
                        Some(pos) => self.curr += pos,
                        None => self.curr = self.src.len(),
                    }
                } else {
                    self.emit(TokenType::SLASH);
                }
            }

            '"' => return self.string(),

            '0'..='9' => self.number(),

            c if c.is_ascii_alphabetic() || c == '_' => self.identifier(),

            _ => {
                return Err(LoxError::lex(
                    self.line,
                    format!("Unexpected character: {}", c),
                ));
            }
        }

        Ok(())
    }

    /// Parse a double‑quoted string literal. On return `self.curr` is past
    /// the closing `"`.
    fn string(&mut self) -> Result<()> {
        while !self.is_at_end() && self.peek() != '"' {
            if self.advance() == '\n' {
                self.line += 1;
            }
        }

        if self.is_at_end() {
            return Err(LoxError::lex(self.line, "Unterminated string."));
        }

        self.advance(); // closing quote

        let text = &self.src[self.start + 1..self.curr - 1];
        self.pending = Some((TokenType::STRING, Some(Literal::Str(text.to_owned()))));

        Ok(())
    }

    /// Parse a numeric literal (`123`, `3.14`).
    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance(); // "."

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let text = &self.src[self.start..self.curr];
        let n: f64 = text.parse::<f64>().unwrap_or(0.0); // digits only, cannot fail
        self.pending = Some((TokenType::NUMBER, Some(Literal::Number(n))));
    }

    /// Parse an identifier and decide if it is a **keyword**.
    fn identifier(&mut self) {
        while {
            let c = self.peek();
            c.is_ascii_alphanumeric() || c == '_'
        } {
            self.advance();
        }

        let text = &self.src[self.start..self.curr];
        let tt = keyword(text).unwrap_or(TokenType::IDENTIFIER);

        self.emit(tt);
    }
}

// ───────────────────────── Iterator implementation ─────────────────────────

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            if self.is_at_end() {
                self.done = true;
                return Some(Ok(Token::new(TokenType::EOF, "", None, self.line)));
            }

            self.start = self.curr;
            self.pending = None;

            if let Err(e) = self.scan_token() {
                return Some(Err(e));
            }

            if let Some((tt, literal)) = self.pending.take() {
                let lexeme = &self.src[self.start..self.curr];
                debug!("Scanned token ({:?}) on line {}", tt, self.line);

                return Some(Ok(Token::new(tt, lexeme, literal, self.line)));
            }
            // whitespace / comment, keep going
        }
    }
}

impl<'a> FusedIterator for Scanner<'a> {}

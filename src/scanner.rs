//! Module `scanner` implements a one‑pass, streaming lexer for the Lox language.
//!
//! It transforms a source string into a sequence of [`Token`]s, skipping whitespace
//! and comments, and emitting exactly one `EOF` token at the end. Designed as a `FusedIterator`,
//! it can be chained safely with other iterator adapters.
//!
//! # Public API
//!
//! - `Scanner::new(src: &'a str) -> Scanner<'a>`
//!   Create a new lexer over the input buffer.
//!
//! - `impl Iterator for Scanner<'a>`
//!   Yields `Result<Token, LoxError>` on each `.next()`, where `Ok(token)` is a scanned token
//!   and `Err` reports a lexing error with line information.  An error never ends the
//!   stream: the offending input is consumed and scanning resumes after it.
//!
//! - `scan_tokens(src) -> (Vec<Token>, Vec<LoxError>)`
//!   Drain a scanner, splitting tokens from diagnostics.
//!
//! # Token Recognition (`scan_token`)
//!
//! - Single‑character tokens: `(`, `)`, `{`, `}`, `,`, `.`, `-`, `+`, `;`, `*`.
//! - Two‑character operators: `!=`, `==`, `<=`, `>=`.
//! - String literals: `"` … `"`, allowing multi‑line and reporting unterminated errors.
//! - Numeric literals: integer and optional fractional part.
//! - Identifiers/keywords: alphanumeric/_ sequences, resolved via a perfect‑hash `KEYWORDS` map.
//!
//! Comment skipping uses `memchr` for the newline search.
//!
//! # Example
//!
//! ```rust
//! use rox::scanner::Scanner;
//!
//! let mut scanner = Scanner::new("print 123; // example");
//! for result in &mut scanner {
//!     match result {
//!         Ok(token) => println!("{}", token),
//!         Err(err) => eprintln!("{}", err),
//!     }
//! }
//! ```

use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};
use log::{debug, info, trace};
use memchr::memchr;
use phf::phf_map;
use std::iter::FusedIterator;

/// Reserved words; anything else shaped like an identifier is `IDENTIFIER`.
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

/// What one call to [`Scanner::scan_token`] found.
enum Lexeme {
    Token(TokenType),
    /// Whitespace, a newline or a comment.
    Skip,
}

/// A single pass **scanner / lexer** that converts source text into a
/// sequence of [`Token`]s.
pub struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    /// First byte of the lexeme being scanned.
    start: usize,
    /// One past the last byte consumed; `len + 1` once EOF was emitted.
    curr: usize,
    line: usize,
}

impl<'a> Scanner<'a> {
    /// Create a new lexer over `src`.
    pub fn new(src: &'a str) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Self {
            src,
            bytes: src.as_bytes(),
            start: 0,
            curr: 0,
            line: 1,
        }
    }

    #[inline]
    fn is_at_end(&self) -> bool {
        self.curr >= self.bytes.len()
    }

    /// Consume one byte.  Callers check [`Self::is_at_end`] first.
    #[inline]
    fn advance(&mut self) -> u8 {
        let b = self.bytes[self.curr];
        self.curr += 1;
        b
    }

    /// Byte `offset` positions ahead of the cursor, `0` past the end.
    #[inline]
    fn peek_at(&self, offset: usize) -> u8 {
        self.bytes.get(self.curr + offset).copied().unwrap_or(0)
    }

    #[inline]
    fn peek(&self) -> u8 {
        self.peek_at(0)
    }

    /// `with_eq` if the next byte is `=` (consuming it), else `single`.
    fn one_or_two(&mut self, with_eq: TokenType, single: TokenType) -> Lexeme {
        if self.peek() == b'=' {
            self.curr += 1;
            Lexeme::Token(with_eq)
        } else {
            Lexeme::Token(single)
        }
    }

    #[inline]
    fn lexeme(&self) -> &'a str {
        &self.src[self.start..self.curr]
    }

    /// Consume one lexeme starting at `self.start`.
    fn scan_token(&mut self) -> Result<Lexeme> {
        let token_type: TokenType = match self.advance() {
            b'(' => TokenType::LEFT_PAREN,
            b')' => TokenType::RIGHT_PAREN,
            b'{' => TokenType::LEFT_BRACE,
            b'}' => TokenType::RIGHT_BRACE,
            b',' => TokenType::COMMA,
            b'.' => TokenType::DOT,
            b'-' => TokenType::MINUS,
            b'+' => TokenType::PLUS,
            b';' => TokenType::SEMICOLON,
            b'*' => TokenType::STAR,

            b'!' => return Ok(self.one_or_two(TokenType::BANG_EQUAL, TokenType::BANG)),
            b'=' => return Ok(self.one_or_two(TokenType::EQUAL_EQUAL, TokenType::EQUAL)),
            b'<' => return Ok(self.one_or_two(TokenType::LESS_EQUAL, TokenType::LESS)),
            b'>' => return Ok(self.one_or_two(TokenType::GREATER_EQUAL, TokenType::GREATER)),

            b' ' | b'\r' | b'\t' => return Ok(Lexeme::Skip),

            b'\n' => {
                self.line += 1;
                return Ok(Lexeme::Skip);
            }

            b'/' if self.peek() == b'/' => {
                // Stop before the newline; the arm above counts it.
                self.curr = memchr(b'\n', &self.bytes[self.curr..])
                    .map_or(self.bytes.len(), |pos| self.curr + pos);
                return Ok(Lexeme::Skip);
            }
            b'/' => TokenType::SLASH,

            b'"' => self.string()?,
            b'0'..=b'9' => self.number(),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(),

            _ => {
                // One diagnostic per code point, and resume on a char boundary.
                let ch: char = self.src[self.start..].chars().next().unwrap_or('\u{FFFD}');
                self.curr = self.start + ch.len_utf8();

                return Err(LoxError::lex(
                    self.line,
                    format!("Unexpected character: {}", ch),
                ));
            }
        };

        Ok(Lexeme::Token(token_type))
    }

    /// The opening `"` is already consumed; strings may span lines.
    fn string(&mut self) -> Result<TokenType> {
        let Some(len) = memchr(b'"', &self.bytes[self.curr..]) else {
            self.line += self.bytes[self.curr..].iter().filter(|&&b| b == b'\n').count();
            self.curr = self.bytes.len();
            return Err(LoxError::lex(self.line, "Unterminated string."));
        };

        let contents: &str = &self.src[self.curr..self.curr + len];
        self.line += contents.bytes().filter(|&b| b == b'\n').count();
        self.curr += len + 1;

        Ok(TokenType::STRING(contents.to_owned()))
    }

    /// Digits with an optional fraction; a `.` not followed by a digit is
    /// left for the next token.
    fn number(&mut self) -> TokenType {
        self.skip_digits();

        if self.peek() == b'.' && self.peek_at(1).is_ascii_digit() {
            self.curr += 1;
            self.skip_digits();
        }

        // The lexeme is ASCII digits with at most one interior '.', so it
        // always parses.
        TokenType::NUMBER(self.lexeme().parse::<f64>().unwrap_or(0.0))
    }

    fn skip_digits(&mut self) {
        while self.peek().is_ascii_digit() {
            self.curr += 1;
        }
    }

    fn identifier(&mut self) -> TokenType {
        while matches!(self.peek(), b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_') {
            self.curr += 1;
        }

        KEYWORDS
            .get(self.lexeme())
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER)
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.curr > self.bytes.len() {
                return None;
            }

            if self.is_at_end() {
                self.curr += 1;
                return Some(Ok(Token::new(TokenType::EOF, "", self.line)));
            }

            self.start = self.curr;

            match self.scan_token() {
                Ok(Lexeme::Token(token_type)) => {
                    trace!("Scanned {:?} on line {}", token_type, self.line);
                    return Some(Ok(Token::new(token_type, self.lexeme(), self.line)));
                }
                Ok(Lexeme::Skip) => {}
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

impl<'a> FusedIterator for Scanner<'a> {}

/// Scan all of `src`, returning every token (ending with `EOF`) together with
/// every lexical error encountered along the way.
pub fn scan_tokens(src: &str) -> (Vec<Token>, Vec<LoxError>) {
    let mut tokens: Vec<Token> = Vec::new();
    let mut errors: Vec<LoxError> = Vec::new();

    for result in Scanner::new(src) {
        match result {
            Ok(token) => tokens.push(token),
            Err(e) => errors.push(e),
        }
    }

    debug!(
        "Scanned {} token(s) with {} error(s)",
        tokens.len(),
        errors.len()
    );

    (tokens, errors)
}

//! Lexer: source text in, [`Token`]s out.
//!
//! [`Scanner`] walks the source bytes once and yields `Result<Token>` items.
//! A lexical error is yielded in place of the token it spoiled; scanning
//! then resumes after the offending input, so one pass reports every bad
//! character.  The stream always ends with exactly one `EOF` token and is
//! fused afterwards.
//!
//! Callers that want everything at once use [`scan`], which splits the
//! stream into tokens and errors.
//!
//! ```rust
//! use rox::scanner::Scanner;
//!
//! for item in Scanner::new("print 123; // trailing comment") {
//!     match item {
//!         Ok(token) => println!("{}", token),
//!         Err(err) => eprintln!("{}", err),
//!     }
//! }
//! ```
//!
//! Numbers are digits with an optional fractional part; there is no
//! exponent form, and a leading or trailing `.` is a separate `DOT`.
//! Strings may span lines and have no escape sequences.

use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};
use log::{debug, info};
use memchr::memchr;
use phf::phf_map;
use std::iter::FusedIterator;

static RESERVED: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"and"    => TokenType::AND,
    b"class"  => TokenType::CLASS,
    b"else"   => TokenType::ELSE,
    b"false"  => TokenType::FALSE,
    b"fun"    => TokenType::FUN,
    b"for"    => TokenType::FOR,
    b"if"     => TokenType::IF,
    b"nil"    => TokenType::NIL,
    b"or"     => TokenType::OR,
    b"print"  => TokenType::PRINT,
    b"return" => TokenType::RETURN,
    b"super"  => TokenType::SUPER,
    b"this"   => TokenType::THIS,
    b"true"   => TokenType::TRUE,
    b"var"    => TokenType::VAR,
    b"while"  => TokenType::WHILE,
};

pub struct Scanner<'a> {
    source: &'a str,
    bytes: &'a [u8],
    start: usize, // first byte of the lexeme being scanned
    pos: usize,   // next byte to read
    line: usize,
    done: bool, // EOF already emitted
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        info!("Scanner created over {} bytes", source.len());

        Self {
            source,
            bytes: source.as_bytes(),
            start: 0,
            pos: 0,
            line: 1,
            done: false,
        }
    }

    // ───────────────────────────── cursor ──────────────────────────────────

    #[inline(always)]
    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Byte `offset` positions ahead of the cursor, or `0` past the end.
    #[inline(always)]
    fn look(&self, offset: usize) -> u8 {
        self.bytes.get(self.pos + offset).copied().unwrap_or(0)
    }

    #[inline(always)]
    fn bump(&mut self) -> u8 {
        let b = self.look(0);
        self.pos += 1;
        b
    }

    /// `double` when the next byte is `=` (and consume it), else `single`.
    #[inline(always)]
    fn with_equals(&mut self, single: TokenType, double: TokenType) -> TokenType {
        if self.look(0) == b'=' {
            self.pos += 1;
            double
        } else {
            single
        }
    }

    fn lexeme(&self) -> &'a str {
        &self.source[self.start..self.pos]
    }

    // ──────────────────────────── lexemes ──────────────────────────────────

    /// Consume one lexeme.  `Ok(None)` means it was trivia (whitespace,
    /// newline or comment) and produced no token.
    fn scan_token(&mut self) -> Result<Option<TokenType>> {
        let kind = match self.bump() {
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

            b'!' => self.with_equals(TokenType::BANG, TokenType::BANG_EQUAL),
            b'=' => self.with_equals(TokenType::EQUAL, TokenType::EQUAL_EQUAL),
            b'<' => self.with_equals(TokenType::LESS, TokenType::LESS_EQUAL),
            b'>' => self.with_equals(TokenType::GREATER, TokenType::GREATER_EQUAL),

            b'/' if self.look(0) == b'/' => {
                self.skip_comment();
                return Ok(None);
            }
            b'/' => TokenType::SLASH,

            b' ' | b'\r' | b'\t' => return Ok(None),
            b'\n' => {
                self.line += 1;
                return Ok(None);
            }

            b'"' => self.string()?,
            b'0'..=b'9' => self.number(),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.word(),

            _ => return Err(self.unexpected()),
        };

        Ok(Some(kind))
    }

    /// Jump to the newline ending a `//` comment; the newline itself is
    /// left for the line counter.
    fn skip_comment(&mut self) {
        self.pos = match memchr(b'\n', &self.bytes[self.pos..]) {
            Some(offset) => self.pos + offset,
            None => self.bytes.len(),
        };
    }

    fn string(&mut self) -> Result<TokenType> {
        while !self.at_end() && self.look(0) != b'"' {
            if self.bump() == b'\n' {
                self.line += 1;
            }
        }

        if self.at_end() {
            return Err(LoxError::lex(self.line, "Unterminated string."));
        }
        self.pos += 1;

        let contents: &str = &self.source[self.start + 1..self.pos - 1];
        Ok(TokenType::STRING(contents.to_owned()))
    }

    fn number(&mut self) -> TokenType {
        self.skip_digits();

        if self.look(0) == b'.' && self.look(1).is_ascii_digit() {
            self.pos += 1;
            self.skip_digits();
        }

        // Only ASCII digits and at most one inner '.', which always parses.
        TokenType::NUMBER(self.lexeme().parse::<f64>().unwrap_or(0.0))
    }

    fn skip_digits(&mut self) {
        while self.look(0).is_ascii_digit() {
            self.pos += 1;
        }
    }

    fn word(&mut self) -> TokenType {
        while matches!(self.look(0), b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_') {
            self.pos += 1;
        }

        RESERVED
            .get(self.lexeme().as_bytes())
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER)
    }

    /// Report the character at `start` and step over all of its bytes.
    fn unexpected(&mut self) -> LoxError {
        let c: char = self.source[self.start..]
            .chars()
            .next()
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        self.pos = self.start + c.len_utf8();

        LoxError::lex(self.line, format!("Unexpected character: {}", c))
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        while !self.at_end() {
            self.start = self.pos;

            match self.scan_token() {
                Ok(Some(kind)) => {
                    debug!("Scanned {:?} on line {}", kind, self.line);
                    return Some(Ok(Token::new(kind, self.lexeme(), self.line)));
                }
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }

        self.done = true;
        Some(Ok(Token::new(TokenType::EOF, "", self.line)))
    }
}

impl<'a> FusedIterator for Scanner<'a> {}

/// Scan all of `source`.  The token list always ends with `EOF`.
pub fn scan(source: &str) -> (Vec<Token>, Vec<LoxError>) {
    let mut tokens: Vec<Token> = Vec::new();
    let mut errors: Vec<LoxError> = Vec::new();

    for item in Scanner::new(source) {
        match item {
            Ok(token) => tokens.push(token),
            Err(e) => errors.push(e),
        }
    }

    info!(
        "Scan finished: {} token(s), {} error(s)",
        tokens.len(),
        errors.len()
    );

    (tokens, errors)
}

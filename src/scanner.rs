//! Module `scanner` implements a one‑pass, streaming lexer for the Java
//! expression subset understood by the debugger.
//!
//! It transforms an expression string into a sequence of `Token<'a>`s, skipping
//! whitespace and comments, and emitting exactly one `EOF` token at the end.
//! Designed as a `FusedIterator`, it can be chained safely with other iterator
//! adapters.
//!
//! # Public API
//!
//! - `Scanner::new(src: &'a str) -> Scanner<'a>`
//!   Create a new lexer over the expression text.
//!
//! - `impl Iterator for Scanner<'a>`
//!   Yields `Result<Token<'a>, EvalError>` on each `.next()`, where `Ok(token)` is a scanned
//!   token and `Err` reports a lexing error with line/column information.  Scanning
//!   continues after an error so callers that collect diagnostics see all of them.
//!
//! # Token Recognition
//!
//! - Separators and every Java operator, longest match first (`>>>=` before `>>>`
//!   before `>>=` ...).
//! - Integer literals in the three radixes of the grammar: hex `0x1F`, octal `017`,
//!   decimal `42`, each with an optional `l`/`L` suffix.
//! - Floating point literals: `1.5`, `1.`, `.5`, `1e10`, `2f`, `3.0d`.
//! - Character and string literals with `\b \t \n \f \r \" \' \\`, unicode and octal
//!   escapes.  Escapes are validated here but decoded by the evaluator.
//! - Identifiers/keywords: resolved via a perfect‑hash `KEYWORDS` map.
//! - `//` and `/* */` comments, skipped with `memchr` searches.
//!
//! # Example
//!
//! ```rust
//! use jdb_eval::scanner::Scanner;
//!
//! for result in Scanner::new("a.b[0] + 1") {
//!     match result {
//!         Ok(token) => println!("{}", token),
//!         Err(err) => eprintln!("Lex error: {}", err),
//!     }
//! }
//! ```

use crate::error::{EvalError, Result};
use crate::token::{Token, TokenType};
use log::{debug, info};
use memchr::{memchr, memchr_iter, memmem, memrchr};
use phf::phf_map;
use std::iter::FusedIterator;

// ─────────────────────────────────────────────────────────────────────────────
// Static keyword map (compile‑time perfect hash)
// ─────────────────────────────────────────────────────────────────────────────

static KEYWORDS: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"abstract"     => TokenType::ABSTRACT,
    b"assert"       => TokenType::ASSERT,
    b"boolean"      => TokenType::BOOLEAN,
    b"break"        => TokenType::BREAK,
    b"byte"         => TokenType::BYTE,
    b"case"         => TokenType::CASE,
    b"catch"        => TokenType::CATCH,
    b"char"         => TokenType::CHAR,
    b"class"        => TokenType::CLASS,
    b"continue"     => TokenType::CONTINUE,
    b"default"      => TokenType::DEFAULT,
    b"do"           => TokenType::DO,
    b"double"       => TokenType::DOUBLE,
    b"else"         => TokenType::ELSE,
    b"enum"         => TokenType::ENUM,
    b"extends"      => TokenType::EXTENDS,
    b"false"        => TokenType::FALSE,
    b"final"        => TokenType::FINAL,
    b"finally"      => TokenType::FINALLY,
    b"float"        => TokenType::FLOAT,
    b"for"          => TokenType::FOR,
    b"if"           => TokenType::IF,
    b"implements"   => TokenType::IMPLEMENTS,
    b"import"       => TokenType::IMPORT,
    b"instanceof"   => TokenType::INSTANCEOF,
    b"int"          => TokenType::INT,
    b"interface"    => TokenType::INTERFACE,
    b"long"         => TokenType::LONG,
    b"native"       => TokenType::NATIVE,
    b"new"          => TokenType::NEW,
    b"null"         => TokenType::NULL,
    b"package"      => TokenType::PACKAGE,
    b"private"      => TokenType::PRIVATE,
    b"protected"    => TokenType::PROTECTED,
    b"public"       => TokenType::PUBLIC,
    b"return"       => TokenType::RETURN,
    b"short"        => TokenType::SHORT,
    b"static"       => TokenType::STATIC,
    b"strictfp"     => TokenType::STRICTFP,
    b"super"        => TokenType::SUPER,
    b"switch"       => TokenType::SWITCH,
    b"synchronized" => TokenType::SYNCHRONIZED,
    b"this"         => TokenType::THIS,
    b"throw"        => TokenType::THROW,
    b"throws"       => TokenType::THROWS,
    b"transient"    => TokenType::TRANSIENT,
    b"true"         => TokenType::TRUE,
    b"try"          => TokenType::TRY,
    b"void"         => TokenType::VOID,
    b"volatile"     => TokenType::VOLATILE,
    b"while"        => TokenType::WHILE,
};

/// A single pass **scanner / lexer** that converts expression text into a
/// sequence of [`Token`]s.  The lifetime `'a` ties every emitted token’s
/// `lexeme` slice back to the original source string.
pub struct Scanner<'a> {
    src: &'a str,               // the expression text
    bytes: &'a [u8],            // same text, byte view for the hot loop
    start: usize,               // index of the *first* byte of the current lexeme
    curr: usize,                // index *one past* the last byte examined
    line: usize,                // 1‑based line counter (\n increments)
    line_start: usize,          // byte index where the current line begins
    pending: Option<TokenType>, // recognised token kind waiting to be emitted
}

impl<'a> Scanner<'a> {
    /// Create a new lexer over `src`.
    #[inline]
    pub fn new(src: &'a str) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Self {
            src,
            bytes: src.as_bytes(),
            start: 0,
            curr: 0,
            line: 1,
            line_start: 0,
            pending: None,
        }
    }

    // ───────────────────────────── primitive helpers ────────────────────────

    #[inline(always)]
    const fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.len()
    }

    /// Advance one byte and return it.  Higher‑level code always guards with
    /// [`is_at_end`] or a non‑zero [`peek`].
    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.bytes[self.curr];
        self.curr += 1;
        b
    }

    /// Peek at the current byte without consuming it.  Returns `0` if past EOF.
    #[inline(always)]
    fn peek(&self) -> u8 {
        self.bytes.get(self.curr).copied().unwrap_or(0)
    }

    /// Peek one byte beyond [`peek`].  Safe at EOF.
    #[inline(always)]
    fn peek_next(&self) -> u8 {
        self.bytes.get(self.curr + 1).copied().unwrap_or(0)
    }

    /// Conditionally consume a byte **iff** it matches `expected`.
    #[inline(always)]
    fn match_byte(&mut self, expected: u8) -> bool {
        if !self.is_at_end() && self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume one byte if it is any of `set`.
    #[inline(always)]
    fn match_any(&mut self, set: &[u8]) -> bool {
        if !self.is_at_end() && set.contains(&self.peek()) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a whole UTF‑8 scalar whose lead byte is at `curr`.
    fn advance_char(&mut self) {
        self.advance();

        while (0x80..0xC0).contains(&self.peek()) {
            self.advance();
        }
    }

    #[inline]
    fn column_of(&self, index: usize) -> usize {
        index - self.line_start + 1
    }

    fn error(&self, msg: impl Into<String>) -> EvalError {
        EvalError::lex(self.line, self.column_of(self.start), msg)
    }

    /// Register a newline that ends just before `curr`.
    fn newline_at(&mut self, index: usize) {
        self.line += 1;
        self.line_start = index + 1;
    }

    // ───────────────────────────── core lexing ─────────────────────────────

    /// Scan a *single* token starting at `self.curr`.  If the lexeme produces an
    /// actual token the kind is stored in `self.pending`.  Whitespace and
    /// comments are skipped by returning `Ok(())` with `pending = None`.
    fn scan_token(&mut self) -> Result<()> {
        let b = self.advance();

        let tt = match b {
            // ── single‑character separators ──────────────────────────────
            b'(' => TokenType::LPAREN,
            b')' => TokenType::RPAREN,
            b'[' => TokenType::LBRACK,
            b']' => TokenType::RBRACK,
            b'{' => TokenType::LCURLY,
            b'}' => TokenType::RCURLY,
            b';' => TokenType::SEMI,
            b',' => TokenType::COMMA,
            b'@' => TokenType::AT,
            b'?' => TokenType::QUESTION,
            b':' => TokenType::COLON,
            b'~' => TokenType::NOT,

            b'.' => {
                if self.peek().is_ascii_digit() {
                    return self.scan_fraction();
                }

                if self.peek() == b'.' && self.peek_next() == b'.' {
                    self.curr += 2;
                    TokenType::ELLIPSIS
                } else {
                    TokenType::DOT
                }
            }

            // ── operators with `=` / doubled forms ───────────────────────
            b'=' => self.either(b'=', TokenType::EQUAL, TokenType::ASSIGN),
            b'!' => self.either(b'=', TokenType::NOT_EQUAL, TokenType::LOGICAL_NOT),
            b'*' => self.either(b'=', TokenType::STAR_ASSIGN, TokenType::STAR),
            b'%' => self.either(b'=', TokenType::MOD_ASSIGN, TokenType::MOD),
            b'^' => self.either(b'=', TokenType::XOR_ASSIGN, TokenType::XOR),

            b'+' => {
                if self.match_byte(b'+') {
                    TokenType::INC
                } else {
                    self.either(b'=', TokenType::PLUS_ASSIGN, TokenType::PLUS)
                }
            }

            b'-' => {
                if self.match_byte(b'-') {
                    TokenType::DEC
                } else {
                    self.either(b'=', TokenType::MINUS_ASSIGN, TokenType::MINUS)
                }
            }

            b'&' => {
                if self.match_byte(b'&') {
                    TokenType::LOGICAL_AND
                } else {
                    self.either(b'=', TokenType::AND_ASSIGN, TokenType::AND)
                }
            }

            b'|' => {
                if self.match_byte(b'|') {
                    TokenType::LOGICAL_OR
                } else {
                    self.either(b'=', TokenType::OR_ASSIGN, TokenType::OR)
                }
            }

            b'<' => {
                if self.match_byte(b'<') {
                    self.either(b'=', TokenType::SHIFT_LEFT_ASSIGN, TokenType::SHIFT_LEFT)
                } else {
                    self.either(b'=', TokenType::LESS_OR_EQUAL, TokenType::LESS_THAN)
                }
            }

            b'>' => {
                if self.match_byte(b'>') {
                    if self.match_byte(b'>') {
                        self.either(
                            b'=',
                            TokenType::BIT_SHIFT_RIGHT_ASSIGN,
                            TokenType::BIT_SHIFT_RIGHT,
                        )
                    } else {
                        self.either(b'=', TokenType::SHIFT_RIGHT_ASSIGN, TokenType::SHIFT_RIGHT)
                    }
                } else {
                    self.either(b'=', TokenType::GREATER_OR_EQUAL, TokenType::GREATER_THAN)
                }
            }

            // ── division or comments ────────────────────────────────────
            b'/' => {
                if self.match_byte(b'/') {
                    // Fast‑forward to the next newline; the newline itself is
                    // handled by the whitespace arm on the next call.
                    match memchr(b'\n', &self.bytes[self.curr..]) {
                        Some(pos) => self.curr += pos,
                        None => self.curr = self.len(),
                    }

                    return Ok(());
                }

                if self.match_byte(b'*') {
                    return self.skip_block_comment();
                }

                self.either(b'=', TokenType::DIV_ASSIGN, TokenType::DIV)
            }

            // ── whitespace / newline ─────────────────────────────────────
            b' ' | b'\r' | b'\t' | 0x0C => {
                return Ok(());
            }

            b'\n' => {
                self.newline_at(self.curr - 1);

                return Ok(());
            }

            // ── literals ────────────────────────────────────────────────
            b'"' => return self.scan_string(),
            b'\'' => return self.scan_char(),
            b'0'..=b'9' => return self.scan_number(b),

            // ── identifiers / keywords ───────────────────────────────────
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' | 0x80..=0xFF => {
                self.scan_identifier();

                return Ok(());
            }

            // ── unexpected character ─────────────────────────────────────
            _ => {
                return Err(self.error(format!("Unexpected character: {}", b as char)));
            }
        };

        self.pending = Some(tt);

        Ok(())
    }

    #[inline(always)]
    fn either(&mut self, next: u8, matched: TokenType, otherwise: TokenType) -> TokenType {
        if self.match_byte(next) {
            matched
        } else {
            otherwise
        }
    }

    /// Skip a `/* … */` comment whose opening delimiter was just consumed.
    fn skip_block_comment(&mut self) -> Result<()> {
        let rest: &[u8] = &self.bytes[self.curr..];

        let Some(end) = memmem::find(rest, b"*/") else {
            let err = self.error("Unterminated comment");
            self.curr = self.len();
            return Err(err);
        };

        let body: &[u8] = &rest[..end];
        let newlines: usize = memchr_iter(b'\n', body).count();

        if let Some(last) = memrchr(b'\n', body) {
            self.line += newlines;
            self.line_start = self.curr + last + 1;
        }

        self.curr += end + 2;

        Ok(())
    }

    /// Validate one escape sequence; the backslash is already consumed.
    fn scan_escape(&mut self) -> Result<()> {
        match self.peek() {
            b'b' | b't' | b'n' | b'f' | b'r' | b'"' | b'\'' | b'\\' => {
                self.advance();
            }

            b'u' => {
                while self.peek() == b'u' {
                    self.advance();
                }

                for _ in 0..4 {
                    if !self.peek().is_ascii_hexdigit() {
                        return Err(self.error("Illegal unicode escape"));
                    }

                    self.advance();
                }
            }

            b'0'..=b'7' => {
                // \[0-3][0-7][0-7] | \[0-7][0-7] | \[0-7]
                let first: u8 = self.advance();
                let max_extra: usize = if first <= b'3' { 2 } else { 1 };

                for _ in 0..max_extra {
                    if !(b'0'..=b'7').contains(&self.peek()) {
                        break;
                    }

                    self.advance();
                }
            }

            _ => return Err(self.error("Illegal escape character")),
        }

        Ok(())
    }

    /// Parse a double‑quoted string literal.  Java strings may not span lines.
    fn scan_string(&mut self) -> Result<()> {
        loop {
            if self.is_at_end() || self.peek() == b'\n' {
                return Err(self.error("Unterminated string literal"));
            }

            match self.advance() {
                b'"' => break,
                b'\\' => self.scan_escape()?,
                _ => {}
            }
        }

        self.pending = Some(TokenType::STRING_LITERAL);

        Ok(())
    }

    /// Parse a single‑quoted character literal.
    fn scan_char(&mut self) -> Result<()> {
        match self.peek() {
            0 if self.is_at_end() => {
                return Err(self.error("Unterminated character literal"));
            }

            b'\'' | b'\n' => {
                return Err(self.error("Empty character literal"));
            }

            b'\\' => {
                self.advance();
                self.scan_escape()?;
            }

            _ => self.advance_char(),
        }

        if !self.match_byte(b'\'') {
            return Err(self.error("Unterminated character literal"));
        }

        self.pending = Some(TokenType::CHARACTER_LITERAL);

        Ok(())
    }

    /// Parse a numeric literal whose first digit is already consumed.
    fn scan_number(&mut self, first: u8) -> Result<()> {
        if first == b'0' && matches!(self.peek(), b'x' | b'X') {
            self.advance();

            let digits_start: usize = self.curr;

            while self.peek().is_ascii_hexdigit() {
                self.advance();
            }

            if self.curr == digits_start {
                return Err(self.error("Malformed hex literal"));
            }

            self.match_any(b"lL");
            self.pending = Some(TokenType::HEX_LITERAL);

            return Ok(());
        }

        while self.peek().is_ascii_digit() {
            self.advance();
        }

        let digits_end: usize = self.curr;
        let mut floating: bool = false;

        if self.peek() == b'.' && self.peek_next() != b'.' {
            floating = true;
            self.advance();

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        if matches!(self.peek(), b'e' | b'E') {
            floating = true;
            self.scan_exponent()?;
        }

        if self.match_any(b"fFdD") {
            floating = true;
        }

        if floating {
            self.pending = Some(TokenType::FLOATING_POINT_LITERAL);

            return Ok(());
        }

        self.match_any(b"lL");

        let digits: &[u8] = &self.bytes[self.start..digits_end];

        let tt = if first == b'0' && digits.len() > 1 {
            if digits.iter().any(|d| !(b'0'..=b'7').contains(d)) {
                return Err(self.error("Invalid octal literal"));
            }

            TokenType::OCTAL_LITERAL
        } else {
            TokenType::DECIMAL_LITERAL
        };

        self.pending = Some(tt);

        Ok(())
    }

    /// Fraction‑first literal such as `.5e3f`; the dot is already consumed.
    fn scan_fraction(&mut self) -> Result<()> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if matches!(self.peek(), b'e' | b'E') {
            self.scan_exponent()?;
        }

        self.match_any(b"fFdD");
        self.pending = Some(TokenType::FLOATING_POINT_LITERAL);

        Ok(())
    }

    fn scan_exponent(&mut self) -> Result<()> {
        self.advance(); // 'e' | 'E'
        self.match_any(b"+-");

        if !self.peek().is_ascii_digit() {
            return Err(self.error("Malformed floating point literal: missing exponent digits"));
        }

        while self.peek().is_ascii_digit() {
            self.advance();
        }

        Ok(())
    }

    /// Parse an identifier and decide if it is a **keyword** or a generic
    /// `IDENT` token.  Non‑ASCII bytes are accepted as identifier parts.
    fn scan_identifier(&mut self) {
        while {
            let c: u8 = self.peek();
            c.is_ascii_alphanumeric() || c == b'_' || c == b'$' || c >= 0x80
        } {
            self.advance();
        }

        let slice: &[u8] = &self.bytes[self.start..self.curr];

        let tt: TokenType = KEYWORDS.get(slice).copied().unwrap_or(TokenType::IDENT);

        self.pending = Some(tt);
    }
}

// ───────────────────────── Iterator implementation ─────────────────────────

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        // Loop until we either emit a token, hit EOF, or see an error.
        while self.curr <= self.len() {
            // 1. EOF guard – emit exactly one EOF then terminate.
            if self.curr == self.len() {
                let column: usize = self.column_of(self.curr);
                self.curr += 1; // ensure fused semantics
                return Some(Ok(Token::new(TokenType::EOF, "", self.line, column)));
            }

            // 2. Reset per‑token state.
            self.start = self.curr;
            self.pending = None;

            let line: usize = self.line;
            let column: usize = self.column_of(self.start);

            // 3. Attempt to scan a token.
            if let Err(e) = self.scan_token() {
                return Some(Err(e));
            }

            // 4. If a real token was recognised, build and return it.
            if let Some(tt) = self.pending.take() {
                let lexeme: &'a str = self.src.get(self.start..self.curr).unwrap_or_default();
                debug!("Scanned token ({:?}) at {}:{}", tt, line, column);

                return Some(Ok(Token::new(tt, lexeme, line, column)));
            }
            // Otherwise it was whitespace / comment → continue loop.
        }

        None // already yielded EOF
    }
}

impl<'a> FusedIterator for Scanner<'a> {}

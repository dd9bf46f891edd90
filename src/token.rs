use log::debug;
use serde::Serialize;
use std::fmt;

/// The different kinds of tokens recognized by the Java expression scanner.
///
/// Literal tokens do not carry a decoded payload: the lexeme *is* the
/// literal and conversion is left to the evaluator, which owns the target's
/// numeric and string semantics.  `IDENT` is used for user‑defined names.
/// `EOF` marks the end of input.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenType {
    // ── separators ──────────────────────────────────────────────────────
    /// '('
    LPAREN,

    /// ')'
    RPAREN,

    /// '['
    LBRACK,

    /// ']'
    RBRACK,

    /// '{'
    LCURLY,

    /// '}'
    RCURLY,

    /// ';'
    SEMI,

    /// ','
    COMMA,

    /// '.'
    DOT,

    /// '...'
    ELLIPSIS,

    /// '@'
    AT,

    /// '?'
    QUESTION,

    /// ':'
    COLON,

    // ── assignment operators ────────────────────────────────────────────
    /// '='
    ASSIGN,

    /// '+='
    PLUS_ASSIGN,

    /// '-='
    MINUS_ASSIGN,

    /// '*='
    STAR_ASSIGN,

    /// '/='
    DIV_ASSIGN,

    /// '%='
    MOD_ASSIGN,

    /// '&='
    AND_ASSIGN,

    /// '|='
    OR_ASSIGN,

    /// '^='
    XOR_ASSIGN,

    /// '<<='
    SHIFT_LEFT_ASSIGN,

    /// '>>='
    SHIFT_RIGHT_ASSIGN,

    /// '>>>='
    BIT_SHIFT_RIGHT_ASSIGN,

    // ── other operators ─────────────────────────────────────────────────
    /// '||'
    LOGICAL_OR,

    /// '&&'
    LOGICAL_AND,

    /// '|'
    OR,

    /// '^'
    XOR,

    /// '&'
    AND,

    /// '=='
    EQUAL,

    /// '!='
    NOT_EQUAL,

    /// '<'
    LESS_THAN,

    /// '<='
    LESS_OR_EQUAL,

    /// '>'
    GREATER_THAN,

    /// '>='
    GREATER_OR_EQUAL,

    /// '<<'
    SHIFT_LEFT,

    /// '>>'
    SHIFT_RIGHT,

    /// '>>>'
    BIT_SHIFT_RIGHT,

    /// '+'
    PLUS,

    /// '-'
    MINUS,

    /// '*'
    STAR,

    /// '/'
    DIV,

    /// '%'
    MOD,

    /// '++'
    INC,

    /// '--'
    DEC,

    /// '!'
    LOGICAL_NOT,

    /// '~'
    NOT,

    // ── literals ────────────────────────────────────────────────────────
    /// `0x1F`, `0xFFL`
    HEX_LITERAL,

    /// `017`, `017L`
    OCTAL_LITERAL,

    /// `0`, `42`, `42L`
    DECIMAL_LITERAL,

    /// `1.5`, `.5`, `1e10`, `2f`, `3.0d`
    FLOATING_POINT_LITERAL,

    /// `'a'`, `'\n'`
    CHARACTER_LITERAL,

    /// `"text"`
    STRING_LITERAL,

    /// 'true'
    TRUE,

    /// 'false'
    FALSE,

    /// 'null'
    NULL,

    /// A user‑defined identifier
    IDENT,

    // ── keywords ────────────────────────────────────────────────────────
    ABSTRACT,
    ASSERT,
    BOOLEAN,
    BREAK,
    BYTE,
    CASE,
    CATCH,
    CHAR,
    CLASS,
    CONTINUE,
    DEFAULT,
    DO,
    DOUBLE,
    ELSE,
    ENUM,
    EXTENDS,
    FINAL,
    FINALLY,
    FLOAT,
    FOR,
    IF,
    IMPLEMENTS,
    IMPORT,
    INSTANCEOF,
    INT,
    INTERFACE,
    LONG,
    NATIVE,
    NEW,
    PACKAGE,
    PRIVATE,
    PROTECTED,
    PUBLIC,
    RETURN,
    SHORT,
    STATIC,
    STRICTFP,
    SUPER,
    SWITCH,
    SYNCHRONIZED,
    THIS,
    THROW,
    THROWS,
    TRANSIENT,
    TRY,
    VOID,
    VOLATILE,
    WHILE,

    /// End‑of‑input marker
    EOF,
}

impl TokenType {
    /// Keywords naming one of the eight primitive types.
    pub fn is_primitive_type(self) -> bool {
        matches!(
            self,
            TokenType::BOOLEAN
                | TokenType::BYTE
                | TokenType::CHAR
                | TokenType::SHORT
                | TokenType::INT
                | TokenType::LONG
                | TokenType::FLOAT
                | TokenType::DOUBLE
        )
    }

    /// Tokens that start a literal primary.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenType::HEX_LITERAL
                | TokenType::OCTAL_LITERAL
                | TokenType::DECIMAL_LITERAL
                | TokenType::FLOATING_POINT_LITERAL
                | TokenType::CHARACTER_LITERAL
                | TokenType::STRING_LITERAL
                | TokenType::TRUE
                | TokenType::FALSE
                | TokenType::NULL
        )
    }
}

/// A scanned token, including its type, the original lexeme,
/// and the position where it was found.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Token<'a> {
    /// The category of this token.
    pub token_type: TokenType,

    /// The exact substring from the source that produced this token.
    pub lexeme: &'a str,

    /// 1‑based line number in the source.
    pub line: usize,

    /// 1‑based column of the first character of the lexeme.
    pub column: usize,
}

impl<'a> Token<'a> {
    /// Create a new Token with the given type, lexeme and position.
    pub fn new(token_type: TokenType, lexeme: &'a str, line: usize, column: usize) -> Self {
        debug!(
            "Creating new token: type={:?}, lexeme={}, line={}:{}",
            token_type, lexeme, line, column
        );

        Self {
            token_type,
            lexeme,
            line,
            column,
        }
    }

    /// The lexeme as it should appear in a diagnostic (`<EOF>` for the end
    /// marker, mirroring the usual grammar-tool phrasing).
    pub fn describe(&self) -> &str {
        match self.token_type {
            TokenType::EOF => "<EOF>",
            _ => self.lexeme,
        }
    }
}

impl<'a> fmt::Display for Token<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Variant names double as the printed token names.
        write!(f, "{:?} {}", self.token_type, self.describe())
    }
}

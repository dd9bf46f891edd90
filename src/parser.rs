/*!
Recursive‑descent parser for the Java expression subset.

Time & Space
------------
* **n** = number of tokens (including the sole EOF).

| Phase / function               | Cost | Rationale                                                  |
|--------------------------------|-----:|------------------------------------------------------------|
| `Parser::parse` main descent   | Θ(n) | Each token is consumed once via `advance()`.               |
| Cast lookahead `cast_ahead()`  | O(k) | Bounded by the length of the parenthesised type name.      |
| Error recovery `synchronize()` | O(k) | Discards tokens up to the next token that starts an operand.|

Call‑stack depth grows with syntactic nesting (≪ n in practice).

### Logging Policy

| Location                          | Level   | Purpose                                        |
|-----------------------------------|---------|------------------------------------------------|
| `Parser::new`, `parse`            | `info`  | Lifecycle milestones.                          |
| grammar branches (cast, creator…) | `debug` | Descent into less common productions.          |
| syntax errors in strict mode      | `warn`  | Default diagnostic sink.                       |

--------------------------------------------------------------------------------
Grammar (EBNF, condensed)
--------------------------------------------------------------------------------

```text
expression     → assignment ;
assignment     → ternary ( ASSIGN_OP assignment )? ;
ternary        → logical_or ( "?" assignment ":" ternary )? ;
logical_or     → logical_and ( "||" logical_and )* ;
logical_and    → inclusive_or ( "&&" inclusive_or )* ;
inclusive_or   → exclusive_or ( "|" exclusive_or )* ;
exclusive_or   → and ( "^" and )* ;
and            → equality ( "&" equality )* ;
equality       → instance_of ( ( "==" | "!=" ) instance_of )* ;
instance_of    → relational ( "instanceof" type )? ;
relational     → shift ( ( "<" | "<=" | ">" | ">=" ) shift )* ;
shift          → additive ( ( "<<" | ">>" | ">>>" ) additive )* ;
additive       → multiplicative ( ( "+" | "-" ) multiplicative )* ;
multiplicative → unary ( ( "*" | "/" | "%" ) unary )* ;
unary          → ( "+" | "-" ) unary | ( "++" | "--" ) postfix | unary_not_pm ;
unary_not_pm   → ( "~" | "!" ) unary | cast | postfix ;
cast           → "(" type ")" ( unary | unary_not_pm ) ;
postfix        → call ( "++" | "--" )* ;
call           → primary ( "." member | "[" expression "]" | "[" "]" … ".class" )* ;
member         → IDENT arguments? | "this" | "super" | "class" | "new" IDENT arguments ;
primary        → literal | IDENT arguments? | "(" expression ")" | "this" | "super"
               | "new" creator | ( primitive | "void" ) ( "[" "]" )* "." "class" ;
creator        → type_name ( arguments | ( "[" expression "]" )+ ( "[" "]" )*
               | ( "[" "]" )+ array_init ) ;
array_init     → "{" ( ( array_init | expression ) ( "," … )* ","? )? "}" ;
type           → ( primitive | IDENT ( "." IDENT )* ) ( "[" "]" )* ;
```

Casts are recognised by bounded lookahead instead of backtracking: a
parenthesised primitive type is always a cast; a parenthesised (dotted) name
is a cast only when followed by something that can only start an operand.
*/

use crate::error::{EvalError, Result};
use crate::expr::{
    AssignOp, BinaryOp, Creator, Expr, IncDecOp, LiteralKind, Member, TypeRef, UnaryOp,
};
use crate::token::{Token, TokenType};

use log::{debug, info, warn};
use std::fmt;

/// Java limits argument lists to 255 entries.
const MAX_ARGUMENTS: usize = 255;

/// Token returned by `peek()` if the parser is handed an empty slice.
static EOF_TOKEN: Token<'static> = Token {
    token_type: TokenType::EOF,
    lexeme: "",
    line: 1,
    column: 1,
};

type BinaryTable = &'static [(TokenType, BinaryOp)];

const LOGICAL_OR: BinaryTable = &[(TokenType::LOGICAL_OR, BinaryOp::LogicalOr)];
const LOGICAL_AND: BinaryTable = &[(TokenType::LOGICAL_AND, BinaryOp::LogicalAnd)];
const INCLUSIVE_OR: BinaryTable = &[(TokenType::OR, BinaryOp::Or)];
const EXCLUSIVE_OR: BinaryTable = &[(TokenType::XOR, BinaryOp::Xor)];
const AND: BinaryTable = &[(TokenType::AND, BinaryOp::And)];

const EQUALITY: BinaryTable = &[
    (TokenType::EQUAL, BinaryOp::Equal),
    (TokenType::NOT_EQUAL, BinaryOp::NotEqual),
];

const RELATIONAL: BinaryTable = &[
    (TokenType::LESS_THAN, BinaryOp::LessThan),
    (TokenType::LESS_OR_EQUAL, BinaryOp::LessOrEqual),
    (TokenType::GREATER_THAN, BinaryOp::GreaterThan),
    (TokenType::GREATER_OR_EQUAL, BinaryOp::GreaterOrEqual),
];

const SHIFT: BinaryTable = &[
    (TokenType::SHIFT_LEFT, BinaryOp::ShiftLeft),
    (TokenType::SHIFT_RIGHT, BinaryOp::ShiftRight),
    (TokenType::BIT_SHIFT_RIGHT, BinaryOp::BitShiftRight),
];

const ADDITIVE: BinaryTable = &[
    (TokenType::PLUS, BinaryOp::Plus),
    (TokenType::MINUS, BinaryOp::Minus),
];

const MULTIPLICATIVE: BinaryTable = &[
    (TokenType::STAR, BinaryOp::Star),
    (TokenType::DIV, BinaryOp::Div),
    (TokenType::MOD, BinaryOp::Mod),
];

/// One syntax diagnostic: position plus the grammar message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl Diagnostic {
    /// Diagnostic view of an error raised while scanning or parsing.
    pub fn from_error(err: &EvalError) -> Self {
        match err {
            EvalError::Lex {
                message,
                line,
                column,
            }
            | EvalError::Parse {
                message,
                line,
                column,
            } => Diagnostic {
                line: *line,
                column: *column,
                message: message.clone(),
            },
            other => Diagnostic {
                line: 0,
                column: 0,
                message: other.to_string(),
            },
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}:{} {}", self.line, self.column, self.message)
    }
}

impl From<Diagnostic> for EvalError {
    fn from(d: Diagnostic) -> Self {
        EvalError::Parse {
            message: d.message,
            line: d.line,
            column: d.column,
        }
    }
}

/// Expression parser over an immutable slice of tokens ending in `EOF`.
pub struct Parser<'a> {
    tokens: &'a [Token<'a>],
    current: usize,
    recovering: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    /// Strict parser: the first syntax error aborts the parse.
    pub fn new(tokens: &'a [Token<'a>]) -> Self {
        info!("Parser created with {} tokens", tokens.len());

        Self {
            tokens,
            current: 0,
            recovering: false,
            diagnostics: Vec::new(),
        }
    }

    /// Recovering parser: syntax errors are collected into
    /// [`diagnostics`](Self::diagnostics) and parsing continues best‑effort.
    pub fn recovering(tokens: &'a [Token<'a>]) -> Self {
        info!("Recovering parser created with {} tokens", tokens.len());

        Self {
            recovering: true,
            ..Self::new(tokens)
        }
    }

    /// Messages collected so far, in source order of discovery.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    // ───────────────────────── public API ─────────────────────────

    /// Parse exactly one expression followed by EOF.
    ///
    /// In recovering mode the returned error is the first collected
    /// diagnostic; the complete list stays available on the parser.
    pub fn parse(&mut self) -> Result<Expr> {
        info!("Beginning parse phase");

        if self.recovering {
            return self.parse_recovering();
        }

        let result = self.expression().and_then(|expr| {
            if self.is_at_end() {
                Ok(expr)
            } else {
                Err(self.extraneous(self.peek()))
            }
        });

        if let Err(e) = &result {
            warn!("{}", e);
        }

        result
    }

    fn parse_recovering(&mut self) -> Result<Expr> {
        let mut parsed: Option<Expr> = None;

        loop {
            match self.expression() {
                Ok(expr) => {
                    parsed.get_or_insert(expr);

                    if self.is_at_end() {
                        break;
                    }

                    let err = self.extraneous(self.peek());
                    self.record(&err);
                    self.advance();
                }

                Err(err) => {
                    self.record(&err);

                    if self.is_at_end() {
                        break;
                    }

                    self.synchronize();
                }
            }

            if self.is_at_end() {
                break;
            }
        }

        info!(
            "Recovering parse finished with {} diagnostic(s)",
            self.diagnostics.len()
        );

        match (self.diagnostics.first(), parsed) {
            (Some(first), _) => Err(first.clone().into()),
            (None, Some(expr)) => Ok(expr),
            (None, None) => Err(self.syntax_error(self.peek(), "empty expression")),
        }
    }

    // ─────────────────────── expression rules ─────────────────────

    fn expression(&mut self) -> Result<Expr> {
        debug!("Entering expression at token {}", self.current);

        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr> {
        let target: Expr = self.ternary()?;

        if let Some(op) = assign_op(self.peek().token_type) {
            self.advance();

            debug!("Parsing assignment '{}'", op.as_str());

            let value: Expr = self.assignment()?;

            return Ok(Expr::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            });
        }

        Ok(target)
    }

    fn ternary(&mut self) -> Result<Expr> {
        let condition: Expr = self.logical_or()?;

        if self.matches(TokenType::QUESTION) {
            let then_branch: Expr = self.assignment()?;

            self.consume(TokenType::COLON, "':'")?;

            let else_branch: Expr = self.ternary()?;

            return Ok(Expr::Ternary {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            });
        }

        Ok(condition)
    }

    /// One left‑associative precedence level.
    fn left_assoc(
        &mut self,
        table: BinaryTable,
        operand: fn(&mut Self) -> Result<Expr>,
    ) -> Result<Expr> {
        let mut expr: Expr = operand(self)?;

        while let Some(op) = self.binary_op(table) {
            let right: Expr = operand(self)?;

            expr = Expr::Binary {
                op,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn logical_or(&mut self) -> Result<Expr> {
        self.left_assoc(LOGICAL_OR, Self::logical_and)
    }

    fn logical_and(&mut self) -> Result<Expr> {
        self.left_assoc(LOGICAL_AND, Self::inclusive_or)
    }

    fn inclusive_or(&mut self) -> Result<Expr> {
        self.left_assoc(INCLUSIVE_OR, Self::exclusive_or)
    }

    fn exclusive_or(&mut self) -> Result<Expr> {
        self.left_assoc(EXCLUSIVE_OR, Self::and)
    }

    fn and(&mut self) -> Result<Expr> {
        self.left_assoc(AND, Self::equality)
    }

    fn equality(&mut self) -> Result<Expr> {
        self.left_assoc(EQUALITY, Self::instance_of)
    }

    fn instance_of(&mut self) -> Result<Expr> {
        let operand: Expr = self.relational()?;

        if self.matches(TokenType::INSTANCEOF) {
            let ty: TypeRef = self.type_ref()?;

            return Ok(Expr::InstanceOf {
                operand: Box::new(operand),
                ty,
            });
        }

        Ok(operand)
    }

    fn relational(&mut self) -> Result<Expr> {
        self.left_assoc(RELATIONAL, Self::shift)
    }

    fn shift(&mut self) -> Result<Expr> {
        self.left_assoc(SHIFT, Self::additive)
    }

    fn additive(&mut self) -> Result<Expr> {
        self.left_assoc(ADDITIVE, Self::multiplicative)
    }

    fn multiplicative(&mut self) -> Result<Expr> {
        self.left_assoc(MULTIPLICATIVE, Self::unary)
    }

    fn unary(&mut self) -> Result<Expr> {
        let op: UnaryOp = match self.peek().token_type {
            TokenType::PLUS => UnaryOp::Plus,
            TokenType::MINUS => UnaryOp::Minus,

            TokenType::INC | TokenType::DEC => {
                let op = if self.advance().token_type == TokenType::INC {
                    IncDecOp::PreIncrement
                } else {
                    IncDecOp::PreDecrement
                };

                let operand: Expr = self.postfix()?;

                return Ok(Expr::IncDec {
                    op,
                    operand: Box::new(operand),
                });
            }

            _ => return self.unary_not_plus_minus(),
        };

        self.advance();

        let operand: Expr = self.unary()?;

        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn unary_not_plus_minus(&mut self) -> Result<Expr> {
        let op: UnaryOp = match self.peek().token_type {
            TokenType::NOT => UnaryOp::Not,
            TokenType::LOGICAL_NOT => UnaryOp::LogicalNot,
            TokenType::LPAREN if self.cast_ahead() => return self.cast(),
            _ => return self.postfix(),
        };

        self.advance();

        let operand: Expr = self.unary()?;

        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    /// Bounded lookahead deciding whether the `(` at the cursor opens a cast.
    fn cast_ahead(&self) -> bool {
        let mut i: usize = 1;
        let primitive: bool = self.peek_at(i).is_primitive_type();

        if primitive {
            i += 1;
        } else if self.peek_at(i) == TokenType::IDENT {
            i += 1;

            while self.peek_at(i) == TokenType::DOT && self.peek_at(i + 1) == TokenType::IDENT {
                i += 2;
            }
        } else {
            return false;
        }

        while self.peek_at(i) == TokenType::LBRACK && self.peek_at(i + 1) == TokenType::RBRACK {
            i += 2;
        }

        if self.peek_at(i) != TokenType::RPAREN {
            return false;
        }

        if primitive {
            return true;
        }

        let next: TokenType = self.peek_at(i + 1);

        next.is_literal()
            || matches!(
                next,
                TokenType::IDENT
                    | TokenType::THIS
                    | TokenType::SUPER
                    | TokenType::NEW
                    | TokenType::LPAREN
                    | TokenType::LOGICAL_NOT
                    | TokenType::NOT
            )
    }

    fn cast(&mut self) -> Result<Expr> {
        self.consume(TokenType::LPAREN, "'('")?;

        let ty: TypeRef = self.type_ref()?;

        self.consume(TokenType::RPAREN, "')'")?;

        debug!("Parsing cast to {}", ty);

        // `(int) -x` is legal; `(Foo) -x` is a subtraction and never gets here.
        let operand: Expr = if is_primitive_name(&ty) {
            self.unary()?
        } else {
            self.unary_not_plus_minus()?
        };

        Ok(Expr::Cast {
            ty,
            operand: Box::new(operand),
        })
    }

    fn postfix(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.call()?;

        loop {
            let op = if self.matches(TokenType::INC) {
                IncDecOp::PostIncrement
            } else if self.matches(TokenType::DEC) {
                IncDecOp::PostDecrement
            } else {
                break;
            };

            expr = Expr::IncDec {
                op,
                operand: Box::new(expr),
            };
        }

        Ok(expr)
    }

    /// Primary followed by any number of `.member` and `[index]` selectors.
    fn call(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.primary()?;

        loop {
            if self.matches(TokenType::DOT) {
                expr = self.finish_dot(expr)?;
            } else if self.check(TokenType::LBRACK) {
                if self.peek_at(1) == TokenType::RBRACK {
                    expr = self.array_class_literal(expr)?;
                } else {
                    self.advance();

                    let index: Expr = self.expression()?;

                    self.consume(TokenType::RBRACK, "']'")?;

                    expr = Expr::ArrayAccess {
                        array: Box::new(expr),
                        index: Box::new(index),
                    };
                }
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_dot(&mut self, target: Expr) -> Result<Expr> {
        let token: &'a Token<'a> = self.peek();
        let target: Box<Expr> = Box::new(target);

        let member: Member = match token.token_type {
            TokenType::IDENT => {
                self.advance();

                let dot = Expr::Dot {
                    target,
                    member: Member::Ident(token.lexeme.to_string()),
                };

                if self.check(TokenType::LPAREN) {
                    let arguments: Vec<Expr> = self.arguments()?;

                    return Ok(Expr::MethodCall {
                        callee: Box::new(dot),
                        arguments,
                    });
                }

                return Ok(dot);
            }

            TokenType::THIS => Member::This,
            TokenType::SUPER => Member::Super,
            TokenType::CLASS => Member::Class,

            TokenType::NEW => {
                self.advance();

                debug!("Parsing inner class creation");

                let class: &Token<'_> = self.consume(TokenType::IDENT, "identifier")?;
                let arguments: Vec<Expr> = self.arguments()?;

                return Ok(Expr::Dot {
                    target,
                    member: Member::New {
                        class: class.lexeme.to_string(),
                        arguments,
                    },
                });
            }

            _ => {
                return Err(self.syntax_error(
                    token,
                    format!("no viable alternative at input '.{}'", token.describe()),
                ));
            }
        };

        self.advance();

        Ok(Expr::Dot { target, member })
    }

    /// `Name[].class` where `Name` was already parsed as a dotted chain.
    fn array_class_literal(&mut self, expr: Expr) -> Result<Expr> {
        let Some(name) = expr.qualified_name() else {
            return Err(self.syntax_error(self.peek(), "no viable alternative at input '['"));
        };

        let dimensions: usize = self.dimensions();

        self.consume(TokenType::DOT, "'.'")?;
        self.consume(TokenType::CLASS, "'class'")?;

        Ok(Expr::ClassLiteral(TypeRef::new(name, dimensions)))
    }

    fn arguments(&mut self) -> Result<Vec<Expr>> {
        self.consume(TokenType::LPAREN, "'('")?;

        let mut arguments: Vec<Expr> = Vec::new();

        if !self.check(TokenType::RPAREN) {
            loop {
                if arguments.len() >= MAX_ARGUMENTS {
                    return Err(
                        self.syntax_error(self.peek(), "Cannot have more than 255 arguments")
                    );
                }

                arguments.push(self.expression()?);

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        self.consume(TokenType::RPAREN, "')'")?;

        Ok(arguments)
    }

    fn primary(&mut self) -> Result<Expr> {
        let token: &'a Token<'a> = self.peek();

        if let Some(kind) = literal_kind(token.token_type) {
            self.advance();

            return Ok(Expr::literal(kind, token.lexeme));
        }

        match token.token_type {
            TokenType::IDENT => {
                self.advance();

                let name = Expr::Ident(token.lexeme.to_string());

                if self.check(TokenType::LPAREN) {
                    let arguments: Vec<Expr> = self.arguments()?;

                    return Ok(Expr::MethodCall {
                        callee: Box::new(name),
                        arguments,
                    });
                }

                Ok(name)
            }

            TokenType::LPAREN => {
                self.advance();

                let expr: Expr = self.expression()?;

                self.consume(TokenType::RPAREN, "')'")?;

                Ok(Expr::Parenthesized(Box::new(expr)))
            }

            TokenType::THIS => {
                self.advance();
                Ok(Expr::This)
            }

            TokenType::SUPER => {
                self.advance();
                Ok(Expr::Super)
            }

            TokenType::NEW => {
                self.advance();
                self.creator()
            }

            tt if tt.is_primitive_type() || tt == TokenType::VOID => {
                self.advance();

                let dimensions: usize = self.dimensions();

                self.consume(TokenType::DOT, "'.'")?;
                self.consume(TokenType::CLASS, "'class'")?;

                Ok(Expr::ClassLiteral(TypeRef::new(token.lexeme, dimensions)))
            }

            _ => Err(self.syntax_error(
                token,
                format!("no viable alternative at input '{}'", token.describe()),
            )),
        }
    }

    fn creator(&mut self) -> Result<Expr> {
        let token: &'a Token<'a> = self.peek();
        let primitive: bool = token.token_type.is_primitive_type();

        let name: String = if primitive {
            self.advance();
            token.lexeme.to_string()
        } else if token.token_type == TokenType::IDENT {
            self.qualified_ident()?
        } else {
            return Err(self.syntax_error(
                token,
                format!("no viable alternative at input '{}'", token.describe()),
            ));
        };

        debug!("Parsing creator for {}", name);

        if self.check(TokenType::LBRACK) {
            return self.array_creator(name);
        }

        if primitive {
            let next: &Token<'_> = self.peek();
            return Err(self.syntax_error(next, format!("missing '[' at '{}'", next.describe())));
        }

        let arguments: Vec<Expr> = self.arguments()?;

        Ok(Expr::New(Creator::Object {
            ty: TypeRef::new(name, 0),
            arguments,
        }))
    }

    fn array_creator(&mut self, name: String) -> Result<Expr> {
        if self.peek_at(1) == TokenType::RBRACK {
            let dims: usize = self.dimensions();
            let initializer: Vec<Expr> = self.array_initializer()?;

            return Ok(Expr::New(Creator::Array {
                ty: TypeRef::new(name, dims),
                dimensions: Vec::new(),
                initializer: Some(initializer),
            }));
        }

        let mut dimensions: Vec<Expr> = Vec::new();

        while self.check(TokenType::LBRACK) && self.peek_at(1) != TokenType::RBRACK {
            self.advance();
            dimensions.push(self.expression()?);
            self.consume(TokenType::RBRACK, "']'")?;
        }

        let total: usize = dimensions.len() + self.dimensions();

        Ok(Expr::New(Creator::Array {
            ty: TypeRef::new(name, total),
            dimensions,
            initializer: None,
        }))
    }

    fn array_initializer(&mut self) -> Result<Vec<Expr>> {
        self.consume(TokenType::LCURLY, "'{'")?;

        let mut elements: Vec<Expr> = Vec::new();

        while !self.check(TokenType::RCURLY) && !self.is_at_end() {
            let element: Expr = if self.check(TokenType::LCURLY) {
                Expr::ArrayInitializer(self.array_initializer()?)
            } else {
                self.expression()?
            };

            elements.push(element);

            if !self.matches(TokenType::COMMA) {
                break;
            }
        }

        self.consume(TokenType::RCURLY, "'}'")?;

        Ok(elements)
    }

    fn type_ref(&mut self) -> Result<TypeRef> {
        let token: &'a Token<'a> = self.peek();

        let name: String = if token.token_type.is_primitive_type() {
            self.advance();
            token.lexeme.to_string()
        } else if token.token_type == TokenType::IDENT {
            self.qualified_ident()?
        } else {
            return Err(self.syntax_error(
                token,
                format!("no viable alternative at input '{}'", token.describe()),
            ));
        };

        Ok(TypeRef::new(name, self.dimensions()))
    }

    /// `IDENT ( "." IDENT )*`
    fn qualified_ident(&mut self) -> Result<String> {
        let mut name: String = self
            .consume(TokenType::IDENT, "identifier")?
            .lexeme
            .to_string();

        while self.check(TokenType::DOT) && self.peek_at(1) == TokenType::IDENT {
            self.advance();
            name.push('.');
            name.push_str(self.advance().lexeme);
        }

        Ok(name)
    }

    /// Consume `[ ]` pairs and count them.
    fn dimensions(&mut self) -> usize {
        let mut count: usize = 0;

        while self.check(TokenType::LBRACK) && self.peek_at(1) == TokenType::RBRACK {
            self.advance();
            self.advance();
            count += 1;
        }

        count
    }

    // ────────────────────── utility helpers ───────────────────────

    fn binary_op(&mut self, table: BinaryTable) -> Option<BinaryOp> {
        let tt: TokenType = self.peek().token_type;
        let op: BinaryOp = table.iter().find(|(t, _)| *t == tt).map(|(_, op)| *op)?;

        self.advance();

        Some(op)
    }

    #[inline(always)]
    fn matches(&mut self, ttype: TokenType) -> bool {
        if self.check(ttype) {
            self.advance();

            return true;
        }

        false
    }

    /// Expect `ttype`.  In recovering mode a single extraneous token is
    /// deleted, or a missing token is assumed present, and the problem is
    /// recorded instead of aborting.
    fn consume(&mut self, ttype: TokenType, expected: &str) -> Result<&'a Token<'a>> {
        if self.check(ttype) {
            return Ok(self.advance());
        }

        let token: &'a Token<'a> = self.peek();

        if !self.recovering {
            return Err(self.syntax_error(
                token,
                format!("missing {} at '{}'", expected, token.describe()),
            ));
        }

        if self.peek_at(1) == ttype {
            let err = self.syntax_error(
                token,
                format!("extraneous input '{}' expecting {}", token.describe(), expected),
            );
            self.record(&err);
            self.advance();

            return Ok(self.advance());
        }

        let err = self.syntax_error(token, format!("missing {} at '{}'", expected, token.describe()));
        self.record(&err);

        Ok(token)
    }

    #[inline(always)]
    fn check(&self, ttype: TokenType) -> bool {
        self.peek().token_type == ttype
    }

    #[inline(always)]
    fn advance(&mut self) -> &'a Token<'a> {
        let token: &'a Token<'a> = self.peek();

        if !self.is_at_end() {
            self.current += 1;
        }

        token
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::EOF
    }

    #[inline(always)]
    fn peek(&self) -> &'a Token<'a> {
        self.tokens
            .get(self.current)
            .or_else(|| self.tokens.last())
            .unwrap_or(&EOF_TOKEN)
    }

    /// Token type `offset` positions ahead of the cursor (EOF past the end).
    fn peek_at(&self, offset: usize) -> TokenType {
        self.tokens
            .get(self.current + offset)
            .map_or(TokenType::EOF, |t| t.token_type)
    }

    fn syntax_error(&self, token: &Token<'_>, message: impl Into<String>) -> EvalError {
        EvalError::parse(token.line, token.column, message)
    }

    fn extraneous(&self, token: &Token<'_>) -> EvalError {
        self.syntax_error(
            token,
            format!("extraneous input '{}' expecting <EOF>", token.describe()),
        )
    }

    fn record(&mut self, err: &EvalError) {
        let diagnostic: Diagnostic = Diagnostic::from_error(err);

        debug!("Collected diagnostic: {}", diagnostic);

        self.diagnostics.push(diagnostic);
    }

    /// Discards tokens until one that can start an operand.
    fn synchronize(&mut self) {
        self.advance(); // skip the token that caused the error

        while !self.is_at_end() && !starts_operand(self.peek().token_type) {
            self.advance();
        }
    }
}

fn assign_op(tt: TokenType) -> Option<AssignOp> {
    let op = match tt {
        TokenType::ASSIGN => AssignOp::Assign,
        TokenType::PLUS_ASSIGN => AssignOp::PlusAssign,
        TokenType::MINUS_ASSIGN => AssignOp::MinusAssign,
        TokenType::STAR_ASSIGN => AssignOp::StarAssign,
        TokenType::DIV_ASSIGN => AssignOp::DivAssign,
        TokenType::MOD_ASSIGN => AssignOp::ModAssign,
        TokenType::AND_ASSIGN => AssignOp::AndAssign,
        TokenType::OR_ASSIGN => AssignOp::OrAssign,
        TokenType::XOR_ASSIGN => AssignOp::XorAssign,
        TokenType::SHIFT_LEFT_ASSIGN => AssignOp::ShiftLeftAssign,
        TokenType::SHIFT_RIGHT_ASSIGN => AssignOp::ShiftRightAssign,
        TokenType::BIT_SHIFT_RIGHT_ASSIGN => AssignOp::BitShiftRightAssign,
        _ => return None,
    };

    Some(op)
}

fn literal_kind(tt: TokenType) -> Option<LiteralKind> {
    let kind = match tt {
        TokenType::HEX_LITERAL => LiteralKind::Hex,
        TokenType::OCTAL_LITERAL => LiteralKind::Octal,
        TokenType::DECIMAL_LITERAL => LiteralKind::Decimal,
        TokenType::FLOATING_POINT_LITERAL => LiteralKind::FloatingPoint,
        TokenType::CHARACTER_LITERAL => LiteralKind::Char,
        TokenType::STRING_LITERAL => LiteralKind::Str,
        TokenType::TRUE => LiteralKind::True,
        TokenType::FALSE => LiteralKind::False,
        TokenType::NULL => LiteralKind::Null,
        _ => return None,
    };

    Some(kind)
}

fn starts_operand(tt: TokenType) -> bool {
    tt.is_literal()
        || tt.is_primitive_type()
        || matches!(
            tt,
            TokenType::IDENT
                | TokenType::LPAREN
                | TokenType::THIS
                | TokenType::SUPER
                | TokenType::NEW
                | TokenType::VOID
                | TokenType::PLUS
                | TokenType::MINUS
                | TokenType::INC
                | TokenType::DEC
                | TokenType::LOGICAL_NOT
                | TokenType::NOT
        )
}

fn is_primitive_name(ty: &TypeRef) -> bool {
    ty.dimensions == 0
        && matches!(
            ty.name.as_str(),
            "boolean" | "byte" | "char" | "short" | "int" | "long" | "float" | "double"
        )
}

//! Expression tree produced by the parser and consumed by the walker.
//!
//! Nodes own their text so a parsed tree can be cached independently of the
//! token buffer it came from.

use serde::Serialize;
use std::fmt;

/// The twelve simple and compound assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AssignOp {
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    DivAssign,
    ModAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShiftLeftAssign,
    ShiftRightAssign,
    BitShiftRightAssign,
}

impl AssignOp {
    /// The binary operator a compound assignment applies before storing;
    /// `None` for plain `=`.
    pub fn operand(self) -> Option<BinaryOp> {
        let op = match self {
            AssignOp::Assign => return None,
            AssignOp::PlusAssign => BinaryOp::Plus,
            AssignOp::MinusAssign => BinaryOp::Minus,
            AssignOp::StarAssign => BinaryOp::Star,
            AssignOp::DivAssign => BinaryOp::Div,
            AssignOp::ModAssign => BinaryOp::Mod,
            AssignOp::AndAssign => BinaryOp::And,
            AssignOp::OrAssign => BinaryOp::Or,
            AssignOp::XorAssign => BinaryOp::Xor,
            AssignOp::ShiftLeftAssign => BinaryOp::ShiftLeft,
            AssignOp::ShiftRightAssign => BinaryOp::ShiftRight,
            AssignOp::BitShiftRightAssign => BinaryOp::BitShiftRight,
        };

        Some(op)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::PlusAssign => "+=",
            AssignOp::MinusAssign => "-=",
            AssignOp::StarAssign => "*=",
            AssignOp::DivAssign => "/=",
            AssignOp::ModAssign => "%=",
            AssignOp::AndAssign => "&=",
            AssignOp::OrAssign => "|=",
            AssignOp::XorAssign => "^=",
            AssignOp::ShiftLeftAssign => "<<=",
            AssignOp::ShiftRightAssign => ">>=",
            AssignOp::BitShiftRightAssign => ">>>=",
        }
    }
}

/// The nineteen infix operators, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    LogicalOr,
    LogicalAnd,
    Or,
    Xor,
    And,
    Equal,
    NotEqual,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
    ShiftLeft,
    ShiftRight,
    BitShiftRight,
    Plus,
    Minus,
    Star,
    Div,
    Mod,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::LogicalOr => "||",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::And => "&",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::LessThan => "<",
            BinaryOp::LessOrEqual => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterOrEqual => ">=",
            BinaryOp::ShiftLeft => "<<",
            BinaryOp::ShiftRight => ">>",
            BinaryOp::BitShiftRight => ">>>",
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Star => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }
}

/// Operator tag handed to `Evaluator::operation`: any binary operator or any
/// assignment form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operator {
    Binary(BinaryOp),
    Assign(AssignOp),
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Binary(op) => op.as_str(),
            Operator::Assign(op) => op.as_str(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    /// `+x`
    Plus,
    /// `-x`
    Minus,
    /// `!x`
    LogicalNot,
    /// `~x`
    Not,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::LogicalNot => "!",
            UnaryOp::Not => "~",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prefix and postfix `++` / `--`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IncDecOp {
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

impl IncDecOp {
    /// Name used in diagnostics and in the printed tree.
    pub fn name(self) -> &'static str {
        match self {
            IncDecOp::PreIncrement => "prefix increment",
            IncDecOp::PreDecrement => "prefix decrement",
            IncDecOp::PostIncrement => "postfix increment",
            IncDecOp::PostDecrement => "postfix decrement",
        }
    }
}

/// The nine literal kinds, each converted by its own evaluator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LiteralKind {
    Hex,
    Octal,
    Decimal,
    FloatingPoint,
    Char,
    Str,
    True,
    False,
    Null,
}

/// A literal constant, kept as its exact source text (quotes and suffixes
/// included).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Literal {
    pub kind: LiteralKind,
    pub text: String,
}

/// A type as written in a cast, `instanceof`, `new` or class literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeRef {
    /// Primitive keyword, `void`, or a dotted class name.
    pub name: String,

    /// Number of trailing `[]` pairs.
    pub dimensions: usize,
}

impl TypeRef {
    pub fn new(name: impl Into<String>, dimensions: usize) -> Self {
        Self {
            name: name.into(),
            dimensions,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;

        for _ in 0..self.dimensions {
            f.write_str("[]")?;
        }

        Ok(())
    }
}

/// What follows the dot of a qualified expression `target.member`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Member {
    /// `a.b`
    Ident(String),

    /// `Outer.this`
    This,

    /// `Outer.super`
    Super,

    /// `outer.new Inner(args)`
    New { class: String, arguments: Vec<Expr> },

    /// `Foo.class`
    Class,
}

/// Object or array construction after `new`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Creator {
    /// `new Foo(a, b)`
    Object { ty: TypeRef, arguments: Vec<Expr> },

    /// `new int[n][]` or `new int[] {1, 2}`; `ty` carries the total dimensions.
    Array {
        ty: TypeRef,
        dimensions: Vec<Expr>,
        initializer: Option<Vec<Expr>>,
    },
}

/// **Abstract‑Syntax‑Tree node** for every expression form of the grammar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    /// `target op= value`
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },

    /// `condition ? then_branch : else_branch`
    Ternary {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },

    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    IncDec {
        op: IncDecOp,
        operand: Box<Expr>,
    },

    /// `operand instanceof Type`
    InstanceOf {
        operand: Box<Expr>,
        ty: TypeRef,
    },

    /// `(Type) operand`
    Cast {
        ty: TypeRef,
        operand: Box<Expr>,
    },

    Literal(Literal),

    /// Bare name, resolved as local variable then field of the implicit receiver.
    Ident(String),

    /// `( expr )`
    Parenthesized(Box<Expr>),

    /// `target.member`
    Dot {
        target: Box<Expr>,
        member: Member,
    },

    /// `callee(arguments)`; the callee is a bare `Ident` or a `Dot` ending in
    /// an identifier.
    MethodCall {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },

    /// `array[index]`
    ArrayAccess {
        array: Box<Expr>,
        index: Box<Expr>,
    },

    This,

    Super,

    New(Creator),

    /// Nested `{ ... }` inside an array initializer.
    ArrayInitializer(Vec<Expr>),

    /// `int.class`, `void.class`, `String[].class`
    ClassLiteral(TypeRef),
}

impl Expr {
    pub fn literal(kind: LiteralKind, text: impl Into<String>) -> Self {
        Expr::Literal(Literal {
            kind,
            text: text.into(),
        })
    }

    /// Dotted name if this node is a plain `a.b.c` chain of identifiers.
    pub fn qualified_name(&self) -> Option<String> {
        match self {
            Expr::Ident(name) => Some(name.clone()),
            Expr::Dot {
                target,
                member: Member::Ident(name),
            } => target.qualified_name().map(|prefix| format!("{}.{}", prefix, name)),
            _ => None,
        }
    }
}

//! Tree walker: turns an [`Expr`] plus an [`Evaluator`] into an
//! [`ExpressionValue`](crate::lvalue::ExpressionValue).
//!
//! The walker is a pure dispatcher.  It decides evaluation order and name
//! resolution; every value is produced by the evaluator.
//!
//! * Operator nodes evaluate their left operand, then their right operand,
//!   then call [`Evaluator::operation`] exactly once.  `&&`, `||` and the
//!   ternary are evaluated eagerly: both operands (all three for the ternary)
//!   are always evaluated.
//! * A bare identifier is looked up as a local variable, then as a field of
//!   the implicit receiver.  A bare identifier used as a method callee is the
//!   method name and the receiver is `this`.
//! * In `a.b` the value of `a` becomes the receiver that `b` is resolved
//!   against.
//! * Constructs the grammar accepts but the walker cannot evaluate
//!   (`instanceof`, `++`/`--`, casts, `new`, `.class`, qualified
//!   `this`/`super`) fail with [`EvalError::Unsupported`].

use crate::error::{EvalError, Result};
use crate::evaluator::{Evaluator, Lvalue, RuntimeValue};
use crate::expr::{Creator, Expr, LiteralKind, Literal, Member, Operator};

use log::{debug, info};

/// Resolution context threaded through one evaluation.
struct Scope<V> {
    /// `this` of the top frame; receiver of bare method calls.
    this: V,

    /// Implicit receiver for identifiers.
    receiver: V,
}

pub struct Interpreter<'e, E: Evaluator> {
    evaluator: &'e E,
}

impl<'e, E: Evaluator> Interpreter<'e, E> {
    pub fn new(evaluator: &'e E) -> Self {
        Self { evaluator }
    }

    /// Evaluate a whole expression.  The implicit receiver starts out as the
    /// evaluator's `this` object.
    pub fn evaluate(&self, expr: &Expr) -> Result<Lvalue<'e, E>> {
        let this: RuntimeValue<E> = self.evaluator.this_object()?.value()?;

        let scope = Scope {
            receiver: this.clone(),
            this,
        };

        let result: Lvalue<'e, E> = self.walk(expr, &scope)?;

        info!("Expression evaluated to a {}", result.kind());

        Ok(result)
    }

    fn walk(&self, expr: &Expr, scope: &Scope<RuntimeValue<E>>) -> Result<Lvalue<'e, E>> {
        match expr {
            Expr::Assign { op, target, value } => {
                self.operation(target, value, Operator::Assign(*op), scope)
            }

            Expr::Binary { op, left, right } => {
                self.operation(left, right, Operator::Binary(*op), scope)
            }

            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                debug!("Evaluating ternary, all three operands");

                let test: Lvalue<'e, E> = self.walk(condition, scope)?;
                let then_value: Lvalue<'e, E> = self.walk(then_branch, scope)?;
                let else_value: Lvalue<'e, E> = self.walk(else_branch, scope)?;

                self.evaluator.ternary_operator(test, then_value, else_value)
            }

            Expr::Unary { op, operand } => {
                let value: Lvalue<'e, E> = self.walk(operand, scope)?;

                debug!("Dispatching unary '{}'", op);

                self.evaluator.unary_operation(value, *op)
            }

            Expr::IncDec { op, .. } => Err(EvalError::unsupported(op.name())),

            Expr::InstanceOf { .. } => Err(EvalError::unsupported("instanceof")),

            Expr::Cast { .. } => Err(EvalError::unsupported("cast")),

            Expr::Literal(literal) => self.literal(literal),

            Expr::Ident(name) => self.identifier(name, scope),

            Expr::Parenthesized(inner) => self.walk(inner, scope),

            Expr::Dot { target, member } => {
                let receiver: RuntimeValue<E> = self.walk(target, scope)?.value()?;

                let inner = Scope {
                    this: scope.this.clone(),
                    receiver,
                };

                self.member(member, &inner)
            }

            Expr::MethodCall { callee, arguments } => self.call(callee, arguments, scope),

            Expr::ArrayAccess { array, index } => {
                let array: RuntimeValue<E> = self.walk(array, scope)?.value()?;
                let index: RuntimeValue<E> = self.walk(index, scope)?.value()?;

                self.evaluator.array_element(&array, &index)
            }

            Expr::This | Expr::Super => self.evaluator.this_object(),

            Expr::New(Creator::Object { .. }) => Err(EvalError::unsupported("object creation")),

            Expr::New(Creator::Array { .. }) => Err(EvalError::unsupported("array creation")),

            Expr::ArrayInitializer(_) => Err(EvalError::unsupported("array initializer")),

            Expr::ClassLiteral(_) => Err(EvalError::unsupported("class literal")),
        }
    }

    /// Left, then right, then one `operation` call.
    fn operation(
        &self,
        left: &Expr,
        right: &Expr,
        op: Operator,
        scope: &Scope<RuntimeValue<E>>,
    ) -> Result<Lvalue<'e, E>> {
        let left: Lvalue<'e, E> = self.walk(left, scope)?;
        let right: Lvalue<'e, E> = self.walk(right, scope)?;

        debug!("Dispatching operator '{}'", op);

        self.evaluator.operation(left, right, op)
    }

    fn identifier(&self, name: &str, scope: &Scope<RuntimeValue<E>>) -> Result<Lvalue<'e, E>> {
        if let Some(local) = self.evaluator.local_variable(name)? {
            debug!("'{}' resolved as local variable", name);
            return Ok(local);
        }

        if let Some(field) = self.evaluator.field(&scope.receiver, name)? {
            debug!("'{}' resolved as field of the implicit receiver", name);
            return Ok(field);
        }

        Err(EvalError::unresolved(name))
    }

    fn member(&self, member: &Member, scope: &Scope<RuntimeValue<E>>) -> Result<Lvalue<'e, E>> {
        match member {
            Member::Ident(name) => self
                .evaluator
                .field(&scope.receiver, name)?
                .ok_or_else(|| EvalError::unresolved(name.as_str())),

            Member::This => Err(EvalError::unsupported("qualified this")),
            Member::Super => Err(EvalError::unsupported("qualified super")),
            Member::New { .. } => Err(EvalError::unsupported("inner class creation")),
            Member::Class => Err(EvalError::unsupported("class literal")),
        }
    }

    fn call(
        &self,
        callee: &Expr,
        arguments: &[Expr],
        scope: &Scope<RuntimeValue<E>>,
    ) -> Result<Lvalue<'e, E>> {
        let (receiver, name): (RuntimeValue<E>, &str) = match callee {
            Expr::Ident(name) => (scope.this.clone(), name.as_str()),

            Expr::Dot {
                target,
                member: Member::Ident(name),
            } => (self.walk(target, scope)?.value()?, name.as_str()),

            _ => return Err(EvalError::evaluation("Method call without a method name")),
        };

        let mut values: Vec<RuntimeValue<E>> = Vec::with_capacity(arguments.len());

        for argument in arguments {
            values.push(self.walk(argument, scope)?.value()?);
        }

        debug!("Invoking '{}' with {} argument(s)", name, values.len());

        self.evaluator.invoke_method(&receiver, name, values)
    }

    fn literal(&self, literal: &Literal) -> Result<Lvalue<'e, E>> {
        let text: &str = &literal.text;

        match literal.kind {
            LiteralKind::Hex => self.evaluator.hex_value(text),
            LiteralKind::Octal => self.evaluator.octal_value(text),
            LiteralKind::Decimal => self.evaluator.decimal_value(text),
            LiteralKind::FloatingPoint => self.evaluator.floating_point_value(text),
            LiteralKind::Char => self.evaluator.char_value(text),
            LiteralKind::Str => self.evaluator.string_value(text),
            LiteralKind::True | LiteralKind::False => self.evaluator.boolean_value(text),
            LiteralKind::Null => self.evaluator.null_value(),
        }
    }
}

//! Primitive semantics the walker delegates to.
//!
//! The walker never inspects runtime values: it resolves names, combines
//! operands and converts literals exclusively through an [`Evaluator`] bound to
//! a suspended debug target.  Every method may fail; the walker propagates
//! the error unchanged.

use crate::error::Result;
use crate::expr::{Operator, UnaryOp};
use crate::lvalue::{ExpressionValue, Storage, ValueOf};

/// Lvalue produced by evaluator `E`.
pub type Lvalue<'e, E> = ExpressionValue<'e, <E as Evaluator>::Storage>;

/// Raw runtime value of evaluator `E`.
pub type RuntimeValue<E> = ValueOf<<E as Evaluator>::Storage>;

pub trait Evaluator {
    /// Backend the returned lvalues read from and write to.
    type Storage: Storage;

    /// The `this` object of the top frame. In a static frame, a value that
    /// [`field`](Evaluator::field) resolves against the declaring class's
    /// statics and that no evaluated expression can produce.
    fn this_object(&self) -> Result<ExpressionValue<'_, Self::Storage>>;

    /// `Ok(None)` when the top frame has no variable called `name`.
    fn local_variable(&self, name: &str) -> Result<Option<ExpressionValue<'_, Self::Storage>>>;

    /// `Ok(None)` when `receiver` has no field called `name`.
    fn field(
        &self,
        receiver: &ValueOf<Self::Storage>,
        name: &str,
    ) -> Result<Option<ExpressionValue<'_, Self::Storage>>>;

    fn invoke_method(
        &self,
        receiver: &ValueOf<Self::Storage>,
        name: &str,
        arguments: Vec<ValueOf<Self::Storage>>,
    ) -> Result<ExpressionValue<'_, Self::Storage>>;

    fn array_element(
        &self,
        array: &ValueOf<Self::Storage>,
        index: &ValueOf<Self::Storage>,
    ) -> Result<ExpressionValue<'_, Self::Storage>>;

    /// Any binary or assignment operator, called once per operator node with
    /// both operands already evaluated.
    fn operation<'a>(
        &'a self,
        left: ExpressionValue<'a, Self::Storage>,
        right: ExpressionValue<'a, Self::Storage>,
        op: Operator,
    ) -> Result<ExpressionValue<'a, Self::Storage>>;

    fn unary_operation<'a>(
        &'a self,
        value: ExpressionValue<'a, Self::Storage>,
        op: UnaryOp,
    ) -> Result<ExpressionValue<'a, Self::Storage>>;

    fn ternary_operator<'a>(
        &'a self,
        test: ExpressionValue<'a, Self::Storage>,
        then_value: ExpressionValue<'a, Self::Storage>,
        else_value: ExpressionValue<'a, Self::Storage>,
    ) -> Result<ExpressionValue<'a, Self::Storage>>;

    // ── literal conversion: one call per kind, given the source text ──

    fn hex_value(&self, text: &str) -> Result<ExpressionValue<'_, Self::Storage>>;

    fn octal_value(&self, text: &str) -> Result<ExpressionValue<'_, Self::Storage>>;

    fn decimal_value(&self, text: &str) -> Result<ExpressionValue<'_, Self::Storage>>;

    fn floating_point_value(&self, text: &str) -> Result<ExpressionValue<'_, Self::Storage>>;

    /// `text` includes the single quotes.
    fn char_value(&self, text: &str) -> Result<ExpressionValue<'_, Self::Storage>>;

    /// `text` includes the double quotes.
    fn string_value(&self, text: &str) -> Result<ExpressionValue<'_, Self::Storage>>;

    /// Called for both `true` and `false`.
    fn boolean_value(&self, text: &str) -> Result<ExpressionValue<'_, Self::Storage>>;

    fn null_value(&self) -> Result<ExpressionValue<'_, Self::Storage>>;
}

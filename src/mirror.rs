//! Reference [`Evaluator`] over the in‑memory [`Memory`] target.
//!
//! Operator semantics follow the Java language: binary numeric promotion
//! (`double` > `float` > `long` > `int`), wrapping integer arithmetic,
//! masked shift distances, string concatenation on `+`, and
//! `ArithmeticException`‑style failure for integer division by zero.

use crate::error::{EvalError, Result};
use crate::evaluator::Evaluator;
use crate::expr::{AssignOp, BinaryOp, Operator, UnaryOp};
use crate::expression::ExpressionParser;
use crate::lvalue::{
    ArrayElementValue, ExpressionValue, InstanceFieldValue, LocalVariableValue, StaticFieldValue,
};
use crate::memory::Memory;
use crate::value::{ObjectId, Value};

use log::debug;

type Mirror<'a> = ExpressionValue<'a, Memory>;

/// Evaluates expressions against a [`Memory`] snapshot.
pub struct MirrorEvaluator<'m> {
    memory: &'m Memory,
}

impl<'m> MirrorEvaluator<'m> {
    pub fn new(memory: &'m Memory) -> Self {
        Self { memory }
    }

    pub fn memory(&self) -> &'m Memory {
        self.memory
    }

    /// Breakpoint condition: met only when the expression yields `true`.
    pub fn condition_holds(&self, parser: &mut ExpressionParser) -> Result<bool> {
        let value: Value = parser.evaluate(self)?;

        debug!("Condition '{}' evaluated to {}", parser.text(), value);

        Ok(value == Value::Boolean(true))
    }

    fn static_lookup(&self, class: &str, name: &str) -> Option<Mirror<'_>> {
        self.memory.static_field(class, name).map(|field| {
            StaticFieldValue::new(self.memory, field.declaring_class.clone(), field).into()
        })
    }

    fn binary(&self, op: BinaryOp, left: Value, right: Value) -> Result<Value> {
        if op == BinaryOp::Plus && (matches!(left, Value::Str(_)) || matches!(right, Value::Str(_)))
        {
            let text: String = self.memory.describe(&left) + &self.memory.describe(&right);
            return Ok(Value::Str(text));
        }

        match (&left, &right) {
            (Value::Boolean(a), Value::Boolean(b)) => boolean(op, *a, *b)
                .map(Value::Boolean)
                .ok_or_else(|| bad_operands(op, &left, &right)),

            (l, r) if l.is_reference() && r.is_reference() => match op {
                BinaryOp::Equal => Ok(Value::Boolean(l == r)),
                BinaryOp::NotEqual => Ok(Value::Boolean(l != r)),
                _ => Err(bad_operands(op, &left, &right)),
            },

            _ => numeric(op, &left, &right),
        }
    }

    fn string_method(&self, s: &str, name: &str, args: &[Value]) -> Result<Value> {
        let chars: Vec<char> = s.chars().collect();

        let value: Value = match (name, args) {
            ("length", []) => Value::Int(length(chars.len())?),

            ("isEmpty", []) => Value::Boolean(chars.is_empty()),

            ("charAt", [index]) => {
                let i: i32 = int_argument(index)?;

                usize::try_from(i)
                    .ok()
                    .and_then(|i| chars.get(i))
                    .copied()
                    .map(Value::Char)
                    .ok_or_else(|| {
                        EvalError::evaluation(format!("String index out of range: {}", i))
                    })?
            }

            ("equals", [other]) => Value::Boolean(matches!(other, Value::Str(o) if o == s)),

            ("concat", [Value::Str(other)]) => Value::Str(format!("{}{}", s, other)),

            ("substring", [begin]) => {
                let begin: usize = char_index(int_argument(begin)?, chars.len())?;
                Value::Str(chars[begin..].iter().collect())
            }

            ("substring", [begin, end]) => {
                let end: usize = char_index(int_argument(end)?, chars.len())?;
                let begin: usize = char_index(int_argument(begin)?, end)?;
                Value::Str(chars[begin..end].iter().collect())
            }

            ("indexOf", [needle]) => {
                let needle: String = match needle {
                    Value::Str(n) => n.clone(),
                    Value::Char(c) => c.to_string(),
                    other => return Err(no_such_method(name, other.type_name())),
                };

                match s.find(&needle) {
                    Some(byte) => Value::Int(length(s[..byte].chars().count())?),
                    None => Value::Int(-1),
                }
            }

            ("contains", [Value::Str(n)]) => Value::Boolean(s.contains(n.as_str())),

            ("startsWith", [Value::Str(n)]) => Value::Boolean(s.starts_with(n.as_str())),

            ("endsWith", [Value::Str(n)]) => Value::Boolean(s.ends_with(n.as_str())),

            ("toUpperCase", []) => Value::Str(s.to_uppercase()),

            ("toLowerCase", []) => Value::Str(s.to_lowercase()),

            ("trim", []) => Value::Str(s.trim_matches(|c: char| c <= ' ').to_string()),

            ("toString", []) => Value::Str(s.to_string()),

            ("hashCode", []) => Value::Int(string_hash(s)),

            _ => return Err(no_such_method(name, "java.lang.String")),
        };

        Ok(value)
    }

    fn object_method(&self, id: ObjectId, name: &str, args: &[Value]) -> Result<Value> {
        let value: Value = match (name, args) {
            ("toString", []) => Value::Str(self.memory.describe(&Value::Ref(id))),
            ("equals", [other]) => Value::Boolean(*other == Value::Ref(id)),
            ("hashCode", []) => Value::Int(id as i32),
            _ => return Err(no_such_method(name, &self.memory.class_of(id)?)),
        };

        Ok(value)
    }
}

impl<'m> Evaluator for MirrorEvaluator<'m> {
    type Storage = Memory;

    fn this_object(&self) -> Result<Mirror<'_>> {
        let this: Value = match self.memory.this_ref()? {
            Some(id) => Value::Ref(id),
            None => Value::Class(self.memory.declaring_class()?),
        };

        Ok(ExpressionValue::read_only(this))
    }

    fn local_variable(&self, name: &str) -> Result<Option<Mirror<'_>>> {
        let Some(slot) = self.memory.local_slot(name)? else {
            return Ok(None);
        };

        let thread: String = self.memory.thread_name();

        Ok(Some(LocalVariableValue::new(self.memory, thread, slot).into()))
    }

    fn field(&self, receiver: &Value, name: &str) -> Result<Option<Mirror<'_>>> {
        match receiver {
            Value::Ref(id) => {
                if let Some(length) = self.memory.array_length(*id)? {
                    let length = ExpressionValue::read_only(Value::Int(length));

                    return Ok((name == "length").then_some(length));
                }

                let class: String = self.memory.class_of(*id)?;

                if let Some(field) = self.memory.instance_field(&class, name) {
                    return Ok(Some(InstanceFieldValue::new(self.memory, *id, field).into()));
                }

                Ok(self.static_lookup(&class, name))
            }

            // Static frame: only statics of the declaring class are visible.
            Value::Class(class) => Ok(self.static_lookup(class, name)),

            Value::Str(_) => Ok(None),

            other => Err(EvalError::evaluation(format!(
                "Value is not object. Cannot get field {} of {}",
                name,
                other.type_name()
            ))),
        }
    }

    fn invoke_method(&self, receiver: &Value, name: &str, arguments: Vec<Value>) -> Result<Mirror<'_>> {
        let value: Value = match receiver {
            Value::Str(s) => self.string_method(s, name, &arguments)?,
            Value::Ref(id) => self.object_method(*id, name, &arguments)?,
            Value::Null => {
                return Err(EvalError::evaluation(format!(
                    "Cannot invoke method {} on null",
                    name
                )))
            }
            _ => {
                return Err(EvalError::evaluation(format!(
                    "Value is not object. Cannot invoke method {}",
                    name
                )))
            }
        };

        Ok(ExpressionValue::read_only(value))
    }

    fn array_element(&self, array: &Value, index: &Value) -> Result<Mirror<'_>> {
        let id: ObjectId = match array {
            Value::Ref(id) if self.memory.array_length(*id)?.is_some() => *id,
            other => {
                return Err(EvalError::evaluation(format!(
                    "Value of type {} is not an array",
                    other.type_name()
                )))
            }
        };

        let index: i32 = int_argument(index)?;

        Ok(ArrayElementValue::new(self.memory, id, index).into())
    }

    fn operation<'a>(&'a self, mut left: Mirror<'a>, mut right: Mirror<'a>, op: Operator) -> Result<Mirror<'a>> {
        match op {
            Operator::Assign(AssignOp::Assign) => {
                let value: Value = right.value()?;

                left.set_value(value)?;

                Ok(left)
            }

            Operator::Assign(compound) => {
                let Some(bin) = compound.operand() else {
                    return Err(EvalError::evaluation("Invalid compound assignment"));
                };

                let current: Value = left.value()?;
                let result: Value = self.binary(bin, current.clone(), right.value()?)?;

                // Compound assignment casts back to the type of the target.
                left.set_value(narrow(result, &current))?;

                Ok(left)
            }

            Operator::Binary(bin) => {
                let value: Value = self.binary(bin, left.value()?, right.value()?)?;

                Ok(ExpressionValue::read_only(value))
            }
        }
    }

    fn unary_operation<'a>(&'a self, mut value: Mirror<'a>, op: UnaryOp) -> Result<Mirror<'a>> {
        let operand: Value = value.value()?;

        let result: Option<Value> = match (op, &operand) {
            (UnaryOp::LogicalNot, Value::Boolean(b)) => Some(Value::Boolean(!b)),

            (UnaryOp::Plus, v) if v.is_numeric() => Some(promote_unary(v)),

            (UnaryOp::Minus, v) => match promote_unary(v) {
                Value::Int(n) => Some(Value::Int(n.wrapping_neg())),
                Value::Long(n) => Some(Value::Long(n.wrapping_neg())),
                Value::Float(x) => Some(Value::Float(-x)),
                Value::Double(x) => Some(Value::Double(-x)),
                _ => None,
            },

            (UnaryOp::Not, v) => match promote_unary(v) {
                Value::Int(n) => Some(Value::Int(!n)),
                Value::Long(n) => Some(Value::Long(!n)),
                _ => None,
            },

            _ => None,
        };

        result.map(ExpressionValue::read_only).ok_or_else(|| {
            EvalError::evaluation(format!(
                "Bad operand type {} for unary operator '{}'",
                operand.type_name(),
                op
            ))
        })
    }

    fn ternary_operator<'a>(
        &'a self,
        mut test: Mirror<'a>,
        then_value: Mirror<'a>,
        else_value: Mirror<'a>,
    ) -> Result<Mirror<'a>> {
        match test.value()? {
            Value::Boolean(true) => Ok(then_value),
            Value::Boolean(false) => Ok(else_value),
            _ => Err(EvalError::evaluation("Invalid ternary operator.")),
        }
    }

    fn hex_value(&self, text: &str) -> Result<Mirror<'_>> {
        let digits: &str = text
            .get(2..)
            .ok_or_else(|| invalid_literal("hex", text))?;

        integer_literal(text, digits, 16).map(ExpressionValue::read_only)
    }

    fn octal_value(&self, text: &str) -> Result<Mirror<'_>> {
        let digits: &str = text
            .get(1..)
            .ok_or_else(|| invalid_literal("octal", text))?;

        integer_literal(text, digits, 8).map(ExpressionValue::read_only)
    }

    fn decimal_value(&self, text: &str) -> Result<Mirror<'_>> {
        let value: Value = match text.strip_suffix(['l', 'L']) {
            Some(digits) => digits.parse::<i64>().map(Value::Long),
            None => text.parse::<i32>().map(Value::Int),
        }
        .map_err(|_| EvalError::evaluation(format!("Integer number too large: {}", text)))?;

        Ok(ExpressionValue::read_only(value))
    }

    fn floating_point_value(&self, text: &str) -> Result<Mirror<'_>> {
        let value: Option<Value> = match text.strip_suffix(['f', 'F']) {
            Some(digits) => digits.parse::<f32>().ok().map(Value::Float),
            None => text
                .strip_suffix(['d', 'D'])
                .unwrap_or(text)
                .parse::<f64>()
                .ok()
                .map(Value::Double),
        };

        value
            .map(ExpressionValue::read_only)
            .ok_or_else(|| invalid_literal("floating point", text))
    }

    fn char_value(&self, text: &str) -> Result<Mirror<'_>> {
        let body: &str = text
            .strip_prefix('\'')
            .and_then(|t| t.strip_suffix('\''))
            .ok_or_else(|| invalid_literal("character", text))?;

        let decoded: String = unescape(body)?;
        let mut chars = decoded.chars();

        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(ExpressionValue::read_only(Value::Char(c))),
            _ => Err(invalid_literal("character", text)),
        }
    }

    fn string_value(&self, text: &str) -> Result<Mirror<'_>> {
        let body: &str = text
            .strip_prefix('"')
            .and_then(|t| t.strip_suffix('"'))
            .ok_or_else(|| invalid_literal("string", text))?;

        Ok(ExpressionValue::read_only(Value::Str(unescape(body)?)))
    }

    fn boolean_value(&self, text: &str) -> Result<Mirror<'_>> {
        match text {
            "true" => Ok(ExpressionValue::read_only(Value::Boolean(true))),
            "false" => Ok(ExpressionValue::read_only(Value::Boolean(false))),
            _ => Err(invalid_literal("boolean", text)),
        }
    }

    fn null_value(&self) -> Result<Mirror<'_>> {
        Ok(ExpressionValue::read_only(Value::Null))
    }
}

// ─────────────────────────── operators ─────────────────────────

fn boolean(op: BinaryOp, a: bool, b: bool) -> Option<bool> {
    let result: bool = match op {
        BinaryOp::LogicalOr | BinaryOp::Or => a || b,
        BinaryOp::LogicalAnd | BinaryOp::And => a && b,
        BinaryOp::Xor => a ^ b,
        BinaryOp::Equal => a == b,
        BinaryOp::NotEqual => a != b,
        _ => return None,
    };

    Some(result)
}

/// Result type of binary numeric promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Numeric {
    Int,
    Long,
    Float,
    Double,
}

fn promotion(left: &Value, right: &Value) -> Option<Numeric> {
    if !left.is_numeric() || !right.is_numeric() {
        return None;
    }

    let kind = |v: &Value| match v {
        Value::Double(_) => Numeric::Double,
        Value::Float(_) => Numeric::Float,
        Value::Long(_) => Numeric::Long,
        _ => Numeric::Int,
    };

    let (l, r) = (kind(left), kind(right));

    Some(if l == Numeric::Double || r == Numeric::Double {
        Numeric::Double
    } else if l == Numeric::Float || r == Numeric::Float {
        Numeric::Float
    } else if l == Numeric::Long || r == Numeric::Long {
        Numeric::Long
    } else {
        Numeric::Int
    })
}

fn promote_unary(value: &Value) -> Value {
    match value {
        Value::Byte(_) | Value::Short(_) | Value::Char(_) => {
            value.as_integral().map_or(Value::Null, |n| Value::Int(n as i32))
        }
        other => other.clone(),
    }
}

fn numeric(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    if matches!(
        op,
        BinaryOp::ShiftLeft | BinaryOp::ShiftRight | BinaryOp::BitShiftRight
    ) {
        return shift(op, left, right);
    }

    let kind: Numeric = promotion(left, right).ok_or_else(|| bad_operands(op, left, right))?;

    match kind {
        Numeric::Int | Numeric::Long => {
            let (Some(a), Some(b)) = (left.as_integral(), right.as_integral()) else {
                return Err(bad_operands(op, left, right));
            };

            integral(op, a, b, kind == Numeric::Long).ok_or_else(|| bad_operands(op, left, right))?
        }

        Numeric::Float | Numeric::Double => {
            let (Some(a), Some(b)) = (left.as_floating(), right.as_floating()) else {
                return Err(bad_operands(op, left, right));
            };

            floating(op, a, b, kind == Numeric::Float).ok_or_else(|| bad_operands(op, left, right))
        }
    }
}

/// Integer arithmetic carried out in `i64`; `int` results are truncated to
/// 32 bits, which matches Java's wrapping semantics.  `None` means the
/// operator does not apply; `Some(Err)` is a division by zero.
fn integral(op: BinaryOp, a: i64, b: i64, long: bool) -> Option<Result<Value>> {
    let wrap = |n: i64| if long { Value::Long(n) } else { Value::Int(n as i32) };

    let value: Value = match op {
        BinaryOp::Plus => wrap(a.wrapping_add(b)),
        BinaryOp::Minus => wrap(a.wrapping_sub(b)),
        BinaryOp::Star => wrap(a.wrapping_mul(b)),

        BinaryOp::Div | BinaryOp::Mod if b == 0 => {
            return Some(Err(EvalError::evaluation("/ by zero")));
        }

        BinaryOp::Div => wrap(a.wrapping_div(b)),
        BinaryOp::Mod => wrap(a.wrapping_rem(b)),
        BinaryOp::And => wrap(a & b),
        BinaryOp::Or => wrap(a | b),
        BinaryOp::Xor => wrap(a ^ b),
        BinaryOp::Equal => Value::Boolean(a == b),
        BinaryOp::NotEqual => Value::Boolean(a != b),
        BinaryOp::LessThan => Value::Boolean(a < b),
        BinaryOp::LessOrEqual => Value::Boolean(a <= b),
        BinaryOp::GreaterThan => Value::Boolean(a > b),
        BinaryOp::GreaterOrEqual => Value::Boolean(a >= b),
        _ => return None,
    };

    Some(Ok(value))
}

/// Floating arithmetic in `f64`; `float` results are rounded back to `f32`.
fn floating(op: BinaryOp, a: f64, b: f64, float: bool) -> Option<Value> {
    let wrap = |x: f64| if float { Value::Float(x as f32) } else { Value::Double(x) };

    let (a, b) = if float {
        (f64::from(a as f32), f64::from(b as f32))
    } else {
        (a, b)
    };

    let value: Value = match op {
        BinaryOp::Plus => wrap(a + b),
        BinaryOp::Minus => wrap(a - b),
        BinaryOp::Star => wrap(a * b),
        BinaryOp::Div => wrap(a / b),
        BinaryOp::Mod => wrap(a % b),
        BinaryOp::Equal => Value::Boolean(a == b),
        BinaryOp::NotEqual => Value::Boolean(a != b),
        BinaryOp::LessThan => Value::Boolean(a < b),
        BinaryOp::LessOrEqual => Value::Boolean(a <= b),
        BinaryOp::GreaterThan => Value::Boolean(a > b),
        BinaryOp::GreaterOrEqual => Value::Boolean(a >= b),
        _ => return None,
    };

    Some(value)
}

/// Shifts promote the left operand alone; the distance is masked to the
/// width of the result.
fn shift(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    let (Some(a), Some(distance)) = (left.as_integral(), right.as_integral()) else {
        return Err(bad_operands(op, left, right));
    };

    let value: Value = if matches!(left, Value::Long(_)) {
        let d: u32 = (distance & 0x3f) as u32;

        Value::Long(match op {
            BinaryOp::ShiftLeft => a.wrapping_shl(d),
            BinaryOp::ShiftRight => a.wrapping_shr(d),
            _ => ((a as u64) >> d) as i64,
        })
    } else {
        let a: i32 = a as i32;
        let d: u32 = (distance & 0x1f) as u32;

        Value::Int(match op {
            BinaryOp::ShiftLeft => a.wrapping_shl(d),
            BinaryOp::ShiftRight => a.wrapping_shr(d),
            _ => ((a as u32) >> d) as i32,
        })
    };

    Ok(value)
}

/// Cast `result` back to the primitive type of `target`.
fn narrow(result: Value, target: &Value) -> Value {
    let Some(x) = result.as_floating() else {
        return result;
    };

    // Floating results saturate to `long` or `int` before any further narrowing.
    let n: i64 = match (result.as_integral(), target) {
        (Some(n), _) => n,
        (None, Value::Long(_)) => x as i64,
        (None, _) => i64::from(x as i32),
    };

    match target {
        Value::Byte(_) => Value::Byte(n as i8),
        Value::Short(_) => Value::Short(n as i16),
        Value::Char(_) => char::from_u32(u32::from(n as u16)).map_or(result, Value::Char),
        Value::Int(_) => Value::Int(n as i32),
        Value::Long(_) => Value::Long(n),
        Value::Float(_) => Value::Float(x as f32),
        Value::Double(_) => Value::Double(x),
        _ => result,
    }
}

// ─────────────────────────── literals ──────────────────────────

/// Hex and octal literals may spell negative values (`0xFFFFFFFF` is -1).
fn integer_literal(text: &str, digits: &str, radix: u32) -> Result<Value> {
    let value: Option<Value> = match digits.strip_suffix(['l', 'L']) {
        Some(digits) => u64::from_str_radix(digits, radix)
            .ok()
            .map(|n| Value::Long(n as i64)),
        None => u32::from_str_radix(digits, radix)
            .ok()
            .map(|n| Value::Int(n as i32)),
    };

    value.ok_or_else(|| EvalError::evaluation(format!("Integer number too large: {}", text)))
}

/// Decode the escape sequences of a char or string literal body.
fn unescape(body: &str) -> Result<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let decoded: char = match chars.next() {
            Some('b') => '\u{8}',
            Some('t') => '\t',
            Some('n') => '\n',
            Some('f') => '\u{c}',
            Some('r') => '\r',
            Some('"') => '"',
            Some('\'') => '\'',
            Some('\\') => '\\',

            Some('u') => {
                while chars.peek() == Some(&'u') {
                    chars.next();
                }

                let hex: String = chars.by_ref().take(4).collect();

                u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| EvalError::evaluation("Illegal unicode escape"))?
            }

            Some(first @ '0'..='7') => {
                let max_len: usize = if first <= '3' { 3 } else { 2 };
                let mut code: u32 = first.to_digit(8).unwrap_or(0);
                let mut len: usize = 1;

                while len < max_len {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            chars.next();
                            len += 1;
                        }
                        None => break,
                    }
                }

                char::from_u32(code).ok_or_else(|| EvalError::evaluation("Illegal octal escape"))?
            }

            _ => return Err(EvalError::evaluation("Illegal escape character")),
        };

        out.push(decoded);
    }

    Ok(out)
}

// ─────────────────────────── helpers ───────────────────────────

fn int_argument(value: &Value) -> Result<i32> {
    match value {
        Value::Byte(_) | Value::Short(_) | Value::Char(_) | Value::Int(_) => value
            .as_integral()
            .map(|n| n as i32)
            .ok_or_else(|| EvalError::type_mismatch("int", value.type_name())),
        other => Err(EvalError::type_mismatch("int", other.type_name())),
    }
}

fn length(n: usize) -> Result<i32> {
    i32::try_from(n).map_err(|_| EvalError::evaluation("String too long"))
}

/// Validate `index` against `0..=limit`.
fn char_index(index: i32, limit: usize) -> Result<usize> {
    usize::try_from(index)
        .ok()
        .filter(|i| *i <= limit)
        .ok_or_else(|| EvalError::evaluation(format!("String index out of range: {}", index)))
}

/// `String.hashCode()` over UTF‑16 code units.
fn string_hash(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

fn bad_operands(op: BinaryOp, left: &Value, right: &Value) -> EvalError {
    EvalError::evaluation(format!(
        "Bad operand types for binary operator '{}': {} and {}",
        op.as_str(),
        left.type_name(),
        right.type_name()
    ))
}

fn no_such_method(name: &str, owner: &str) -> EvalError {
    EvalError::evaluation(format!("No applicable method '{}' on {}", name, owner))
}

fn invalid_literal(kind: &str, text: &str) -> EvalError {
    EvalError::evaluation(format!("Invalid {} literal: {}", kind, text))
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of an object in the snapshot heap.
pub type ObjectId = u64;

/// A runtime value of the mirrored debug target.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Char(char),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    #[serde(rename = "string")]
    Str(String),
    /// Instance or array in the heap.
    Ref(ObjectId),
    /// Static context of a class: the implicit receiver of a static frame.
    Class(String),
}

impl Value {
    /// Java name of the value's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Byte(_) => "byte",
            Value::Short(_) => "short",
            Value::Char(_) => "char",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Str(_) => "java.lang.String",
            Value::Ref(_) => "reference",
            Value::Class(_) => "java.lang.Class",
        }
    }

    /// Integral primitive widened to `i64`.
    pub fn as_integral(&self) -> Option<i64> {
        match *self {
            Value::Byte(n) => Some(n.into()),
            Value::Short(n) => Some(n.into()),
            Value::Char(c) => Some(u32::from(c).into()),
            Value::Int(n) => Some(n.into()),
            Value::Long(n) => Some(n),
            _ => None,
        }
    }

    /// Any numeric primitive widened to `f64`.
    pub fn as_floating(&self) -> Option<f64> {
        match *self {
            Value::Float(x) => Some(x.into()),
            Value::Double(x) => Some(x),
            _ => self.as_integral().map(|n| n as f64),
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.as_floating().is_some()
    }

    /// Null, strings and heap references.
    pub fn is_reference(&self) -> bool {
        matches!(self, Value::Null | Value::Str(_) | Value::Ref(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buffer = itoa::Buffer::new();

        match self {
            Value::Null => f.write_str("null"),

            Value::Boolean(b) => write!(f, "{}", b),

            Value::Byte(n) => f.write_str(buffer.format(*n)),

            Value::Short(n) => f.write_str(buffer.format(*n)),

            Value::Char(c) => write!(f, "{}", c),

            Value::Int(n) => f.write_str(buffer.format(*n)),

            Value::Long(n) => f.write_str(buffer.format(*n)),

            Value::Float(x) => write_floating(f, (*x).into(), x, x),

            Value::Double(x) => write_floating(f, *x, x, x),

            Value::Str(s) => f.write_str(s),

            Value::Ref(id) => write!(f, "#{}", buffer.format(*id)),

            Value::Class(name) => write!(f, "class {}", name),
        }
    }
}

/// Java's `Double.toString` layout: `3.0`, `0.25`, `1.0E10`, `NaN`.
fn write_floating(
    f: &mut fmt::Formatter<'_>,
    value: f64,
    plain: impl fmt::Display,
    scientific: impl fmt::UpperExp,
) -> fmt::Result {
    if value.is_nan() {
        return f.write_str("NaN");
    }

    if value.is_infinite() {
        return f.write_str(if value > 0.0 { "Infinity" } else { "-Infinity" });
    }

    let magnitude: f64 = value.abs();

    if magnitude != 0.0 && !(1e-3..1e7).contains(&magnitude) {
        let text: String = format!("{:E}", scientific);

        return match text.split_once('E') {
            Some((mantissa, exponent)) if !mantissa.contains('.') => {
                write!(f, "{}.0E{}", mantissa, exponent)
            }
            _ => f.write_str(&text),
        };
    }

    if value.fract() == 0.0 {
        write!(f, "{:.1}", value)
    } else {
        write!(f, "{}", plain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floating_display_follows_java() {
        assert_eq!(Value::Double(3.0).to_string(), "3.0");
        assert_eq!(Value::Double(0.25).to_string(), "0.25");
        assert_eq!(Value::Double(1e10).to_string(), "1.0E10");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::Double(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::Double(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(Value::Class("Main".to_string()).to_string(), "class Main");
    }

    #[test]
    fn serde_shape() {
        let json: String = serde_json::to_string(&Value::Int(7)).unwrap();
        assert_eq!(json, r#"{"type":"int","value":7}"#);

        let parsed: Value = serde_json::from_str(r#"{"type":"string","value":"hi"}"#).unwrap();
        assert_eq!(parsed, Value::Str("hi".to_string()));

        let null: Value = serde_json::from_str(r#"{"type":"null"}"#).unwrap();
        assert_eq!(null, Value::Null);
    }
}

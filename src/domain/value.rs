// Telemetry value model
use serde_json::{Number, Value as JsonValue};
use std::fmt;

/// A single telemetry value. The variant is the value's concrete type and
/// survives anomaly mutation: an `Integer` stays an `Integer`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i32),
    Long(i64),
    Double(f64),
    String(String),
    Boolean(bool),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Long(_) => "long",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Long(_) | Value::Double(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(v) => Some(*v as f64),
            Value::Long(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            Value::String(_) | Value::Boolean(_) => None,
        }
    }

    /// Convert `value` into the same numeric variant as `self`.
    /// Integral variants truncate toward zero and saturate at their bounds.
    /// Returns `None` for non-numeric variants.
    pub fn cast(&self, value: f64) -> Option<Value> {
        match self {
            Value::Integer(_) => Some(Value::Integer(value as i32)),
            Value::Long(_) => Some(Value::Long(value as i64)),
            Value::Double(_) => Some(Value::Double(value)),
            Value::String(_) | Value::Boolean(_) => None,
        }
    }

    /// Numbers become JSON numbers, everything else its string form.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Integer(v) => JsonValue::Number(Number::from(*v)),
            Value::Long(v) => JsonValue::Number(Number::from(*v)),
            // Non-finite doubles have no JSON number form
            Value::Double(v) => Number::from_f64(*v)
                .map(JsonValue::Number)
                .unwrap_or_else(|| JsonValue::String(v.to_string())),
            Value::String(_) | Value::Boolean(_) => JsonValue::String(self.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::String(v) => f.write_str(v),
            Value::Boolean(v) => write!(f, "{}", v),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

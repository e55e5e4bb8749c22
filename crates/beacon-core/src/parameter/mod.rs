//! Parameters: typed, wire-named descriptors and the map that carries hit data.

mod key;
mod known;
mod map;
mod param_ref;
mod value;

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::errors::{BeaconResult, ParameterError};

pub use key::ParameterKey;
pub use known::KnownParameter;
pub use map::ParameterMap;
pub use param_ref::{ParamRef, MAX_CUSTOM_INDEX};
pub use value::{Value, ValueType};

/// Immutable parameter descriptor.
///
/// Identity is the wire name: two descriptors with the same `wire_name` are
/// interchangeable as map keys, whatever their other fields say.
#[derive(Debug, Clone)]
pub struct Parameter {
    id: String,
    wire_name: String,
    value_type: ValueType,
    max_length: Option<usize>,
    default_value: Option<Value>,
}

impl Parameter {
    pub fn new(id: impl Into<String>, wire_name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            id: id.into(),
            wire_name: wire_name.into(),
            value_type,
            max_length: None,
            default_value: None,
        }
    }

    /// Limit text values to `max_length` characters.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Declare the value the collection endpoint assumes when the parameter is absent.
    pub fn with_default(mut self, default_value: impl Into<Value>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    /// Convert `value` to this parameter's declared type.
    ///
    /// Exact matches pass through. Integers widen to currency and float, and
    /// floats to currency. Anything else is a type mismatch.
    pub fn coerce(&self, value: Value) -> BeaconResult<Value> {
        let coerced = match (self.value_type, value) {
            (expected, v) if v.value_type() == expected => v,
            (ValueType::Currency, Value::Integer(i)) => Value::Currency(i as f64),
            (ValueType::Currency, Value::Float(f)) => Value::Currency(f),
            (ValueType::Float, Value::Integer(i)) => Value::Float(i as f64),
            (expected, v) => {
                return Err(ParameterError::TypeMismatch {
                    wire_name: self.wire_name.clone(),
                    expected,
                    actual: v.value_type(),
                }
                .into())
            }
        };
        Ok(coerced)
    }
}

impl PartialEq for Parameter {
    fn eq(&self, other: &Self) -> bool {
        self.wire_name == other.wire_name
    }
}

impl Eq for Parameter {}

impl Hash for Parameter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.wire_name.hash(state);
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.wire_name)
    }
}

impl From<&Parameter> for Parameter {
    fn from(p: &Parameter) -> Self {
        p.clone()
    }
}

use crate::parameter::ValueType;

/// Parameter resolution and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ParameterError {
    #[error("unknown parameter name: {name}")]
    UnknownName { name: String },

    #[error("{kind} index {index} out of range 1..={max}")]
    IndexOutOfRange {
        kind: &'static str,
        index: u32,
        max: u32,
    },

    #[error("parameter {wire_name} expects {expected}, got {actual}")]
    TypeMismatch {
        wire_name: String,
        expected: ValueType,
        actual: ValueType,
    },

    #[error("parameter {wire_name} value {value} outside {min}..={max}")]
    OutOfRange {
        wire_name: String,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("parameter {wire_name} must not be negative, got {value}")]
    NegativeValue { wire_name: String, value: i64 },
}

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::{BeaconResult, ParameterError};

use super::{KnownParameter, Parameter, ValueType};

/// Highest custom dimension / metric index the endpoint accepts.
pub const MAX_CUSTOM_INDEX: u32 = 200;

/// Maximum length of a custom dimension value.
const CUSTOM_DIMENSION_MAX_LENGTH: usize = 150;

static DIMENSION_NAME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^dimension([1-9][0-9]*)$").ok());

static METRIC_NAME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^metric([1-9][0-9]*)$").ok());

/// A reference to any parameter: built-in, or an indexed custom dimension/metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamRef {
    Known(KnownParameter),
    CustomDimension(u32),
    CustomMetric(u32),
}

impl ParamRef {
    /// Resolve a parameter name.
    ///
    /// Accepts built-in ids (`"eventCategory"`), `"dimensionN"` and
    /// `"metricN"` with `N` in `1..=MAX_CUSTOM_INDEX`. Everything else is
    /// rejected.
    pub fn resolve(name: &str) -> BeaconResult<Self> {
        if let Some(known) = KnownParameter::from_id(name) {
            return Ok(ParamRef::Known(known));
        }
        if let Some(index) = capture_index(&DIMENSION_NAME, name) {
            return Ok(ParamRef::CustomDimension(check_index("dimension", index)?));
        }
        if let Some(index) = capture_index(&METRIC_NAME, name) {
            return Ok(ParamRef::CustomMetric(check_index("metric", index)?));
        }
        Err(ParameterError::UnknownName {
            name: name.to_string(),
        }
        .into())
    }

    pub fn wire_name(&self) -> Cow<'static, str> {
        match self {
            ParamRef::Known(p) => Cow::Borrowed(p.wire_name()),
            ParamRef::CustomDimension(i) => Cow::Owned(format!("cd{i}")),
            ParamRef::CustomMetric(i) => Cow::Owned(format!("cm{i}")),
        }
    }

    /// Build the full descriptor.
    pub fn parameter(&self) -> Parameter {
        match self {
            ParamRef::Known(p) => p.descriptor(),
            ParamRef::CustomDimension(i) => {
                Parameter::new(format!("dimension{i}"), format!("cd{i}"), ValueType::Text)
                    .with_max_length(CUSTOM_DIMENSION_MAX_LENGTH)
            }
            ParamRef::CustomMetric(i) => {
                Parameter::new(format!("metric{i}"), format!("cm{i}"), ValueType::Integer)
            }
        }
    }
}

impl From<KnownParameter> for ParamRef {
    fn from(p: KnownParameter) -> Self {
        ParamRef::Known(p)
    }
}

impl From<ParamRef> for Parameter {
    fn from(r: ParamRef) -> Self {
        r.parameter()
    }
}

fn capture_index(pattern: &LazyLock<Option<Regex>>, name: &str) -> Option<u64> {
    let re = pattern.as_ref()?;
    let caps = re.captures(name)?;
    // Digits too long for u64 are out of range anyway.
    Some(caps.get(1)?.as_str().parse::<u64>().unwrap_or(u64::MAX))
}

fn check_index(kind: &'static str, index: u64) -> BeaconResult<u32> {
    match u32::try_from(index) {
        Ok(i) if (1..=MAX_CUSTOM_INDEX).contains(&i) => Ok(i),
        _ => Err(ParameterError::IndexOutOfRange {
            kind,
            index: u32::try_from(index).unwrap_or(u32::MAX),
            max: MAX_CUSTOM_INDEX,
        }
        .into()),
    }
}

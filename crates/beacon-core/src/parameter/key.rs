use std::borrow::Cow;

use super::{KnownParameter, ParamRef, Parameter};

/// Anything that can name a map entry by wire name.
pub trait ParameterKey {
    fn key(&self) -> Cow<'_, str>;
}

impl ParameterKey for Parameter {
    fn key(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.wire_name())
    }
}

impl ParameterKey for KnownParameter {
    fn key(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.wire_name())
    }
}

impl ParameterKey for ParamRef {
    fn key(&self) -> Cow<'_, str> {
        self.wire_name()
    }
}

/// A raw wire name.
impl ParameterKey for str {
    fn key(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

//! Hits: one telemetry event on its way through the pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::parameter::ParameterMap;

/// Kind of hit, sent on the wire as the `t` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitType {
    AppView,
    Event,
    Social,
    Transaction,
    Item,
    Timing,
    Exception,
}

impl HitType {
    /// Wire name of the hit type parameter.
    pub const WIRE_NAME: &'static str = "t";

    pub fn wire_code(self) -> &'static str {
        match self {
            HitType::AppView => "appview",
            HitType::Event => "event",
            HitType::Social => "social",
            HitType::Transaction => "transaction",
            HitType::Item => "item",
            HitType::Timing => "timing",
            HitType::Exception => "exception",
        }
    }

    /// Commerce hits describe money changing hands and are never rate limited.
    pub fn is_commerce(self) -> bool {
        matches!(self, HitType::Transaction | HitType::Item)
    }
}

impl fmt::Display for HitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_code())
    }
}

/// A parameter snapshot plus hit type, cancelable by filters.
#[derive(Debug, Clone)]
pub struct Hit {
    hit_type: HitType,
    parameters: ParameterMap,
    canceled: bool,
}

impl Hit {
    pub fn new(hit_type: HitType, parameters: ParameterMap) -> Self {
        Self {
            hit_type,
            parameters,
            canceled: false,
        }
    }

    pub fn hit_type(&self) -> HitType {
        self.hit_type
    }

    pub fn parameters(&self) -> &ParameterMap {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterMap {
        &mut self.parameters
    }

    /// Cancel the hit. There is no way back.
    pub fn cancel(&mut self) {
        self.canceled = true;
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled
    }

    pub fn into_parameters(self) -> ParameterMap {
        self.parameters
    }
}

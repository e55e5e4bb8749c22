//! Event labeler: derives `el` from `ev` so values can be grouped remotely.

use std::sync::Arc;

use beacon_channel::Filter;
use beacon_core::errors::{BeaconResult, FilterError};
use beacon_core::{Hit, HitType, KnownParameter, Value};

type LabelFn = Arc<dyn Fn(i64) -> String + Send + Sync>;

/// Builds a [`Filter`] that labels event hits by their value.
///
/// Exactly one strategy must be chosen:
///
/// ```ignore
/// let filter = EventLabelerBuilder::new()
///     .category("downloads")
///     .power_of_two()?
///     .strip_value()
///     .build()?;
/// service.add_filter(filter);
/// ```
#[derive(Default)]
pub struct EventLabelerBuilder {
    category: Option<String>,
    action: Option<String>,
    labeler: Option<LabelFn>,
    strip_value: bool,
}

impl EventLabelerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only label events in this category.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Only label events with this action.
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Bucket by powers of two: `0`, `1`, `2`, `3-4`, `5-8`, `9-16`, ...
    pub fn power_of_two(self) -> BeaconResult<Self> {
        self.with_labeler(Arc::new(power_of_two_label))
    }

    /// Bucket by explicit bounds, e.g. `[10, 50]` gives `<10`, `10-49`, `50+`.
    ///
    /// Bounds must be non-empty, non-negative and strictly ascending.
    pub fn range_bounds(self, bounds: &[i64]) -> BeaconResult<Self> {
        validate_bounds(bounds)?;
        let bounds = bounds.to_vec();
        self.with_labeler(Arc::new(move |value| range_label(&bounds, value)))
    }

    /// Label with a custom function of the event value.
    pub fn labeler_fn(self, labeler: impl Fn(i64) -> String + Send + Sync + 'static) -> BeaconResult<Self> {
        self.with_labeler(Arc::new(labeler))
    }

    /// Remove the event value once the label is written.
    pub fn strip_value(mut self) -> Self {
        self.strip_value = true;
        self
    }

    pub fn build(self) -> BeaconResult<Filter> {
        let labeler = self.labeler.ok_or(FilterError::NoStrategy)?;
        let category = self.category;
        let action = self.action;
        let strip_value = self.strip_value;

        let filter: Filter = Arc::new(move |hit: &mut Hit| {
            if hit.hit_type() != HitType::Event {
                return;
            }
            let parameters = hit.parameters_mut();
            if !text_matches(parameters.get(&KnownParameter::EventCategory), category.as_deref())
                || !text_matches(parameters.get(&KnownParameter::EventAction), action.as_deref())
            {
                return;
            }
            let Some(value) = parameters
                .get(&KnownParameter::EventValue)
                .and_then(Value::as_integer)
            else {
                return;
            };
            if value < 0 {
                return;
            }
            parameters.set(KnownParameter::EventLabel, labeler(value));
            if strip_value {
                parameters.remove(&KnownParameter::EventValue);
            }
        });
        Ok(filter)
    }

    fn with_labeler(mut self, labeler: LabelFn) -> BeaconResult<Self> {
        if self.labeler.is_some() {
            return Err(FilterError::StrategyAlreadySet.into());
        }
        self.labeler = Some(labeler);
        Ok(self)
    }
}

impl std::fmt::Debug for EventLabelerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLabelerBuilder")
            .field("category", &self.category)
            .field("action", &self.action)
            .field("has_strategy", &self.labeler.is_some())
            .field("strip_value", &self.strip_value)
            .finish()
    }
}

fn text_matches(actual: Option<&Value>, wanted: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => actual.and_then(Value::as_text) == Some(wanted),
    }
}

/// Non-negative values only.
fn power_of_two_label(value: i64) -> String {
    if value <= 2 {
        return value.to_string();
    }
    let upper = (value as u64).next_power_of_two();
    let lower = upper / 2 + 1;
    if lower == upper {
        upper.to_string()
    } else {
        format!("{lower}-{upper}")
    }
}

fn range_label(bounds: &[i64], value: i64) -> String {
    let Some((&first, _)) = bounds.split_first() else {
        return value.to_string();
    };
    if value < first {
        return format!("<{first}");
    }
    for pair in bounds.windows(2) {
        let (low, high) = (pair[0], pair[1]);
        if value >= low && value < high {
            return format!("{low}-{}", high - 1);
        }
    }
    // value >= first and no window matched, so it is at or past the last bound.
    format!("{}+", bounds[bounds.len() - 1])
}

fn validate_bounds(bounds: &[i64]) -> BeaconResult<()> {
    let invalid = |reason: &str| FilterError::InvalidBounds {
        reason: reason.to_string(),
    };
    if bounds.is_empty() {
        return Err(invalid("no bounds given").into());
    }
    if bounds.iter().any(|b| *b < 0) {
        return Err(invalid("bounds must be non-negative").into());
    }
    if bounds.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(invalid("bounds must be strictly ascending").into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_of_two_buckets() {
        let cases = [
            (0, "0"),
            (1, "1"),
            (2, "2"),
            (3, "3-4"),
            (4, "3-4"),
            (5, "5-8"),
            (8, "5-8"),
            (9, "9-16"),
            (1000, "513-1024"),
        ];
        for (value, expected) in cases {
            assert_eq!(power_of_two_label(value), expected, "value {value}");
        }
    }

    #[test]
    fn range_buckets() {
        let bounds = [10, 50, 100];
        assert_eq!(range_label(&bounds, 0), "<10");
        assert_eq!(range_label(&bounds, 9), "<10");
        assert_eq!(range_label(&bounds, 10), "10-49");
        assert_eq!(range_label(&bounds, 49), "10-49");
        assert_eq!(range_label(&bounds, 50), "50-99");
        assert_eq!(range_label(&bounds, 100), "100+");
        assert_eq!(range_label(&bounds, 10_000), "100+");
    }

    #[test]
    fn single_bound() {
        assert_eq!(range_label(&[5], 4), "<5");
        assert_eq!(range_label(&[5], 5), "5+");
    }

    #[test]
    fn bounds_validation() {
        assert!(validate_bounds(&[1, 2, 3]).is_ok());
        assert!(validate_bounds(&[]).is_err());
        assert!(validate_bounds(&[-1, 2]).is_err());
        assert!(validate_bounds(&[2, 2]).is_err());
        assert!(validate_bounds(&[3, 1]).is_err());
    }
}

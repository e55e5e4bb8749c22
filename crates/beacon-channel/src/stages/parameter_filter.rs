use std::sync::Arc;

use async_trait::async_trait;

use beacon_core::errors::BeaconResult;
use beacon_core::traits::IChannel;
use beacon_core::{HitType, ParameterMap, SendResult, Value};

/// Shapes the payload: truncates over-long text and drops values the
/// endpoint would assume anyway. Always delegates.
pub struct ParameterFilterChannel {
    delegate: Arc<dyn IChannel>,
}

impl ParameterFilterChannel {
    pub fn new(delegate: Arc<dyn IChannel>) -> Self {
        Self { delegate }
    }
}

#[async_trait]
impl IChannel for ParameterFilterChannel {
    async fn send(&self, hit_type: HitType, mut parameters: ParameterMap) -> BeaconResult<SendResult> {
        truncate_long_values(&mut parameters);
        remove_default_values(&mut parameters);
        self.delegate.send(hit_type, parameters).await
    }
}

/// Cut text values down to their parameter's `max_length`, in characters.
fn truncate_long_values(parameters: &mut ParameterMap) {
    for (parameter, value) in parameters.iter_mut() {
        let (Some(max), Value::Text(text)) = (parameter.max_length(), value) else {
            continue;
        };
        if let Some((cut, _)) = text.char_indices().nth(max) {
            tracing::debug!(
                wire_name = parameter.wire_name(),
                max,
                "parameter_filter: truncating value"
            );
            text.truncate(cut);
        }
    }
}

fn remove_default_values(parameters: &mut ParameterMap) {
    parameters.retain(|parameter, value| parameter.default_value() != Some(value));
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_core::KnownParameter;

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let mut map = ParameterMap::new();
        map.set(KnownParameter::Language, "é".repeat(30));
        truncate_long_values(&mut map);
        let kept = map.get(&KnownParameter::Language).and_then(Value::as_text).unwrap();
        assert_eq!(kept.chars().count(), 20);
    }

    #[test]
    fn value_at_exact_limit_is_kept() {
        let mut map = ParameterMap::new();
        map.set(KnownParameter::Language, "x".repeat(20));
        truncate_long_values(&mut map);
        assert_eq!(
            map.get(&KnownParameter::Language),
            Some(&Value::Text("x".repeat(20)))
        );
    }
}

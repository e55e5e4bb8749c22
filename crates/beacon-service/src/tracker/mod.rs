//! ServiceTracker: sticky parameters plus one-call helpers per hit type.

mod timing;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tracing::Instrument;

use beacon_core::errors::{BeaconResult, ParameterError};
use beacon_core::traits::{IChannel, IClock};
use beacon_core::{HitType, KnownParameter, ParamRef, Parameter, ParameterMap, SendResult, Value};

pub use timing::Timing;

/// Value of `sc` that starts a new session.
const SESSION_START: &str = "start";

/// Sends hits for one tracking id. Parameters set on the tracker are sticky:
/// every later hit carries them unless the hit overrides them.
pub struct ServiceTracker {
    sticky: RwLock<ParameterMap>,
    channel: Arc<dyn IChannel>,
    clock: Arc<dyn IClock>,
    session_start: AtomicBool,
}

impl ServiceTracker {
    pub fn new(sticky: ParameterMap, channel: Arc<dyn IChannel>, clock: Arc<dyn IClock>) -> Self {
        Self {
            sticky: RwLock::new(sticky),
            channel,
            clock,
            session_start: AtomicBool::new(false),
        }
    }

    /// Set a sticky parameter, coercing `value` to the parameter's type.
    pub fn set(&self, parameter: impl Into<Parameter>, value: impl Into<Value>) -> BeaconResult<()> {
        self.sticky
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .try_set(parameter, value)
    }

    /// Set a sticky parameter by name, e.g. `"dimension3"` or `"appId"`.
    pub fn set_by_name(&self, name: &str, value: impl Into<Value>) -> BeaconResult<()> {
        self.set(ParamRef::resolve(name)?, value)
    }

    /// Remove a sticky parameter.
    pub fn unset(&self, parameter: impl Into<ParamRef>) {
        let wire_name = parameter.into().wire_name();
        self.sticky
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&*wire_name);
    }

    /// Snapshot of the sticky parameters.
    pub fn parameters(&self) -> ParameterMap {
        self.sticky
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Make the next hit start a new session.
    pub fn force_session_start(&self) {
        self.session_start.store(true, Ordering::SeqCst);
    }

    /// Send a hit: sticky parameters overlaid with `extra`.
    ///
    /// `extra` values are coerced to their parameters' types. A value that
    /// cannot be coerced fails the call before anything is sent.
    pub async fn send(&self, hit_type: HitType, extra: Option<ParameterMap>) -> BeaconResult<SendResult> {
        let mut parameters = self.parameters();
        if let Some(mut extra) = extra {
            extra.coerce_all()?;
            parameters.add_all(&extra);
        }
        if self.session_start.swap(false, Ordering::SeqCst) {
            parameters.set(KnownParameter::SessionControl, SESSION_START);
        }
        let span = crate::send_span!(hit_type);
        self.channel.send(hit_type, parameters).instrument(span).await
    }

    /// Record a view of `screen_name`.
    pub async fn send_app_view(&self, screen_name: &str) -> BeaconResult<SendResult> {
        let extra = ParameterMap::from_iter([(KnownParameter::Description, screen_name)]);
        self.send(HitType::AppView, Some(extra)).await
    }

    /// Record an event. A negative `value` is rejected.
    pub async fn send_event(
        &self,
        category: &str,
        action: &str,
        label: Option<&str>,
        value: Option<i64>,
    ) -> BeaconResult<SendResult> {
        let mut extra = ParameterMap::from_iter([
            (KnownParameter::EventCategory, category),
            (KnownParameter::EventAction, action),
        ]);
        if let Some(label) = label {
            extra.set(KnownParameter::EventLabel, label);
        }
        if let Some(value) = value {
            extra.set(KnownParameter::EventValue, non_negative(KnownParameter::EventValue, value)?);
        }
        self.send(HitType::Event, Some(extra)).await
    }

    pub async fn send_social(&self, network: &str, action: &str, target: &str) -> BeaconResult<SendResult> {
        let extra = ParameterMap::from_iter([
            (KnownParameter::SocialNetwork, network),
            (KnownParameter::SocialAction, action),
            (KnownParameter::SocialTarget, target),
        ]);
        self.send(HitType::Social, Some(extra)).await
    }

    pub async fn send_exception(&self, description: &str, fatal: bool) -> BeaconResult<SendResult> {
        let mut extra = ParameterMap::new();
        extra.set(KnownParameter::ExDescription, description);
        extra.set(KnownParameter::ExFatal, fatal);
        self.send(HitType::Exception, Some(extra)).await
    }

    /// Record a measured duration in milliseconds.
    pub async fn send_timing(
        &self,
        category: &str,
        variable: &str,
        value_ms: i64,
        label: Option<&str>,
    ) -> BeaconResult<SendResult> {
        let mut extra = ParameterMap::from_iter([
            (KnownParameter::TimingCategory, category),
            (KnownParameter::TimingVar, variable),
        ]);
        extra.set(KnownParameter::TimingValue, non_negative(KnownParameter::TimingValue, value_ms)?);
        if let Some(label) = label {
            extra.set(KnownParameter::TimingLabel, label);
        }
        self.send(HitType::Timing, Some(extra)).await
    }

    /// Start a stopwatch; [`Timing::send`] records the elapsed time.
    pub fn start_timing(&self, category: &str, variable: &str) -> Timing<'_> {
        Timing::start(self, category, variable)
    }

    pub(crate) fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }
}

impl std::fmt::Debug for ServiceTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceTracker")
            .field("sticky", &self.parameters())
            .finish_non_exhaustive()
    }
}

fn non_negative(parameter: KnownParameter, value: i64) -> BeaconResult<i64> {
    if value < 0 {
        return Err(ParameterError::NegativeValue {
            wire_name: parameter.wire_name().to_string(),
            value,
        }
        .into());
    }
    Ok(value)
}

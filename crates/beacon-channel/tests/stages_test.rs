//! Individual pipeline stages against a recording delegate.

use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;

use beacon_channel::{
    encode_payload, sampling_key, AsyncSettingsChannel, DivertBuffer, DivertingChannel,
    DummyChannel, EventPublishingChannel, Filter, FilterChannel, HttpChannel,
    ParameterFilterChannel, RateLimitingChannel, TokenBucket, UserSamplingChannel,
};
use beacon_core::config::{SettingsConfig, TransportConfig};
use beacon_core::errors::{BeaconError, ChannelError, ParameterError, SettingsError};
use beacon_core::traits::IChannel;
use beacon_core::{
    HitType, KnownParameter, ParameterMap, ResultDetails, SendStatus, Value,
};
use beacon_settings::{MemoryStore, ServiceSettings};
use test_fixtures::{
    client_id_with_segment, ready_settings, ready_settings_with_user, ManualClock,
    RecordingChannel, RecordingTransport,
};

fn event(category: &str) -> ParameterMap {
    let mut map = ParameterMap::new();
    map.set(KnownParameter::EventCategory, category);
    map.set(KnownParameter::EventAction, "click");
    map
}

fn with_client(segment: u16) -> ParameterMap {
    let mut map = event("c");
    map.set(KnownParameter::ClientId, client_id_with_segment(segment));
    map
}

// ─── RateLimitingChannel ───────────────────────────────────

#[tokio::test]
async fn empty_bucket_drops_events_but_not_items() {
    let clock = Arc::new(ManualClock::new(0));
    let bucket = Arc::new(TokenBucket::new(0, 5, 0.001, clock));
    let sink = RecordingChannel::new();
    let channel = RateLimitingChannel::new(bucket, sink.clone());

    let dropped = channel.send(HitType::Event, event("c")).await.unwrap();
    assert_eq!(dropped.status, SendStatus::RateLimited);
    assert!(sink.is_empty());

    let item = channel.send(HitType::Item, ParameterMap::new()).await.unwrap();
    assert_eq!(item.status, SendStatus::Sent);
    let txn = channel.send(HitType::Transaction, ParameterMap::new()).await.unwrap();
    assert_eq!(txn.status, SendStatus::Sent);
    assert_eq!(sink.len(), 2);
}

#[tokio::test]
async fn commerce_hits_do_not_consume_tokens() {
    let clock = Arc::new(ManualClock::new(0));
    let bucket = Arc::new(TokenBucket::new(1, 5, 0.001, clock));
    let channel = RateLimitingChannel::new(bucket.clone(), RecordingChannel::new());

    channel.send(HitType::Item, ParameterMap::new()).await.unwrap();
    assert_eq!(bucket.available_tokens(), 1);
    let sent = channel.send(HitType::AppView, ParameterMap::new()).await.unwrap();
    assert!(sent.is_sent());
}

// ─── UserSamplingChannel ───────────────────────────────────

#[test]
fn sampling_key_reads_the_second_segment() {
    assert_eq!(sampling_key(&client_id_with_segment(0x8000)).unwrap(), 32768);
    assert_eq!(sampling_key(&client_id_with_segment(0)).unwrap(), 0);
    assert_eq!(sampling_key(&client_id_with_segment(0xffff)).unwrap(), 65535);
}

#[test]
fn malformed_client_ids_are_rejected() {
    for bad in ["nohyphens", "abc-12-def", "abc-zzzz-def", "abc-12345-def"] {
        let err = sampling_key(bad).unwrap_err();
        assert!(
            matches!(err, BeaconError::Channel(ChannelError::MalformedClientId { .. })),
            "{bad}: {err}"
        );
    }
}

#[tokio::test]
async fn sampling_boundary_sits_at_rate_times_655_36() {
    let (settings, _store) = ready_settings().await;
    let sink = RecordingChannel::new();
    let channel = UserSamplingChannel::new(settings.clone(), sink.clone());

    settings.set_sample_rate(51).unwrap();
    let included = channel.send(HitType::Event, with_client(0x8000)).await.unwrap();
    assert_eq!(included.status, SendStatus::Sent);

    settings.set_sample_rate(50).unwrap();
    let excluded = channel.send(HitType::Event, with_client(0x8000)).await.unwrap();
    assert_eq!(excluded.status, SendStatus::SampledOut);
    assert_eq!(sink.len(), 1);
}

#[tokio::test]
async fn per_hit_override_supersedes_the_configured_rate_once() {
    let (settings, _store) = ready_settings().await;
    settings.set_sample_rate(50).unwrap();
    let sink = RecordingChannel::new();
    let channel = UserSamplingChannel::new(settings, sink.clone());

    let mut overridden = with_client(0x8000);
    overridden.set(KnownParameter::SampleRateOverride, 51);
    let first = channel.send(HitType::Event, overridden).await.unwrap();
    assert_eq!(first.status, SendStatus::Sent);

    let second = channel.send(HitType::Event, with_client(0x8000)).await.unwrap();
    assert_eq!(second.status, SendStatus::SampledOut);
}

#[tokio::test]
async fn malformed_override_is_rejected_without_delegating() {
    let (settings, _store) = ready_settings().await;
    let sink = RecordingChannel::new();
    let channel = UserSamplingChannel::new(settings, sink.clone());

    let mut textual = with_client(0x0001);
    textual.set(KnownParameter::SampleRateOverride, "50");
    let err = channel.send(HitType::Event, textual).await.unwrap_err();
    assert!(matches!(err, BeaconError::Parameter(ParameterError::TypeMismatch { .. })));

    for bad in [0, 101, 500] {
        let mut out_of_range = with_client(0x0001);
        out_of_range.set(KnownParameter::SampleRateOverride, bad);
        let err = channel.send(HitType::Event, out_of_range).await.unwrap_err();
        assert!(matches!(err, BeaconError::Parameter(ParameterError::OutOfRange { .. })));
    }
    assert!(sink.is_empty());
}

#[tokio::test]
async fn full_rate_includes_every_key() {
    let (settings, _store) = ready_settings().await;
    let channel = UserSamplingChannel::new(settings, RecordingChannel::new());
    let result = channel.send(HitType::Event, with_client(0xffff)).await.unwrap();
    assert!(result.is_sent());
}

#[tokio::test]
async fn missing_client_id_is_a_programmer_error() {
    let (settings, _store) = ready_settings().await;
    let channel = UserSamplingChannel::new(settings, RecordingChannel::new());
    let err = channel.send(HitType::Event, event("c")).await.unwrap_err();
    assert!(matches!(err, BeaconError::Channel(ChannelError::MissingClientId)));
}

// ─── ParameterFilterChannel ────────────────────────────────

#[tokio::test]
async fn truncates_text_to_max_length() {
    let sink = RecordingChannel::new();
    let channel = ParameterFilterChannel::new(sink.clone());

    channel.send(HitType::Event, event(&"x".repeat(501))).await.unwrap();

    let (_, params) = sink.last().unwrap();
    let category = params.get(&KnownParameter::EventCategory).and_then(Value::as_text);
    assert_eq!(category.map(str::len), Some(500));
}

#[tokio::test]
async fn removes_values_equal_to_their_default() {
    let sink = RecordingChannel::new();
    let channel = ParameterFilterChannel::new(sink.clone());

    let mut params = ParameterMap::new();
    params.set(KnownParameter::ExDescription, "boom");
    params.set(KnownParameter::ExFatal, true);
    params.set(KnownParameter::NonInteraction, true);
    channel.send(HitType::Exception, params).await.unwrap();

    let (_, params) = sink.last().unwrap();
    assert!(!params.contains(&KnownParameter::ExFatal));
    assert_eq!(params.get(&KnownParameter::NonInteraction), Some(&Value::Boolean(true)));
    assert_eq!(params.len(), 2);
}

// ─── AsyncSettingsChannel ──────────────────────────────────

#[tokio::test]
async fn stamps_the_user_id_over_any_existing_client_id() {
    let user = client_id_with_segment(0x1234);
    let (settings, _store) = ready_settings_with_user(&user).await;
    let sink = RecordingChannel::new();
    let channel = AsyncSettingsChannel::new(settings, sink.clone()).unwrap();

    let mut params = event("c");
    params.set(KnownParameter::ClientId, "stale");
    channel.send(HitType::Event, params).await.unwrap();

    let (_, params) = sink.last().unwrap();
    assert_eq!(
        params.get(&KnownParameter::ClientId),
        Some(&Value::Text(user))
    );
}

#[tokio::test]
async fn construction_before_ready_fails() {
    let settings = ServiceSettings::new(
        Arc::new(MemoryStore::new()),
        SettingsConfig::default(),
        None,
    );
    let err = AsyncSettingsChannel::new(settings, RecordingChannel::new())
        .err()
        .expect("unready settings must be rejected");
    assert!(matches!(err, BeaconError::Settings(SettingsError::NotReady)));
}

// ─── FilterChannel ─────────────────────────────────────────

#[tokio::test]
async fn cancel_stops_later_filters_and_the_delegate() {
    let sink = RecordingChannel::new();
    let second_ran = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let flag = second_ran.clone();
    let filters: Vec<Filter> = vec![
        Arc::new(|hit| hit.cancel()),
        Arc::new(move |_| flag.store(true, std::sync::atomic::Ordering::SeqCst)),
    ];
    let channel = FilterChannel::new(Arc::new(RwLock::new(filters)), sink.clone());

    let result = channel.send(HitType::Event, event("c")).await.unwrap();

    assert_eq!(result.status, SendStatus::Canceled);
    assert!(!second_ran.load(std::sync::atomic::Ordering::SeqCst));
    assert!(sink.is_empty());
}

#[tokio::test]
async fn mutations_are_visible_downstream() {
    let sink = RecordingChannel::new();
    let filters: Vec<Filter> = vec![Arc::new(|hit| {
        hit.parameters_mut().set(KnownParameter::EventLabel, "tagged");
    })];
    let channel = FilterChannel::new(Arc::new(RwLock::new(filters)), sink.clone());

    let result = channel.send(HitType::Event, event("c")).await.unwrap();

    assert!(result.is_sent());
    let (_, params) = sink.last().unwrap();
    assert_eq!(
        params.get(&KnownParameter::EventLabel),
        Some(&Value::Text("tagged".into()))
    );
}

#[tokio::test]
async fn filters_installed_later_apply_to_later_hits() {
    let sink = RecordingChannel::new();
    let filters = Arc::new(RwLock::new(Vec::<Filter>::new()));
    let channel = FilterChannel::new(filters.clone(), sink.clone());

    channel.send(HitType::Event, event("c")).await.unwrap();
    filters.write().unwrap().push(Arc::new(|hit| hit.cancel()));
    let result = channel.send(HitType::Event, event("c")).await.unwrap();

    assert_eq!(result.status, SendStatus::Canceled);
    assert_eq!(sink.len(), 1);
}

// ─── EventPublishingChannel ────────────────────────────────

#[tokio::test]
async fn publishes_a_snapshot_and_delegates() {
    let (tx, mut rx) = broadcast::channel(8);
    let sink = RecordingChannel::new();
    let channel = EventPublishingChannel::new(tx, sink.clone());

    channel.send(HitType::Event, event("c")).await.unwrap();

    let published = rx.recv().await.unwrap();
    assert_eq!(published.hit_type, HitType::Event);
    assert_eq!(published.parameters, event("c"));
    assert_eq!(sink.len(), 1);
}

#[tokio::test]
async fn publishing_without_subscribers_still_delegates() {
    let (tx, rx) = broadcast::channel(8);
    drop(rx);
    let sink = RecordingChannel::new();
    let channel = EventPublishingChannel::new(tx, sink.clone());

    let result = channel.send(HitType::AppView, ParameterMap::new()).await.unwrap();
    assert!(result.is_sent());
    assert_eq!(sink.len(), 1);
}

// ─── HttpChannel ───────────────────────────────────────────

#[test]
fn payload_starts_with_hit_type_and_is_url_encoded() {
    let mut params = ParameterMap::new();
    params.set(KnownParameter::EventCategory, "a b&c");
    params.set(KnownParameter::EventValue, 7);

    let body = encode_payload(HitType::Event, &params);

    assert!(body.starts_with("t=event&"));
    assert!(body.contains("ec=a%20b%26c"));
    assert!(body.contains("ev=7"));
}

#[tokio::test]
async fn posts_once_to_the_endpoint() {
    let transport = RecordingTransport::new();
    let config = TransportConfig::default();
    let channel = HttpChannel::new(transport.clone(), &config);

    let result = channel.send(HitType::Event, event("c")).await.unwrap();

    assert!(result.is_sent());
    let posts = transport.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].0, config.endpoint_url);
    assert_eq!(posts[0].1, encode_payload(HitType::Event, &event("c")));
}

#[tokio::test]
async fn offline_resolves_without_posting() {
    let transport = RecordingTransport::new();
    transport.set_online(false);
    let channel = HttpChannel::new(transport.clone(), &TransportConfig::default());

    let result = channel.send(HitType::Event, event("c")).await.unwrap();

    assert_eq!(result.status, SendStatus::DeviceOffline);
    assert_eq!(transport.attempts(), 0);
}

#[tokio::test]
async fn oversized_payload_reports_sizes_without_posting() {
    let transport = RecordingTransport::new();
    let config = TransportConfig {
        max_post_length: 32,
        ..TransportConfig::default()
    };
    let channel = HttpChannel::new(transport.clone(), &config);
    let params = event(&"y".repeat(64));
    let actual = encode_payload(HitType::Event, &params).len();

    let result = channel.send(HitType::Event, params).await.unwrap();

    assert_eq!(result.status, SendStatus::PayloadTooBig);
    assert_eq!(
        result.details,
        Some(ResultDetails::PayloadSize { actual, max: 32 })
    );
    assert_eq!(transport.attempts(), 0);
}

#[tokio::test]
async fn transport_failure_is_an_error() {
    let transport = RecordingTransport::new();
    transport.set_failing(true);
    let channel = HttpChannel::new(transport.clone(), &TransportConfig::default());

    let err = channel.send(HitType::Event, event("c")).await.unwrap_err();

    assert!(matches!(err, BeaconError::Channel(ChannelError::Delivery { .. })));
    assert_eq!(transport.attempts(), 1, "no retry");
}

// ─── Dummy / Diverting ─────────────────────────────────────

#[tokio::test]
async fn dummy_reports_sent() {
    let result = DummyChannel.send(HitType::Event, event("c")).await.unwrap();
    assert!(result.is_sent());
}

#[tokio::test]
async fn diverting_queues_in_order_until_drained() {
    let buffer = DivertBuffer::new();
    let channel = DivertingChannel::new(buffer.clone());

    let first = channel.send(HitType::Event, event("one")).await.unwrap();
    channel.send(HitType::AppView, event("two")).await.unwrap();
    assert_eq!(first.status, SendStatus::Queued);
    assert_eq!(buffer.len(), 2);

    let mut closed = false;
    assert_eq!(buffer.pop_or_close(|| closed = true).unwrap().hit_type, HitType::Event);
    assert_eq!(buffer.pop_or_close(|| closed = true).unwrap().hit_type, HitType::AppView);
    assert!(!closed);
    assert!(buffer.pop_or_close(|| closed = true).is_none());
    assert!(closed);
    assert!(buffer.is_closed());

    let err = channel.send(HitType::Event, event("late")).await.unwrap_err();
    assert!(matches!(err, BeaconError::Channel(ChannelError::BufferDrained)));
}

#[tokio::test]
async fn discard_drops_pending_hits_and_closes() {
    let buffer = DivertBuffer::new();
    let channel = DivertingChannel::new(buffer.clone());
    channel.send(HitType::Event, event("one")).await.unwrap();

    assert_eq!(buffer.discard(), 1);
    assert!(buffer.is_empty());
    assert!(channel.send(HitType::Event, event("two")).await.is_err());
}

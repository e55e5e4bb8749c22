//! Stages composed into a chain.

use std::sync::{Arc, RwLock};

use beacon_channel::{
    Filter, FilterChannel, HttpChannel, ParameterFilterChannel, RateLimitingChannel, TokenBucket,
};
use beacon_core::config::{RateLimitConfig, TransportConfig};
use beacon_core::traits::IChannel;
use beacon_core::{HitType, KnownParameter, ParameterMap, SendStatus};
use test_fixtures::{ManualClock, RecordingTransport};

#[tokio::test]
async fn sixty_first_rapid_event_is_rate_limited_and_earlier_ones_truncated() {
    let clock = Arc::new(ManualClock::new(0));
    let bucket = Arc::new(TokenBucket::from_config(&RateLimitConfig::default(), clock));
    let transport = RecordingTransport::new();
    let http: Arc<dyn IChannel> =
        Arc::new(HttpChannel::new(transport.clone(), &TransportConfig::default()));
    let shaping: Arc<dyn IChannel> = Arc::new(ParameterFilterChannel::new(http));
    let limiting: Arc<dyn IChannel> = Arc::new(RateLimitingChannel::new(bucket, shaping));
    let pipeline = FilterChannel::new(Arc::new(RwLock::new(Vec::<Filter>::new())), limiting);

    let category = "c".repeat(600);
    let mut statuses = Vec::new();
    for _ in 0..61 {
        let mut params = ParameterMap::new();
        params.set(KnownParameter::EventCategory, category.as_str());
        params.set(KnownParameter::EventAction, "a");
        statuses.push(pipeline.send(HitType::Event, params).await.unwrap().status);
    }

    assert!(statuses[..60].iter().all(|s| *s == SendStatus::Sent));
    assert_eq!(statuses[60], SendStatus::RateLimited);

    let posts = transport.posts();
    assert_eq!(posts.len(), 60);
    let expected = format!("ec={}", "c".repeat(500));
    for (_, body) in posts {
        let ec = body.split('&').find(|p| p.starts_with("ec=")).unwrap();
        assert_eq!(ec, expected);
    }
}

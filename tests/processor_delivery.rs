mod common;

use click_pipeline::prelude::*;
use common::{FlakyStore, RecordingStore, click, config, create_processor, wait_until};
use std::sync::Arc;
use std::time::Duration;

const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Mobile/15E148 Safari/604.1";

#[tokio::test]
async fn test_click_is_recorded_with_device_category() {
    let store = Arc::new(RecordingStore::new(Duration::ZERO));
    let processor = create_processor(store.clone(), config(2, 10));
    processor.start().unwrap();

    processor
        .submit(ClickEvent::new(
            "abc123",
            Some("203.0.113.7".to_string()),
            Some(IPHONE),
            Some("https://example.com/"),
        ))
        .unwrap();

    wait_until(async || store.count().await == 1).await;
    processor.stop(Duration::from_secs(5)).await.unwrap();

    let records = store.records().await;
    assert_eq!(records[0].alias, "abc123");
    assert_eq!(records[0].device_category, DeviceCategory::Mobile);
    assert_eq!(records[0].ip.as_deref(), Some("203.0.113.7"));
    assert_eq!(records[0].referer.as_deref(), Some("https://example.com/"));
}

#[tokio::test]
async fn test_woothee_classifier_is_used_when_installed() {
    let store = Arc::new(RecordingStore::new(Duration::ZERO));
    let classifier = Arc::new(ClassifierSlot::empty());
    let processor = ClickProcessor::new(config(1, 10), store.clone(), classifier.clone());

    classifier
        .install(Arc::new(WootheeClassifier::new()))
        .unwrap();
    processor.start().unwrap();

    processor
        .submit(ClickEvent::new(
            "tab",
            None,
            Some("Mozilla/5.0 (iPad; CPU OS 16_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Mobile/15E148 Safari/604.1"),
            None,
        ))
        .unwrap();
    processor
        .submit(ClickEvent::new(
            "bot",
            None,
            Some("Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)"),
            None,
        ))
        .unwrap();
    processor.submit(ClickEvent::new("none", None, None, None)).unwrap();

    processor.stop(Duration::from_secs(5)).await.unwrap();

    let records = store.records().await;
    let category = |alias: &str| {
        records
            .iter()
            .find(|r| r.alias == alias)
            .map(|r| r.device_category)
    };
    assert_eq!(category("tab"), Some(DeviceCategory::Tablet));
    assert_eq!(category("bot"), Some(DeviceCategory::Bot));
    assert_eq!(category("none"), Some(DeviceCategory::Unknown));
}

#[tokio::test(start_paused = true)]
async fn test_backoff_doubles_between_attempts() {
    let store = Arc::new(FlakyStore::new(2));
    let config = ProcessorConfig {
        retry_base_delay: Duration::from_secs(1),
        ..config(1, 10)
    };
    let processor = create_processor(store.clone(), config);
    processor.start().unwrap();
    processor.submit(click("abc123")).unwrap();

    wait_until(async || processor.stats().recorded == 1).await;

    let attempts = store.attempts().await;
    assert_eq!(attempts.len(), 3);
    assert!(attempts[1] - attempts[0] >= Duration::from_secs(1));
    assert!(attempts[2] - attempts[1] >= Duration::from_secs(2));

    let stats = processor.stats();
    assert_eq!(stats.retried, 2);
    assert_eq!(stats.dropped, 0);

    processor.stop(Duration::from_secs(5)).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_backoff_is_capped() {
    let store = Arc::new(FlakyStore::new(3));
    let config = ProcessorConfig {
        retry_attempts: 4,
        retry_base_delay: Duration::from_secs(1),
        retry_max_delay: Duration::from_millis(1500),
        ..config(1, 10)
    };
    let processor = create_processor(store.clone(), config);
    processor.start().unwrap();
    processor.submit(click("abc123")).unwrap();

    wait_until(async || processor.stats().recorded == 1).await;

    let attempts = store.attempts().await;
    assert_eq!(attempts.len(), 4);
    // 1s, then min(2s, 1.5s), then min(4s, 1.5s).
    assert!(attempts[2] - attempts[1] < Duration::from_secs(2));
    assert!(attempts[3] - attempts[2] < Duration::from_secs(2));
    assert!(attempts[3] - attempts[2] >= Duration::from_millis(1500));

    processor.stop(Duration::from_secs(5)).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_are_dropped() {
    let store = Arc::new(FlakyStore::always_failing());
    let processor = create_processor(store.clone(), config(1, 10));
    processor.start().unwrap();
    processor.submit(click("abc123")).unwrap();

    wait_until(async || processor.stats().dropped == 1).await;

    assert_eq!(store.attempts().await.len(), 3);
    let stats = processor.stats();
    assert_eq!(stats.recorded, 0);
    assert_eq!(stats.retried, 2);

    processor.stop(Duration::from_secs(5)).await.unwrap();
}

#[tokio::test]
async fn test_unknown_alias_is_dropped_without_retry() {
    let store = Arc::new(RecordingStore::new(Duration::ZERO).with_unknown(&["gone"]));
    let processor = create_processor(store.clone(), config(1, 10));
    processor.start().unwrap();

    processor.submit(click("gone")).unwrap();
    processor.submit(click("abc123")).unwrap();
    processor.stop(Duration::from_secs(5)).await.unwrap();

    let stats = processor.stats();
    assert_eq!(stats.dropped, 1);
    assert_eq!(stats.retried, 0);
    assert_eq!(stats.recorded, 1);
    assert_eq!(store.records().await[0].alias, "abc123");
}

#[tokio::test(start_paused = true)]
async fn test_single_worker_preserves_order() {
    let store = Arc::new(RecordingStore::new(Duration::from_millis(1)));
    let processor = create_processor(store.clone(), config(1, 100));
    processor.start().unwrap();

    for i in 0..20 {
        processor.submit(click(&format!("alias{i}"))).unwrap();
    }
    processor.stop(Duration::from_secs(60)).await.unwrap();

    let aliases: Vec<String> = store.records().await.into_iter().map(|r| r.alias).collect();
    let expected: Vec<String> = (0..20).map(|i| format!("alias{i}")).collect();
    assert_eq!(aliases, expected);
}

#[tokio::test(start_paused = true)]
async fn test_every_accepted_click_is_accounted_for() {
    let store = Arc::new(RecordingStore::new(Duration::from_millis(3)).with_unknown(&["alias3", "alias7"]));
    let processor = create_processor(store.clone(), config(4, 16));
    processor.start().unwrap();

    let mut accepted = 0u64;
    let mut rejected = 0u64;
    for i in 0..100 {
        match processor.submit(click(&format!("alias{}", i % 10))) {
            Ok(()) => accepted += 1,
            Err(SubmitError::QueueFull) => rejected += 1,
            Err(err) => panic!("unexpected error: {err}"),
        }
        if i % 8 == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    processor.stop(Duration::from_secs(60)).await.unwrap();

    let stats = processor.stats();
    assert_eq!(stats.recorded + stats.dropped, accepted);
    assert_eq!(stats.rejected, rejected);
    assert_eq!(stats.recorded, store.count().await as u64);
    assert_eq!(stats.queue_length, 0);
}

// ABOUTME: Integration tests for health polling.
// ABOUTME: Uses a paused clock to check attempt counts and elapsed time exactly.

mod support;

use rollout::pipeline::{HealthPolicy, HealthVerdict, await_healthy};
use std::time::Duration;
use support::{FakeProbe, Harness};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

fn policy(max_attempts: u32, interval_secs: u64) -> HealthPolicy {
    HealthPolicy {
        max_attempts,
        interval: Duration::from_secs(interval_secs),
    }
}

#[tokio::test(start_paused = true)]
async fn healthy_on_first_attempt_returns_immediately() {
    let settings = Harness::new(&[]).settings();
    let probe = FakeProbe::healthy_from(1);
    let start = Instant::now();

    let report = await_healthy(
        &probe,
        &settings,
        &HealthPolicy::default(),
        &CancellationToken::new(),
    )
    .await;

    assert!(report.is_healthy());
    assert_eq!(report.attempts, 1);
    assert_eq!(probe.attempts(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn never_healthy_uses_every_attempt_without_trailing_sleep() {
    let settings = Harness::new(&[]).settings();
    let probe = FakeProbe::never_healthy();
    let start = Instant::now();

    let report = await_healthy(
        &probe,
        &settings,
        &HealthPolicy::default(),
        &CancellationToken::new(),
    )
    .await;

    assert_eq!(report.verdict, HealthVerdict::Unhealthy);
    assert_eq!(report.attempts, 30);
    assert_eq!(probe.attempts(), 30);
    assert_eq!(start.elapsed(), Duration::from_secs(29 * 10));
}

#[tokio::test(start_paused = true)]
async fn becomes_healthy_mid_way() {
    let settings = Harness::new(&[]).settings();
    let probe = FakeProbe::healthy_from(5);
    let start = Instant::now();

    let report = await_healthy(&probe, &settings, &policy(30, 10), &CancellationToken::new()).await;

    assert!(report.is_healthy());
    assert_eq!(report.attempts, 5);
    assert_eq!(start.elapsed(), Duration::from_secs(40));
}

#[tokio::test(start_paused = true)]
async fn probe_errors_count_as_unhealthy() {
    let settings = Harness::new(&[]).settings();
    let probe = FakeProbe::never_healthy();
    *probe.errors.lock() = true;

    let report = await_healthy(&probe, &settings, &policy(3, 1), &CancellationToken::new()).await;

    assert_eq!(report.verdict, HealthVerdict::Unhealthy);
    assert_eq!(report.attempts, 3);
    assert_eq!(report.last_error.as_deref(), Some("connection failed: connection refused"));
}

#[tokio::test(start_paused = true)]
async fn single_attempt_never_sleeps() {
    let settings = Harness::new(&[]).settings();
    let probe = FakeProbe::never_healthy();
    let start = Instant::now();

    let report = await_healthy(&probe, &settings, &policy(1, 60), &CancellationToken::new()).await;

    assert!(!report.is_healthy());
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn cancellation_interrupts_the_sleep() {
    let settings = Harness::new(&[]).settings();
    let probe = FakeProbe::never_healthy();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(15)).await;
        trigger.cancel();
    });
    let start = Instant::now();

    let report = await_healthy(&probe, &settings, &policy(30, 10), &cancel).await;

    assert_eq!(report.verdict, HealthVerdict::Cancelled);
    assert_eq!(report.attempts, 2);
    assert_eq!(start.elapsed(), Duration::from_secs(15));
}

#[tokio::test(start_paused = true)]
async fn already_cancelled_makes_no_attempt() {
    let settings = Harness::new(&[]).settings();
    let probe = FakeProbe::healthy_from(1);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = await_healthy(&probe, &settings, &policy(30, 10), &cancel).await;

    assert_eq!(report.verdict, HealthVerdict::Cancelled);
    assert_eq!(report.attempts, 0);
    assert_eq!(probe.attempts(), 0);
}

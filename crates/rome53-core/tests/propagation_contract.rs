//! Contract Test: Propagation Wait
//!
//! Constraints verified:
//! - The first status check is immediate
//! - Delays between checks grow linearly by the configured step
//! - Interrupting the wait ends the run successfully
//! - Interrupting before the change is submitted changes nothing, even
//!   while a lookup is still in flight
//!
//! These tests run on paused time, so sleeps complete instantly while the
//! clock still advances by the full delay.

mod common;

use common::*;
use rome53_core::traits::ChangeStatus;
use rome53_core::{CancelToken, Error, Outcome, Propagation, Reporter, Updater, cancellation};
use std::sync::Arc;
use std::net::Ipv4Addr;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

const WAN_IP: Ipv4Addr = Ipv4Addr::new(5, 6, 7, 8);

#[tokio::test(start_paused = true)]
async fn backoff_is_zero_then_grows_by_five_seconds() {
    let mut h = harness(
        MockProvider::with_a_record(&["1.2.3.4"]).with_statuses(
            ChangeStatus::Pending,
            &[ChangeStatus::Pending, ChangeStatus::Pending],
            ChangeStatus::InSync,
        ),
        WAN_IP,
        config("example.com"),
    );

    assert_ok!(h.updater.run(CancelToken::never()).await);

    assert_eq!(h.provider.status_check_count(), 3);
    assert_eq!(h.provider.poll_gaps_secs(), vec![0, 5, 10]);
}

#[tokio::test(start_paused = true)]
async fn progress_reports_each_delay() {
    let mut h = harness(
        MockProvider::with_a_record(&["1.2.3.4"]).with_statuses(
            ChangeStatus::Pending,
            &[ChangeStatus::Pending, ChangeStatus::Pending],
            ChangeStatus::InSync,
        ),
        WAN_IP,
        config("example.com"),
    );

    assert_ok!(h.updater.run(CancelToken::never()).await);

    let waits: Vec<String> = h
        .out
        .lines()
        .into_iter()
        .filter(|l| l.starts_with("Waiting for DNS update to sync"))
        .collect();
    assert_eq!(
        waits,
        vec![
            "Waiting for DNS update to sync... (0s)",
            "Waiting for DNS update to sync... (5s)",
            "Waiting for DNS update to sync... (10s)",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn custom_step_changes_the_schedule() {
    let mut h = harness(
        MockProvider::with_a_record(&["1.2.3.4"]).with_statuses(
            ChangeStatus::Pending,
            &[ChangeStatus::Pending, ChangeStatus::Pending],
            ChangeStatus::InSync,
        ),
        WAN_IP,
        config("example.com").with_poll_increment(Duration::from_secs(2)),
    );

    assert_ok!(h.updater.run(CancelToken::never()).await);

    assert_eq!(h.provider.poll_gaps_secs(), vec![0, 2, 4]);
}

#[tokio::test(start_paused = true)]
async fn interrupt_during_wait_ends_successfully() {
    // Never converges on its own
    let mut h = harness(
        MockProvider::with_a_record(&["1.2.3.4"]).with_statuses(
            ChangeStatus::Pending,
            &[],
            ChangeStatus::Pending,
        ),
        WAN_IP,
        config("example.com"),
    );

    let (handle, token) = cancellation();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(7)).await;
        handle.cancel();
    });

    let outcome = assert_ok!(h.updater.run(token).await);

    assert_eq!(
        outcome,
        Outcome::Updated {
            previous: "1.2.3.4".to_string(),
            ip: WAN_IP,
            propagation: Propagation::Interrupted,
        }
    );
    // Checks at 0s and 5s; the 10s sleep is cut short at 7s
    assert_eq!(h.provider.status_check_count(), 2);
    assert_eq!(h.provider.update_call_count(), 1);
    assert_eq!(h.out.lines().last().map(String::as_str), Some("example.com.\t5.6.7.8"));
}

#[tokio::test(start_paused = true)]
async fn interrupt_before_submit_changes_nothing() {
    let mut h = harness(
        MockProvider::with_a_record(&["1.2.3.4"]),
        WAN_IP,
        config("example.com"),
    );

    let (handle, token) = cancellation();
    handle.cancel();

    let err = assert_err!(h.updater.run(token).await);

    assert!(matches!(err, Error::Interrupted));
    assert_eq!(err.exit_code(), 5);
    assert_eq!(h.provider.update_call_count(), 0);
    assert_eq!(h.provider.status_check_count(), 0);
    assert!(!h.out.contents().contains("example.com.\t"));
}

#[tokio::test(start_paused = true)]
async fn interrupt_during_record_listing_returns_at_once() {
    let mut h = harness(
        MockProvider::with_a_record(&["1.2.3.4"]).with_listing_delay(Duration::from_secs(600)),
        WAN_IP,
        config("example.com"),
    );

    let (handle, token) = cancellation();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.cancel();
    });

    let started = tokio::time::Instant::now();
    let err = assert_err!(h.updater.run(token).await);

    assert!(matches!(err, Error::Interrupted));
    assert!(
        started.elapsed() < Duration::from_secs(2),
        "run took {:?}",
        started.elapsed()
    );
    assert_eq!(h.provider.update_call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn interrupt_during_wan_lookup_returns_at_once() {
    let provider = Arc::new(MockProvider::with_a_record(&["1.2.3.4"]));
    let reporter = Reporter::new(false, false, Box::new(Sink::default()), Box::new(Sink::default()));
    let mut updater = Updater::new(
        Box::new(SlowWanIp {
            ip: WAN_IP,
            delay: Duration::from_secs(600),
        }),
        provider.clone(),
        provider.clone(),
        config("example.com"),
        reporter,
    )
    .expect("updater construction succeeds");

    let (handle, token) = cancellation();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.cancel();
    });

    let started = tokio::time::Instant::now();
    let err = assert_err!(updater.run(token).await);

    assert!(matches!(err, Error::Interrupted));
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(provider.list_zones_call_count(), 0);
    assert_eq!(provider.update_call_count(), 0);
}

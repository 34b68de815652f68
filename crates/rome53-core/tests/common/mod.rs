//! Test doubles and common utilities for workflow contract tests
//!
//! This module provides minimal fakes for the provider and the WAN IP
//! resolver that count and record every call made to them.

#![allow(dead_code)]

use rome53_core::error::{Error, Result};
use rome53_core::traits::{
    ChangeHandle, ChangeStatus, HostedZone, RecordSet, RecordType, RecordUpdater, WanIpResolver,
    ZoneLister,
};
use rome53_core::{DomainName, Reporter, RunConfig, Updater};
use std::collections::VecDeque;
use std::io::{self, Write};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// A WAN IP resolver returning a fixed address and counting calls
pub struct FakeWanIp {
    ip: Ipv4Addr,
    calls: Arc<AtomicUsize>,
}

impl FakeWanIp {
    pub fn new(ip: Ipv4Addr) -> Self {
        Self {
            ip,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared call counter, readable after the resolver has been boxed
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait::async_trait]
impl WanIpResolver for FakeWanIp {
    async fn resolve(&self) -> Result<Ipv4Addr> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.ip)
    }

    fn resolver_name(&self) -> &'static str {
        "fake"
    }
}

/// A WAN IP resolver that always fails
pub struct FailingWanIp;

#[async_trait::async_trait]
impl WanIpResolver for FailingWanIp {
    async fn resolve(&self) -> Result<Ipv4Addr> {
        Err(Error::wan_ip("no resolver responded"))
    }

    fn resolver_name(&self) -> &'static str {
        "failing"
    }
}

/// A WAN IP resolver that takes `delay` to answer
pub struct SlowWanIp {
    pub ip: Ipv4Addr,
    pub delay: Duration,
}

#[async_trait::async_trait]
impl WanIpResolver for SlowWanIp {
    async fn resolve(&self) -> Result<Ipv4Addr> {
        tokio::time::sleep(self.delay).await;
        Ok(self.ip)
    }

    fn resolver_name(&self) -> &'static str {
        "slow"
    }
}

/// An in-memory provider that tracks calls
pub struct MockProvider {
    /// Zones and their records, in listing order
    zones: Vec<(HostedZone, Vec<RecordSet>)>,
    /// Reject every call as unauthenticated
    reject_credentials: bool,
    /// How long each list_records() call takes
    listing_delay: Duration,
    /// Status returned by update_a()
    submitted_status: ChangeStatus,
    /// Statuses returned by successive change_status() calls
    statuses: Mutex<VecDeque<ChangeStatus>>,
    /// Status returned once `statuses` is exhausted
    final_status: ChangeStatus,
    /// Call counter for list_zones()
    list_zones_calls: AtomicUsize,
    /// Addresses passed to update_a(), in call order
    updates: Mutex<Vec<(String, Ipv4Addr)>>,
    /// When update_a() was called
    submitted_at: Mutex<Option<Instant>>,
    /// When each change_status() call was made
    status_checks: Mutex<Vec<Instant>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            zones: Vec::new(),
            reject_credentials: false,
            listing_delay: Duration::ZERO,
            submitted_status: ChangeStatus::Pending,
            statuses: Mutex::new(VecDeque::new()),
            final_status: ChangeStatus::InSync,
            list_zones_calls: AtomicUsize::new(0),
            updates: Mutex::new(Vec::new()),
            submitted_at: Mutex::new(None),
            status_checks: Mutex::new(Vec::new()),
        }
    }

    /// A provider holding `example.com.` with an A record of `values`
    pub fn with_a_record(values: &[&str]) -> Self {
        Self::new().with_zone(
            "Z1EXAMPLE",
            "example.com.",
            vec![
                record("example.com.", RecordType::Other("NS".into()), &["ns-1.awsdns-00.com."]),
                record("example.com.", RecordType::A, values),
                record("www.example.com.", RecordType::Cname, &["example.com."]),
            ],
        )
    }

    /// Add a zone with the given records
    pub fn with_zone(mut self, id: &str, name: &str, records: Vec<RecordSet>) -> Self {
        self.zones.push((HostedZone::new(id, name), records));
        self
    }

    /// Reject credentials on every call
    pub fn rejecting_credentials(mut self) -> Self {
        self.reject_credentials = true;
        self
    }

    /// Make every list_records() call take `delay`
    pub fn with_listing_delay(mut self, delay: Duration) -> Self {
        self.listing_delay = delay;
        self
    }

    /// Script the propagation: status at submission, then per poll
    pub fn with_statuses(
        mut self,
        submitted: ChangeStatus,
        polls: &[ChangeStatus],
        then: ChangeStatus,
    ) -> Self {
        self.submitted_status = submitted;
        self.statuses = Mutex::new(polls.iter().copied().collect());
        self.final_status = then;
        self
    }

    /// Get the number of times update_a() was called
    pub fn update_call_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }

    /// Get the (zone id, address) pairs passed to update_a()
    pub fn updates(&self) -> Vec<(String, Ipv4Addr)> {
        self.updates.lock().unwrap().clone()
    }

    /// Get the number of times list_zones() was called
    pub fn list_zones_call_count(&self) -> usize {
        self.list_zones_calls.load(Ordering::SeqCst)
    }

    /// Get the number of times change_status() was called
    pub fn status_check_count(&self) -> usize {
        self.status_checks.lock().unwrap().len()
    }

    /// Seconds between submission and each status check, and between checks
    pub fn poll_gaps_secs(&self) -> Vec<u64> {
        let mut previous = self
            .submitted_at
            .lock()
            .unwrap()
            .expect("update_a() was called");
        let mut gaps = Vec::new();
        for at in self.status_checks.lock().unwrap().iter() {
            gaps.push(at.duration_since(previous).as_secs());
            previous = *at;
        }
        gaps
    }

    fn check_credentials(&self) -> Result<()> {
        if self.reject_credentials {
            return Err(Error::auth(
                "Have you set AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY?",
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ZoneLister for MockProvider {
    async fn list_zones(&self) -> Result<Vec<HostedZone>> {
        self.list_zones_calls.fetch_add(1, Ordering::SeqCst);
        self.check_credentials()?;
        Ok(self.zones.iter().map(|(zone, _)| zone.clone()).collect())
    }

    async fn list_records(&self, zone: &HostedZone) -> Result<Vec<RecordSet>> {
        if !self.listing_delay.is_zero() {
            tokio::time::sleep(self.listing_delay).await;
        }
        self.check_credentials()?;
        self.zones
            .iter()
            .find(|(z, _)| z.id == zone.id)
            .map(|(_, records)| records.clone())
            .ok_or_else(|| Error::provider("mock", format!("No such zone: {}", zone.id)))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

#[async_trait::async_trait]
impl RecordUpdater for MockProvider {
    async fn update_a(
        &self,
        zone: &HostedZone,
        _current: &RecordSet,
        new_ip: Ipv4Addr,
    ) -> Result<ChangeHandle> {
        self.check_credentials()?;
        self.updates.lock().unwrap().push((zone.id.clone(), new_ip));
        *self.submitted_at.lock().unwrap() = Some(Instant::now());
        Ok(ChangeHandle {
            id: "C1CHANGE".to_string(),
            status: self.submitted_status,
        })
    }

    async fn change_status(&self, _change: &ChangeHandle) -> Result<ChangeStatus> {
        self.status_checks.lock().unwrap().push(Instant::now());
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.final_status))
    }
}

/// An output sink shared between the reporter and the test
#[derive(Clone, Default)]
pub struct Sink(Arc<Mutex<Vec<u8>>>);

impl Sink {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Build a record set
pub fn record(name: &str, record_type: RecordType, values: &[&str]) -> RecordSet {
    RecordSet::new(
        name,
        record_type,
        Some(300),
        values.iter().map(|v| v.to_string()).collect(),
    )
}

/// Helper to create a configuration for `domain` with defaults
pub fn config(domain: &str) -> RunConfig {
    RunConfig::new(DomainName::new(domain).expect("valid test domain"))
}

/// Everything a test needs to drive one run and inspect it afterwards
pub struct Harness {
    pub updater: Updater,
    pub provider: Arc<MockProvider>,
    pub resolver_calls: Arc<AtomicUsize>,
    pub out: Sink,
    pub err: Sink,
}

/// Wire an updater over `provider`, with `wan_ip` as the detected address
pub fn harness(provider: MockProvider, wan_ip: Ipv4Addr, config: RunConfig) -> Harness {
    let resolver = FakeWanIp::new(wan_ip);
    let resolver_calls = resolver.calls();
    let provider = Arc::new(provider);
    let out = Sink::default();
    let err = Sink::default();
    let reporter = Reporter::new(
        config.quiet,
        false,
        Box::new(out.clone()),
        Box::new(err.clone()),
    );

    let updater = Updater::new(
        Box::new(resolver),
        provider.clone(),
        provider.clone(),
        config,
        reporter,
    )
    .expect("updater construction succeeds");

    Harness {
        updater,
        provider,
        resolver_calls,
        out,
        err,
    }
}

//! The rome53 update workflow
//!
//! The Updater is responsible for:
//! - Learning the WAN IP (unless overridden)
//! - Locating the zone that owns the domain
//! - Refusing anything but a single-valued A record
//! - Updating the record if it has drifted
//! - Optionally waiting for the change to propagate
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐   ┌────────────┐   ┌────────────┐
//! │ WanIpResolver │   │ ZoneLister │   │  Reporter  │
//! └───────────────┘   └────────────┘   └────────────┘
//!         │                 │                ▲
//!         ▼                 ▼                │
//!   ┌───────────────────────────────────────────────┐
//!   │ Updater: locate → guard → decide → update     │
//!   └───────────────────────────────────────────────┘
//!                           │
//!                           ▼
//!                   ┌───────────────┐
//!                   │ RecordUpdater │ (update_a, change_status)
//!                   └───────────────┘
//! ```
//!
//! Control flows strictly top to bottom, once per run.

pub mod guard;
pub mod locator;
pub mod propagation;

use crate::config::{Mode, RunConfig};
use crate::error::{Error, Result};
use crate::report::{Colour, Reporter};
use crate::traits::{RecordUpdater, WanIpResolver, ZoneLister};
use propagation::{CancelToken, WaitOutcome};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What happened to the propagation wait after an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// The change is in sync on every authoritative server
    InSync,
    /// The user stopped waiting; the change still completes server-side
    Interrupted,
    /// The run was configured not to wait
    NotAwaited,
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The record already pointed at the WAN IP
    Unchanged {
        /// The address the record holds
        ip: Ipv4Addr,
    },
    /// The record was changed
    Updated {
        /// Raw value the record held before
        previous: String,
        /// The address the record holds now
        ip: Ipv4Addr,
        /// How the wait for propagation ended
        propagation: Propagation,
    },
    /// Dry run: the record would have been changed
    WouldUpdate {
        /// Raw value the record holds
        previous: String,
        /// The address it would have been changed to
        ip: Ipv4Addr,
    },
}

/// Runs the update workflow once
///
/// All inputs are explicit: the collaborators, the [`RunConfig`], and the
/// [`Reporter`] that progress goes through.
pub struct Updater {
    /// WAN IP detection
    resolver: Box<dyn WanIpResolver>,

    /// Zone and record enumeration
    zones: Arc<dyn ZoneLister>,

    /// Record changes
    records: Arc<dyn RecordUpdater>,

    /// This run's settings
    config: RunConfig,

    /// User-facing output
    reporter: Reporter,
}

impl Updater {
    /// Create a new updater
    ///
    /// `zones` and `records` are usually the same provider object.
    pub fn new(
        resolver: Box<dyn WanIpResolver>,
        zones: Arc<dyn ZoneLister>,
        records: Arc<dyn RecordUpdater>,
        config: RunConfig,
        reporter: Reporter,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            resolver,
            zones,
            records,
            config,
            reporter,
        })
    }

    /// The reporter this updater writes through
    ///
    /// The binary uses it to print the final error, if any.
    pub fn reporter_mut(&mut self) -> &mut Reporter {
        &mut self.reporter
    }

    /// Run the workflow
    ///
    /// A `cancel` seen before the change is submitted aborts the run with
    /// `Error::Interrupted`, even in the middle of a lookup; afterwards it
    /// only ends the propagation wait. On every successful, non-dry-run
    /// outcome the `domain<TAB>ip` summary line is printed.
    pub async fn run(&mut self, mut cancel: CancelToken) -> Result<Outcome> {
        let domain = self.config.domain.clone();

        self.reporter.verbose(
            format!("Looking for {} in your {}", domain, self.zones.provider_name()),
            Some(Colour::Header),
        );

        let wan_ip = interruptible(&mut cancel, self.wan_ip()).await?;

        let located =
            interruptible(&mut cancel, locator::find_zone(self.zones.as_ref(), &domain)).await?;
        let record = guard::single_a_record(&located.records, &domain)?;

        // The guard guarantees exactly one value
        let current = record.values[0].clone();

        match current.trim().parse::<Ipv4Addr>() {
            Ok(ip) if ip == wan_ip => {
                info!("{} already points at {}", domain, wan_ip);
                self.reporter.verbose(
                    format!(
                        "Current WAN IP matches DNS record ({}). Doing nothing.",
                        wan_ip
                    ),
                    Some(Colour::Success),
                );
                self.reporter.summary(&domain, wan_ip)?;
                return Ok(Outcome::Unchanged { ip: wan_ip });
            }
            Ok(_) => {}
            Err(_) => {
                warn!("{} holds a value that is not an IPv4 address: {}", domain, current);
                self.reporter.verbose(
                    format!(
                        "DNS record value {} is not an IPv4 address; replacing it.",
                        current
                    ),
                    Some(Colour::Warning),
                );
            }
        }

        self.reporter.verbose(
            format!("Updating DNS A record to {} (was {})", wan_ip, current),
            Some(Colour::Info),
        );

        if self.config.mode == Mode::DryRun {
            info!(
                "[DRY-RUN] Would change {} in zone {} from {} to {}",
                domain, located.zone.id, current, wan_ip
            );
            self.reporter.verbose(
                "Dry run: no change was submitted.",
                Some(Colour::Warning),
            );
            return Ok(Outcome::WouldUpdate {
                previous: current,
                ip: wan_ip,
            });
        }

        if cancel.is_cancelled() {
            warn!("Interrupted before submitting the change for {}", domain);
            return Err(Error::Interrupted);
        }

        let change = self.records.update_a(&located.zone, record, wan_ip).await?;
        info!("Submitted change {} for {} -> {}", change.id, domain, wan_ip);
        self.reporter
            .verbose("DNS update request succeeded.", Some(Colour::Success));

        let propagation = if self.config.wait_for_sync {
            self.reporter.verbose(
                "You can ^C now, or await confirmation of the propagation.",
                None,
            );

            match propagation::await_propagation(
                self.records.as_ref(),
                &change,
                self.config.poll_increment,
                &mut self.reporter,
                &mut cancel,
            )
            .await?
            {
                WaitOutcome::InSync { polls } => {
                    debug!("Change {} in sync after {} poll(s)", change.id, polls);
                    self.reporter
                        .verbose("DNS update is in sync.", Some(Colour::Success));
                    Propagation::InSync
                }
                WaitOutcome::Interrupted => {
                    self.reporter.verbose(
                        "Stopped waiting. The update will still propagate.",
                        Some(Colour::Warning),
                    );
                    Propagation::Interrupted
                }
            }
        } else {
            Propagation::NotAwaited
        };

        self.reporter.summary(&domain, wan_ip)?;

        Ok(Outcome::Updated {
            previous: current,
            ip: wan_ip,
            propagation,
        })
    }

    /// The override address, or whatever the resolver reports
    async fn wan_ip(&self) -> Result<Ipv4Addr> {
        if let Some(ip) = self.config.override_ip {
            debug!("Using WAN IP override {}", ip);
            return Ok(ip);
        }

        let ip = self.resolver.resolve().await?;
        info!("WAN IP via {}: {}", self.resolver.resolver_name(), ip);
        Ok(ip)
    }
}

/// Run `work` unless `cancel` fires first
async fn interruptible<T>(
    cancel: &mut CancelToken,
    work: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            warn!("Interrupted before any change was submitted");
            Err(Error::Interrupted)
        }
        result = work => result,
    }
}

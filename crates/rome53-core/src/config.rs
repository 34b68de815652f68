//! Configuration for a single rome53 run
//!
//! Everything the workflow needs to know about the invocation lives in
//! [`RunConfig`]. It is built once by the binary and handed to the
//! [`Updater`](crate::Updater); nothing reads process-wide state.

use crate::domain::DomainName;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Default increment added to the propagation poll delay after every poll
pub const DEFAULT_POLL_INCREMENT: Duration = Duration::from_secs(5);

/// How a run should treat the update step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Submit the change
    #[default]
    Live,
    /// Do every lookup, but only report the change that would be made
    DryRun,
}

/// Settings for one invocation
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// The record to manage, fully qualified
    pub domain: DomainName,

    /// Suppress progress output (the summary line is still printed)
    pub quiet: bool,

    /// Use this address instead of detecting the WAN IP
    pub override_ip: Option<Ipv4Addr>,

    /// Wait for the change to reach every authoritative server
    pub wait_for_sync: bool,

    /// Live or dry-run
    pub mode: Mode,

    /// Linear backoff step between propagation polls
    pub poll_increment: Duration,
}

impl RunConfig {
    /// Create a configuration with defaults for everything but the domain
    pub fn new(domain: DomainName) -> Self {
        Self {
            domain,
            quiet: false,
            override_ip: None,
            wait_for_sync: true,
            mode: Mode::Live,
            poll_increment: DEFAULT_POLL_INCREMENT,
        }
    }

    /// Suppress or enable progress output
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Skip WAN IP detection and use this address
    pub fn with_override_ip(mut self, ip: Option<Ipv4Addr>) -> Self {
        self.override_ip = ip;
        self
    }

    /// Enable or disable the propagation wait
    pub fn with_wait_for_sync(mut self, wait: bool) -> Self {
        self.wait_for_sync = wait;
        self
    }

    /// Set the run mode
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the backoff step between propagation polls
    pub fn with_poll_increment(mut self, increment: Duration) -> Self {
        self.poll_increment = increment;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.wait_for_sync && self.poll_increment.is_zero() {
            return Err(crate::Error::config(
                "Propagation poll increment must be > 0",
            ));
        }

        Ok(())
    }
}

//! Core traits for rome53
//!
//! This module defines the narrow interfaces to the outside world.
//!
//! - [`WanIpResolver`]: Learn the host's public IPv4 address
//! - [`ZoneLister`]: Enumerate hosted zones and their records
//! - [`RecordUpdater`]: Change one A record and track propagation

pub mod dns_provider;
pub mod wan_ip;

pub use dns_provider::{
    ChangeHandle, ChangeStatus, HostedZone, RecordSet, RecordType, RecordUpdater, ZoneLister,
};
pub use wan_ip::WanIpResolver;

//! Zone location
//!
//! Which zone owns a name cannot be derived from the name alone: an account
//! may hold `example.com.` and `home.example.com.` as separate zones, or a
//! private and a public zone of the same name. The only reliable answer is to
//! enumerate every zone's records and see which one actually holds the name.

use crate::domain::DomainName;
use crate::error::{Error, Result};
use crate::traits::{HostedZone, RecordSet, ZoneLister};
use std::collections::HashMap;
use tracing::debug;

/// A zone together with the records it held when it was listed
#[derive(Debug, Clone)]
pub struct LocatedZone {
    /// The owning zone
    pub zone: HostedZone,
    /// Every record set in the zone
    pub records: Vec<RecordSet>,
}

/// Find the zone holding a record named exactly `domain`
///
/// Later zones win when two zones hold the same name, matching the order
/// the provider lists them in.
///
/// # Errors
///
/// - `Error::DomainNotFound`: no zone in the account holds the name
/// - anything the provider returns while listing
pub async fn find_zone(zones: &dyn ZoneLister, domain: &DomainName) -> Result<LocatedZone> {
    let mut listed = Vec::new();
    let mut owners: HashMap<String, usize> = HashMap::new();

    for zone in zones.list_zones().await? {
        let records = zones.list_records(&zone).await?;
        debug!(
            "Zone {} ({}) holds {} record set(s)",
            zone.name,
            zone.id,
            records.len()
        );

        let index = listed.len();
        for record in &records {
            owners.insert(record.name.to_ascii_lowercase(), index);
        }
        listed.push(LocatedZone { zone, records });
    }

    match owners.get(domain.as_str()) {
        Some(&index) => {
            let located = listed.swap_remove(index);
            debug!("{} belongs to zone {}", domain, located.zone.name);
            Ok(located)
        }
        None => Err(Error::DomainNotFound(domain.to_string())),
    }
}

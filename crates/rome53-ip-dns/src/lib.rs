// # DNS Echo WAN IP Resolver
//
// This crate provides the WAN IP resolver for rome53.
//
// ## How It Works
//
// OpenDNS resolvers answer an A query for `myip.opendns.com` with the
// address the query came from. Asking one of them directly, over plain UDP,
// tells us the host's public IPv4 address without any HTTP service.
//
// The four OpenDNS resolvers are configured as name servers of a single
// resolver and tried in order. There is no retry beyond that: if none of
// them answers, the lookup fails and so does the run.

use rome53_core::traits::WanIpResolver;
use rome53_core::{Error, Result};

use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{
    NameServerConfigGroup, ResolverConfig, ResolverOpts, ServerOrderingStrategy,
};
use hickory_resolver::error::ResolveErrorKind;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// The name OpenDNS answers with the querying address
pub const ECHO_NAME: &str = "myip.opendns.com.";

/// resolver1-4.opendns.com, in the order they are tried
pub const OPENDNS_RESOLVERS: [Ipv4Addr; 4] = [
    Ipv4Addr::new(208, 67, 222, 222),
    Ipv4Addr::new(208, 67, 220, 220),
    Ipv4Addr::new(208, 67, 222, 220),
    Ipv4Addr::new(208, 67, 220, 222),
];

/// Default per-server query timeout
const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// WAN IP resolver backed by the OpenDNS echo service
pub struct OpenDnsResolver {
    /// Resolver pointed only at the echo servers
    resolver: TokioAsyncResolver,

    /// Servers queried, for logging
    servers: Vec<Ipv4Addr>,
}

impl std::fmt::Debug for OpenDnsResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenDnsResolver")
            .field("servers", &self.servers)
            .finish()
    }
}

impl OpenDnsResolver {
    /// Create a resolver querying the four OpenDNS servers
    pub fn new() -> Self {
        Self::with_servers(&OPENDNS_RESOLVERS, DEFAULT_QUERY_TIMEOUT)
    }

    /// Create a resolver querying `servers` in order
    ///
    /// # Parameters
    ///
    /// - `servers`: Echo-capable name servers, tried first to last
    /// - `timeout`: How long to wait for each server
    pub fn with_servers(servers: &[Ipv4Addr], timeout: Duration) -> Self {
        let ips: Vec<IpAddr> = servers.iter().copied().map(IpAddr::V4).collect();
        let group = NameServerConfigGroup::from_ips_clear(&ips, 53, true);
        let config = ResolverConfig::from_parts(None, Vec::new(), group);

        Self {
            resolver: TokioAsyncResolver::tokio(config, resolver_opts(timeout)),
            servers: servers.to_vec(),
        }
    }

    /// Servers this resolver queries, in order
    pub fn servers(&self) -> &[Ipv4Addr] {
        &self.servers
    }
}

/// One server at a time, in the given order, nothing cached
fn resolver_opts(timeout: Duration) -> ResolverOpts {
    let mut opts = ResolverOpts::default();
    opts.timeout = timeout;
    opts.attempts = 1;
    opts.num_concurrent_reqs = 1;
    opts.cache_size = 0;
    opts.use_hosts_file = false;
    opts.server_ordering_strategy = ServerOrderingStrategy::UserProvidedOrder;
    opts
}

impl Default for OpenDnsResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl WanIpResolver for OpenDnsResolver {
    async fn resolve(&self) -> Result<Ipv4Addr> {
        tracing::debug!("Querying {} via {:?}", ECHO_NAME, self.servers);

        let lookup = self
            .resolver
            .ipv4_lookup(ECHO_NAME)
            .await
            .map_err(|e| match e.kind() {
                ResolveErrorKind::NoRecordsFound { .. } => {
                    Error::wan_ip(format!("{} returned no A record", ECHO_NAME))
                }
                _ => Error::wan_ip(format!("Query for {} failed: {}", ECHO_NAME, e)),
            })?;

        let ip = lookup
            .iter()
            .next()
            .map(|a| a.0)
            .ok_or_else(|| Error::wan_ip(format!("{} returned an empty answer", ECHO_NAME)))?;

        tracing::debug!("{} answered {}", ECHO_NAME, ip);
        Ok(ip)
    }

    fn resolver_name(&self) -> &'static str {
        "opendns"
    }
}

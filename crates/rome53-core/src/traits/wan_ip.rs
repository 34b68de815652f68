// # WAN IP Resolver Trait
//
// Defines the interface for learning the host's public IPv4 address.
//
// ## Implementations
//
// - DNS echo query against OpenDNS: `rome53-ip-dns` crate
//
// ## Usage
//
// ```rust,ignore
// use rome53_core::WanIpResolver;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let resolver = /* WanIpResolver implementation */;
//     let ip = resolver.resolve().await?;
//     println!("WAN IP: {}", ip);
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for WAN IP resolver implementations
///
/// A resolver answers one question, once: what address does the outside
/// world see this host as?
///
/// ## Forbidden Capabilities
/// - ❌ Retry loops (a failed lookup fails the run; rerunning is the recovery)
/// - ❌ Caching between calls
/// - ❌ Returning anything but IPv4
#[async_trait]
pub trait WanIpResolver: Send + Sync {
    /// Resolve the current public IPv4 address
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: The address the echo service saw
    /// - `Err(Error::WanIp)`: No resolver answered, or the answer was malformed
    async fn resolve(&self) -> Result<Ipv4Addr, crate::Error>;

    /// Get the resolver name (for logging/debugging)
    fn resolver_name(&self) -> &'static str;
}

// Network utilities - DNS resolution and socket helpers

use crate::Result;
use crate::error::WardenError;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;

/// Resolve hostname to IP addresses
///
/// IP literals are returned as-is without a lookup.
pub async fn resolve_hostname(hostname: &str, port: u16) -> Result<Vec<IpAddr>> {
    if let Ok(ip) = hostname.parse::<IpAddr>() {
        return Ok(vec![ip]);
    }

    let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());

    let response = resolver
        .lookup_ip(hostname)
        .await
        .map_err(|e| WardenError::Connection {
            host: hostname.to_string(),
            port,
            details: format!("DNS lookup failed: {}", e),
        })?;

    let ips: Vec<IpAddr> = response.iter().collect();

    if ips.is_empty() {
        return Err(WardenError::Connection {
            host: hostname.to_string(),
            port,
            details: "DNS lookup returned no addresses".to_string(),
        });
    }

    Ok(ips)
}

/// Open a TCP connection to `addr`, reporting failures against `hostname`
pub async fn connect(hostname: &str, addr: SocketAddr) -> Result<TcpStream> {
    TcpStream::connect(addr)
        .await
        .map_err(|e| WardenError::Connection {
            host: hostname.to_string(),
            port: addr.port(),
            details: format!("TCP connect to {} failed: {}", addr, e),
        })
}

/// Convert a whole-second timeout from configuration into a Duration,
/// never letting it reach zero
pub fn timeout_from_secs(seconds: u64) -> Duration {
    Duration::from_secs(seconds.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_ip_literal_skips_dns() {
        let ips = resolve_hostname("127.0.0.1", 443).await.unwrap();
        assert_eq!(ips, vec!["127.0.0.1".parse::<IpAddr>().unwrap()]);

        let ips = resolve_hostname("::1", 443).await.unwrap();
        assert_eq!(ips, vec!["::1".parse::<IpAddr>().unwrap()]);
    }

    #[tokio::test]
    async fn test_connect_refused_is_connection_error() {
        // Bind then drop to get a port with nothing listening
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = connect("localhost", addr).await.unwrap_err();
        assert_eq!(err.code(), "CONNECTION_ERROR");
    }

    #[test]
    fn test_timeout_from_secs_never_zero() {
        assert_eq!(timeout_from_secs(0), Duration::from_secs(1));
        assert_eq!(timeout_from_secs(8), Duration::from_secs(8));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_resolve_public_hostname() {
        let ips = resolve_hostname("example.com", 443).await.unwrap();
        assert!(!ips.is_empty());
    }
}

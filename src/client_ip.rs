//! Client IP resolution.
//!
//! Behind a reverse proxy the TCP peer is the proxy, not the client. Which
//! header carries the real address (and how far it can be trusted) depends on
//! the deployment, so the router takes a strategy instead of guessing.
//!
//! ```rust,no_run
//! use routedump::{Router, client_ip::SingleIpHeader};
//!
//! // nginx: proxy_set_header X-Real-IP $remote_addr;
//! let app = Router::new().client_ip(SingleIpHeader::new("x-real-ip"));
//! ```

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use http::HeaderMap;

use crate::error::ClientIpError;

/// Derives the client address of a request.
pub trait ClientIpStrategy: Send + Sync + 'static {
    fn client_ip(&self, headers: &HeaderMap, remote_addr: SocketAddr) -> Result<IpAddr, ClientIpError>;
}

pub(crate) type SharedStrategy = Arc<dyn ClientIpStrategy>;

/// Uses the TCP peer address. Correct only when nothing sits in front of the
/// server.
#[derive(Clone, Copy, Debug, Default)]
pub struct RemoteAddr;

impl ClientIpStrategy for RemoteAddr {
    fn client_ip(&self, _headers: &HeaderMap, remote_addr: SocketAddr) -> Result<IpAddr, ClientIpError> {
        Ok(remote_addr.ip())
    }
}

/// Reads a header that holds exactly one address, such as `X-Real-IP` or
/// `CF-Connecting-IP`, set by a trusted proxy.
#[derive(Clone, Debug)]
pub struct SingleIpHeader {
    name: String,
}

impl SingleIpHeader {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_ascii_lowercase() }
    }
}

impl ClientIpStrategy for SingleIpHeader {
    fn client_ip(&self, headers: &HeaderMap, _remote_addr: SocketAddr) -> Result<IpAddr, ClientIpError> {
        let raw = headers
            .get(self.name.as_str())
            .ok_or_else(|| ClientIpError::MissingHeader(self.name.clone()))?;
        raw.to_str()
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .ok_or_else(|| ClientIpError::InvalidHeader {
                header: self.name.clone(),
                value: String::from_utf8_lossy(raw.as_bytes()).into_owned(),
            })
    }
}

/// Walks a list header (`X-Forwarded-For` by default) from the right and
/// returns the first address that is not private, loopback, or link-local.
///
/// Suited to deployments where every proxy in the chain is on a private
/// network: the rightmost public hop is the last one a proxy recorded.
#[derive(Clone, Debug)]
pub struct RightmostNonPrivate {
    name: String,
}

impl RightmostNonPrivate {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_ascii_lowercase() }
    }
}

impl Default for RightmostNonPrivate {
    fn default() -> Self { Self::new("x-forwarded-for") }
}

impl ClientIpStrategy for RightmostNonPrivate {
    fn client_ip(&self, headers: &HeaderMap, _remote_addr: SocketAddr) -> Result<IpAddr, ClientIpError> {
        let values = headers.get_all(self.name.as_str());
        if values.iter().next().is_none() {
            return Err(ClientIpError::MissingHeader(self.name.clone()));
        }

        // Repeated headers are one comma-separated list, in arrival order.
        let hops: Vec<&str> = values
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .collect();

        hops.iter()
            .rev()
            .filter_map(|hop| hop.trim().parse::<IpAddr>().ok())
            .find(|ip| !is_private(ip))
            .ok_or_else(|| ClientIpError::NoPublicAddress(self.name.clone()))
    }
}

fn is_private(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback() || v4.is_link_local() || v4.is_unspecified(),
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            v6.is_loopback()
                || v6.is_unspecified()
                || (first & 0xfe00) == 0xfc00 // unique local
                || (first & 0xffc0) == 0xfe80 // link local
        }
    }
}

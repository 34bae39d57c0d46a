//! Incoming HTTP request type.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Uri, Version};

use crate::client_ip::SharedStrategy;
use crate::error::ClientIpError;
use crate::method::Method;
use crate::router::Router;

/// An incoming request, after routing.
///
/// Besides the usual method/URI/headers/body it knows which route pattern it
/// matched, the parameters that pattern captured, and the router that
/// dispatched it.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) uri: Uri,
    pub(crate) version: Version,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) matched: Matched,
    pub(crate) remote_addr: SocketAddr,
    pub(crate) router: Arc<Router>,
}

/// What the router resolved for one request.
pub(crate) struct Matched {
    pub(crate) pattern: String,
    pub(crate) params: Vec<(String, String)>,
    pub(crate) client_ip: Option<SharedStrategy>,
}

impl Request {
    pub fn method(&self) -> Method { self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn version(&self) -> Version { self.version }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// The peer address of the TCP connection.
    pub fn remote_addr(&self) -> SocketAddr { self.remote_addr }

    /// The router that dispatched this request.
    pub fn router(&self) -> &Router { &self.router }

    /// Header lookup. Header names are case-insensitive; values that are not
    /// visible ASCII are treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The route pattern this request matched, e.g. `/users/{id}`.
    pub fn pattern(&self) -> &str { &self.matched.pattern }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.matched.params.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All path parameters, in the order the pattern declares them.
    pub fn params(&self) -> &[(String, String)] { &self.matched.params }

    /// First value of a query-string parameter. Values are taken verbatim;
    /// percent-encoding is not decoded.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.uri.query()?
            .split('&')
            .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    /// Resolves the client address with the matched route's strategy, falling
    /// back to the router's.
    ///
    /// `None` when neither has one configured.
    pub fn client_ip(&self) -> Option<Result<IpAddr, ClientIpError>> {
        let strategy = self.matched.client_ip.as_ref()?;
        Some(strategy.client_ip(&self.headers, self.remote_addr))
    }
}

//! The debug endpoint.
//!
//! Mount [`debug_handler`] on any route to get the full report for the
//! request that hit it:
//!
//! ```rust,no_run
//! use routedump::{Method, Router, debug_handler};
//!
//! let app = Router::new()
//!     .on(Method::Get, "/debug", debug_handler)
//!     .on(Method::Get, "/debug/{*rest}", debug_handler);
//! ```
//!
//! The page exposes headers, addresses and process details. Keep it off
//! public listeners.

use tracing::debug;

use crate::duration;
use crate::report::{self, RequestInfo};
use crate::request::Request;
use crate::response::Response;
use crate::stats::HostStats;

/// Responds with the debug report as plain text.
///
/// A `sleep` query parameter holding a valid duration (`?sleep=250ms`) delays
/// the response by that long first, which is handy for load and timeout
/// testing. Invalid values are ignored.
pub async fn debug_handler(req: Request) -> Response {
    if let Some(delay) = req.query_param("sleep").and_then(duration::parse) {
        debug!(?delay, "delaying debug response");
        tokio::time::sleep(delay).await;
    }

    let router = req.router();
    let config = router.config();
    let routes: Vec<_> = router.routes().collect();
    let request = RequestInfo::capture(&req);
    let host = HostStats::collect();

    Response::builder()
        .header("server", "routedump")
        .header("cache-control", "no-cache, no-store, must-revalidate")
        .text(report::render(&config, &routes, &request, &host))
}

//! # routedump
//!
//! A small HTTP router with a built-in debug page.
//!
//! Mount [`debug_handler`] on a route and every hit returns one plain-text
//! snapshot of:
//!
//! - **the router**: trailing-slash and path-cleaning modes, automatic
//!   `OPTIONS`, `405` handling, client-IP strategy, and every registered route
//! - **the request**: matched pattern, path parameters, remote and client
//!   address, and a wire-level dump of what was received
//! - **the process**: time, hostname, OS, architecture, pid, CPU count, alive
//!   tokio tasks, and heap / resident memory
//!
//! The report itself is a pure function, [`report::render`], over four
//! values, so it can be produced and tested without a server.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use routedump::{Method, Request, Response, Router, Server, debug_handler};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .auto_options(true)
//!         .handle_method_not_allowed(true)
//!         .on(Method::Get, "/users/{id}", get_user)
//!         .on(Method::Get, "/debug", debug_handler);
//!
//!     Server::bind("127.0.0.1:3000").serve(app).await.unwrap();
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//! ```

mod debug;
mod dump;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;

pub mod alloc;
pub mod client_ip;
pub mod duration;
pub mod humanize;
pub mod report;
pub mod stats;

pub use client_ip::ClientIpStrategy;
pub use debug::debug_handler;
pub use error::{ClientIpError, DumpError, Error};
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::{FixedPath, RouteOptions, Router, TrailingSlash};
pub use server::Server;

//! A router with the debug page mounted.
//!
//! Run with:
//!   RUST_LOG=routedump=debug cargo run --example debug -- 127.0.0.1:3000
//!
//! Try:
//!   curl http://localhost:3000/debug
//!   curl 'http://localhost:3000/debug/users/42?sleep=500ms'
//!   curl -H 'x-forwarded-for: 203.0.113.7, 10.0.0.1' http://localhost:3000/debug/proxied
//!   curl -X OPTIONS -i http://localhost:3000/users/42

use routedump::alloc::TrackingAllocator;
use routedump::client_ip::{RemoteAddr, RightmostNonPrivate};
use routedump::{
    FixedPath, Method, Request, Response, RouteOptions, Router, Server, TrailingSlash,
    debug_handler,
};
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: TrackingAllocator = TrackingAllocator;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let addr = std::env::args().nth(1).unwrap_or_else(|| "127.0.0.1:3000".to_owned());

    let app = Router::new()
        .trailing_slash(TrailingSlash::Redirect)
        .fixed_path(FixedPath::Redirect)
        .auto_options(true)
        .handle_method_not_allowed(true)
        .client_ip(RemoteAddr)
        .on(Method::Get, "/users/{id}", get_user)
        .on(Method::Delete, "/users/{id}", delete_user)
        .on(Method::Get, "/debug", debug_handler)
        .on(Method::Post, "/debug", debug_handler)
        .on(Method::Get, "/debug/users/{id}", debug_handler)
        .on_with(
            Method::Get,
            "/debug/proxied",
            debug_handler,
            RouteOptions::new()
                .trailing_slash(TrailingSlash::Relaxed)
                .client_ip(RightmostNonPrivate::default()),
        );

    Server::bind(&addr)
        .serve(app)
        .await
        .expect("server error");
}

async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
}

async fn delete_user(_req: Request) -> http::StatusCode {
    http::StatusCode::NO_CONTENT
}

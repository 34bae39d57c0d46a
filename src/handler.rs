//! Route handlers.
//!
//! Any `async fn(Request) -> impl IntoResponse` is a [`Handler`]. The router
//! stores each one as a shared closure that runs the handler inside a `route`
//! span carrying the method and pattern it was registered under, so handler
//! logs say which route they belong to.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::Instrument;

use crate::method::Method;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// A registered handler, ready to be called once per request.
pub(crate) type BoxedHandler = Arc<dyn Fn(Request) -> BoxFuture + Send + Sync + 'static>;

/// Something that can answer a routed request.
///
/// Implemented for every `async fn(Request) -> R` where `R: IntoResponse`.
/// Implement it on your own type when a handler needs state of its own.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: Request) -> impl Future<Output = Response> + Send + 'static;
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    fn call(&self, req: Request) -> impl Future<Output = Response> + Send + 'static {
        let fut = (self)(req);
        async move { fut.await.into_response() }
    }
}

/// Erases `handler` for storage in the routing tree under `method pattern`.
pub(crate) fn boxed(handler: impl Handler, method: Method, pattern: &str) -> BoxedHandler {
    let pattern: Arc<str> = Arc::from(pattern);
    Arc::new(move |req: Request| -> BoxFuture {
        let span = tracing::debug_span!("route", %method, pattern = %pattern);
        Box::pin(handler.call(req).instrument(span))
    })
}

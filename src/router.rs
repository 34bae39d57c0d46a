//! Radix-tree request router.
//!
//! One [`matchit`] tree per HTTP method, plus the router-wide options that
//! decide what happens on a miss: trailing-slash and path-cleaning fallbacks,
//! automatic `OPTIONS`, and `405 Method Not Allowed`.

use std::collections::HashMap;
use std::sync::Arc;

use http::StatusCode;
use matchit::Router as MatchitRouter;
use tracing::debug;

use crate::client_ip::{ClientIpStrategy, SharedStrategy};
use crate::handler::{self, BoxedHandler, Handler};
use crate::method::Method;
use crate::report::{RouteDescriptor, RouterConfig};
use crate::request::Matched;

/// What to do when a path misses only by its trailing slash.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TrailingSlash {
    /// Treat `/a` and `/a/` as different paths.
    #[default]
    Strict,
    /// Redirect to the registered form.
    Redirect,
    /// Serve the registered route as if the path matched.
    Relaxed,
}

/// What to do when a path misses but its cleaned form (no `//`, `.` or `..`)
/// would match.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FixedPath {
    #[default]
    Strict,
    Redirect,
    Relaxed,
}

/// Per-route options for [`Router::on_with`].
#[derive(Clone, Default)]
pub struct RouteOptions {
    trailing_slash: Option<TrailingSlash>,
    client_ip: Option<SharedStrategy>,
}

impl RouteOptions {
    pub fn new() -> Self { Self::default() }

    /// Overrides the router's trailing-slash mode for this route.
    pub fn trailing_slash(mut self, mode: TrailingSlash) -> Self {
        self.trailing_slash = Some(mode);
        self
    }

    /// Resolves client IPs with `strategy` on this route instead of the
    /// router's.
    pub fn client_ip(mut self, strategy: impl ClientIpStrategy) -> Self {
        self.client_ip = Some(Arc::new(strategy));
        self
    }

    fn same_as(&self, other: &Self) -> bool {
        let same_strategy = match (&self.client_ip, &other.client_ip) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        self.trailing_slash == other.trailing_slash && same_strategy
    }
}

/// A pattern and the methods registered on it with the same options.
struct RouteEntry {
    pattern: String,
    methods: Vec<Method>,
    options: RouteOptions,
}

struct Endpoint {
    handler: BoxedHandler,
    route: usize,
}

/// Outcome of routing one request.
pub(crate) enum Resolution {
    Found { handler: BoxedHandler, matched: Matched },
    Redirect { location: String, status: StatusCode },
    Options { allow: String },
    MethodNotAllowed { allow: String },
    NotFound,
}

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Every builder method returns `self` so configuration and registrations
/// chain:
///
/// ```rust,no_run
/// # use routedump::{Method, Request, Response, Router, TrailingSlash, debug_handler};
/// # async fn get_user(_: Request) -> Response { Response::text("") }
/// Router::new()
///     .trailing_slash(TrailingSlash::Redirect)
///     .auto_options(true)
///     .on(Method::Get, "/users/{id}", get_user)
///     .on(Method::Get, "/debug", debug_handler);
/// ```
pub struct Router {
    trees: HashMap<Method, MatchitRouter<Endpoint>>,
    routes: Vec<RouteEntry>,
    trailing_slash: TrailingSlash,
    fixed_path: FixedPath,
    auto_options: bool,
    method_not_allowed: bool,
    client_ip: Option<SharedStrategy>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            trees: HashMap::new(),
            routes: Vec::new(),
            trailing_slash: TrailingSlash::Strict,
            fixed_path: FixedPath::Strict,
            auto_options: false,
            method_not_allowed: false,
            client_ip: None,
        }
    }

    /// Default trailing-slash mode for routes that do not set their own.
    pub fn trailing_slash(mut self, mode: TrailingSlash) -> Self {
        self.trailing_slash = mode;
        self
    }

    pub fn fixed_path(mut self, mode: FixedPath) -> Self {
        self.fixed_path = mode;
        self
    }

    /// Answer `OPTIONS` with `204` and an `allow` header for any path that
    /// has routes but no explicit `OPTIONS` handler.
    pub fn auto_options(mut self, enabled: bool) -> Self {
        self.auto_options = enabled;
        self
    }

    /// Answer `405` with an `allow` header instead of `404` when the path
    /// exists under other methods.
    pub fn handle_method_not_allowed(mut self, enabled: bool) -> Self {
        self.method_not_allowed = enabled;
        self
    }

    /// Client-IP strategy for every route that does not set its own.
    pub fn client_ip(mut self, strategy: impl ClientIpStrategy) -> Self {
        self.client_ip = Some(Arc::new(strategy));
        self
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax, catch-alls `{*name}`.
    ///
    /// # Panics
    ///
    /// Panics if the pattern is invalid or conflicts with one already
    /// registered for `method`.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.on_with(method, path, handler, RouteOptions::default())
    }

    /// Like [`on`](Router::on), with per-route options.
    pub fn on_with(
        mut self,
        method: Method,
        path: &str,
        handler: impl Handler,
        options: RouteOptions,
    ) -> Self {
        let existing = self.routes.iter()
            .position(|r| r.pattern == path && r.options.same_as(&options));
        let route = existing.unwrap_or(self.routes.len());

        let endpoint = Endpoint { handler: handler::boxed(handler, method, path), route };
        self.trees
            .entry(method)
            .or_default()
            .insert(path, endpoint)
            .unwrap_or_else(|e| panic!("invalid route `{method} {path}`: {e}"));

        match existing {
            Some(i) => self.routes[i].methods.push(method),
            None => self.routes.push(RouteEntry {
                pattern: path.to_owned(),
                methods: vec![method],
                options,
            }),
        }

        debug!(%method, pattern = path, "route registered");
        self
    }

    /// Router-wide settings, as shown in the debug report.
    pub fn config(&self) -> RouterConfig {
        RouterConfig {
            trailing_slash: self.trailing_slash,
            fixed_path: self.fixed_path,
            auto_options: self.auto_options,
            method_not_allowed: self.method_not_allowed,
            client_ip: self.client_ip.is_some(),
        }
    }

    /// Registered routes, grouped by pattern and options.
    ///
    /// Groups come in the order their first method was registered, methods
    /// within a group likewise. A router cannot change once it is served, so
    /// the order is the same on every call.
    pub fn routes(&self) -> impl Iterator<Item = RouteDescriptor> + '_ {
        self.routes.iter().map(|r| RouteDescriptor {
            methods: r.methods.clone(),
            pattern: r.pattern.clone(),
            trailing_slash: r.options.trailing_slash.unwrap_or(self.trailing_slash),
            client_ip: r.options.client_ip.is_some(),
        })
    }

    pub(crate) fn resolve(&self, method: Option<Method>, path: &str, query: Option<&str>) -> Resolution {
        if let Some(method) = method {
            if let Some(found) = self.find(method, path) {
                return found;
            }

            if let Some(alt) = toggle_trailing_slash(path) {
                if let Some((endpoint, _)) = self.lookup(method, &alt) {
                    let route = &self.routes[endpoint.route];
                    match route.options.trailing_slash.unwrap_or(self.trailing_slash) {
                        TrailingSlash::Redirect => return redirect(method, &alt, query),
                        TrailingSlash::Relaxed => {
                            if let Some(found) = self.find(method, &alt) {
                                return found;
                            }
                        }
                        TrailingSlash::Strict => {}
                    }
                }
            }

            if self.fixed_path != FixedPath::Strict {
                let clean = clean_path(path);
                if clean != path {
                    if let Some(found) = self.find(method, &clean) {
                        return match self.fixed_path {
                            FixedPath::Redirect => redirect(method, &clean, query),
                            _ => found,
                        };
                    }
                }
            }
        }

        if method == Some(Method::Options) && self.auto_options {
            let allow = self.allowed(path);
            if !allow.is_empty() {
                return Resolution::Options { allow: join_allow(allow.into_iter().chain([Method::Options])) };
            }
        }

        if self.method_not_allowed {
            let allow = self.allowed(path);
            if !allow.is_empty() {
                return Resolution::MethodNotAllowed { allow: join_allow(allow) };
            }
        }

        Resolution::NotFound
    }

    fn lookup(&self, method: Method, path: &str) -> Option<(&Endpoint, Vec<(String, String)>)> {
        let matched = self.trees.get(&method)?.at(path).ok()?;
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((matched.value, params))
    }

    fn find(&self, method: Method, path: &str) -> Option<Resolution> {
        let (endpoint, params) = self.lookup(method, path)?;
        let route = &self.routes[endpoint.route];
        let client_ip = route.options.client_ip.as_ref().or(self.client_ip.as_ref()).cloned();
        Some(Resolution::Found {
            handler: Arc::clone(&endpoint.handler),
            matched: Matched { pattern: route.pattern.clone(), params, client_ip },
        })
    }

    /// Methods with a route matching `path`, in `Method` order.
    fn allowed(&self, path: &str) -> Vec<Method> {
        let mut methods: Vec<Method> = self.trees.iter()
            .filter(|(_, tree)| tree.at(path).is_ok())
            .map(|(m, _)| *m)
            .collect();
        methods.sort();
        methods
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

fn redirect(method: Method, path: &str, query: Option<&str>) -> Resolution {
    let location = match query {
        Some(q) => format!("{path}?{q}"),
        None => path.to_owned(),
    };
    let status = if method.is_safe() {
        StatusCode::MOVED_PERMANENTLY
    } else {
        StatusCode::PERMANENT_REDIRECT
    };
    Resolution::Redirect { location, status }
}

fn join_allow(methods: impl IntoIterator<Item = Method>) -> String {
    let mut allow = String::new();
    for m in methods {
        if !allow.is_empty() {
            allow.push_str(", ");
        }
        allow.push_str(m.as_str());
    }
    allow
}

fn toggle_trailing_slash(path: &str) -> Option<String> {
    match path {
        "" | "/" => None,
        p if p.ends_with('/') => Some(p[..p.len() - 1].to_owned()),
        p => Some(format!("{p}/")),
    }
}

/// Collapses repeated slashes and resolves `.` and `..` segments. A trailing
/// slash on the input is kept.
fn clean_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut clean = String::with_capacity(path.len());
    clean.push('/');
    clean.push_str(&segments.join("/"));
    if path.ends_with('/') && clean.len() > 1 {
        clean.push('/');
    }
    clean
}

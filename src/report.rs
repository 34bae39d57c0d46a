//! The debug report.
//!
//! [`render`] turns four point-in-time inputs (router settings, the route
//! table, the request being served, and host stats) into one plain-text
//! page. It reads nothing else, so the same inputs always produce the same
//! text.
//!
//! Inputs that could not be obtained are printed as sentinels (`unknown`,
//! `Failed to dump request`, the client-IP error text) and the report
//! carries on; rendering itself cannot fail.

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::error::{ClientIpError, DumpError};
use crate::humanize;
use crate::method::Method;
use crate::request::Request;
use crate::router::{FixedPath, TrailingSlash};
use crate::stats::HostStats;

const BANNER: &str = concat!(
    "routedump: router, request and process snapshot\n",
    "Repo: ", env!("CARGO_PKG_REPOSITORY"), "\n",
);

const DUMP_FAILED: &str = "Failed to dump request";
const UNKNOWN_HOST: &str = "unknown";

/// Router-wide settings.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RouterConfig {
    pub trailing_slash: TrailingSlash,
    pub fixed_path: FixedPath,
    pub auto_options: bool,
    pub method_not_allowed: bool,
    /// Whether a router-wide client-IP strategy is set.
    pub client_ip: bool,
}

/// One registered route.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RouteDescriptor {
    pub methods: Vec<Method>,
    pub pattern: String,
    pub trailing_slash: TrailingSlash,
    /// Whether the route has its own client-IP strategy.
    pub client_ip: bool,
}

/// What the report shows about the request being served.
#[derive(Clone, Debug)]
pub struct RequestInfo {
    pub pattern: String,
    pub params: Vec<(String, String)>,
    pub remote_addr: Option<SocketAddr>,
    /// `None` when no client-IP strategy applies to the request.
    pub client_ip: Option<Result<IpAddr, ClientIpError>>,
    pub dump: Result<String, DumpError>,
}

impl RequestInfo {
    /// Captures everything the report needs from `req`, including the wire
    /// dump and client-IP resolution.
    pub fn capture(req: &Request) -> Self {
        Self {
            pattern: req.pattern().to_owned(),
            params: req.params().to_vec(),
            remote_addr: Some(req.remote_addr()),
            client_ip: req.client_ip(),
            dump: Ok(req.dump()),
        }
    }
}

/// Renders the full report.
pub fn render(
    config: &RouterConfig,
    routes: &[RouteDescriptor],
    request: &RequestInfo,
    host: &HostStats,
) -> String {
    Report { config, routes, request, host }.to_string()
}

/// Label for a trailing-slash mode. `Strict` doubles as the fallback.
pub fn trailing_slash_label(mode: TrailingSlash) -> &'static str {
    match mode {
        TrailingSlash::Redirect => "RedirectSlash",
        TrailingSlash::Relaxed => "RelaxedSlash",
        TrailingSlash::Strict => "StrictSlash",
    }
}

/// Label for a fixed-path mode. `Strict` doubles as the fallback.
pub fn fixed_path_label(mode: FixedPath) -> &'static str {
    match mode {
        FixedPath::Redirect => "RedirectPath",
        FixedPath::Relaxed => "RelaxedPath",
        FixedPath::Strict => "StrictPath",
    }
}

struct Report<'a> {
    config: &'a RouterConfig,
    routes: &'a [RouteDescriptor],
    request: &'a RequestInfo,
    host: &'a HostStats,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { config, routes, request, host } = self;

        writeln!(f, "{BANNER}")?;

        writeln!(f, "Router Information:")?;
        writeln!(f, "Trailing Slash: {}", trailing_slash_label(config.trailing_slash))?;
        writeln!(f, "Fixed Path: {}", fixed_path_label(config.fixed_path))?;
        writeln!(f, "Auto OPTIONS: {}", config.auto_options)?;
        writeln!(f, "Handle 405: {}", config.method_not_allowed)?;
        writeln!(f, "Client IP strategy: {}", config.client_ip)?;

        writeln!(f, "Registered route:")?;
        for route in routes.iter() {
            f.write_str("- ")?;
            for (i, method) in route.methods.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                f.write_str(method.as_str())?;
            }
            writeln!(
                f,
                " {} [TSO: {}, CIR: {}]",
                route.pattern,
                trailing_slash_label(route.trailing_slash),
                route.client_ip,
            )?;
        }

        writeln!(f, "\n\nHandler Information:")?;
        if let Some(addr) = request.remote_addr {
            writeln!(f, "Remote Address: {}", addr.ip())?;
        }
        match &request.client_ip {
            Some(Ok(ip)) => writeln!(f, "Client IP: {ip}")?,
            Some(Err(e)) => writeln!(f, "Client IP: {e}")?,
            None => {}
        }

        writeln!(f, "Matched Route: {}", request.pattern)?;
        writeln!(f, "Route Parameters:")?;
        if request.params.is_empty() {
            writeln!(f, "- None")?;
        }
        for (name, value) in &request.params {
            writeln!(f, "- {name}: {value}")?;
        }

        writeln!(f, "\n\nFull Request Dump:")?;
        f.write_str(request.dump.as_deref().unwrap_or(DUMP_FAILED))?;

        writeln!(f, "\nSystem Information:")?;
        writeln!(f, "Time: {}", host.time.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))?;
        writeln!(f, "Hostname: {}", host.hostname.as_deref().unwrap_or(UNKNOWN_HOST))?;
        writeln!(f, "OS: {}", host.os)?;
        writeln!(f, "Arch: {}", host.arch)?;
        writeln!(f, "Version: {}", host.version)?;
        writeln!(f, "Pid: {}", host.pid)?;
        writeln!(f, "CPU Cores: {}", host.cpus)?;
        writeln!(f, "Number of Tasks: {}", host.tasks)?;
        writeln!(f, "Allocated Memory: {}", humanize::bytes(host.allocated))?;
        writeln!(f, "Total Allocated Memory: {}", humanize::bytes(host.total_allocated))?;
        writeln!(f, "RSS Memory: {}", humanize::bytes(host.resident))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn host() -> HostStats {
        HostStats {
            hostname: Some("web-1".into()),
            time: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
            os: "linux".into(),
            arch: "x86_64".into(),
            version: "routedump 0.1.0".into(),
            pid: 4242,
            cpus: 8,
            tasks: 3,
            allocated: 2_500_000,
            total_allocated: 123_456_789,
            resident: 9_950_000,
        }
    }

    fn request() -> RequestInfo {
        RequestInfo {
            pattern: "/users/{id}".into(),
            params: vec![("id".into(), "42".into())],
            remote_addr: Some("192.0.2.10:55000".parse().unwrap()),
            client_ip: None,
            dump: Ok("GET /users/42 HTTP/1.1\r\nhost: api.local\r\n\r\n".into()),
        }
    }

    fn route(methods: &[Method]) -> RouteDescriptor {
        RouteDescriptor {
            methods: methods.to_vec(),
            pattern: "/users/{id}".into(),
            trailing_slash: TrailingSlash::Strict,
            client_ip: false,
        }
    }

    #[test]
    fn banner_points_at_repository() {
        let second = BANNER.lines().nth(1).unwrap();
        assert_eq!(second, concat!("Repo: ", env!("CARGO_PKG_REPOSITORY")));
        assert!(second.starts_with("Repo: https://"));
    }

    #[test]
    fn labels_for_modes() {
        assert_eq!(trailing_slash_label(TrailingSlash::Redirect), "RedirectSlash");
        assert_eq!(trailing_slash_label(TrailingSlash::Relaxed), "RelaxedSlash");
        assert_eq!(trailing_slash_label(TrailingSlash::default()), "StrictSlash");
        assert_eq!(fixed_path_label(FixedPath::Redirect), "RedirectPath");
        assert_eq!(fixed_path_label(FixedPath::Relaxed), "RelaxedPath");
        assert_eq!(fixed_path_label(FixedPath::default()), "StrictPath");
    }

    #[test]
    fn full_layout() {
        let config = RouterConfig { auto_options: true, ..RouterConfig::default() };
        let out = render(&config, &[route(&[Method::Get])], &request(), &host());

        let expected = format!(
            "{BANNER}\n\
             Router Information:\n\
             Trailing Slash: StrictSlash\n\
             Fixed Path: StrictPath\n\
             Auto OPTIONS: true\n\
             Handle 405: false\n\
             Client IP strategy: false\n\
             Registered route:\n\
             - GET /users/{{id}} [TSO: StrictSlash, CIR: false]\n\
             \n\
             \n\
             Handler Information:\n\
             Remote Address: 192.0.2.10\n\
             Matched Route: /users/{{id}}\n\
             Route Parameters:\n\
             - id: 42\n\
             \n\
             \n\
             Full Request Dump:\n\
             GET /users/42 HTTP/1.1\r\n\
             host: api.local\r\n\
             \r\n\
             \n\
             System Information:\n\
             Time: 2024-05-01T12:30:00Z\n\
             Hostname: web-1\n\
             OS: linux\n\
             Arch: x86_64\n\
             Version: routedump 0.1.0\n\
             Pid: 4242\n\
             CPU Cores: 8\n\
             Number of Tasks: 3\n\
             Allocated Memory: 2.5 MB\n\
             Total Allocated Memory: 123 MB\n\
             RSS Memory: 10 MB\n"
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn method_lists_have_n_minus_one_commas() {
        let methods = [Method::Get, Method::Post, Method::Put, Method::Delete];
        for n in 1..=methods.len() {
            let out = render(&RouterConfig::default(), &[route(&methods[..n])], &request(), &host());
            let line = out.lines().find(|l| l.starts_with("- ") && l.contains("[TSO:")).unwrap();
            let list = line.split(' ').nth(1).unwrap();
            assert_eq!(list.matches(',').count(), n - 1);
            assert!(!list.starts_with(',') && !list.ends_with(','));
        }
    }

    #[test]
    fn no_routes_keeps_section() {
        let out = render(&RouterConfig::default(), &[], &request(), &host());
        assert!(out.contains("Client IP strategy: false\nRegistered route:\n\n\nHandler Information:\n"));
    }

    #[test]
    fn no_params_prints_none_once() {
        let req = RequestInfo { params: vec![], ..request() };
        let out = render(&RouterConfig::default(), &[], &req, &host());
        assert_eq!(out.matches("- None\n").count(), 1);
        assert!(out.contains("Route Parameters:\n- None\n"));
    }

    #[test]
    fn failed_dump_is_replaced() {
        let ok = render(&RouterConfig::default(), &[], &request(), &host());
        let req = RequestInfo { dump: Err(DumpError("body stream reset".into())), ..request() };
        let out = render(&RouterConfig::default(), &[], &req, &host());

        assert!(out.contains("Full Request Dump:\nFailed to dump request\nSystem Information:\n"));
        let tail = |s: &str| s.split("System Information:").nth(1).unwrap().to_owned();
        assert_eq!(tail(&out), tail(&ok));
    }

    #[test]
    fn unknown_hostname() {
        let ok = render(&RouterConfig::default(), &[], &request(), &host());
        let out = render(&RouterConfig::default(), &[], &request(), &HostStats { hostname: None, ..host() });
        assert_eq!(out, ok.replace("Hostname: web-1", "Hostname: unknown"));
    }

    #[test]
    fn client_ip_line_only_when_resolving() {
        let out = render(&RouterConfig::default(), &[], &request(), &host());
        assert!(!out.contains("Client IP:"));

        let req = RequestInfo { client_ip: Some(Ok("203.0.113.5".parse().unwrap())), ..request() };
        let out = render(&RouterConfig::default(), &[], &req, &host());
        assert!(out.contains("Remote Address: 192.0.2.10\nClient IP: 203.0.113.5\n"));

        let req = RequestInfo {
            client_ip: Some(Err(ClientIpError::MissingHeader("x-real-ip".into()))),
            ..request()
        };
        let out = render(&RouterConfig::default(), &[], &req, &host());
        assert!(out.contains("Client IP: client ip: header `x-real-ip` is missing\nMatched Route:"));
    }

    #[test]
    fn no_remote_address_line_without_address() {
        let req = RequestInfo { remote_addr: None, ..request() };
        let out = render(&RouterConfig::default(), &[], &req, &host());
        assert!(out.contains("Handler Information:\nMatched Route: /users/{id}\n"));
    }

    #[test]
    fn same_inputs_same_output() {
        let routes = [route(&[Method::Get, Method::Head])];
        let a = render(&RouterConfig::default(), &routes, &request(), &host());
        let b = render(&RouterConfig::default(), &routes, &request(), &host());
        assert_eq!(a, b);
    }
}

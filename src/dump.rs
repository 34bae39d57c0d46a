//! Wire-level text dump of a request.
//!
//! Produces roughly what the client sent:
//!
//! ```text
//! POST /users?verbose=1 HTTP/1.1
//! host: api.local
//! content-type: application/json
//!
//! {"name":"alice"}
//! ```
//!
//! Header names come out lowercase (hyper normalises them). `host` is always
//! written first; HTTP/2 requests carry it as the URI authority instead.
//! Header values and the body are printed as text, with bytes that are not
//! UTF-8 shown as `U+FFFD`.

use std::borrow::Cow;

use http::header::HOST;

use crate::request::Request;

impl Request {
    /// Renders the request line, headers, and body, lines separated by CRLF.
    ///
    /// The body has already been read in full by the server, so this cannot
    /// fail.
    pub fn dump(&self) -> String {
        let target = self.uri.path_and_query().map_or("/", |pq| pq.as_str());
        let body = String::from_utf8_lossy(&self.body);

        let mut out = format!("{} {} {:?}\r\n", self.method, target, self.version);
        out.reserve(128 + body.len());

        let host = match self.headers.get(HOST) {
            Some(v) => Some(String::from_utf8_lossy(v.as_bytes())),
            None => self.uri.authority().map(|a| Cow::Borrowed(a.as_str())),
        };
        if let Some(host) = host {
            push_header(&mut out, "host", &host);
        }

        for (name, value) in &self.headers {
            if *name != HOST {
                push_header(&mut out, name.as_str(), &String::from_utf8_lossy(value.as_bytes()));
            }
        }

        out.push_str("\r\n");
        out.push_str(&body);
        out
    }
}

fn push_header(out: &mut String, name: &str, value: &str) {
    out.push_str(name);
    out.push_str(": ");
    out.push_str(value);
    out.push_str("\r\n");
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;
    use http::{HeaderMap, HeaderValue, Version};

    use crate::method::Method;
    use crate::request::{Matched, Request};
    use crate::router::Router;

    fn request(uri: &str, headers: HeaderMap, body: &'static [u8]) -> Request {
        Request {
            method: Method::Post,
            uri: uri.parse().unwrap(),
            version: Version::HTTP_11,
            headers,
            body: Bytes::from_static(body),
            matched: Matched { pattern: "/users".into(), params: vec![], client_ip: None },
            remote_addr: "127.0.0.1:4000".parse().unwrap(),
            router: Arc::new(Router::new()),
        }
    }

    #[test]
    fn host_first_then_headers_then_body() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        headers.insert("host", HeaderValue::from_static("api.local"));

        let dump = request("/users?verbose=1", headers, br#"{"name":"alice"}"#).dump();
        assert_eq!(
            dump,
            "POST /users?verbose=1 HTTP/1.1\r\n\
             host: api.local\r\n\
             content-type: application/json\r\n\
             \r\n\
             {\"name\":\"alice\"}"
        );
    }

    #[test]
    fn host_from_authority() {
        let dump = request("http://h2.local/users", HeaderMap::new(), b"").dump();
        assert!(dump.starts_with("POST /users HTTP/1.1\r\nhost: h2.local\r\n"));
    }

    #[test]
    fn utf8_header_value_is_kept() {
        let mut headers = HeaderMap::new();
        headers.insert("x-name", HeaderValue::from_bytes("café".as_bytes()).unwrap());

        let dump = request("/users", headers, b"").dump();
        assert_eq!(dump, "POST /users HTTP/1.1\r\nx-name: café\r\n\r\n");
    }

    #[test]
    fn binary_body_is_shown_lossily() {
        let dump = request("/users", HeaderMap::new(), &[0x1f, 0x8b, 0x08, 0x00]).dump();
        assert_eq!(dump, "POST /users HTTP/1.1\r\n\r\n\u{1f}\u{fffd}\u{8}\u{0}");
    }

    #[test]
    fn opaque_header_value_is_shown_lossily() {
        let mut headers = HeaderMap::new();
        headers.insert("x-blob", HeaderValue::from_bytes(&[b'a', 0xe9, b'b']).unwrap());

        let dump = request("/users", headers, b"").dump();
        assert!(dump.contains("x-blob: a\u{fffd}b\r\n"));
    }
}

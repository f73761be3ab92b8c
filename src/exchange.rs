//! The network side of the bridge.
//!
//! [`Exchange`] is everything the adapter needs from the server that accepted
//! the request. [`HttpExchange`] implements it over the `http::request::Parts`
//! hyper hands us.

use std::net::SocketAddr;

use http::header::HOST;
use http::request::Parts;
use http::{HeaderMap, Method, Version};

use crate::params::{ParamMap, parse_urlencoded};

/// Request fields as reported by the network layer.
pub trait Exchange {
    fn method(&self) -> &Method;
    fn version(&self) -> Version;
    fn scheme(&self) -> &str;
    /// Host as sent by the client, port included when present.
    fn host(&self) -> &str;
    fn path(&self) -> &str;
    /// Raw, undecoded query string without the leading `?`.
    fn query(&self) -> Option<&str>;
    /// Pre-combined absolute URI, when the transport has one.
    fn absolute_uri(&self) -> Option<&str>;
    fn headers(&self) -> &HeaderMap;
    /// Query parameters, already decoded.
    fn params(&self) -> &ParamMap;
    fn remote_addr(&self) -> Option<SocketAddr>;
}

/// [`Exchange`] over a hyper request head.
#[derive(Debug)]
pub struct HttpExchange {
    parts: Parts,
    scheme: String,
    host: String,
    absolute_uri: Option<String>,
    params: ParamMap,
    remote_addr: Option<SocketAddr>,
}

impl HttpExchange {
    /// Wraps `parts`, assuming plain `http` when the request target carries no scheme.
    pub fn new(parts: Parts, remote_addr: Option<SocketAddr>) -> Self {
        Self::with_default_scheme(parts, remote_addr, "http")
    }

    /// Wraps `parts`, falling back to `default_scheme` for origin-form targets.
    ///
    /// Behind a TLS-terminating proxy the server only ever sees origin-form
    /// requests over plain TCP; pass `"https"` there.
    pub fn with_default_scheme(
        parts: Parts,
        remote_addr: Option<SocketAddr>,
        default_scheme: &str,
    ) -> Self {
        let uri = &parts.uri;
        let scheme = uri.scheme_str().unwrap_or(default_scheme).to_owned();
        let host = match uri.authority() {
            Some(authority) => authority.as_str().to_owned(),
            None => parts
                .headers
                .get(HOST)
                .and_then(|h| h.to_str().ok())
                .unwrap_or_default()
                .to_owned(),
        };

        // HTTP/2 and absolute-form HTTP/1.1 targets already are the full URI.
        let absolute_uri = (uri.scheme().is_some() && uri.authority().is_some())
            .then(|| uri.to_string());
        let params = uri.query().map(|q| parse_urlencoded(q.as_bytes())).unwrap_or_default();

        Self { parts, scheme, host, absolute_uri, params, remote_addr }
    }

    pub fn parts(&self) -> &Parts {
        &self.parts
    }
}

impl Exchange for HttpExchange {
    fn method(&self) -> &Method { &self.parts.method }
    fn version(&self) -> Version { self.parts.version }
    fn scheme(&self) -> &str { &self.scheme }
    fn host(&self) -> &str { &self.host }
    fn path(&self) -> &str { self.parts.uri.path() }
    fn query(&self) -> Option<&str> { self.parts.uri.query() }
    fn absolute_uri(&self) -> Option<&str> { self.absolute_uri.as_deref() }
    fn headers(&self) -> &HeaderMap { &self.parts.headers }
    fn params(&self) -> &ParamMap { &self.params }
    fn remote_addr(&self) -> Option<SocketAddr> { self.remote_addr }
}

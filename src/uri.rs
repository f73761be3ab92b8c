//! Request-identity reconstruction.
//!
//! Every scheme, host, port, path and URL accessor on the adapter reads from a
//! single [`CanonicalUri`] derived once, at construction time. Two paths lead
//! there:
//!
//! 1. The network layer reports a pre-combined absolute URI. It is parsed
//!    as-is and trusted; no repair is attempted.
//! 2. It does not. The URI is synthesized from scheme, host, path and raw
//!    query. Raw query strings arrive from the wire unvalidated, so each
//!    `key=value` pair has its value form-encoded before parsing:
//!
//! ```text
//! a=b=1|c=d|e=f&g=h   →   a=b%3D1%7Cc%3Dd%7Ce%3Df&g=h
//! ```
//!
//! Pairs without a `=`, or with an empty key, are dropped.

use std::fmt;

use http::Uri;
use http::uri::Scheme;
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::error::Error;

/// Read-only snapshot of the request-identity fields the network layer hands us.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawRequestFields<'a> {
    pub scheme: &'a str,
    pub host: &'a str,
    pub raw_path: &'a str,
    pub raw_query: Option<&'a str>,
    /// Pre-combined absolute URI, when the transport supplies one.
    pub absolute_uri: Option<&'a str>,
}

/// Longest input `http::Uri` accepts.
const MAX_URI_LEN: usize = u16::MAX as usize - 1;

/// The resolved, always well-formed request URI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalUri {
    uri: Uri,
    /// Scheme of a host-less URI. `http::Uri` cannot carry a scheme without
    /// an authority, so `uri` is in origin form when this is set.
    bare_scheme: Option<Scheme>,
}

impl CanonicalUri {
    /// Scheme, or `""` when the URI carries none.
    pub fn scheme(&self) -> &str {
        match &self.bare_scheme {
            Some(scheme) => scheme.as_str(),
            None => self.uri.scheme_str().unwrap_or(""),
        }
    }

    /// Host without port, or `""` when the URI carries none.
    pub fn host(&self) -> &str {
        self.uri.host().unwrap_or("")
    }

    /// The explicit port, if the URI names one.
    pub fn port(&self) -> Option<u16> {
        self.uri.port_u16()
    }

    /// The explicit port, else 443 for `https` (any case) and 80 for everything else.
    pub fn effective_port(&self) -> u16 {
        self.port().unwrap_or_else(|| default_port(self.scheme()))
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// The (possibly re-encoded) query, without the leading `?`.
    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    /// `scheme://authority/path`, with the query stripped.
    pub fn url(&self) -> String {
        match (self.uri.authority(), &self.bare_scheme) {
            (Some(authority), _) => format!("{}://{}{}", self.scheme(), authority, self.path()),
            (None, Some(scheme)) => format!("{scheme}://{}", self.path()),
            (None, None) => self.path().to_owned(),
        }
    }

    /// The parsed URI. Host-less URIs come back in origin form.
    pub fn as_uri(&self) -> &Uri {
        &self.uri
    }
}

impl fmt::Display for CanonicalUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scheme) = &self.bare_scheme {
            write!(f, "{scheme}://")?;
        }
        fmt::Display::fmt(&self.uri, f)
    }
}

/// Resolves the canonical URI for one request.
///
/// Fails only when the assembled string is still not a valid URI, which means
/// the scheme, host, path or a verbatim query key is itself unrepresentable.
///
/// An empty host (HTTP/1.0 without `Host`) yields a URI with no authority. A
/// query that grows past the URI length limit once re-encoded loses its
/// trailing pairs.
pub fn resolve(fields: &RawRequestFields<'_>) -> Result<CanonicalUri, Error> {
    if let Some(absolute) = fields.absolute_uri.filter(|s| !s.is_empty()) {
        return parse(absolute).map(|uri| CanonicalUri { uri, bare_scheme: None });
    }

    let mut assembled = String::with_capacity(
        fields.scheme.len()
            + 3
            + fields.host.len()
            + fields.raw_path.len()
            + fields.raw_query.map_or(0, |q| q.len() * 3 + 1),
    );

    let bare_scheme = if fields.host.is_empty() {
        let scheme = Scheme::try_from(fields.scheme).map_err(|source| Error::InvalidUri {
            input: fields.scheme.to_owned(),
            source,
        })?;
        if fields.raw_path.is_empty() {
            assembled.push('/');
        }
        Some(scheme)
    } else {
        assembled.push_str(fields.scheme);
        assembled.push_str("://");
        assembled.push_str(fields.host);
        None
    };
    assembled.push_str(fields.raw_path);

    if let Some(query) = fields.raw_query {
        let budget = MAX_URI_LEN.saturating_sub(assembled.len() + 1);
        let repaired = repair(query, budget);
        if repaired.truncated {
            warn!(
                path = fields.raw_path,
                dropped = repaired.dropped,
                "re-encoded query too long, trailing pairs dropped"
            );
        }
        debug!(path = fields.raw_path, dropped = repaired.dropped, "synthesized request uri");

        assembled.push('?');
        assembled.push_str(&repaired.query);
    } else {
        debug!(path = fields.raw_path, "synthesized request uri");
    }

    parse(&assembled).map(|uri| CanonicalUri { uri, bare_scheme })
}

/// Rebuilds a raw query string so that every surviving value is form-encoded.
///
/// Keys are kept verbatim. Everything after the first `=` is the value,
/// further `=` characters included.
pub fn repair_query(query: &str) -> String {
    repair(query, usize::MAX).query
}

struct Repaired {
    query: String,
    /// Pairs left out: keyless ones plus any cut off by the length budget.
    dropped: usize,
    truncated: bool,
}

// Stops appending at the first pair that would push the result past `budget`.
fn repair(query: &str, budget: usize) -> Repaired {
    let mut repaired = String::with_capacity(query.len().min(budget));
    let mut dropped = 0;
    let mut truncated = false;

    for pair in query.split('&') {
        let Some((key, value)) = pair.split_once('=').filter(|(key, _)| !key.is_empty()) else {
            if !pair.is_empty() {
                dropped += 1;
            }
            continue;
        };
        if truncated {
            dropped += 1;
            continue;
        }

        let start = repaired.len();
        if start > 0 {
            repaired.push('&');
        }
        repaired.push_str(key);
        repaired.push('=');
        repaired.extend(form_urlencoded::byte_serialize(value.as_bytes()));

        if repaired.len() > budget {
            repaired.truncate(start);
            truncated = true;
            dropped += 1;
        }
    }

    Repaired { query: repaired, dropped, truncated }
}

/// Default port implied by `scheme`.
pub fn default_port(scheme: &str) -> u16 {
    if scheme.eq_ignore_ascii_case("https") { 443 } else { 80 }
}

fn parse(input: &str) -> Result<Uri, Error> {
    input
        .parse::<Uri>()
        .map_err(|source| Error::InvalidUri { input: input.to_owned(), source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields<'a>(path: &'a str, query: Option<&'a str>) -> RawRequestFields<'a> {
        RawRequestFields {
            scheme: "http",
            host: "test.org",
            raw_path: path,
            raw_query: query,
            absolute_uri: None,
        }
    }

    #[test]
    fn absolute_uri_is_parsed_directly() {
        let raw = RawRequestFields {
            absolute_uri: Some("https://example.com:8443/a/b?x=1"),
            ..fields("/ignored", Some("ignored=1"))
        };
        let uri = resolve(&raw).unwrap();

        assert_eq!(uri.scheme(), "https");
        assert_eq!(uri.host(), "example.com");
        assert_eq!(uri.port(), Some(8443));
        assert_eq!(uri.path(), "/a/b");
        assert_eq!(uri.query(), Some("x=1"));
    }

    #[test]
    fn empty_absolute_uri_falls_back_to_synthesis() {
        let raw = RawRequestFields { absolute_uri: Some(""), ..fields("/test", None) };
        let uri = resolve(&raw).unwrap();

        assert_eq!(uri.host(), "test.org");
        assert_eq!(uri.path(), "/test");
        assert_eq!(uri.query(), None);
    }

    #[test]
    fn malformed_absolute_uri_is_an_error() {
        let raw = RawRequestFields { absolute_uri: Some("http://exa mple.com/"), ..fields("/", None) };
        assert!(matches!(resolve(&raw), Err(Error::InvalidUri { .. })));
    }

    #[test]
    fn synthesized_uri_matches_components() {
        let uri = resolve(&fields("/test", Some("a=b"))).unwrap();

        assert_eq!(uri.scheme(), "http");
        assert_eq!(uri.host(), "test.org");
        assert_eq!(uri.path(), "/test");
        assert_eq!(uri.query(), Some("a=b"));
    }

    #[test]
    fn bad_query_is_repaired() {
        let uri = resolve(&fields("/test", Some("a=b=1|c=d|e=f&g=h"))).unwrap();

        assert_eq!(uri.path(), "/test");
        assert_eq!(uri.query(), Some("a=b%3D1%7Cc%3Dd%7Ce%3Df&g=h"));
    }

    #[test]
    fn values_are_form_encoded() {
        assert_eq!(repair_query("q=hello world&r=a+b"), "q=hello+world&r=a%2Bb");
        assert_eq!(repair_query("k=*-._~"), "k=*-._%7E");
    }

    #[test]
    fn keyless_pairs_are_dropped() {
        assert_eq!(repair_query("flag&=orphan&a=1"), "a=1");
        assert_eq!(repair_query("&&a=1&&"), "a=1");
        assert_eq!(repair_query("novalue"), "");
    }

    #[test]
    fn empty_value_is_kept() {
        assert_eq!(repair_query("a=&b=2"), "a=&b=2");
    }

    #[test]
    fn host_may_carry_a_port() {
        let raw = RawRequestFields { host: "test.org:8080", ..fields("/", None) };
        let uri = resolve(&raw).unwrap();

        assert_eq!(uri.host(), "test.org");
        assert_eq!(uri.effective_port(), 8080);
    }

    #[test]
    fn port_defaults_follow_scheme() {
        assert_eq!(resolve(&fields("/", None)).unwrap().effective_port(), 80);

        let raw = RawRequestFields { scheme: "HTTPS", ..fields("/", None) };
        assert_eq!(resolve(&raw).unwrap().effective_port(), 443);
    }

    #[test]
    fn url_strips_query() {
        let uri = resolve(&fields("/a/b", Some("x=1"))).unwrap();
        assert_eq!(uri.url(), "http://test.org/a/b");
    }

    #[test]
    fn empty_host_keeps_scheme_without_authority() {
        let raw = RawRequestFields { host: "", ..fields("/test", Some("a=b")) };
        let uri = resolve(&raw).unwrap();

        assert_eq!(uri.scheme(), "http");
        assert_eq!(uri.host(), "");
        assert_eq!(uri.path(), "/test");
        assert_eq!(uri.query(), Some("a=b"));
        assert_eq!(uri.effective_port(), 80);
        assert_eq!(uri.url(), "http:///test");
        assert_eq!(uri.to_string(), "http:///test?a=b");
    }

    #[test]
    fn empty_host_and_path_resolve_to_root() {
        let raw = RawRequestFields { scheme: "https", host: "", ..fields("", None) };
        let uri = resolve(&raw).unwrap();

        assert_eq!(uri.path(), "/");
        assert_eq!(uri.effective_port(), 443);
    }

    #[test]
    fn oversized_repaired_query_drops_trailing_pairs() {
        // Each `%20` becomes `%2520`, taking the value past the URI length limit.
        let query = format!("a=1&q={}&b=2", "%20".repeat(15_000));
        assert!(query.len() < MAX_URI_LEN);

        let uri = resolve(&fields("/t", Some(&query))).unwrap();

        assert_eq!(uri.path(), "/t");
        assert_eq!(uri.query(), Some("a=1"));
    }

    #[test]
    fn budget_counts_dropped_pairs() {
        let repaired = repair("a=1&bad&b=22&c=3", 7);

        assert_eq!(repaired.query, "a=1");
        assert_eq!(repaired.dropped, 3);
        assert!(repaired.truncated);
    }
}

//! The bridge itself: an [`Exchange`] seen through [`LegacyRequest`].

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use http::Version;
use http::header::{ACCEPT_LANGUAGE, CONTENT_LENGTH, COOKIE};

use crate::cookie::{self, Cookie};
use crate::error::Error;
use crate::exchange::Exchange;
use crate::headers;
use crate::legacy::LegacyRequest;
use crate::locale::Locale;
use crate::params::{ParamMap, ParamView};
use crate::uri::{self, CanonicalUri, RawRequestFields};

/// One inbound request exposed as a [`LegacyRequest`].
///
/// Built once per request and dropped with it. The canonical URI is resolved
/// during construction, so a request whose URI cannot be made well-formed never
/// yields an adapter.
///
/// ```rust
/// use reqbridge::{Adapter, HttpExchange, LegacyRequest};
///
/// let (parts, ()) = http::Request::get("/test?a=b")
///     .header("host", "test.org")
///     .body(())
///     .unwrap()
///     .into_parts();
/// let exchange = HttpExchange::new(parts, None);
/// let req = Adapter::new(&exchange).unwrap();
///
/// assert_eq!(req.scheme(), "http");
/// assert_eq!(req.server_name(), "test.org");
/// assert_eq!(req.request_uri(), "/test");
/// assert_eq!(req.parameter("a"), Some("b"));
/// ```
pub struct Adapter<'a> {
    exchange: &'a dyn Exchange,
    uri: CanonicalUri,
    params: ParamView<'a>,
    default_locale: Locale,
}

impl<'a> Adapter<'a> {
    /// Adapter without form parameters and with the `en-US` default locale.
    pub fn new(exchange: &'a dyn Exchange) -> Result<Self, Error> {
        Self::builder(exchange).build()
    }

    pub fn builder(exchange: &'a dyn Exchange) -> AdapterBuilder<'a> {
        AdapterBuilder { exchange, form: None, default_locale: Locale::default() }
    }

    pub fn canonical_uri(&self) -> &CanonicalUri {
        &self.uri
    }

    pub fn params(&self) -> ParamView<'a> {
        self.params
    }

    pub fn exchange(&self) -> &'a dyn Exchange {
        self.exchange
    }
}

/// Fluent configuration for [`Adapter`]. Obtain via [`Adapter::builder`].
pub struct AdapterBuilder<'a> {
    exchange: &'a dyn Exchange,
    form: Option<&'a ParamMap>,
    default_locale: Locale,
}

impl<'a> AdapterBuilder<'a> {
    /// Form parameters decoded from the body. Borrowed, never modified.
    pub fn form(mut self, form: &'a ParamMap) -> Self {
        self.form = Some(form);
        self
    }

    /// Locale reported when the client sends no `Accept-Language`.
    pub fn default_locale(mut self, locale: Locale) -> Self {
        self.default_locale = locale;
        self
    }

    /// Resolves the canonical URI and finishes the adapter.
    pub fn build(self) -> Result<Adapter<'a>, Error> {
        let exchange = self.exchange;
        let uri = uri::resolve(&RawRequestFields {
            scheme: exchange.scheme(),
            host: exchange.host(),
            raw_path: exchange.path(),
            raw_query: exchange.query(),
            absolute_uri: exchange.absolute_uri(),
        })?;

        Ok(Adapter {
            exchange,
            uri,
            params: ParamView::new(exchange.params(), self.form),
            default_locale: self.default_locale,
        })
    }
}

impl LegacyRequest for Adapter<'_> {
    fn method(&self) -> &str {
        self.exchange.method().as_str()
    }

    fn protocol(&self) -> &str {
        match self.exchange.version() {
            Version::HTTP_09 => "HTTP/0.9",
            Version::HTTP_10 => "HTTP/1.0",
            Version::HTTP_2 => "HTTP/2.0",
            Version::HTTP_3 => "HTTP/3.0",
            _ => "HTTP/1.1",
        }
    }

    fn scheme(&self) -> &str { self.uri.scheme() }
    fn server_name(&self) -> &str { self.uri.host() }
    fn server_port(&self) -> u16 { self.uri.effective_port() }
    fn request_uri(&self) -> &str { self.uri.path() }
    fn request_url(&self) -> String { self.uri.url() }
    fn path_info(&self) -> &str { self.exchange.path() }
    fn query_string(&self) -> Option<&str> { self.exchange.query() }

    fn header(&self, name: &str) -> Option<&str> {
        headers::first(self.exchange.headers(), name)
    }

    fn headers(&self, name: &str) -> Vec<&str> {
        headers::all(self.exchange.headers(), name)
    }

    fn header_names(&self) -> Vec<&str> {
        self.exchange.headers().keys().map(|name| name.as_str()).collect()
    }

    fn int_header(&self, name: &str) -> Result<i32, Error> {
        headers::int(self.exchange.headers(), name)
    }

    fn date_header(&self, name: &str) -> Result<Option<DateTime<Utc>>, Error> {
        headers::date(self.exchange.headers(), name)
    }

    fn content_length_long(&self) -> Result<i64, Error> {
        headers::long(self.exchange.headers(), CONTENT_LENGTH)
    }

    // HTTP/2 clients may split cookies across several header fields.
    fn cookies(&self) -> Vec<Cookie> {
        let fields = headers::all(self.exchange.headers(), COOKIE);
        if fields.is_empty() {
            return Vec::new();
        }
        cookie::parse(&fields.join("; "))
    }

    fn locale(&self) -> Locale {
        headers::first(self.exchange.headers(), ACCEPT_LANGUAGE)
            .and_then(Locale::from_accept_language)
            .unwrap_or_else(|| self.default_locale.clone())
    }

    fn remote_addr(&self) -> Option<String> {
        self.exchange.remote_addr().map(|addr| addr.to_string())
    }

    fn parameter(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    fn parameter_values(&self, name: &str) -> Vec<&str> {
        self.params.get_all(name)
    }

    fn parameter_names(&self) -> BTreeSet<&str> {
        self.params.names()
    }

    fn parameter_map(&self) -> ParamMap {
        self.params.to_map()
    }
}

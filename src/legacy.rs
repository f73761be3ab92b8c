//! The legacy request contract.
//!
//! Legacy consumers expect one wide request surface. The transport can back
//! only part of it, so [`LegacyRequest`] comes in two strata:
//!
//! - **Required methods**: URI resolution, parameter reconciliation and
//!   header/field projection. Implemented by [`Adapter`](crate::Adapter).
//! - **Provided methods**: everything the transport has no implementation
//!   for. Each one names its [`Capability`] and defers to the policy table in
//!   [`Capability::policy`]; implementors never override them.
//!
//! | Policy | Result |
//! |---|---|
//! | [`Policy::Sentinel`] | `None` / empty / `false` / `0` / `Ok(())` |
//! | [`Policy::Refuse`] | `Err(Error::Unsupported(..))` |

use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{trace, warn};

use crate::cookie::Cookie;
use crate::error::Error;
use crate::locale::Locale;
use crate::params::ParamMap;

// ── Capability policy table ───────────────────────────────────────────────────

/// What happens when an unsupported capability is used.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Policy {
    /// Answer with the type's empty value.
    Sentinel,
    /// Fail loudly; the caller would otherwise assume a mutation took effect.
    Refuse,
}

// One list drives the enum, `ALL` and `as_str`, so none of them can drift.
macro_rules! capabilities {
    ($($variant:ident => $name:literal,)+) => {
        /// Every part of the legacy surface the transport cannot provide.
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        pub enum Capability {
            $($variant,)+
        }

        impl Capability {
            /// Every capability, in declaration order.
            pub const ALL: &'static [Capability] = &[$(Self::$variant,)+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }
    };
}

capabilities! {
    // Authentication ───────────────────────────────────────────────────────────
    AuthType             => "auth type",
    RemoteUser           => "remote user",
    UserInRole           => "user role check",
    UserPrincipal        => "user principal",
    Authenticate         => "authenticate",
    Login                => "login",
    Logout               => "logout",
    // Sessions ─────────────────────────────────────────────────────────────────
    RequestedSessionId   => "requested session id",
    Session              => "session",
    ChangeSessionId      => "change session id",
    SessionIdValid       => "session id validity",
    SessionIdFromCookie  => "session id from cookie",
    SessionIdFromUrl     => "session id from url",
    // Body ─────────────────────────────────────────────────────────────────────
    Parts                => "multipart parts",
    Part                 => "multipart part",
    Upgrade              => "protocol upgrade",
    CharacterEncoding    => "character encoding",
    SetCharacterEncoding => "set character encoding",
    InputStream          => "input stream",
    Reader               => "reader",
    // Attributes ───────────────────────────────────────────────────────────────
    Attribute            => "attribute",
    AttributeNames       => "attribute names",
    SetAttribute         => "set attribute",
    RemoveAttribute      => "remove attribute",
    // Container ────────────────────────────────────────────────────────────────
    ContextPath          => "context path",
    ServletPath          => "servlet path",
    PathTranslated       => "path translated",
    RealPath             => "real path",
    RequestDispatcher    => "request dispatcher",
    ServletContext       => "servlet context",
    DispatcherType       => "dispatcher type",
    // Connection ───────────────────────────────────────────────────────────────
    RemotePort           => "remote port",
    LocalName            => "local name",
    LocalAddr            => "local address",
    LocalPort            => "local port",
    // Async ────────────────────────────────────────────────────────────────────
    StartAsync           => "start async",
    AsyncStarted         => "async started",
    AsyncSupported       => "async supported",
    AsyncContext         => "async context",
}

impl Capability {
    /// The policy table.
    pub fn policy(self) -> Policy {
        match self {
            Self::SetAttribute | Self::RemoveAttribute => Policy::Refuse,
            _ => Policy::Sentinel,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stand-in for objects the transport can never produce: sessions,
/// principals, multipart parts, dispatchers, async contexts, body streams.
///
/// Uninhabited, so an `Option<Unavailable>` is always `None`.
#[derive(Debug)]
pub enum Unavailable {}

/// Answer for a query-style capability.
fn sentinel<T: Default>(capability: Capability) -> T {
    debug_assert_eq!(capability.policy(), Policy::Sentinel);
    trace!(%capability, "unsupported capability queried");
    T::default()
}

/// Answer for an action-style capability, per the policy table.
fn settle(capability: Capability) -> Result<(), Error> {
    match capability.policy() {
        Policy::Sentinel => {
            trace!(%capability, "unsupported capability ignored");
            Ok(())
        }
        Policy::Refuse => {
            warn!(%capability, "refusing unsupported mutation");
            Err(Error::Unsupported(capability))
        }
    }
}

// ── LegacyRequest ─────────────────────────────────────────────────────────────

/// The request surface legacy handlers are written against.
pub trait LegacyRequest {
    // Request line ─────────────────────────────────────────────────────────────

    /// Method name, e.g. `"GET"`.
    fn method(&self) -> &str;
    /// Protocol version, e.g. `"HTTP/1.1"`.
    fn protocol(&self) -> &str;
    fn scheme(&self) -> &str;
    fn server_name(&self) -> &str;
    /// Explicit port, else 443 for `https` and 80 otherwise.
    fn server_port(&self) -> u16;
    /// Path of the canonical URI.
    fn request_uri(&self) -> &str;
    /// Canonical `scheme://host[:port]/path`, no query.
    fn request_url(&self) -> String;
    /// Raw path as received.
    fn path_info(&self) -> &str;
    /// Raw query as received.
    fn query_string(&self) -> Option<&str>;

    fn is_secure(&self) -> bool {
        self.scheme().eq_ignore_ascii_case("https")
    }

    // Headers ──────────────────────────────────────────────────────────────────

    /// First value of a header; names are case-insensitive.
    fn header(&self, name: &str) -> Option<&str>;
    fn headers(&self, name: &str) -> Vec<&str>;
    fn header_names(&self) -> Vec<&str>;
    /// `-1` when absent.
    fn int_header(&self, name: &str) -> Result<i32, Error>;
    /// `Ok(None)` when absent.
    fn date_header(&self, name: &str) -> Result<Option<DateTime<Utc>>, Error>;
    /// `-1` when absent.
    fn content_length_long(&self) -> Result<i64, Error>;

    /// `-1` when absent.
    fn content_length(&self) -> Result<i32, Error> {
        self.int_header("content-length")
    }

    fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    fn cookies(&self) -> Vec<Cookie>;
    fn locale(&self) -> Locale;

    fn locales(&self) -> Vec<Locale> {
        vec![self.locale()]
    }

    // Connection ───────────────────────────────────────────────────────────────

    fn remote_addr(&self) -> Option<String>;

    fn remote_host(&self) -> Option<String> {
        self.remote_addr()
    }

    // Parameters ───────────────────────────────────────────────────────────────

    /// First query value, else first form value.
    fn parameter(&self, name: &str) -> Option<&str>;
    /// Query values followed by form values.
    fn parameter_values(&self, name: &str) -> Vec<&str>;
    fn parameter_names(&self) -> BTreeSet<&str>;
    fn parameter_map(&self) -> ParamMap;

    // Unsupported ──────────────────────────────────────────────────────────────

    fn auth_type(&self) -> Option<&str> { sentinel(Capability::AuthType) }
    fn remote_user(&self) -> Option<&str> { sentinel(Capability::RemoteUser) }
    fn is_user_in_role(&self, _role: &str) -> bool { sentinel(Capability::UserInRole) }
    fn user_principal(&self) -> Option<Unavailable> { sentinel(Capability::UserPrincipal) }
    fn authenticate(&self) -> bool { sentinel(Capability::Authenticate) }
    fn login(&self, _username: &str, _password: &str) -> Result<(), Error> { settle(Capability::Login) }
    fn logout(&self) -> Result<(), Error> { settle(Capability::Logout) }

    fn requested_session_id(&self) -> Option<&str> { sentinel(Capability::RequestedSessionId) }
    fn session(&self, _create: bool) -> Option<Unavailable> { sentinel(Capability::Session) }
    fn change_session_id(&self) -> Option<String> { sentinel(Capability::ChangeSessionId) }
    fn is_requested_session_id_valid(&self) -> bool { sentinel(Capability::SessionIdValid) }
    fn is_requested_session_id_from_cookie(&self) -> bool { sentinel(Capability::SessionIdFromCookie) }
    fn is_requested_session_id_from_url(&self) -> bool { sentinel(Capability::SessionIdFromUrl) }

    fn parts(&self) -> Vec<Unavailable> { sentinel(Capability::Parts) }
    fn part(&self, _name: &str) -> Option<Unavailable> { sentinel(Capability::Part) }
    fn upgrade(&self) -> Option<Unavailable> { sentinel(Capability::Upgrade) }
    fn character_encoding(&self) -> Option<&str> { sentinel(Capability::CharacterEncoding) }
    fn set_character_encoding(&self, _encoding: &str) -> Result<(), Error> {
        settle(Capability::SetCharacterEncoding)
    }
    fn input_stream(&self) -> Option<Unavailable> { sentinel(Capability::InputStream) }
    fn reader(&self) -> Option<Unavailable> { sentinel(Capability::Reader) }

    fn attribute(&self, _name: &str) -> Option<&(dyn Any + Send + Sync)> { sentinel(Capability::Attribute) }
    fn attribute_names(&self) -> Vec<&str> { sentinel(Capability::AttributeNames) }
    fn set_attribute(&self, _name: &str, _value: Box<dyn Any + Send + Sync>) -> Result<(), Error> {
        settle(Capability::SetAttribute)
    }
    fn remove_attribute(&self, _name: &str) -> Result<(), Error> {
        settle(Capability::RemoveAttribute)
    }

    fn context_path(&self) -> Option<&str> { sentinel(Capability::ContextPath) }
    fn servlet_path(&self) -> Option<&str> { sentinel(Capability::ServletPath) }
    fn path_translated(&self) -> Option<&str> { sentinel(Capability::PathTranslated) }
    fn real_path(&self, _path: &str) -> Option<String> { sentinel(Capability::RealPath) }
    fn request_dispatcher(&self, _path: &str) -> Option<Unavailable> { sentinel(Capability::RequestDispatcher) }
    fn servlet_context(&self) -> Option<Unavailable> { sentinel(Capability::ServletContext) }
    fn dispatcher_type(&self) -> Option<Unavailable> { sentinel(Capability::DispatcherType) }

    fn remote_port(&self) -> u16 { sentinel(Capability::RemotePort) }
    fn local_name(&self) -> Option<&str> { sentinel(Capability::LocalName) }
    fn local_addr(&self) -> Option<&str> { sentinel(Capability::LocalAddr) }
    fn local_port(&self) -> u16 { sentinel(Capability::LocalPort) }

    fn start_async(&self) -> Option<Unavailable> { sentinel(Capability::StartAsync) }
    fn is_async_started(&self) -> bool { sentinel(Capability::AsyncStarted) }
    fn is_async_supported(&self) -> bool { sentinel(Capability::AsyncSupported) }
    fn async_context(&self) -> Option<Unavailable> { sentinel(Capability::AsyncContext) }
}

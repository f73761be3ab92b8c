//! # reqbridge
//!
//! Run legacy, servlet-style request handlers on a hyper server.
//!
//! hyper knows nothing about the legacy request contract. reqbridge wraps each
//! inbound request in an [`Adapter`] that answers it:
//!
//! - **Request identity**: one canonical URI per request, resolved up front.
//!   When the transport has no absolute URI, it is rebuilt from scheme, host,
//!   path and query, repairing query values that would not parse.
//! - **Parameters**: query and form parameters merged into one namespace.
//!   Query values come first.
//! - **Projection**: method, headers, cookies, locale, content metadata.
//!
//! Sessions, authentication, multipart, async dispatch and attributes have no
//! backing in the transport. They answer with fixed empty values, and attribute
//! mutations fail with [`Error::Unsupported`]. See [`Capability`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use reqbridge::{LegacyRequest, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new().route("/hello", hello);
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! fn hello(req: &dyn LegacyRequest) -> Response {
//!     let name = req.parameter("name").unwrap_or("world");
//!     Response::text(format!("hello, {name} ({})", req.locale()))
//! }
//! ```

mod adapter;
mod error;
mod exchange;
mod handler;
mod legacy;
mod response;
mod router;
mod server;

pub mod cookie;
pub mod form;
pub mod headers;
pub mod locale;
pub mod params;
pub mod uri;

pub use adapter::{Adapter, AdapterBuilder};
pub use cookie::Cookie;
pub use error::Error;
pub use exchange::{Exchange, HttpExchange};
pub use handler::Handler;
pub use legacy::{Capability, LegacyRequest, Policy, Unavailable};
pub use locale::Locale;
pub use params::{ParamMap, ParamView};
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use uri::{CanonicalUri, RawRequestFields};

//! Handler trait and type erasure.
//!
//! Legacy handlers are synchronous: they receive the request surface, do their
//! work, and hand back a response. The router stores handlers of *different*
//! concrete types in one tree, so each is erased behind `dyn ErasedHandler`:
//!
//! ```text
//! fn hello(req: &dyn LegacyRequest) -> Response { … }   ← user writes this
//!        ↓ router.route("/", hello)
//! hello.into_boxed_handler()                           ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(hello))                           ← stored as BoxedHandler
//!        ↓
//! handler.call(&adapter)  at request time              ← one vtable dispatch
//! ```

use std::sync::Arc;

use crate::legacy::LegacyRequest;
use crate::response::{IntoResponse, Response};

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: &dyn LegacyRequest) -> Response;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid legacy handler.
///
/// Automatically satisfied by any function or closure of the shape
///
/// ```text
/// fn name(req: &dyn LegacyRequest) -> impl IntoResponse
/// ```
///
/// Sealed: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, R> private::Sealed for F
where
    F: Fn(&dyn LegacyRequest) -> R + Send + Sync + 'static,
    R: IntoResponse,
{
}

impl<F, R> Handler for F
where
    F: Fn(&dyn LegacyRequest) -> R + Send + Sync + 'static,
    R: IntoResponse,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Bridges a concrete handler `F` into the trait-object world.
struct FnHandler<F>(F);

impl<F, R> ErasedHandler for FnHandler<F>
where
    F: Fn(&dyn LegacyRequest) -> R,
    R: IntoResponse,
{
    fn call(&self, req: &dyn LegacyRequest) -> Response {
        (self.0)(req).into_response()
    }
}

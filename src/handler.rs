//! Handler trait and type erasure for the host layer.
//!
//! The router is generic over what it hands back. The server stores
//! `Router<BoxedHandler>`: every `async fn(Request) -> impl IntoResponse` is
//! wrapped once at registration and called through one vtable dispatch per
//! request.
//!
//! ```text
//! async fn get_user(req: Request) -> Response { … }
//!        ↓ router.get("/users/{id:int}", get_user)
//! Arc::new(FnHandler(get_user))          ← BoxedHandler, the router's H
//!        ↓ router.resolve(..) → Matched { handler, params }
//! handler.call(req)                      ← BoxFuture<Response>
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::method::{Method, MethodFilter};
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::router::Router;

pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface. Public only because [`BoxedHandler`] names it.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every `async fn(Request) -> impl IntoResponse`.
///
/// Sealed: only the blanket impl below satisfies it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

// ── Handler registration shortcuts ────────────────────────────────────────────

/// Per-method shortcuts for async handlers. Each panics on an invalid
/// template, like [`Router::on`].
impl Router<BoxedHandler> {
    pub fn route(self, method: impl Into<MethodFilter>, pattern: &str, handler: impl Handler) -> Self {
        self.on(method, pattern, handler.into_boxed_handler())
    }

    pub fn get(self, pattern: &str, handler: impl Handler) -> Self {
        self.route(Method::Get, pattern, handler)
    }

    pub fn post(self, pattern: &str, handler: impl Handler) -> Self {
        self.route(Method::Post, pattern, handler)
    }

    pub fn put(self, pattern: &str, handler: impl Handler) -> Self {
        self.route(Method::Put, pattern, handler)
    }

    pub fn patch(self, pattern: &str, handler: impl Handler) -> Self {
        self.route(Method::Patch, pattern, handler)
    }

    pub fn delete(self, pattern: &str, handler: impl Handler) -> Self {
        self.route(Method::Delete, pattern, handler)
    }

    pub fn head(self, pattern: &str, handler: impl Handler) -> Self {
        self.route(Method::Head, pattern, handler)
    }

    pub fn options(self, pattern: &str, handler: impl Handler) -> Self {
        self.route(Method::Options, pattern, handler)
    }

    /// Every method, including ones without a [`Method`] variant.
    pub fn any(self, pattern: &str, handler: impl Handler) -> Self {
        self.route(MethodFilter::Any, pattern, handler)
    }
}

//! # tsuji
//!
//! HTTP route resolution with typed constraints and a deterministic
//! precedence order.
//!
//! Register route templates once at startup, then resolve `(method, path)`
//! pairs from as many threads as you like. Each resolution returns exactly
//! one handler reference plus the values its template bound, or
//! [`MatchResult::NoMatch`].
//!
//! - Template syntax: literals, `{name}`, `{name?}`, `{name:int}`,
//!   `{name:length(3,20)}`, `{name=default}`, `{*rest}`. See [`template`].
//! - Constraints: `int`, `long`, `bool`, `double`, `guid`, `alpha`,
//!   `datetime`, `range`, `min`, `max`, `length`, `minlength`, `maxlength`,
//!   `regex`. See [`constraint`].
//! - Precedence: literals, then constraints, then registration order. See
//!   [`Router`].
//!
//! The router performs no I/O and never calls back into your code. The
//! optional `server` feature (on by default) adds a small hyper host that
//! consumes it.
//!
//! ## Quick start
//!
//! ```rust
//! use tsuji::{MatchResult, Method, Router};
//!
//! let router = Router::new()
//!     .on(Method::Get, "/api/users/{id:int}", "by_id")
//!     .on(Method::Get, "/api/users/{id}",     "by_name")
//!     .on(Method::Get, "/files/{*path}",      "files");
//!
//! let MatchResult::Matched { handler, params } = router.resolve("GET", "/api/users/123") else {
//!     unreachable!()
//! };
//! assert_eq!(*handler, "by_id");
//! assert_eq!(params.get("id"), Some("123"));
//!
//! assert_eq!(router.resolve("GET", "/api/users/abc").handler(), Some(&"by_name"));
//! assert_eq!(router.resolve("POST", "/api/users/123"), MatchResult::NoMatch);
//! ```
//!
//! ## Serving
//!
//! ```rust,no_run
//! # #[cfg(feature = "server")]
//! # async fn run() -> Result<(), tsuji::Error> {
//! use tsuji::{Request, Response, Router, Server};
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":{id}}}"#))
//! }
//!
//! let app = Router::new().get("/users/{id:int}", get_user);
//! Server::bind(([0, 0, 0, 0], 3000)).serve(app).await
//! # }
//! ```

pub mod constraint;
mod error;
pub mod manifest;
mod method;
mod params;
mod router;
mod shared;
pub mod template;

#[cfg(feature = "server")]
mod handler;
#[cfg(feature = "server")]
mod request;
#[cfg(feature = "server")]
mod response;
#[cfg(feature = "server")]
mod server;

pub use constraint::Constraint;
pub use error::{Error, TemplateError};
pub use manifest::{RouteEntry, RouteManifest};
pub use method::{Method, MethodFilter};
pub use params::Params;
pub use router::{MatchResult, Router};
pub use shared::SharedRouter;
pub use template::{RouteTemplate, SegmentSpec};

#[cfg(feature = "server")]
pub use handler::{BoxedHandler, Handler};
#[cfg(feature = "server")]
pub use request::Request;
#[cfg(feature = "server")]
pub use response::{IntoResponse, Response, ResponseBuilder};
#[cfg(feature = "server")]
pub use server::Server;

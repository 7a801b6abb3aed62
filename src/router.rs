//! Request router.
//!
//! Templates live in one flat table in registration order. Resolution walks
//! every template whose method filter admits the request, matches it segment
//! by segment, and keeps the most specific survivor. Build it once at startup;
//! after that it is read-only and can be shared across any number of threads.
//!
//! # Precedence
//!
//! When several templates match, the winner is decided by, in order:
//!
//! 1. **More literals.** The template with more literal segments wins;
//!    with equal counts, the first path position where one has a literal and
//!    the other does not decides it. `/users/admin` beats `/users/{id}`
//!    whatever the registration order.
//! 2. **Constraints.** At the first path position where one template has a
//!    constrained parameter and the other an unconstrained one (or a
//!    catch-all), the constrained one wins. `/users/{id:int}` beats
//!    `/users/{id}` for `/users/42`.
//! 3. **Registration order.** Everything else, optional against required
//!    or parameter against catch-all included, goes to the earlier
//!    registration.
//!
//! Positions are path positions: a catch-all counts once for every segment
//! it swallows.

use std::cmp::Ordering;

use tracing::debug;

use crate::error::Error;
use crate::method::{Method, MethodFilter};
use crate::params::Params;
use crate::template::{RouteTemplate, SegmentSpec};

/// Outcome of [`Router::resolve`].
#[derive(Debug, PartialEq)]
pub enum MatchResult<'r, H> {
    /// One template won; `params` holds every value it bound.
    Matched { handler: &'r H, params: Params },
    /// No template matched. Not an error: the host answers "not found".
    NoMatch,
}

impl<'r, H> MatchResult<'r, H> {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    pub fn handler(&self) -> Option<&'r H> {
        match self {
            Self::Matched { handler, .. } => Some(*handler),
            Self::NoMatch => None,
        }
    }

    pub fn params(&self) -> Option<&Params> {
        match self {
            Self::Matched { params, .. } => Some(params),
            Self::NoMatch => None,
        }
    }

    pub fn into_parts(self) -> Option<(&'r H, Params)> {
        match self {
            Self::Matched { handler, params } => Some((handler, params)),
            Self::NoMatch => None,
        }
    }
}

/// The route table.
///
/// `H` is whatever the host wants back from a match: a boxed handler, an
/// enum, a handler name. The router never looks inside it.
#[derive(Clone, Debug)]
pub struct Router<H> {
    routes: Vec<RouteTemplate<H>>,
}

impl<H> Router<H> {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Register `handler` for a method + pattern pair.
    ///
    /// Fails with [`Error::InvalidTemplate`] when the pattern is structurally
    /// invalid. Overlapping templates are accepted; precedence sorts them out
    /// at match time.
    pub fn register(
        &mut self,
        method: impl Into<MethodFilter>,
        pattern: &str,
        handler: H,
    ) -> Result<&RouteTemplate<H>, Error> {
        let method = method.into();
        let order = self.routes.len() as u64;
        let route = RouteTemplate::new(method, pattern, handler, order)?;

        debug!(%method, pattern, order, "route registered");
        self.routes.push(route);
        Ok(&self.routes[self.routes.len() - 1])
    }

    /// Register a route and return `self` for chaining.
    ///
    /// ```rust
    /// use tsuji::{Method, MethodFilter, Router};
    ///
    /// let router = Router::new()
    ///     .on(Method::Get,       "/users/{id:int}", "get_user")
    ///     .on(Method::Post,      "/users",          "create_user")
    ///     .on(MethodFilter::Any, "/static/{*path}", "assets");
    /// # assert_eq!(router.len(), 3);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the pattern is invalid. Templates are fixed at startup, so a
    /// bad one is a programming error; use [`register`](Router::register) to
    /// handle it instead.
    pub fn on(mut self, method: impl Into<MethodFilter>, pattern: &str, handler: H) -> Self {
        if let Err(e) = self.register(method, pattern, handler) {
            panic!("{e}");
        }
        self
    }

    /// Resolve a request to exactly one handler, or [`MatchResult::NoMatch`].
    ///
    /// `method` is the raw request method; it is compared case-sensitively.
    /// Empty path segments are ignored, so `/a//b/` resolves like `/a/b`.
    pub fn resolve<'r>(&'r self, method: &str, path: &str) -> MatchResult<'r, H> {
        let segments: Vec<&str> = split_path(path).collect();

        let mut best: Option<(&RouteTemplate<H>, Params)> = None;
        for route in self.routes.iter().filter(|r| r.method().accepts(method)) {
            let Some(params) = route.match_segments(&segments) else {
                continue;
            };
            let wins = best
                .as_ref()
                .is_none_or(|(current, _)| precedence(route, current, segments.len()).is_lt());
            if wins {
                best = Some((route, params));
            }
        }

        match best {
            Some((route, params)) => MatchResult::Matched { handler: route.handler(), params },
            None => MatchResult::NoMatch,
        }
    }

    /// Methods for which some template matches `path`, in `Method::ALL` order.
    ///
    /// A matching [`MethodFilter::Any`] template allows every method.
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let segments: Vec<&str> = split_path(path).collect();

        let mut allowed = Vec::new();
        for route in &self.routes {
            if route.match_segments(&segments).is_none() {
                continue;
            }
            match route.method() {
                MethodFilter::Any => return Method::ALL.to_vec(),
                MethodFilter::Only(m) if !allowed.contains(&m) => allowed.push(m),
                MethodFilter::Only(_) => {}
            }
        }
        allowed.sort();
        allowed
    }

    /// Registered templates in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteTemplate<H>> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize { self.routes.len() }
    pub fn is_empty(&self) -> bool { self.routes.is_empty() }
}

impl<H> Default for Router<H> {
    fn default() -> Self { Self::new() }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// `Less` when `a` should win over `b` for a path of `len` segments.
///
/// Both templates matched the same path, so positions are compared over the
/// path; a catch-all occupies every position from its own onwards.
fn precedence<H>(a: &RouteTemplate<H>, b: &RouteTemplate<H>, len: usize) -> Ordering {
    let literals = |t: &RouteTemplate<H>| t.segments().iter().filter(|s| s.is_literal()).count();
    // `false` sorts first.
    let generic = |s: &SegmentSpec| !s.is_literal();
    let unconstrained = |s: &SegmentSpec| !s.is_literal() && !s.is_constrained();

    literals(b)
        .cmp(&literals(a))
        .then_with(|| positions(a, len).map(generic).cmp(positions(b, len).map(generic)))
        .then_with(|| {
            positions(a, len)
                .map(unconstrained)
                .cmp(positions(b, len).map(unconstrained))
        })
        .then(a.order().cmp(&b.order()))
}

/// The segment spec that consumed each path position.
fn positions<H>(t: &RouteTemplate<H>, len: usize) -> impl Iterator<Item = &SegmentSpec> {
    let segments = t.segments();
    (0..len).map(move |p| &segments[p.min(segments.len() - 1)])
}

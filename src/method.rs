//! HTTP method as a typed enum, plus the per-route method filter.
//!
//! Routes register against one of the seven methods an API router actually
//! dispatches on, or against [`MethodFilter::Any`]. Requests carrying any
//! other method string only ever reach `Any` routes.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A routable HTTP method.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Method {
    /// Every routable method, in the order `Allow` headers list them.
    pub const ALL: [Method; 7] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Patch,
        Self::Delete,
        Self::Head,
        Self::Options,
    ];

    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delete  => "DELETE",
            Self::Get     => "GET",
            Self::Head    => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch   => "PATCH",
            Self::Post    => "POST",
            Self::Put     => "PUT",
        }
    }
}

/// Parses an uppercase method string (e.g. `"GET"`). Case-sensitive per RFC 9110 §9.1.
impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DELETE"  => Ok(Self::Delete),
            "GET"     => Ok(Self::Get),
            "HEAD"    => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            "PATCH"   => Ok(Self::Patch),
            "POST"    => Ok(Self::Post),
            "PUT"     => Ok(Self::Put),
            _         => Err(Error::UnknownMethod(s.to_owned())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which request methods a route answers.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MethodFilter {
    /// Every method, including ones tsuji has no variant for.
    Any,
    Only(Method),
}

impl MethodFilter {
    /// Whether a request carrying the raw method string `method` passes.
    pub fn accepts(self, method: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Only(m) => m.as_str() == method,
        }
    }
}

impl From<Method> for MethodFilter {
    fn from(m: Method) -> Self {
        Self::Only(m)
    }
}

/// Parses `"*"` or `"ANY"` as [`MethodFilter::Any`], anything else as a [`Method`].
impl FromStr for MethodFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "*" | "ANY" => Ok(Self::Any),
            other => other.parse().map(Self::Only),
        }
    }
}

impl fmt::Display for MethodFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Only(m) => m.fmt(f),
        }
    }
}

//! Unified error type.

use thiserror::Error as ThisError;

/// The error type returned by tsuji's fallible operations.
///
/// A request that matches no route is *not* an error: [`resolve`] returns
/// [`MatchResult::NoMatch`] and the host decides what "not found" looks like.
/// This type surfaces configuration mistakes (bad templates, bad manifests)
/// and the host layer's infrastructure failures.
///
/// [`resolve`]: crate::Router::resolve
/// [`MatchResult::NoMatch`]: crate::MatchResult::NoMatch
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("invalid route template `{pattern}`: {reason}")]
    InvalidTemplate {
        pattern: String,
        reason: TemplateError,
    },

    #[error("unknown HTTP method `{0}`")]
    UnknownMethod(String),

    #[error("route manifest references unknown handler `{0}`")]
    UnknownHandler(String),

    #[error("route manifest: {0}")]
    Manifest(#[from] toml::de::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn template(pattern: &str, reason: TemplateError) -> Self {
        Self::InvalidTemplate { pattern: pattern.to_owned(), reason }
    }
}

/// Why a route template was rejected at registration time.
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum TemplateError {
    #[error("catch-all `{0}` must be the last segment")]
    CatchallNotLast(String),

    #[error("optional parameter `{0}` may only be followed by optional segments")]
    OptionalNotLast(String),

    #[error("parameter `{0}` cannot be both optional and defaulted")]
    OptionalWithDefault(String),

    #[error("parameter `{0}` has an empty default value")]
    EmptyDefault(String),

    #[error("default `{default}` of parameter `{name}` fails its own constraints")]
    InvalidDefault { name: String, default: String },

    #[error("catch-all `{0}` cannot carry constraints or defaults")]
    CatchallModifiers(String),

    #[error("parameter `{0}` appears more than once")]
    DuplicateParameter(String),

    #[error("invalid parameter name `{0}`")]
    InvalidParameterName(String),

    #[error("unknown constraint `{0}`")]
    UnknownConstraint(String),

    #[error("malformed constraint `{0}`")]
    MalformedConstraint(String),

    #[error("invalid regex `{pattern}`: {message}")]
    InvalidRegex { pattern: String, message: String },

    #[error("unbalanced braces in `{0}`")]
    UnbalancedBraces(String),

    #[error("segment `{0}` mixes literal text with a parameter")]
    ComplexSegment(String),
}

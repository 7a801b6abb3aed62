//! Typed route-parameter constraints.
//!
//! A constraint is a predicate over the raw text of one path segment. It runs
//! at match time and only ever decides whether *its* template matches; a
//! failing constraint is never an error.
//!
//! | Spec            | Accepts                                             |
//! |-----------------|-----------------------------------------------------|
//! | `int`           | a 32-bit signed integer                             |
//! | `long`          | a 64-bit signed integer                             |
//! | `bool`          | `true` / `false`, any case                          |
//! | `double`        | a finite float (`float` and `decimal` are aliases)  |
//! | `guid`          | a UUID, hyphenated, simple, braced or URN form      |
//! | `alpha`         | one or more ASCII letters                           |
//! | `datetime`      | RFC 3339, `YYYY-MM-DD[ T]HH:MM:SS[.f]`, `YYYY-MM-DD` |
//! | `range(a,b)`    | an integer in `a..=b`                               |
//! | `min(a)`        | an integer `>= a`                                   |
//! | `max(b)`        | an integer `<= b`                                   |
//! | `length(n)`     | exactly `n` characters                              |
//! | `length(a,b)`   | `a..=b` characters                                  |
//! | `minlength(a)`  | at least `a` characters                             |
//! | `maxlength(b)`  | at most `b` characters                              |
//! | `regex(expr)`   | text `expr` finds a match in, ignoring case         |
//!
//! Constraint names are case-insensitive. `regex` is not anchored for you:
//! write `regex(^\d{3}$)` when the whole segment must match.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::{Regex, RegexBuilder};

use crate::error::TemplateError;

/// A predicate restricting which raw values a parameter segment may bind.
#[derive(Clone, Debug, PartialEq)]
pub enum Constraint {
    Int,
    Long,
    Bool,
    Double,
    Guid,
    Alpha,
    DateTime,
    Regex(SegmentRegex),
    Range(i64, i64),
    Min(i64),
    Max(i64),
    Length(usize, usize),
    MinLength(usize),
    MaxLength(usize),
}

impl Constraint {
    /// Whether `raw` satisfies the constraint.
    pub fn matches(&self, raw: &str) -> bool {
        match self {
            Self::Int          => raw.parse::<i32>().is_ok(),
            Self::Long         => raw.parse::<i64>().is_ok(),
            Self::Bool         => raw.eq_ignore_ascii_case("true") || raw.eq_ignore_ascii_case("false"),
            Self::Double       => raw.parse::<f64>().is_ok_and(f64::is_finite),
            Self::Guid         => uuid::Uuid::parse_str(raw).is_ok(),
            Self::Alpha        => !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_alphabetic()),
            Self::DateTime     => parses_as_datetime(raw),
            Self::Regex(re)    => re.0.is_match(raw),
            Self::Range(lo, hi) => raw.parse::<i64>().is_ok_and(|n| (*lo..=*hi).contains(&n)),
            Self::Min(lo)      => raw.parse::<i64>().is_ok_and(|n| n >= *lo),
            Self::Max(hi)      => raw.parse::<i64>().is_ok_and(|n| n <= *hi),
            Self::Length(lo, hi) => (*lo..=*hi).contains(&raw.chars().count()),
            Self::MinLength(lo) => raw.chars().count() >= *lo,
            Self::MaxLength(hi) => raw.chars().count() <= *hi,
        }
    }

    /// Parses one constraint spec such as `int`, `length(3,20)` or `regex(^a+$)`.
    pub fn parse(spec: &str) -> Result<Self, TemplateError> {
        let malformed = || TemplateError::MalformedConstraint(spec.to_owned());

        let (name, args) = match spec.find('(') {
            Some(open) => {
                let inner = spec[open + 1..].strip_suffix(')').ok_or_else(malformed)?;
                (&spec[..open], Some(inner))
            }
            None => (spec, None),
        };

        let name = name.to_ascii_lowercase();
        let constraint = match (name.as_str(), args) {
            ("int", None)      => Self::Int,
            ("long", None)     => Self::Long,
            ("bool", None)     => Self::Bool,
            ("double" | "float" | "decimal", None) => Self::Double,
            ("guid", None)     => Self::Guid,
            ("alpha", None)    => Self::Alpha,
            ("datetime", None) => Self::DateTime,

            ("regex", Some(expr)) => Self::Regex(SegmentRegex::new(expr)?),

            ("range", Some(args)) => {
                let [lo, hi] = int_args::<i64, 2>(args).ok_or_else(malformed)?;
                if lo > hi {
                    return Err(malformed());
                }
                Self::Range(lo, hi)
            }
            ("min", Some(args)) => {
                let [lo] = int_args::<i64, 1>(args).ok_or_else(malformed)?;
                Self::Min(lo)
            }
            ("max", Some(args)) => {
                let [hi] = int_args::<i64, 1>(args).ok_or_else(malformed)?;
                Self::Max(hi)
            }
            ("length", Some(args)) => {
                if let Some([n]) = int_args::<usize, 1>(args) {
                    Self::Length(n, n)
                } else {
                    let [lo, hi] = int_args::<usize, 2>(args).ok_or_else(malformed)?;
                    if lo > hi {
                        return Err(malformed());
                    }
                    Self::Length(lo, hi)
                }
            }
            ("minlength", Some(args)) => {
                let [lo] = int_args::<usize, 1>(args).ok_or_else(malformed)?;
                Self::MinLength(lo)
            }
            ("maxlength", Some(args)) => {
                let [hi] = int_args::<usize, 1>(args).ok_or_else(malformed)?;
                Self::MaxLength(hi)
            }

            (
                "int" | "long" | "bool" | "double" | "float" | "decimal" | "guid" | "alpha"
                | "datetime" | "regex" | "range" | "min" | "max" | "length" | "minlength"
                | "maxlength",
                _,
            ) => return Err(malformed()),

            _ => return Err(TemplateError::UnknownConstraint(spec.to_owned())),
        };

        Ok(constraint)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int             => f.write_str("int"),
            Self::Long            => f.write_str("long"),
            Self::Bool            => f.write_str("bool"),
            Self::Double          => f.write_str("double"),
            Self::Guid            => f.write_str("guid"),
            Self::Alpha           => f.write_str("alpha"),
            Self::DateTime        => f.write_str("datetime"),
            Self::Regex(re)       => write!(f, "regex({})", re.as_str()),
            Self::Range(lo, hi)   => write!(f, "range({lo},{hi})"),
            Self::Min(lo)         => write!(f, "min({lo})"),
            Self::Max(hi)         => write!(f, "max({hi})"),
            Self::Length(lo, hi) if lo == hi => write!(f, "length({lo})"),
            Self::Length(lo, hi)  => write!(f, "length({lo},{hi})"),
            Self::MinLength(lo)   => write!(f, "minlength({lo})"),
            Self::MaxLength(hi)   => write!(f, "maxlength({hi})"),
        }
    }
}

/// A compiled, case-insensitive `regex(...)` constraint.
///
/// Compares by source text so templates stay comparable.
#[derive(Clone, Debug)]
pub struct SegmentRegex(Regex);

impl SegmentRegex {
    fn new(expr: &str) -> Result<Self, TemplateError> {
        if expr.is_empty() {
            return Err(TemplateError::MalformedConstraint("regex()".to_owned()));
        }
        RegexBuilder::new(expr)
            .case_insensitive(true)
            .build()
            .map(Self)
            .map_err(|e| TemplateError::InvalidRegex {
                pattern: expr.to_owned(),
                message: e.to_string(),
            })
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for SegmentRegex {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// Splits `a,b,...` into exactly `N` integers.
fn int_args<T: std::str::FromStr, const N: usize>(args: &str) -> Option<[T; N]> {
    let parsed = args
        .split(',')
        .map(|a| a.trim().parse::<T>().ok())
        .collect::<Option<Vec<T>>>()?;
    parsed.try_into().ok()
}

fn parses_as_datetime(raw: &str) -> bool {
    const NAIVE: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    DateTime::parse_from_rfc3339(raw).is_ok()
        || NAIVE.iter().any(|fmt| NaiveDateTime::parse_from_str(raw, fmt).is_ok())
        || NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok()
}

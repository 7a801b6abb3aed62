//! Route templates: pattern parsing and per-template matching.
//!
//! A pattern is split on `/` into components. Each non-empty component is
//! one of:
//!
//! ```text
//! users            literal, compared case-insensitively
//! {id}             required parameter
//! {id?}            optional parameter (last segment only)
//! {id:int}         constrained parameter; chain with `{id:int:min(1)}`
//! {id:int?}        constrained optional parameter
//! {page=1}         parameter with a default, bound when the segment is absent
//! {*path}          catch-all, binds the remaining segments joined by `/`
//! {**path}         same as `{*path}`
//! ```
//!
//! Braces nest, so `{code:regex(^\d{3}$)}` needs no escaping. Parentheses
//! inside a constraint argument must balance unless escaped with `\`.

use std::fmt;

use crate::constraint::Constraint;
use crate::error::{Error, TemplateError};
use crate::method::MethodFilter;
use crate::params::Params;

/// One path segment's matching rule.
#[derive(Clone, Debug, PartialEq)]
pub enum SegmentSpec {
    Literal(String),
    Parameter {
        name: String,
        /// Empty means unconstrained. Every entry must hold.
        constraints: Vec<Constraint>,
        optional: bool,
        default: Option<String>,
    },
    Catchall(String),
}

impl SegmentSpec {
    /// The bound name, if this segment binds one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Literal(_) => None,
            Self::Parameter { name, .. } | Self::Catchall(name) => Some(name.as_str()),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// Whether the template still matches when the path ends before this segment.
    fn may_be_absent(&self) -> bool {
        match self {
            Self::Literal(_) => false,
            Self::Parameter { optional, default, .. } => *optional || default.is_some(),
            Self::Catchall(_) => true,
        }
    }

    /// A parameter carrying at least one constraint.
    pub fn is_constrained(&self) -> bool {
        matches!(self, Self::Parameter { constraints, .. } if !constraints.is_empty())
    }
}

impl fmt::Display for SegmentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => f.write_str(text),
            Self::Parameter { name, constraints, optional, default } => {
                write!(f, "{{{name}")?;
                for c in constraints {
                    write!(f, ":{c}")?;
                }
                if let Some(d) = default {
                    write!(f, "={d}")?;
                }
                if *optional {
                    f.write_str("?")?;
                }
                f.write_str("}")
            }
            Self::Catchall(name) => write!(f, "{{*{name}}}"),
        }
    }
}

/// A registered route: method filter, compiled segments and the caller's handler.
#[derive(Clone, Debug)]
pub struct RouteTemplate<H> {
    method: MethodFilter,
    pattern: String,
    segments: Vec<SegmentSpec>,
    handler: H,
    order: u64,
}

impl<H> RouteTemplate<H> {
    pub(crate) fn new(
        method: MethodFilter,
        pattern: &str,
        handler: H,
        order: u64,
    ) -> Result<Self, Error> {
        let segments = parse(pattern).map_err(|reason| Error::template(pattern, reason))?;
        Ok(Self { method, pattern: pattern.to_owned(), segments, handler, order })
    }

    pub fn method(&self) -> MethodFilter { self.method }
    pub fn pattern(&self) -> &str { &self.pattern }
    pub fn segments(&self) -> &[SegmentSpec] { &self.segments }
    pub fn handler(&self) -> &H { &self.handler }

    /// Position in registration order, starting at 0.
    pub fn order(&self) -> u64 { self.order }

    /// Matches already-split path segments, returning the bound values.
    pub(crate) fn match_segments(&self, path: &[&str]) -> Option<Params> {
        let mut params = Params::with_capacity(self.segments.len());

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                SegmentSpec::Literal(text) => {
                    if !eq_ignore_case(path.get(i)?, text) {
                        return None;
                    }
                }
                SegmentSpec::Parameter { name, constraints, default, .. } => match path.get(i) {
                    Some(raw) => {
                        if !constraints.iter().all(|c| c.matches(raw)) {
                            return None;
                        }
                        params.push(name, *raw);
                    }
                    None if segment.may_be_absent() => {
                        if let Some(value) = default {
                            params.push(name, value.as_str());
                        }
                    }
                    None => return None,
                },
                SegmentSpec::Catchall(name) => {
                    let rest = path.get(i..).map(|rest| rest.join("/")).unwrap_or_default();
                    params.push(name, rest);
                    return Some(params);
                }
            }
        }

        (path.len() <= self.segments.len()).then_some(params)
    }
}

impl<H> fmt::Display for RouteTemplate<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.pattern)
    }
}

/// Literal and parameter-name comparison: ASCII fast path, full Unicode
/// lowercase otherwise.
pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    a.chars().flat_map(char::to_lowercase).eq(b.chars().flat_map(char::to_lowercase))
}

// ── Parsing ───────────────────────────────────────────────────────────────────

pub(crate) fn parse(pattern: &str) -> Result<Vec<SegmentSpec>, TemplateError> {
    let segments = split_components(pattern)?
        .into_iter()
        .filter(|c| !c.is_empty())
        .map(parse_component)
        .collect::<Result<Vec<_>, _>>()?;

    validate(&segments)?;
    Ok(segments)
}

/// Splits on `/` outside braces.
fn split_components(pattern: &str) -> Result<Vec<&str>, TemplateError> {
    let unbalanced = || TemplateError::UnbalancedBraces(pattern.to_owned());

    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, b) in pattern.bytes().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => depth = depth.checked_sub(1).ok_or_else(unbalanced)?,
            b'/' if depth == 0 => {
                out.push(&pattern[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(unbalanced());
    }
    out.push(&pattern[start..]);
    Ok(out)
}

fn parse_component(component: &str) -> Result<SegmentSpec, TemplateError> {
    let complex = || TemplateError::ComplexSegment(component.to_owned());

    if !component.starts_with('{') {
        if component.contains(['{', '}']) {
            return Err(complex());
        }
        return Ok(SegmentSpec::Literal(component.to_owned()));
    }

    // The brace opened at 0 must close on the final byte.
    let mut depth = 0usize;
    let mut close = None;
    for (i, b) in component.bytes().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }
    if close != Some(component.len() - 1) {
        return Err(complex());
    }

    parse_token(&component[1..component.len() - 1])
}

fn parse_token(token: &str) -> Result<SegmentSpec, TemplateError> {
    if let Some(rest) = token.strip_prefix('*') {
        let name = rest.strip_prefix('*').unwrap_or(rest);
        if let Some(at) = name.find([':', '=', '?']) {
            return Err(TemplateError::CatchallModifiers(name[..at].to_owned()));
        }
        validate_name(name)?;
        return Ok(SegmentSpec::Catchall(name.to_owned()));
    }

    let (body, optional) = match token.strip_suffix('?') {
        Some(body) => (body, true),
        None => (token, false),
    };

    let name_end = body.find([':', '=']).unwrap_or(body.len());
    let name = &body[..name_end];
    validate_name(name)?;

    let mut rest = &body[name_end..];
    let mut constraints = Vec::new();
    if let Some(specs) = rest.strip_prefix(':') {
        let (specs, tail) = split_default(specs);
        for spec in split_top_level(specs, b':') {
            constraints.push(Constraint::parse(spec)?);
        }
        rest = tail;
    }

    let default = match rest.strip_prefix('=') {
        Some("") => return Err(TemplateError::EmptyDefault(name.to_owned())),
        Some(_) if optional => return Err(TemplateError::OptionalWithDefault(name.to_owned())),
        Some(value) if !constraints.iter().all(|c| c.matches(value)) => {
            return Err(TemplateError::InvalidDefault {
                name: name.to_owned(),
                default: value.to_owned(),
            });
        }
        Some(value) => Some(value.to_owned()),
        None => None,
    };

    Ok(SegmentSpec::Parameter { name: name.to_owned(), constraints, optional, default })
}

/// Splits `int:min(1)=5` into `("int:min(1)", "=5")`, ignoring `=` inside parentheses.
fn split_default(specs: &str) -> (&str, &str) {
    match top_level(specs, b'=').next() {
        Some(i) => specs.split_at(i),
        None => (specs, ""),
    }
}

fn split_top_level(s: &str, sep: u8) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for i in top_level(s, sep) {
        out.push(&s[start..i]);
        start = i + 1;
    }
    out.push(&s[start..]);
    out
}

/// Offsets of `sep` outside parentheses.
///
/// A backslash escapes the byte after it, so `regex(\()` stays one piece.
/// Unescaped parentheses inside a regex, `[(]` included, must balance.
fn top_level(s: &str, sep: u8) -> impl Iterator<Item = usize> + '_ {
    let mut depth = 0usize;
    let mut escaped = false;
    s.bytes().enumerate().filter_map(move |(i, b)| {
        let hit = !escaped && depth == 0 && b == sep;
        match b {
            _ if escaped => escaped = false,
            b'\\' => escaped = true,
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        hit.then_some(i)
    })
}

fn validate_name(name: &str) -> Result<(), TemplateError> {
    const RESERVED: [char; 8] = ['{', '}', '/', '?', '*', '=', ':', '('];

    if name.trim().is_empty() || name.contains(RESERVED) {
        return Err(TemplateError::InvalidParameterName(name.to_owned()));
    }
    Ok(())
}

fn validate(segments: &[SegmentSpec]) -> Result<(), TemplateError> {
    let mut seen: Vec<&str> = Vec::new();

    for (i, segment) in segments.iter().enumerate() {
        let is_last = i + 1 == segments.len();

        if let Some(name) = segment.name() {
            if seen.iter().any(|s| eq_ignore_case(s, name)) {
                return Err(TemplateError::DuplicateParameter(name.to_owned()));
            }
            seen.push(name);
        }

        match segment {
            SegmentSpec::Catchall(name) if !is_last => {
                return Err(TemplateError::CatchallNotLast(name.clone()));
            }
            SegmentSpec::Parameter { name, optional: true, .. } if !is_last => {
                return Err(TemplateError::OptionalNotLast(name.clone()));
            }
            SegmentSpec::Parameter { name, default: Some(_), .. }
                if !segments[i + 1..].iter().all(SegmentSpec::may_be_absent) =>
            {
                return Err(TemplateError::OptionalNotLast(name.clone()));
            }
            _ => {}
        }
    }

    Ok(())
}

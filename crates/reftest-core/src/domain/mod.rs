pub mod errors;

pub use errors::{CheckError, CheckResult, ErrorKind};

use regex::Regex;
use std::fmt::{Display, Formatter};

/// Reference magnitudes below this bound are never checked unless the filter
/// overrides `skip_below`.
pub const SKIP_BELOW_DEFAULT: f64 = f64::MIN_POSITIVE;

/// Reference magnitudes above this bound are never checked unless the filter
/// overrides `skip_above`.
pub const SKIP_ABOVE_DEFAULT: f64 = f64::MAX;

/// A number extracted from program output, typed the way it was printed.
///
/// A token is integer-typed only when every numeric substring in its word is
/// a plain integer; everything else is carried as a float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Real(f64),
}

impl Number {
    pub const fn is_real(self) -> bool {
        matches!(self, Self::Real(_))
    }

    pub fn value(self) -> f64 {
        match self {
            Self::Integer(value) => value as f64,
            Self::Real(value) => value,
        }
    }

    pub fn abs(self) -> Self {
        match self {
            Self::Integer(value) => Self::Integer(value.abs()),
            Self::Real(value) => Self::Real(value.abs()),
        }
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            // {:?} keeps the decimal point on round floats (1.0, not 1)
            Self::Integer(value) => write!(f, "{value}"),
            Self::Real(value) => write!(f, "{value:?}"),
        }
    }
}

/// Where an extracted number sits in the filtered text: line index within the
/// filtered region, byte column of the first occurrence of the matched text
/// in that line, and the match length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberLocation {
    pub line: usize,
    pub column: usize,
    pub length: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToleranceKind {
    Relative,
    Absolute,
}

impl ToleranceKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relative => "rel",
            Self::Absolute => "abs",
        }
    }
}

/// Maximum allowed deviation between an actual and a reference float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub kind: ToleranceKind,
    pub value: f64,
}

/// A region boundary: unset, a literal substring, or a regular expression.
///
/// Regex anchors are compiled once as `.*<pattern>` so the pattern may match
/// anywhere in the line (search semantics over a prefix-anchored match).
#[derive(Debug, Clone)]
pub enum Anchor {
    None,
    Literal(String),
    Regex { pattern: String, matcher: Regex },
}

impl Anchor {
    pub fn regex(pattern: &str) -> CheckResult<Self> {
        let matcher = Regex::new(&format!(".*{pattern}")).map_err(|source| {
            CheckError::BadAnchorPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        Ok(Self::Regex {
            pattern: pattern.to_string(),
            matcher,
        })
    }

    pub const fn is_set(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// An unset anchor matches every line; this is only meaningful for end
    /// anchors (an unset start anchor selects the whole file instead).
    pub fn matches(&self, line: &str) -> bool {
        match self {
            Self::None => true,
            Self::Literal(text) => line.contains(text.as_str()),
            Self::Regex { matcher, .. } => matcher.is_match(line),
        }
    }

    pub fn pattern_text(&self) -> &str {
        match self {
            Self::None => "",
            Self::Literal(text) => text,
            Self::Regex { pattern, .. } => pattern,
        }
    }
}

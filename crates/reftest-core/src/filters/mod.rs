//! Filter construction and validation.
//!
//! A filter is one comparison rule: where to cut a region out of the output,
//! which words inside it may yield numbers, and how strictly the numbers
//! must agree with the reference. Rules are described by [`FilterOptions`]
//! (a record of named options) and turned into immutable [`FilterSpec`]
//! values by a single validating factory; lists of rules are held in
//! [`FilterList`] in the order they will be applied.

use crate::compare::ComparisonPolicy;
use crate::domain::{
    Anchor, CheckError, CheckResult, SKIP_ABOVE_DEFAULT, SKIP_BELOW_DEFAULT, Tolerance,
    ToleranceKind,
};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

/// Option pairs that may not be combined in one filter.
const INCOMPATIBLE_PAIRS: [(&str, &str); 15] = [
    ("from_re", "from_string"),
    ("to_re", "to_string"),
    ("to_string", "num_lines"),
    ("to_re", "num_lines"),
    ("string", "from_string"),
    ("string", "to_string"),
    ("string", "from_re"),
    ("string", "to_re"),
    ("string", "num_lines"),
    ("re", "from_string"),
    ("re", "to_string"),
    ("re", "from_re"),
    ("re", "to_re"),
    ("re", "num_lines"),
    ("rel_tolerance", "abs_tolerance"),
];

/// The named options a filter accepts.
///
/// `string`/`re` are shorthand for `from_string`/`from_re` with
/// `num_lines = 1`. `ignore_below`/`ignore_above` are accepted as aliases
/// for `skip_below`/`skip_above` in serialized filter files. Unknown option
/// names in a filter file are rejected with the recognized set listed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterOptions {
    pub from_string: Option<String>,
    pub from_re: Option<String>,
    pub to_string: Option<String>,
    pub to_re: Option<String>,
    pub string: Option<String>,
    pub re: Option<String>,
    pub num_lines: Option<usize>,
    pub occurrences: Option<BTreeSet<usize>>,
    pub mask: Option<BTreeSet<usize>>,
    #[serde(alias = "ignore_below")]
    pub skip_below: Option<f64>,
    #[serde(alias = "ignore_above")]
    pub skip_above: Option<f64>,
    pub ignore_sign: bool,
    pub ignore_order: bool,
    pub rel_tolerance: Option<f64>,
    pub abs_tolerance: Option<f64>,
}

impl FilterOptions {
    fn has(&self, name: &str) -> bool {
        match name {
            "from_string" => self.from_string.is_some(),
            "from_re" => self.from_re.is_some(),
            "to_string" => self.to_string.is_some(),
            "to_re" => self.to_re.is_some(),
            "string" => self.string.is_some(),
            "re" => self.re.is_some(),
            "num_lines" => self.num_lines.is_some(),
            "rel_tolerance" => self.rel_tolerance.is_some(),
            "abs_tolerance" => self.abs_tolerance.is_some(),
            _ => false,
        }
    }
}

/// One validated, immutable comparison rule.
#[derive(Debug, Clone)]
pub struct FilterSpec {
    pub(crate) start: Anchor,
    pub(crate) end: Anchor,
    pub(crate) line_count: usize,
    pub(crate) occurrences: Option<BTreeSet<usize>>,
    pub(crate) mask: Option<BTreeSet<usize>>,
    pub(crate) tolerance: Option<Tolerance>,
    pub(crate) ignore_sign: bool,
    pub(crate) ignore_order: bool,
    pub(crate) skip_below: f64,
    pub(crate) skip_above: f64,
}

impl FilterSpec {
    /// Validates the option record and builds the immutable rule.
    pub fn from_options(options: FilterOptions) -> CheckResult<Self> {
        let conflicts: Vec<(&'static str, &'static str)> = INCOMPATIBLE_PAIRS
            .iter()
            .copied()
            .filter(|(first, second)| options.has(first) && options.has(second))
            .collect();
        if !conflicts.is_empty() {
            return Err(CheckError::IncompatibleOptions(conflicts));
        }

        if let Some(mask) = &options.mask {
            if mask.iter().any(|&index| index < 1) {
                return Err(CheckError::MaskIndexZero);
            }
        }
        if let Some(occurrences) = &options.occurrences {
            if occurrences.iter().any(|&index| index < 1) {
                return Err(CheckError::OccurrenceIndexZero);
            }
        }

        let mut start = match (&options.from_re, &options.from_string) {
            (Some(pattern), _) => Anchor::regex(pattern)?,
            (None, Some(text)) => Anchor::Literal(text.clone()),
            (None, None) => Anchor::None,
        };
        let mut line_count = options.num_lines.unwrap_or(0);
        if let Some(text) = &options.string {
            start = Anchor::Literal(text.clone());
            line_count = 1;
        }
        if let Some(pattern) = &options.re {
            start = Anchor::regex(pattern)?;
            line_count = 1;
        }

        let end = match (&options.to_re, &options.to_string) {
            (Some(pattern), _) => Anchor::regex(pattern)?,
            (None, Some(text)) => Anchor::Literal(text.clone()),
            (None, None) => Anchor::None,
        };

        if options.occurrences.is_some() && !start.is_set() {
            return Err(CheckError::OccurrencesWithoutAnchor);
        }

        let tolerance = match (options.rel_tolerance, options.abs_tolerance) {
            (Some(value), None) => Some(Tolerance {
                kind: ToleranceKind::Relative,
                value,
            }),
            (None, Some(value)) => Some(Tolerance {
                kind: ToleranceKind::Absolute,
                value,
            }),
            (None, None) => None,
            // rejected above as an incompatible pair
            (Some(_), Some(_)) => None,
        };

        Ok(Self {
            start,
            end,
            line_count,
            occurrences: options.occurrences,
            mask: options.mask,
            tolerance,
            ignore_sign: options.ignore_sign,
            ignore_order: options.ignore_order,
            skip_below: options.skip_below.unwrap_or(SKIP_BELOW_DEFAULT),
            skip_above: options.skip_above.unwrap_or(SKIP_ABOVE_DEFAULT),
        })
    }

    /// Renders the selection signature used in extraction error messages:
    /// `[N lines from "X"]` or `["X" ... "Y"]`.
    pub fn signature(&self) -> String {
        if self.line_count > 0 {
            format!(
                "[{} lines from \"{}\"]",
                self.line_count,
                self.start.pattern_text()
            )
        } else {
            format!(
                "[\"{}\" ... \"{}\"]",
                self.start.pattern_text(),
                self.end.pattern_text()
            )
        }
    }

    pub fn mask(&self) -> Option<&BTreeSet<usize>> {
        self.mask.as_ref()
    }

    pub const fn tolerance(&self) -> Option<Tolerance> {
        self.tolerance
    }

    pub const fn ignore_order(&self) -> bool {
        self.ignore_order
    }

    pub const fn comparison_policy(&self) -> ComparisonPolicy {
        ComparisonPolicy {
            tolerance: self.tolerance,
            ignore_sign: self.ignore_sign,
            skip_below: self.skip_below,
            skip_above: self.skip_above,
        }
    }
}

/// An ordered list of comparison rules, built one rule at a time.
#[derive(Debug, Default)]
pub struct FilterList {
    filters: Vec<FilterSpec>,
}

impl FilterList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and appends one rule.
    pub fn add(&mut self, options: FilterOptions) -> CheckResult<()> {
        self.filters.push(FilterSpec::from_options(options)?);
        Ok(())
    }

    /// Builds a whole list from a JSON array of option records.
    pub fn from_json_str(text: &str) -> CheckResult<Self> {
        let records: Vec<FilterOptions> =
            serde_json::from_str(text).map_err(|source| CheckError::FilterFile { source })?;
        let mut list = Self::new();
        for options in records {
            list.add(options)?;
        }
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FilterSpec> {
        self.filters.iter()
    }

    /// Applies every rule to the actual/reference pair; see [`crate::check`].
    pub fn check(
        &self,
        actual_path: impl AsRef<Path>,
        reference_path: impl AsRef<Path>,
        log_dir: impl AsRef<Path>,
        verbose: bool,
    ) -> CheckResult<()> {
        crate::check::check(self, actual_path, reference_path, log_dir, verbose)
    }
}

impl<'a> IntoIterator for &'a FilterList {
    type Item = &'a FilterSpec;
    type IntoIter = std::slice::Iter<'a, FilterSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.filters.iter()
    }
}

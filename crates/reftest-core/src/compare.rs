//! Tolerance-based comparison of extracted number pairs.

use crate::domain::{CheckError, CheckResult, Number, Tolerance, ToleranceKind};

/// The slice of a filter that drives pairwise comparison.
#[derive(Debug, Clone, Copy)]
pub struct ComparisonPolicy {
    pub tolerance: Option<Tolerance>,
    pub ignore_sign: bool,
    pub skip_below: f64,
    pub skip_above: f64,
}

/// Verdict for one (actual, reference) pair; the message is present only on
/// a mismatch.
#[derive(Debug, Clone, PartialEq)]
pub struct PairOutcome {
    pub matched: bool,
    pub message: Option<String>,
}

impl PairOutcome {
    fn matched() -> Self {
        Self {
            matched: true,
            message: None,
        }
    }

    fn mismatch(message: String) -> Self {
        Self {
            matched: false,
            message: Some(message),
        }
    }
}

/// Decides whether one pair matches under the given policy.
///
/// Integer pairs compare exactly and never need a tolerance. Reference
/// magnitudes outside the skip range always match; only the reference value
/// is consulted for that test. Floats without a configured tolerance are a
/// configuration error. A relative tolerance divides the raw error by the
/// reference value without a zero guard, so a zero reference yields an
/// inf/NaN error that never passes.
pub fn compare_pair(
    actual: Number,
    reference: Number,
    policy: &ComparisonPolicy,
) -> CheckResult<PairOutcome> {
    let (actual, reference) = if policy.ignore_sign {
        (actual.abs(), reference.abs())
    } else {
        (actual, reference)
    };

    if let (Number::Integer(actual_int), Number::Integer(reference_int)) = (actual, reference) {
        if actual_int == reference_int {
            return Ok(PairOutcome::matched());
        }
        return Ok(PairOutcome::mismatch(format!("expected: {reference}")));
    }

    let a = actual.value();
    let r = reference.value();

    if r.abs() < policy.skip_below || r.abs() > policy.skip_above {
        return Ok(PairOutcome::matched());
    }

    let Some(tolerance) = policy.tolerance else {
        return Err(CheckError::MissingTolerance);
    };

    let mut error = a - r;
    if tolerance.kind == ToleranceKind::Relative {
        error /= r;
    }
    if error.abs() <= tolerance.value {
        return Ok(PairOutcome::matched());
    }

    // the displayed deviation mirrors, but is computed apart from, the
    // pass/fail arithmetic
    let display = match (tolerance.kind, policy.ignore_sign) {
        (ToleranceKind::Relative, true) => (1.0 - a.abs() / r.abs()).abs(),
        (ToleranceKind::Relative, false) => (1.0 - a / r).abs(),
        (ToleranceKind::Absolute, true) => (a.abs() - r.abs()).abs(),
        (ToleranceKind::Absolute, false) => (a - r).abs(),
    };
    let suffix = if policy.ignore_sign {
        " ignoring signs"
    } else {
        ""
    };
    Ok(PairOutcome::mismatch(format!(
        "expected: {reference} ({} diff: {}{suffix})",
        tolerance.kind.as_str(),
        format_deviation(display)
    )))
}

/// Renders a deviation in `6.2e`-style scientific notation with a two-digit
/// signed exponent (`5.00e-02`); non-finite values are rendered by name.
pub fn format_deviation(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value == f64::INFINITY {
        return "inf".to_string();
    }
    if value == f64::NEG_INFINITY {
        return "-inf".to_string();
    }

    let rendered = format!("{value:.2e}");
    match rendered.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(rest) => ('-', rest),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => rendered,
    }
}

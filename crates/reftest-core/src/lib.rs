//! Numerically tolerant comparison of program text output against reference
//! output.
//!
//! Scientific codes print physics into free-form text; validating a run
//! means locating the numbers that matter and comparing them within
//! tolerances instead of byte for byte. This crate is the engine for that:
//! filters select regions of the output by anchor, regex or line count,
//! numbers are tokenized out of the selected lines (Fortran `D` exponents
//! included), and pairs are compared under relative or absolute tolerances
//! with skip ranges and sign/order handling. A check run writes filtered,
//! reference and diff artifacts next to the logs and fails with a single
//! aggregate error describing every mismatch it found.
//!
//! Launching the program under test, staging its working directory and
//! parsing harness command lines are left to the caller.

pub mod check;
pub mod compare;
pub mod domain;
pub mod extract;
pub mod filters;
pub mod regions;

pub use check::check;
pub use compare::{ComparisonPolicy, PairOutcome, compare_pair, format_deviation};
pub use domain::{
    Anchor, CheckError, CheckResult, ErrorKind, Number, NumberLocation, SKIP_ABOVE_DEFAULT,
    SKIP_BELOW_DEFAULT, Tolerance, ToleranceKind,
};
pub use extract::{Extraction, extract_numbers};
pub use filters::{FilterList, FilterOptions, FilterSpec};
pub use regions::select_lines;

//! Numeric tokenization of filtered output lines.

use crate::domain::{Number, NumberLocation};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

// Words containing any character outside this set (identifiers like "TzB1g")
// never yield numbers, even though they contain digits.
static ELIGIBLE_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9.eEdD+-]*$").expect("eligible-word pattern compiles"));

// Optional sign, ".1"- or "1."-style body, optional exponent. The d/D
// exponent markers cover Fortran double-precision literals.
static FLOAT_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[-+]?(?:(?:[0-9]*\.[0-9]+)|(?:[0-9]+\.?))(?:[EeDd][+-]?[0-9]+)?")
        .expect("float token pattern compiles")
});

static INTEGER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+$").expect("integer token pattern compiles"));

/// Numbers and their locations, as parallel sequences of equal length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Extraction {
    pub numbers: Vec<Number>,
    pub locations: Vec<NumberLocation>,
}

/// Extracts every number from the given lines.
///
/// Lines are split on whitespace; a word is eligible when all of its
/// characters could belong to a numeric literal. The 1-indexed position
/// counter advances on every eligible word whether or not it yields numbers,
/// and a mask restricts extraction to the listed positions. A word is
/// integer-typed only when all of its numeric substrings are plain integers.
///
/// The recorded column is the byte offset of the first occurrence of the
/// matched text in the line, so a numeral repeated verbatim earlier in the
/// same line is located at that earlier occurrence.
pub fn extract_numbers(lines: &[String], mask: Option<&BTreeSet<usize>>) -> Extraction {
    let mut extraction = Extraction::default();

    for (line_index, line) in lines.iter().enumerate() {
        let mut position = 0usize;
        for word in line.split_whitespace() {
            if !ELIGIBLE_WORD.is_match(word) {
                continue;
            }
            position += 1;
            if let Some(mask) = mask {
                if !mask.contains(&position) {
                    continue;
                }
            }

            let float_matches: Vec<&str> = FLOAT_TOKEN.find_iter(word).map(|m| m.as_str()).collect();
            if float_matches.is_empty() {
                continue;
            }
            let integer_matches: Vec<&str> =
                INTEGER_TOKEN.find_iter(word).map(|m| m.as_str()).collect();
            let is_integer = float_matches == integer_matches;

            for matched in float_matches {
                let column = line.find(matched).unwrap_or(0);
                let normalized = matched.replace(['d', 'D'], "e");
                let number = if is_integer {
                    normalized.parse::<i64>().map(Number::Integer).ok()
                } else {
                    None
                };
                let number = match number {
                    Some(number) => number,
                    None => match normalized.parse::<f64>() {
                        Ok(value) => Number::Real(value),
                        Err(_) => continue,
                    },
                };
                extraction.numbers.push(number);
                extraction.locations.push(NumberLocation {
                    line: line_index,
                    column,
                    length: matched.len(),
                });
            }
        }
    }

    extraction
}

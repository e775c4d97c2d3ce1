//! The check orchestrator: applies every filter to an actual/reference file
//! pair, writes the filtered/reference/diff artifact files, and raises one
//! aggregate failure if any filter found a mismatch.

use crate::compare::compare_pair;
use crate::domain::{CheckError, CheckResult, Number, NumberLocation};
use crate::extract::extract_numbers;
use crate::filters::{FilterList, FilterSpec};
use crate::regions::select_lines;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

/// Compares the actual output against the reference, filter by filter.
///
/// Three artifact files are written into `log_dir`, named after the actual
/// file's basename: `.filtered` (selected actual text), `.reference`
/// (selected reference text) and `.diff` (every mismatch found). All three
/// are closed before the diff file's size decides pass or fail.
///
/// Configuration and extraction errors abort immediately; comparison
/// mismatches are accumulated across all filters and surfaced once, as a
/// `TestFailed` error naming the actual file. The diff text is embedded in
/// the error message only when `verbose` is set.
pub fn check(
    filters: &FilterList,
    actual_path: impl AsRef<Path>,
    reference_path: impl AsRef<Path>,
    log_dir: impl AsRef<Path>,
    verbose: bool,
) -> CheckResult<()> {
    let actual_path = actual_path.as_ref();
    let reference_path = reference_path.as_ref();
    let log_dir = log_dir.as_ref();

    let actual_name = actual_path.display().to_string();
    let reference_name = reference_path.display().to_string();
    let actual_lines = read_lines(actual_path)?;
    let reference_lines = read_lines(reference_path)?;

    let base = actual_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| actual_name.clone());
    fs::create_dir_all(log_dir).map_err(|source| CheckError::Io {
        path: log_dir.to_path_buf(),
        source,
    })?;
    let filtered_path = log_dir.join(format!("{base}.filtered"));
    let reference_log_path = log_dir.join(format!("{base}.reference"));
    let diff_path = log_dir.join(format!("{base}.diff"));

    {
        let mut log_filtered = create_artifact(&filtered_path)?;
        let mut log_reference = create_artifact(&reference_log_path)?;
        let mut log_diff = create_artifact(&diff_path)?;

        for spec in filters {
            debug!(filter = %spec.signature(), "applying filter");

            let actual_filtered = select_lines(&actual_lines, spec, &actual_name)?;
            if actual_filtered.is_empty() {
                return Err(CheckError::NothingExtracted {
                    signature: spec.signature(),
                    path: actual_name.clone(),
                });
            }
            append_artifact(&mut log_filtered, &filtered_path, &actual_filtered)?;
            let actual_extraction = extract_numbers(&actual_filtered, spec.mask());
            if spec.mask().is_some() && actual_extraction.numbers.is_empty() {
                return Err(CheckError::MaskMatchedNothing {
                    mask: spec.mask().cloned().unwrap_or_default(),
                });
            }

            let reference_filtered = select_lines(&reference_lines, spec, &reference_name)?;
            if reference_filtered.is_empty() {
                return Err(CheckError::NothingExtracted {
                    signature: spec.signature(),
                    path: reference_name.clone(),
                });
            }
            append_artifact(&mut log_reference, &reference_log_path, &reference_filtered)?;
            let reference_extraction = extract_numbers(&reference_filtered, spec.mask());
            if spec.mask().is_some() && reference_extraction.numbers.is_empty() {
                return Err(CheckError::MaskMatchedNothing {
                    mask: spec.mask().cloned().unwrap_or_default(),
                });
            }

            let actual_locations = actual_extraction.locations;
            let mut actual_numbers = actual_extraction.numbers;
            let mut reference_numbers = reference_extraction.numbers;
            if spec.ignore_order() {
                sort_numbers(&mut actual_numbers);
                sort_numbers(&mut reference_numbers);
            }

            if actual_numbers.is_empty()
                && reference_numbers.is_empty()
                && actual_filtered != reference_filtered
            {
                let block = format!(
                    "ERROR: extracted strings do not match\nown gave:\n{}\nreference gave:\n{}\n",
                    lines_block(&actual_filtered),
                    lines_block(&reference_filtered)
                );
                append_text(&mut log_diff, &diff_path, &block)?;
            }

            if actual_numbers.len() == reference_numbers.len() && !actual_numbers.is_empty() {
                let block = compare_filter_numbers(
                    spec,
                    &actual_filtered,
                    &actual_numbers,
                    &actual_locations,
                    &reference_numbers,
                )?;
                if let Some(block) = block {
                    warn!(filter = %spec.signature(), "filter found mismatching numbers");
                    append_text(&mut log_diff, &diff_path, &block)?;
                }
            }

            if actual_numbers.len() != reference_numbers.len() {
                let block = format!(
                    "ERROR: extracted sizes do not match\nown gave {} numbers:\n{}\nreference gave {} numbers:\n{}\n",
                    actual_numbers.len(),
                    lines_block(&actual_filtered),
                    reference_numbers.len(),
                    lines_block(&reference_filtered)
                );
                append_text(&mut log_diff, &diff_path, &block)?;
            }
        }

        flush_artifact(&mut log_filtered, &filtered_path)?;
        flush_artifact(&mut log_reference, &reference_log_path)?;
        flush_artifact(&mut log_diff, &diff_path)?;
    }

    let diff_size = fs::metadata(&diff_path)
        .map_err(|source| CheckError::Io {
            path: diff_path.clone(),
            source,
        })?
        .len();
    if diff_size > 0 {
        let diff = fs::read_to_string(&diff_path).map_err(|source| CheckError::Io {
            path: diff_path.clone(),
            source,
        })?;
        return Err(CheckError::TestFailed {
            path: actual_name,
            diff: verbose.then_some(diff),
        });
    }

    Ok(())
}

/// Runs the comparator over positionally paired numbers and renders the
/// annotated diff block if anything mismatched.
fn compare_filter_numbers(
    spec: &FilterSpec,
    actual_filtered: &[String],
    actual_numbers: &[Number],
    actual_locations: &[NumberLocation],
    reference_numbers: &[Number],
) -> CheckResult<Option<String>> {
    let any_real = actual_numbers
        .iter()
        .chain(reference_numbers)
        .any(|number| number.is_real());
    if any_real && spec.tolerance().is_none() {
        return Err(CheckError::MissingTolerance);
    }

    let policy = spec.comparison_policy();
    let mut outcomes = Vec::with_capacity(actual_numbers.len());
    for (&actual, &reference) in actual_numbers.iter().zip(reference_numbers) {
        outcomes.push(compare_pair(actual, reference, &policy)?);
    }
    if outcomes.iter().all(|outcome| outcome.matched) {
        return Ok(None);
    }

    // one annotated copy of the filtered text: each line, then an underline
    // row per mismatching number on it
    let mut block = String::from("\n");
    for (line_index, line) in actual_filtered.iter().enumerate() {
        block.push_str(&format!(".       {line}\n"));
        for (outcome, location) in outcomes.iter().zip(actual_locations) {
            if location.line != line_index {
                continue;
            }
            if let Some(message) = &outcome.message {
                block.push_str(&format!(
                    "ERROR   {}{} {message}\n",
                    " ".repeat(location.column),
                    "#".repeat(location.length)
                ));
            }
        }
    }
    Ok(Some(block))
}

fn sort_numbers(numbers: &mut [Number]) {
    numbers.sort_by(|left, right| left.value().total_cmp(&right.value()));
}

fn lines_block(lines: &[String]) -> String {
    let mut text = String::new();
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text
}

fn read_lines(path: &Path) -> CheckResult<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|source| CheckError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(content.lines().map(str::to_owned).collect())
}

fn create_artifact(path: &Path) -> CheckResult<File> {
    File::create(path).map_err(|source| CheckError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn append_artifact(file: &mut File, path: &Path, lines: &[String]) -> CheckResult<()> {
    append_text(file, path, &lines_block(lines))
}

fn append_text(file: &mut File, path: &Path, text: &str) -> CheckResult<()> {
    file.write_all(text.as_bytes())
        .map_err(|source| CheckError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn flush_artifact(file: &mut File, path: &Path) -> CheckResult<()> {
    file.flush().map_err(|source| CheckError::Io {
        path: path.to_path_buf(),
        source,
    })
}

//! Region selection: cutting contiguous line ranges out of program output.

use crate::domain::{CheckError, CheckResult};
use crate::filters::FilterSpec;

/// Selects the lines a filter applies to.
///
/// Without a start anchor the whole input is returned. Otherwise every line
/// matching the start condition opens a region: either a fixed window of
/// `num_lines` lines, or the span up to and including the first line that
/// matches the end condition. With an occurrence set only the listed start
/// matches (1-indexed, in order of occurrence) open regions.
///
/// In the fixed-window mode every qualifying start contributes its window
/// and scanning continues, so overlapping windows repeat lines. In the
/// end-anchor mode without an occurrence set the first fully matched span is
/// returned immediately; a start whose end condition never matches
/// contributes nothing.
///
/// An empty result is a valid return value and means the filter extracted
/// nothing from `source_name`. A fixed window running past the end of the
/// input is reported as an error rather than silently truncated.
pub fn select_lines(
    lines: &[String],
    spec: &FilterSpec,
    source_name: &str,
) -> CheckResult<Vec<String>> {
    if !spec.start.is_set() {
        return Ok(lines.to_vec());
    }

    let mut selected = Vec::new();
    let mut starts_seen = 0usize;

    for (i, line) in lines.iter().enumerate() {
        if !spec.start.matches(line) {
            continue;
        }
        starts_seen += 1;
        if let Some(occurrences) = &spec.occurrences {
            if !occurrences.contains(&starts_seen) {
                continue;
            }
        }

        if spec.line_count > 0 {
            let window_end = i + spec.line_count;
            if window_end > lines.len() {
                return Err(CheckError::RegionOutOfBounds {
                    signature: spec.signature(),
                    path: source_name.to_string(),
                });
            }
            selected.extend(lines[i..window_end].iter().cloned());
        } else {
            for (j, candidate) in lines.iter().enumerate().skip(i) {
                if spec.end.matches(candidate) {
                    selected.extend(lines[i..=j].iter().cloned());
                    if spec.occurrences.is_none() {
                        return Ok(selected);
                    }
                    break;
                }
            }
        }
    }

    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::select_lines;
    use crate::domain::{CheckError, ErrorKind};
    use crate::filters::{FilterOptions, FilterSpec};
    use std::collections::BTreeSet;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_owned).collect()
    }

    fn spec(options: FilterOptions) -> FilterSpec {
        FilterSpec::from_options(options).expect("options should validate")
    }

    #[test]
    fn fixed_window_takes_exactly_num_lines_from_the_anchor() {
        let mut text: Vec<String> = (1..=7).map(|n| format!("{n}.0 2.0 3.0")).collect();
        text.push("raboof 1.0 3.0 7.0".to_string());
        text.extend((1..=7).map(|_| "       1.0 3.0 7.0".to_string()));
        assert_eq!(text.len(), 15);

        let selected = select_lines(
            &text,
            &spec(FilterOptions {
                from_string: Some("raboof".to_string()),
                num_lines: Some(5),
                ..Default::default()
            }),
            "out.txt",
        )
        .expect("selection should succeed");

        assert_eq!(selected.len(), 5);
        assert_eq!(selected[0], "raboof 1.0 3.0 7.0");
        assert_eq!(selected[4], "       1.0 3.0 7.0");
        assert_eq!(selected, text[7..12].to_vec());
    }

    #[test]
    fn regex_anchors_span_from_start_to_end_inclusive() {
        let text = lines("1.0\n1.0\n    raboof\n2.0\n2.0\n    raboof2\n3.0\n3.0");

        let selected = select_lines(
            &text,
            &spec(FilterOptions {
                from_re: Some("r.*f".to_string()),
                to_re: Some("r.*f2".to_string()),
                ..Default::default()
            }),
            "out.txt",
        )
        .expect("selection should succeed");

        assert_eq!(selected, lines("    raboof\n2.0\n2.0\n    raboof2"));
    }

    #[test]
    fn whole_file_mode_returns_the_input_unchanged() {
        let text = lines("a\nb\nc");
        let selected = select_lines(&text, &spec(FilterOptions::default()), "out.txt")
            .expect("selection should succeed");
        assert_eq!(selected, text);
    }

    #[test]
    fn end_anchor_mode_stops_after_the_first_full_span() {
        let text = lines("begin\n1.0\nend\nbegin\n2.0\nend");
        let selected = select_lines(
            &text,
            &spec(FilterOptions {
                from_string: Some("begin".to_string()),
                to_string: Some("end".to_string()),
                ..Default::default()
            }),
            "out.txt",
        )
        .expect("selection should succeed");
        assert_eq!(selected, lines("begin\n1.0\nend"));
    }

    #[test]
    fn fixed_window_mode_concatenates_every_qualifying_window() {
        let text = lines("key 1.0\nx\nkey 2.0\ny");
        let selected = select_lines(
            &text,
            &spec(FilterOptions {
                from_string: Some("key".to_string()),
                num_lines: Some(2),
                ..Default::default()
            }),
            "out.txt",
        )
        .expect("selection should succeed");
        assert_eq!(selected, lines("key 1.0\nx\nkey 2.0\ny"));
    }

    #[test]
    fn occurrence_set_keeps_only_the_listed_start_matches() {
        let text = lines("key 1.0\nkey 2.0\nkey 3.0");
        let selected = select_lines(
            &text,
            &spec(FilterOptions {
                from_string: Some("key".to_string()),
                num_lines: Some(1),
                occurrences: Some(BTreeSet::from([2])),
                ..Default::default()
            }),
            "out.txt",
        )
        .expect("selection should succeed");
        assert_eq!(selected, lines("key 2.0"));
    }

    #[test]
    fn occurrence_set_with_end_anchor_collects_each_selected_span() {
        let text = lines("begin\n1.0\nend\nbegin\n2.0\nend\nbegin\n3.0\nend");
        let selected = select_lines(
            &text,
            &spec(FilterOptions {
                from_string: Some("begin".to_string()),
                to_string: Some("end".to_string()),
                occurrences: Some(BTreeSet::from([1, 3])),
                ..Default::default()
            }),
            "out.txt",
        )
        .expect("selection should succeed");
        assert_eq!(selected, lines("begin\n1.0\nend\nbegin\n3.0\nend"));
    }

    #[test]
    fn start_anchor_with_defaults_selects_a_single_line() {
        // no end anchor and no line count: the end condition matches the
        // start line itself
        let text = lines("a\nkey 1.0\nb");
        let selected = select_lines(
            &text,
            &spec(FilterOptions {
                from_string: Some("key".to_string()),
                ..Default::default()
            }),
            "out.txt",
        )
        .expect("selection should succeed");
        assert_eq!(selected, lines("key 1.0"));
    }

    #[test]
    fn unmatched_anchor_yields_an_empty_selection() {
        let text = lines("a\nb");
        let selected = select_lines(
            &text,
            &spec(FilterOptions {
                from_string: Some("missing".to_string()),
                num_lines: Some(2),
                ..Default::default()
            }),
            "out.txt",
        )
        .expect("selection should succeed");
        assert!(selected.is_empty());
    }

    #[test]
    fn start_without_matching_end_contributes_nothing() {
        let text = lines("begin\n1.0\n2.0");
        let selected = select_lines(
            &text,
            &spec(FilterOptions {
                from_string: Some("begin".to_string()),
                to_string: Some("finish".to_string()),
                ..Default::default()
            }),
            "out.txt",
        )
        .expect("selection should succeed");
        assert!(selected.is_empty());
    }

    #[test]
    fn window_past_end_of_input_is_an_extraction_error() {
        let text = lines("a\nraboof\nb");
        let error = select_lines(
            &text,
            &spec(FilterOptions {
                from_string: Some("raboof".to_string()),
                num_lines: Some(5),
                ..Default::default()
            }),
            "out.txt",
        )
        .expect_err("window past the end should be rejected");

        assert_eq!(error.kind(), ErrorKind::Extraction);
        match error {
            CheckError::RegionOutOfBounds { signature, path } => {
                assert_eq!(signature, "[5 lines from \"raboof\"]");
                assert_eq!(path, "out.txt");
            }
            other => panic!("expected RegionOutOfBounds, got {other:?}"),
        }
    }
}

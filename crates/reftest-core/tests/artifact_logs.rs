use reftest_core::{FilterList, FilterOptions, check};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_file(temp: &TempDir, relative_path: &str, content: &str) -> PathBuf {
    let path = temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent dir should be created");
    }
    fs::write(&path, content).expect("file should be written");
    path
}

#[test]
fn all_three_artifacts_are_written_into_the_log_dir() {
    let temp = TempDir::new().expect("tempdir should be created");
    let out = write_file(&temp, "run/out.txt", "header\nraboof 1.0 3.0\nfooter\n");
    let reference = write_file(&temp, "run/ref.txt", "raboof 1.0 3.0\nextra\n");
    let log_dir = temp.path().join("logs/latest");

    let mut filters = FilterList::new();
    filters
        .add(FilterOptions {
            string: Some("raboof".to_string()),
            abs_tolerance: Some(1.0e-6),
            ..Default::default()
        })
        .expect("options should validate");

    check(&filters, &out, &reference, &log_dir, false).expect("matching line should pass");

    assert_eq!(
        fs::read_to_string(log_dir.join("out.txt.filtered")).expect("filtered artifact"),
        "raboof 1.0 3.0\n"
    );
    assert_eq!(
        fs::read_to_string(log_dir.join("out.txt.reference")).expect("reference artifact"),
        "raboof 1.0 3.0\n"
    );
    assert_eq!(
        fs::read_to_string(log_dir.join("out.txt.diff")).expect("diff artifact"),
        ""
    );
}

#[test]
fn artifacts_accumulate_across_filters_in_list_order() {
    let temp = TempDir::new().expect("tempdir should be created");
    let out = write_file(&temp, "out.txt", "alpha 1.0\nbeta 2.0\n");
    let reference = write_file(&temp, "ref.txt", "alpha 1.0\nbeta 2.0\n");

    let mut filters = FilterList::new();
    filters
        .add(FilterOptions {
            string: Some("beta".to_string()),
            abs_tolerance: Some(1.0e-6),
            ..Default::default()
        })
        .expect("beta rule should validate");
    filters
        .add(FilterOptions {
            string: Some("alpha".to_string()),
            abs_tolerance: Some(1.0e-6),
            ..Default::default()
        })
        .expect("alpha rule should validate");

    check(&filters, &out, &reference, temp.path(), false).expect("identical files should pass");

    // filter order, not file order
    assert_eq!(
        fs::read_to_string(temp.path().join("out.txt.filtered")).expect("filtered artifact"),
        "beta 2.0\nalpha 1.0\n"
    );
}

#[test]
fn filtered_artifact_survives_a_failing_reference_side() {
    let temp = TempDir::new().expect("tempdir should be created");
    let out = write_file(&temp, "out.txt", "raboof 1.0\n");
    let reference = write_file(&temp, "ref.txt", "nothing relevant\n");

    let mut filters = FilterList::new();
    filters
        .add(FilterOptions {
            string: Some("raboof".to_string()),
            abs_tolerance: Some(1.0e-6),
            ..Default::default()
        })
        .expect("options should validate");

    check(&filters, &out, &reference, temp.path(), false)
        .expect_err("reference side matches nothing");

    // the actual side was already selected and logged before the reference
    // side aborted the check
    assert_eq!(
        fs::read_to_string(temp.path().join("out.txt.filtered")).expect("filtered artifact"),
        "raboof 1.0\n"
    );
}

#[test]
fn failing_checks_leave_the_diff_on_disk_for_post_mortems() {
    let temp = TempDir::new().expect("tempdir should be created");
    let out = write_file(&temp, "out.txt", "1.0\n");
    let reference = write_file(&temp, "ref.txt", "2.0\n");

    let mut filters = FilterList::new();
    filters
        .add(FilterOptions {
            abs_tolerance: Some(0.1),
            ..Default::default()
        })
        .expect("options should validate");

    let quiet = check(&filters, &out, &reference, temp.path(), false)
        .expect_err("1.0 against 2.0 should fail");
    let diff_on_disk =
        fs::read_to_string(temp.path().join("out.txt.diff")).expect("diff artifact");
    assert!(diff_on_disk.contains("expected: 2.0"));
    // quiet mode keeps the diff out of the error message
    assert!(!quiet.to_string().contains("expected: 2.0"));

    let verbose = check(&filters, &out, &reference, temp.path(), true)
        .expect_err("1.0 against 2.0 should fail");
    assert!(verbose.to_string().contains("expected: 2.0"));
}

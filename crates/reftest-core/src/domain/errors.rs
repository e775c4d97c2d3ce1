use std::collections::BTreeSet;
use std::path::PathBuf;
use thiserror::Error;

pub type CheckResult<T> = Result<T, CheckError>;

/// Conceptual failure categories.
///
/// Configuration and extraction errors abort a check immediately (the test
/// itself is broken); a comparison failure is raised once, after every
/// filter has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Extraction,
    Comparison,
    Io,
}

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("ERROR: incompatible option pairs: {0:?}")]
    IncompatibleOptions(Vec<(&'static str, &'static str)>),

    #[error("ERROR: mask starts counting from 1 (first word)")]
    MaskIndexZero,

    #[error("ERROR: occurrences start counting from 1 (first match)")]
    OccurrenceIndexZero,

    #[error("ERROR: occurrences require a start anchor")]
    OccurrencesWithoutAnchor,

    #[error("ERROR: invalid anchor pattern \"{pattern}\": {source}")]
    BadAnchorPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("ERROR: for floats you have to specify either rel_tolerance or abs_tolerance")]
    MissingTolerance,

    #[error("ERROR: mask {mask:?} did not extract any numbers")]
    MaskMatchedNothing { mask: BTreeSet<usize> },

    #[error("ERROR: could not read filter options: {source}")]
    FilterFile { source: serde_json::Error },

    #[error("ERROR: filter {signature} did not extract anything from file {path}")]
    NothingExtracted { signature: String, path: String },

    #[error("ERROR: filter {signature} runs past the end of file {path}")]
    RegionOutOfBounds { signature: String, path: String },

    #[error("ERROR: test {path} failed\n{}", diff.as_deref().unwrap_or(""))]
    TestFailed { path: String, diff: Option<String> },

    #[error("failed to access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CheckError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::IncompatibleOptions(_)
            | Self::MaskIndexZero
            | Self::OccurrenceIndexZero
            | Self::OccurrencesWithoutAnchor
            | Self::BadAnchorPattern { .. }
            | Self::MissingTolerance
            | Self::MaskMatchedNothing { .. }
            | Self::FilterFile { .. } => ErrorKind::Configuration,
            Self::NothingExtracted { .. } | Self::RegionOutOfBounds { .. } => ErrorKind::Extraction,
            Self::TestFailed { .. } => ErrorKind::Comparison,
            Self::Io { .. } => ErrorKind::Io,
        }
    }
}

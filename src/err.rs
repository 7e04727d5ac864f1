//! Error types raised while validating, splitting, and converting submissions.

/// Errors raised by the submission processing core.
///
/// All of these are fatal: the first one encountered aborts the current
/// stage.
#[derive(thiserror::Error, Debug)]
pub enum SubmissionError {
    /// Input file could not be found or read.
    #[error("can't find file or read data from {path}: {reason}")]
    MissingInput { path: String, reason: String },
    /// Missing or misnamed column, malformed pipeline directive, or
    /// pipeline count mismatch.
    #[error("line {lineno}: {message}")]
    SchemaViolation { lineno: usize, message: String },
    /// A field value outside of its allowed domain.
    #[error("line {lineno}: invalid {field} {value:?}, expected {expected}")]
    DomainViolation {
        lineno: usize,
        field: String,
        value: String,
        expected: String,
    },
    /// Not all samples of the master sample list are represented.
    #[error("incomplete submission, missing samples: {}", .missing.join(", "))]
    IncompleteSubmission { missing: Vec<String> },
    /// The truth file name does not carry a VCF suffix.
    #[error("truth file {path:?} must end in .vcf or .vcf.gz")]
    FormatViolation { path: String },
    /// The truth file could not be parsed as VCF.
    #[error("problem reading truth VCF {path}: {reason}")]
    InvalidTruth { path: String, reason: String },
    /// Writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SubmissionError {
    /// Shortcut for building a `SchemaViolation`.
    pub fn schema<S: Into<String>>(lineno: usize, message: S) -> Self {
        SubmissionError::SchemaViolation {
            lineno,
            message: message.into(),
        }
    }

    /// Shortcut for building a `DomainViolation`.
    pub fn domain<F, V, E>(lineno: usize, field: F, value: V, expected: E) -> Self
    where
        F: Into<String>,
        V: Into<String>,
        E: Into<String>,
    {
        SubmissionError::DomainViolation {
            lineno,
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }
}

//! Data model of the call submission file.

use std::path::Path;

use crate::common::io::read_lines;
use crate::err::SubmissionError;

pub mod header;
pub mod record;
pub mod schema;

pub use header::{parse_header, ParsedHeader, SubmissionHeader};
pub use record::{Prediction, SubmissionRecord};
pub use schema::{SchemaConfig, SchemaVariant};

/// Read the submission file at `path` into memory.
pub fn read_submission<P>(path: P) -> Result<Vec<String>, SubmissionError>
where
    P: AsRef<Path>,
{
    tracing::debug!("reading submission from {:?}", path.as_ref());
    read_lines(path.as_ref()).map_err(|e| SubmissionError::MissingInput {
        path: path.as_ref().display().to_string(),
        reason: e.to_string(),
    })
}

/// Whether `line` is a data line (neither header nor blank).
pub fn is_data_line(line: &str) -> bool {
    !line.starts_with('#') && !line.trim().is_empty()
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::err::SubmissionError;

    #[test]
    fn read_submission() -> Result<(), anyhow::Error> {
        let lines = super::read_submission("tests/data/single_sample.txt")?;

        assert_eq!(lines[0], "##Pipelines=bwa,mutect,strelka");
        assert_eq!(lines.len(), 7);

        Ok(())
    }

    #[test]
    fn read_submission_missing() {
        let res = super::read_submission("tests/data/no-such-submission.txt");

        assert!(matches!(res, Err(SubmissionError::MissingInput { .. })));
    }

    #[rstest::rstest]
    #[case("1\t10\tIS1\t1", true)]
    #[case("#CHROM\tPOS", false)]
    #[case("##Pipelines=a", false)]
    #[case("", false)]
    #[case("   ", false)]
    fn is_data_line(#[case] line: &str, #[case] expected: bool) {
        assert_eq!(super::is_data_line(line), expected);
    }
}

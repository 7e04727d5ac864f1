//! Parsing of the `##` pipeline directives and the column header line.

use std::sync::OnceLock;

use indexmap::IndexMap;
use itertools::Itertools;
use regex::Regex;

use crate::err::SubmissionError;

use super::schema::{ColumnSchema, DirectiveStyle, SchemaConfig, IDX_CONFIDENCE};

/// Pipelines declared in the `##` header block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionHeader {
    /// One pipeline list shared by all samples.
    Shared { pipelines: Vec<String> },
    /// Pipeline list per sample, in declaration order.
    PerSample {
        pipelines: IndexMap<String, Vec<String>>,
    },
}

impl SubmissionHeader {
    /// Whether `sample` has a header entry.
    pub fn declares(&self, sample: &str) -> bool {
        match self {
            SubmissionHeader::Shared { .. } => true,
            SubmissionHeader::PerSample { pipelines } => pipelines.contains_key(sample),
        }
    }

    /// The samples declared explicitly; empty for the shared style.
    pub fn samples(&self) -> Vec<&str> {
        match self {
            SubmissionHeader::Shared { .. } => Vec::new(),
            SubmissionHeader::PerSample { pipelines } => {
                pipelines.keys().map(String::as_str).collect()
            }
        }
    }
}

/// Result of parsing the header section of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedHeader {
    /// The pipeline directives.
    pub header: SubmissionHeader,
    /// 0-based index of the column header line.
    pub column_line_idx: usize,
    /// Whether the optional confidence column is present.
    pub has_confidence: bool,
}

fn shared_directive_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^##Pipelines=(.+)$").expect("invalid regex"))
}

fn per_sample_directive_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^##(.+)_Pipelines=(.+)$").expect("invalid regex"))
}

/// If `line` is a `##<sample>_Pipelines=...` directive, return the sample
/// and the raw pipeline list.
pub fn per_sample_directive(line: &str) -> Option<(&str, &str)> {
    per_sample_directive_re().captures(line).map(|caps| {
        let sample = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let value = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        (sample, value)
    })
}

/// Split a comma-separated pipeline list into its tokens.
pub fn parse_pipelines(lineno: usize, value: &str) -> Result<Vec<String>, SubmissionError> {
    let tokens = value
        .split(',')
        .map(|token| token.trim().to_string())
        .collect::<Vec<_>>();
    if tokens.iter().any(String::is_empty) {
        return Err(SubmissionError::schema(
            lineno,
            format!(
                "malformed pipeline list {:?}, requires XXX1,XXX2,etc.",
                value
            ),
        ));
    }
    Ok(tokens)
}

/// Parse the `##` block and the column header line.
///
/// `master_samples` is the list of samples that must be declared when the
/// directives are per sample.
pub fn parse_header(
    lines: &[String],
    config: &SchemaConfig,
    master_samples: &[String],
) -> Result<ParsedHeader, SubmissionError> {
    let column_line_idx = lines
        .iter()
        .position(|line| !line.starts_with("##"))
        .unwrap_or(lines.len());
    let directives = &lines[..column_line_idx];

    let header = match config.directives {
        DirectiveStyle::Shared => parse_shared_directive(lines)?,
        DirectiveStyle::PerSample => parse_per_sample_directives(directives, master_samples)?,
    };

    let has_confidence = match lines.get(column_line_idx) {
        Some(line) => check_columns(column_line_idx + 1, line, &config.columns)?,
        None => {
            return Err(SubmissionError::schema(
                column_line_idx + 1,
                "missing column header line starting with #CHROM",
            ))
        }
    };

    Ok(ParsedHeader {
        header,
        column_line_idx,
        has_confidence,
    })
}

/// The first line must be `##Pipelines=...`; further `##` lines are ignored.
fn parse_shared_directive(lines: &[String]) -> Result<SubmissionHeader, SubmissionError> {
    let first = lines.first().map(String::as_str).unwrap_or_default();
    let caps = shared_directive_re().captures(first).ok_or_else(|| {
        SubmissionError::schema(
            1,
            format!(
                "list of pipelines not found, found {:?}, requires ##Pipelines=XXX1,XXX2,etc.",
                first
            ),
        )
    })?;
    let value = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    Ok(SubmissionHeader::Shared {
        pipelines: parse_pipelines(1, value)?,
    })
}

fn parse_per_sample_directives(
    directives: &[String],
    master_samples: &[String],
) -> Result<SubmissionHeader, SubmissionError> {
    let mut pipelines: IndexMap<String, Vec<String>> = IndexMap::new();
    for (idx, line) in directives.iter().enumerate() {
        let lineno = idx + 1;
        let (sample, value) = per_sample_directive(line).ok_or_else(|| {
            SubmissionError::schema(
                lineno,
                format!(
                    "malformed pipeline directive {:?}, requires ##<sample>_Pipelines=XXX1,XXX2,etc.",
                    line
                ),
            )
        })?;
        if !master_samples.iter().any(|s| s == sample) {
            return Err(SubmissionError::domain(
                lineno,
                "Sample",
                sample,
                format!("one of [{}]", master_samples.iter().join(", ")),
            ));
        }
        if pipelines.contains_key(sample) {
            return Err(SubmissionError::schema(
                lineno,
                format!("pipelines for sample {} declared more than once", sample),
            ));
        }
        pipelines.insert(sample.to_string(), parse_pipelines(lineno, value)?);
    }

    let missing = master_samples
        .iter()
        .filter(|sample| !pipelines.contains_key(sample.as_str()))
        .cloned()
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(SubmissionError::IncompleteSubmission { missing });
    }

    if let Some((first_sample, first_tokens)) = pipelines.first() {
        for (idx, (sample, tokens)) in pipelines.iter().enumerate() {
            if tokens.len() != first_tokens.len() {
                return Err(SubmissionError::schema(
                    idx + 1,
                    format!(
                        "sample {} lists {} pipelines but sample {} lists {}",
                        sample,
                        tokens.len(),
                        first_sample,
                        first_tokens.len()
                    ),
                ));
            }
        }
    }

    Ok(SubmissionHeader::PerSample { pipelines })
}

/// Check the column header `line` against `columns`.
///
/// Returns whether the optional confidence column is present.
pub fn check_columns(
    lineno: usize,
    line: &str,
    columns: &ColumnSchema,
) -> Result<bool, SubmissionError> {
    let mut fields = line.split('\t').map(str::trim).collect::<Vec<_>>();
    while fields.last() == Some(&"") {
        fields.pop();
    }
    for (idx, expected) in columns.names().iter().enumerate() {
        match fields.get(idx) {
            Some(found) if found == expected => (),
            Some(found) => {
                return Err(SubmissionError::schema(
                    lineno,
                    format!(
                        "invalid column name {:?}, should be {:?} (check whether you intended \
                        to have '##' instead of '#')",
                        found, expected
                    ),
                ))
            }
            None if idx == IDX_CONFIDENCE => {
                tracing::info!("Optional confidence score not provided.");
                return Ok(false);
            }
            None => {
                return Err(SubmissionError::schema(
                    lineno,
                    format!("missing column {:?}", expected),
                ))
            }
        }
    }
    Ok(true)
}

#[cfg(test)]
mod test {
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use super::{parse_header, SubmissionHeader};
    use crate::err::SubmissionError;
    use crate::submission::schema::{SchemaConfig, SchemaVariant};

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(String::from).collect()
    }

    fn master() -> Vec<String> {
        vec!["A".into(), "B".into()]
    }

    #[test]
    fn shared_directive() -> Result<(), anyhow::Error> {
        let lines = lines(
            "##Pipelines=bwa,mutect\n\
             ##comment\n\
             #CHROM\tPOS\tSample\tBinary.Cutoff\tContinuous.Confidence.Score\n\
             1\t10\tA\t1\t0.5",
        );
        let parsed = parse_header(&lines, &SchemaVariant::SingleSample.into(), &master())?;

        assert_eq!(
            parsed.header,
            SubmissionHeader::Shared {
                pipelines: vec!["bwa".into(), "mutect".into()]
            }
        );
        assert_eq!(parsed.column_line_idx, 2);
        assert!(parsed.has_confidence);
        assert!(parsed.header.declares("anything"));

        Ok(())
    }

    #[test]
    fn shared_directive_missing() {
        let lines = lines("#CHROM\tPOS\tSample\tBinary.Cutoff\n");
        let res = parse_header(&lines, &SchemaVariant::SingleSample.into(), &master());

        assert!(matches!(
            res,
            Err(SubmissionError::SchemaViolation { lineno: 1, .. })
        ));
    }

    #[test]
    fn per_sample_directives() -> Result<(), anyhow::Error> {
        let lines = lines(
            "##A_Pipelines=bwa,mutect\n\
             ##B_Pipelines=bowtie,strelka\n\
             #CHROM\tPOS\tSample\tPredicted\n",
        );
        let parsed = parse_header(
            &lines,
            &SchemaVariant::PerSamplePipelines.into(),
            &master(),
        )?;

        let mut expected = IndexMap::new();
        expected.insert("A".to_string(), vec!["bwa".to_string(), "mutect".into()]);
        expected.insert("B".to_string(), vec!["bowtie".to_string(), "strelka".into()]);
        assert_eq!(
            parsed.header,
            SubmissionHeader::PerSample {
                pipelines: expected
            }
        );
        assert_eq!(parsed.header.samples(), vec!["A", "B"]);
        assert!(!parsed.has_confidence);

        Ok(())
    }

    #[test]
    fn per_sample_directives_missing_sample() {
        let lines = lines("##A_Pipelines=bwa\n#CHROM\tPOS\tSample\tPredicted\n");
        let res = parse_header(
            &lines,
            &SchemaVariant::PerSamplePipelines.into(),
            &master(),
        );

        match res {
            Err(SubmissionError::IncompleteSubmission { missing }) => {
                assert_eq!(missing, vec!["B".to_string()])
            }
            other => panic!("expected incomplete submission, got {:?}", other),
        }
    }

    #[test]
    fn per_sample_directives_unlisted_sample() {
        let lines = lines("##A_Pipelines=bwa\n##C_Pipelines=bwa\n#CHROM\tPOS\tSample\tPredicted\n");
        let res = parse_header(
            &lines,
            &SchemaVariant::PerSamplePipelines.into(),
            &master(),
        );

        match res {
            Err(SubmissionError::DomainViolation { lineno, value, .. }) => {
                assert_eq!(lineno, 2);
                assert_eq!(value, "C");
            }
            other => panic!("expected domain violation, got {:?}", other),
        }
    }

    #[test]
    fn per_sample_directives_count_mismatch() {
        let lines = lines(
            "##A_Pipelines=bwa,mutect\n##B_Pipelines=bwa\n#CHROM\tPOS\tSample\tPredicted\n",
        );
        let res = parse_header(
            &lines,
            &SchemaVariant::PerSamplePipelines.into(),
            &master(),
        );

        match res {
            Err(SubmissionError::SchemaViolation { message, .. }) => {
                assert!(message.contains("sample B"), "{}", message)
            }
            other => panic!("expected schema violation, got {:?}", other),
        }
    }

    #[rstest::rstest]
    #[case("##A_Pipelines=bwa\n##A_Pipelines=bwa\n#CHROM\tPOS\tSample\tPredicted\n")]
    #[case("##A_Pipelines=bwa,,x\n##B_Pipelines=bwa\n#CHROM\tPOS\tSample\tPredicted\n")]
    #[case("##Pipelines=bwa\n#CHROM\tPOS\tSample\tPredicted\n")]
    fn per_sample_directives_malformed(#[case] text: &str) {
        let res = parse_header(
            &lines(text),
            &SchemaVariant::PerSamplePipelines.into(),
            &master(),
        );

        assert!(
            matches!(res, Err(SubmissionError::SchemaViolation { .. })),
            "{:?}",
            res
        );
    }

    #[rstest::rstest]
    #[case("#CHROM\tPOS\tSample\n", "missing column \"Predicted\"")]
    #[case("#CHROM\tPOS\tSample\tBinary.Cutoff\n", "should be \"Predicted\"")]
    #[case("#Chrom\tPOS\tSample\tPredicted\n", "'##' instead of '#'")]
    fn column_header_violation(#[case] column_line: &str, #[case] expected: &str) {
        let text = format!("##Pipelines=bwa\n{}", column_line);
        let res = parse_header(&lines(&text), &SchemaVariant::MultiSample.into(), &master());

        match res {
            Err(SubmissionError::SchemaViolation { lineno, message }) => {
                assert_eq!(lineno, 2);
                assert!(message.contains(expected), "{}", message);
            }
            other => panic!("expected schema violation, got {:?}", other),
        }
    }

    #[test]
    fn column_header_missing() {
        let res = parse_header(
            &lines("##Pipelines=bwa\n"),
            &SchemaVariant::MultiSample.into(),
            &master(),
        );

        assert!(matches!(
            res,
            Err(SubmissionError::SchemaViolation { lineno: 2, .. })
        ));
    }

    #[traced_test]
    #[test]
    fn optional_confidence_notice() -> Result<(), anyhow::Error> {
        let parsed = parse_header(
            &lines("##Pipelines=bwa\n#CHROM\tPOS\tSample\tPredicted\n"),
            &SchemaVariant::MultiSample.into(),
            &master(),
        )?;

        assert!(!parsed.has_confidence);
        assert!(logs_contain("Optional confidence score not provided."));

        Ok(())
    }
}

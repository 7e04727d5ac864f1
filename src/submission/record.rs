//! Parsing of submission data lines.

use itertools::Itertools;

use crate::common::{is_canonical, normalize_chrom, CHROMS};
use crate::err::SubmissionError;

use super::schema::{
    ColumnSchema, COLUMN_POS, IDX_CHROM, IDX_CONFIDENCE, IDX_POS, IDX_PREDICTION, IDX_SAMPLE,
};

/// Binary prediction of a submission record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prediction {
    /// `0`, the call is suppressed from the output.
    Negative,
    /// `1`, the call is reported as a variant.
    Positive,
}

/// One data line of a submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRecord {
    /// Chromosome name without `chr` prefix.
    pub chrom: String,
    /// 1-based position.
    pub pos: u64,
    /// Sample identifier.
    pub sample: String,
    /// Binary prediction.
    pub prediction: Prediction,
    /// Optional confidence score.
    pub confidence: Option<f64>,
}

/// Return the tab-separated fields of the data line `line` found at line
/// `lineno`, each with surrounding whitespace removed.
pub fn split_fields(lineno: usize, line: &str) -> Result<csv::StringRecord, SubmissionError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(line.as_bytes());
    let mut record = csv::StringRecord::new();
    reader
        .read_record(&mut record)
        .map_err(|e| SubmissionError::schema(lineno, format!("malformed data line: {}", e)))?;
    Ok(record)
}

/// Return the sample field of a data line, if any.
pub fn sample_field(line: &str) -> Option<&str> {
    line.split('\t').nth(IDX_SAMPLE).map(str::trim)
}

impl SubmissionRecord {
    /// Parse the data line `line` found at 1-based line number `lineno`.
    pub fn parse(
        lineno: usize,
        line: &str,
        columns: &ColumnSchema,
    ) -> Result<Self, SubmissionError> {
        let fields = split_fields(lineno, line)?;
        if fields.len() < columns.required_len() {
            return Err(SubmissionError::schema(
                lineno,
                format!(
                    "expected at least {} tab-separated fields but found {}",
                    columns.required_len(),
                    fields.len()
                ),
            ));
        }

        let chrom = normalize_chrom(&fields[IDX_CHROM]);
        if !is_canonical(chrom) {
            return Err(SubmissionError::domain(
                lineno,
                "CHROM",
                &fields[IDX_CHROM],
                format!("one of [{}]", CHROMS.iter().join(", ")),
            ));
        }

        let pos = match fields[IDX_POS].parse::<u64>() {
            Ok(pos) if pos > 0 => pos,
            _ => {
                return Err(SubmissionError::domain(
                    lineno,
                    COLUMN_POS,
                    &fields[IDX_POS],
                    "a positive integer",
                ))
            }
        };

        let prediction = match &fields[IDX_PREDICTION] {
            "0" => Prediction::Negative,
            "1" => Prediction::Positive,
            value => {
                return Err(SubmissionError::domain(
                    lineno,
                    columns.prediction,
                    value,
                    "0 or 1",
                ))
            }
        };

        let confidence = match fields.get(IDX_CONFIDENCE) {
            None | Some("") => None,
            Some(value) => Some(value.parse::<f64>().map_err(|_| {
                SubmissionError::domain(
                    lineno,
                    columns.confidence,
                    value,
                    "a floating point number",
                )
            })?),
        };

        Ok(Self {
            chrom: chrom.to_string(),
            pos,
            sample: fields[IDX_SAMPLE].to_string(),
            prediction,
            confidence,
        })
    }

    /// Whether the record is a positive call.
    pub fn is_positive(&self) -> bool {
        self.prediction == Prediction::Positive
    }
}

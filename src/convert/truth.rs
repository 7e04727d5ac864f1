//! Access to the truth call set.

use std::path::{Path, PathBuf};

use noodles_vcf as vcf;

use crate::common::io::open_read_maybe_gz;
use crate::err::SubmissionError;

/// One call of the truth set, reduced to the fields used for the join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruthRecord {
    /// Chromosome name as written in the truth file.
    pub chrom: String,
    /// 1-based position.
    pub pos: u64,
    /// Reference allele.
    pub reference: String,
    /// First alternate allele, `.` if there is none.
    pub alternative: String,
}

impl TruthRecord {
    /// Convert from VCF record.
    pub fn from_vcf(record: &vcf::Record) -> Self {
        let pos: usize = record.position().into();
        Self {
            chrom: record.chromosome().to_string(),
            pos: pos as u64,
            reference: record.reference_bases().to_string(),
            alternative: record
                .alternate_bases()
                .first()
                .map(|allele| allele.to_string())
                .unwrap_or_else(|| ".".to_string()),
        }
    }
}

/// Source of truth records, e.g., a VCF file.
pub trait TruthSource {
    /// Name of the source, used for the file format check.
    fn name(&self) -> &str;

    /// Load all records in source order.
    fn load(&mut self) -> Result<Vec<TruthRecord>, SubmissionError>;
}

/// Check that `name` ends in a VCF suffix.
pub fn check_truth_name(name: &str) -> Result<(), SubmissionError> {
    if name.ends_with(".vcf") || name.ends_with(".vcf.gz") {
        Ok(())
    } else {
        Err(SubmissionError::FormatViolation {
            path: name.to_string(),
        })
    }
}

/// Return the first record at `(chrom, pos)`.
///
/// The scan is linear and stops at the first hit, so for duplicate positions
/// the record that comes first in the file wins.
pub fn find_match<'a>(truth: &'a [TruthRecord], chrom: &str, pos: u64) -> Option<&'a TruthRecord> {
    truth
        .iter()
        .find(|record| record.pos == pos && record.chrom == chrom)
}

/// Truth records read from a (maybe gzip or bgzip compressed) VCF file.
#[derive(Debug, Clone)]
pub struct VcfTruthSource {
    path: PathBuf,
    name: String,
}

impl VcfTruthSource {
    /// Create a source reading from `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            name: path.as_ref().display().to_string(),
        }
    }
}

impl TruthSource for VcfTruthSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&mut self) -> Result<Vec<TruthRecord>, SubmissionError> {
        let invalid = |e: std::io::Error| SubmissionError::InvalidTruth {
            path: self.name.clone(),
            reason: e.to_string(),
        };

        tracing::debug!("loading truth records from {:?}", &self.path);
        let mut reader = open_read_maybe_gz(&self.path)
            .map(vcf::Reader::new)
            .map_err(|e| SubmissionError::MissingInput {
                path: self.name.clone(),
                reason: e.to_string(),
            })?;
        let header = reader.read_header().map_err(invalid)?;

        let mut result = Vec::new();
        for record in reader.records(&header) {
            let record = record.map_err(invalid)?;
            result.push(TruthRecord::from_vcf(&record));
        }
        tracing::debug!("... loaded {} truth records", result.len());

        Ok(result)
    }
}

/// Truth source backed by a list of records.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct StaticTruth {
    pub name: String,
    pub records: Vec<TruthRecord>,
}

#[cfg(test)]
impl StaticTruth {
    pub fn new(name: &str, records: &[(&str, u64, &str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            records: records
                .iter()
                .map(|(chrom, pos, reference, alternative)| TruthRecord {
                    chrom: chrom.to_string(),
                    pos: *pos,
                    reference: reference.to_string(),
                    alternative: alternative.to_string(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
impl TruthSource for StaticTruth {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&mut self) -> Result<Vec<TruthRecord>, SubmissionError> {
        Ok(self.records.clone())
    }
}

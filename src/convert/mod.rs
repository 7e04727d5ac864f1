//! Implementation of `convert` subcommand.
//!
//! Converts the positive calls of a single-sample submission to a minimal
//! VCF, taking REF and ALT from the truth set.

use std::io::Write;

use thousands::Separable;

use crate::common::{io::write_maybe_gz, normalize_chrom};
use crate::conf::Config;
use crate::err::SubmissionError;
use crate::submission::{
    is_data_line,
    record::{sample_field, split_fields},
    schema::{ColumnSchema, COLUMN_POS, IDX_CHROM, IDX_POS, IDX_PREDICTION, IDX_SAMPLE},
    SchemaConfig,
};

pub mod output;
pub mod truth;

use output::{OutputVcfRecord, PLACEHOLDER_ALT, PLACEHOLDER_REF};
use truth::{check_truth_name, find_match, TruthSource, VcfTruthSource};

/// Command line arguments for `convert` subcommand.
#[derive(Debug, clap::Parser)]
#[command(author, version, about = "convert a submission file to VCF", long_about = None)]
pub struct Args {
    /// Path to the submission file.
    pub path_in: String,
    /// Path to the truth VCF file (`.vcf` or `.vcf.gz`).
    pub path_truth: String,
    /// Path to the output VCF file.
    #[arg(long, default_value = "sub.vcf")]
    pub path_out: String,
}

/// Counters collected during conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionStats {
    /// Number of records written.
    pub written: usize,
    /// Written records with alleles from the truth set.
    pub matched: usize,
    /// Written records with placeholder alleles.
    pub placeholder: usize,
    /// Negative calls that were dropped.
    pub dropped: usize,
}

/// The fields of a data line used for conversion.
///
/// Unlike `SubmissionRecord` the chromosome is not checked against the
/// canonical set and any non-zero prediction counts as positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// Chromosome name without `chr` prefix.
    pub chrom: String,
    /// Position as given.
    pub pos: u64,
    /// Sample identifier.
    pub sample: String,
    /// Whether the prediction is non-zero.
    pub positive: bool,
}

impl Call {
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

        let pos = fields[IDX_POS].parse::<u64>().map_err(|_| {
            SubmissionError::domain(lineno, COLUMN_POS, &fields[IDX_POS], "an integer")
        })?;
        let prediction = fields[IDX_PREDICTION].parse::<i64>().map_err(|_| {
            SubmissionError::domain(
                lineno,
                columns.prediction,
                &fields[IDX_PREDICTION],
                "an integer",
            )
        })?;

        Ok(Self {
            chrom: normalize_chrom(&fields[IDX_CHROM]).to_string(),
            pos,
            sample: fields[IDX_SAMPLE].to_string(),
            positive: prediction != 0,
        })
    }
}

/// Convert the single-sample submission `lines` to VCF written to `out`.
///
/// The name of `truth` is checked before the truth set is loaded.  The
/// truth set is loaded completely, so the submission does not need to be
/// sorted.
pub fn convert<S, W>(
    lines: &[String],
    columns: &ColumnSchema,
    truth: &mut S,
    out: &mut W,
) -> Result<ConversionStats, SubmissionError>
where
    S: TruthSource + ?Sized,
    W: Write + ?Sized,
{
    check_truth_name(truth.name())?;
    let truth_records = truth.load()?;
    tracing::info!(
        "loaded {} truth records from {}",
        truth_records.len().separate_with_commas(),
        truth.name()
    );

    let sample = lines
        .iter()
        .find(|line| is_data_line(line))
        .and_then(|line| sample_field(line));
    let meta_lines = lines
        .iter()
        .filter(|line| line.starts_with("##"))
        .collect::<Vec<_>>();
    output::write_header(out, sample, &meta_lines)?;

    let mut stats = ConversionStats::default();
    for (idx, line) in lines.iter().enumerate() {
        if !is_data_line(line) {
            continue;
        }
        let lineno = idx + 1;
        let record = Call::parse(lineno, line, columns)?;
        if let Some(sample) = sample {
            if record.sample != sample {
                return Err(SubmissionError::domain(
                    lineno,
                    "Sample",
                    record.sample,
                    format!("{} (sample name must be unique)", sample),
                ));
            }
        }

        if !record.positive {
            stats.dropped += 1;
            continue;
        }

        let output_record = match find_match(&truth_records, &record.chrom, record.pos) {
            Some(truth_record) => {
                stats.matched += 1;
                OutputVcfRecord {
                    chrom: record.chrom,
                    pos: record.pos,
                    reference: truth_record.reference.clone(),
                    alternative: truth_record.alternative.clone(),
                }
            }
            None => {
                tracing::debug!(
                    "no truth record at {}:{}, using placeholder alleles",
                    &record.chrom,
                    record.pos
                );
                stats.placeholder += 1;
                OutputVcfRecord {
                    chrom: record.chrom,
                    pos: record.pos,
                    reference: PLACEHOLDER_REF.to_string(),
                    alternative: PLACEHOLDER_ALT.to_string(),
                }
            }
        };
        writeln!(out, "{}", output_record)?;
        stats.written += 1;
    }

    tracing::info!(
        "wrote {} records ({} with truth alleles, {} with placeholders), dropped {} negative calls",
        stats.written.separate_with_commas(),
        stats.matched.separate_with_commas(),
        stats.placeholder.separate_with_commas(),
        stats.dropped.separate_with_commas()
    );

    Ok(stats)
}

/// Main entry point for `convert` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = std::time::Instant::now();
    tracing::info!("args_common = {:#?}", &args_common);
    tracing::info!("args = {:#?}", &args);

    let config = Config::from_args(args_common)?;
    let schema_config = SchemaConfig::from(config.schema);

    check_truth_name(&args.path_truth)?;
    let lines = crate::submission::read_submission(&args.path_in)?;

    let mut truth = VcfTruthSource::new(&args.path_truth);
    let mut buf = Vec::new();
    convert(&lines, &schema_config.columns, &mut truth, &mut buf)
        .map_err(|e| anyhow::anyhow!("Conversion failed: {}", e))?;
    write_maybe_gz(&args.path_out, &buf)
        .map_err(|e| anyhow::anyhow!("could not write output file {}: {}", &args.path_out, e))?;

    tracing::info!("Converted VCF file: {}", &args.path_out);
    tracing::info!(
        "All of `convert` completed in {:?}",
        before_anything.elapsed()
    );
    Ok(())
}

//! Implementation of `validate` subcommand.

use std::io::Write;

use indexmap::IndexMap;
use itertools::Itertools;
use thousands::Separable;

use crate::conf::Config;
use crate::err::SubmissionError;
use crate::submission::{
    parse_header, schema::DirectiveStyle, Prediction, SchemaConfig, SchemaVariant,
    SubmissionHeader, SubmissionRecord,
};

/// Command line arguments for `validate` subcommand.
#[derive(Debug, clap::Parser)]
#[command(author, version, about = "validate a call submission file", long_about = None)]
pub struct Args {
    /// Path to the submission file.
    pub path_in: String,
}

/// Positive and negative call counts of one sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// Number of records with prediction `1`.
    pub positive: usize,
    /// Number of records with prediction `0`.
    pub negative: usize,
}

impl CallCounts {
    /// Count one record with the given prediction.
    pub fn record(&mut self, prediction: Prediction) {
        match prediction {
            Prediction::Positive => self.positive += 1,
            Prediction::Negative => self.negative += 1,
        }
    }

    /// Total number of records.
    pub fn total(&self) -> usize {
        self.positive + self.negative
    }
}

/// Result of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// The schema variant the submission was checked against.
    pub variant: SchemaVariant,
    /// The pipeline directives.
    pub header: SubmissionHeader,
    /// Whether the optional confidence column was given.
    pub has_confidence: bool,
    /// Call counts per sample, in order of first appearance.
    pub counts: IndexMap<String, CallCounts>,
}

impl ValidationReport {
    /// Write the per-sample summary to `out`.
    pub fn write_summary<W: Write>(&self, out: &mut W) -> Result<(), std::io::Error> {
        writeln!(out, "Validation complete.")?;
        for (sample, counts) in &self.counts {
            writeln!(out)?;
            writeln!(out, "Sample: {}", sample)?;
            writeln!(out, "Total records: {}", counts.total())?;
            writeln!(out, "{}", "-".repeat(60))?;
            writeln!(out, "Positive count: {}", counts.positive)?;
            writeln!(out, "Negative count: {}", counts.negative)?;
            writeln!(out, "{}", "-".repeat(60))?;
        }
        Ok(())
    }
}

/// Validate the submission `lines` against `config`.
///
/// `valid_samples` is the master sample list.  The first violation is
/// returned as error.
pub fn validate(
    lines: &[String],
    config: &SchemaConfig,
    valid_samples: &[String],
) -> Result<ValidationReport, SubmissionError> {
    let parsed = parse_header(lines, config, valid_samples)?;
    tracing::info!("Submitted file has proper column names.");

    let mut counts: IndexMap<String, CallCounts> = IndexMap::new();
    let mut unique_sample: Option<String> = None;
    for (idx, line) in lines
        .iter()
        .enumerate()
        .skip(parsed.column_line_idx + 1)
    {
        if line.trim().is_empty() {
            continue;
        }
        let lineno = idx + 1;
        let record = SubmissionRecord::parse(lineno, line, &config.columns)?;

        if !valid_samples.contains(&record.sample) {
            return Err(SubmissionError::domain(
                lineno,
                "Sample",
                record.sample,
                format!("one of [{}]", valid_samples.iter().join(", ")),
            ));
        }
        if !parsed.header.declares(&record.sample) {
            return Err(SubmissionError::domain(
                lineno,
                "Sample",
                record.sample,
                "a sample declared with ##<sample>_Pipelines=",
            ));
        }
        if config.single_sample {
            let tracked = unique_sample.get_or_insert_with(|| record.sample.clone());
            if tracked != &record.sample {
                return Err(SubmissionError::domain(
                    lineno,
                    "Sample",
                    record.sample,
                    format!("{} (sample name must be unique)", tracked),
                ));
            }
        }

        counts
            .entry(record.sample)
            .or_default()
            .record(record.prediction);
    }

    let expected: Vec<&str> = match config.directives {
        DirectiveStyle::PerSample => parsed.header.samples(),
        DirectiveStyle::Shared if !config.single_sample => {
            valid_samples.iter().map(String::as_str).collect()
        }
        DirectiveStyle::Shared => Vec::new(),
    };
    let missing = expected
        .into_iter()
        .filter(|sample| !counts.contains_key(*sample))
        .map(String::from)
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(SubmissionError::IncompleteSubmission { missing });
    }

    for (sample, sample_counts) in &counts {
        tracing::info!(
            "sample {}: {} records, {} positive, {} negative",
            sample,
            sample_counts.total().separate_with_commas(),
            sample_counts.positive.separate_with_commas(),
            sample_counts.negative.separate_with_commas()
        );
    }

    Ok(ValidationReport {
        variant: config.variant,
        header: parsed.header,
        has_confidence: parsed.has_confidence,
        counts,
    })
}

/// Main entry point for `validate` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = std::time::Instant::now();
    tracing::info!("args_common = {:#?}", &args_common);
    tracing::info!("args = {:#?}", &args);

    let config = Config::from_args(args_common)?;
    tracing::info!("Starting validation against {} schema.", config.schema);

    let lines = crate::submission::read_submission(&args.path_in)?;
    let report = validate(&lines, &config.schema.into(), &config.samples)
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;

    let mut term = console::Term::stdout();
    report.write_summary(&mut term)?;

    tracing::info!(
        "All of `validate` completed in {:?}",
        before_anything.elapsed()
    );
    Ok(())
}

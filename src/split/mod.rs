//! Implementation of `split` subcommand.
//!
//! Demultiplexes a multi-sample submission into one stream per sample.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use itertools::Itertools;
use thousands::Separable;

use crate::common::io::write_lines;
use crate::conf::Config;
use crate::err::SubmissionError;
use crate::submission::{header::per_sample_directive, is_data_line, record::sample_field};

/// Command line arguments for `split` subcommand.
#[derive(Debug, clap::Parser)]
#[command(author, version, about = "split a submission file by sample", long_about = None)]
pub struct Args {
    /// Path to the submission file.
    pub path_in: String,
    /// Directory to write the per-sample submission files to.
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,
}

/// The lines of a submission that belong to one sample.
///
/// Header lines come first, in input order, followed by the sample's data
/// lines in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleStream {
    /// The sample identifier.
    pub sample: String,
    /// Broadcast header lines, the sample's directive, and its data lines.
    pub lines: Vec<String>,
}

impl SampleStream {
    /// Create an empty stream for `sample`.
    pub fn new<S: Into<String>>(sample: S) -> Self {
        Self {
            sample: sample.into(),
            lines: Vec::new(),
        }
    }

    /// Iterate over the data lines of the stream.
    pub fn data_lines(&self) -> impl Iterator<Item = &String> {
        self.lines.iter().filter(|line| is_data_line(line))
    }

    /// Number of data lines in the stream.
    pub fn data_line_count(&self) -> usize {
        self.data_lines().count()
    }
}

fn unknown_sample(lineno: usize, sample: &str, known_samples: &[String]) -> SubmissionError {
    SubmissionError::domain(
        lineno,
        "Sample",
        sample,
        format!("one of [{}]", known_samples.iter().join(", ")),
    )
}

/// Partition `lines` into one `SampleStream` per sample of `known_samples`.
///
/// Lines starting with `#` are copied into every stream, except for
/// `##<sample>_Pipelines=` directives which only go to their sample.  Data
/// lines are routed by their `Sample` column.  Blank lines are dropped.
pub fn split(
    lines: &[String],
    known_samples: &[String],
) -> Result<IndexMap<String, SampleStream>, SubmissionError> {
    let mut streams = known_samples
        .iter()
        .map(|sample| (sample.clone(), SampleStream::new(sample.as_str())))
        .collect::<IndexMap<_, _>>();

    for (idx, line) in lines.iter().enumerate() {
        let lineno = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        let target = if line.starts_with("##") {
            per_sample_directive(line).map(|(sample, _)| sample)
        } else if line.starts_with('#') {
            None
        } else {
            Some(sample_field(line).ok_or_else(|| {
                SubmissionError::schema(lineno, "data line without Sample column")
            })?)
        };

        match target {
            Some(sample) => streams
                .get_mut(sample)
                .ok_or_else(|| unknown_sample(lineno, sample, known_samples))?
                .lines
                .push(line.clone()),
            None => {
                for stream in streams.values_mut() {
                    stream.lines.push(line.clone());
                }
            }
        }
    }

    for stream in streams.values() {
        tracing::debug!(
            "sample {}: {} data lines",
            &stream.sample,
            stream.data_line_count().separate_with_commas()
        );
    }

    Ok(streams)
}

/// Path of the split file for `sample` derived from the input path.
pub fn output_path(output_dir: &Path, path_in: &Path, sample: &str) -> PathBuf {
    let stem = path_in
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "submission".to_string());
    output_dir.join(format!("{}_{}.txt", stem, sample))
}

/// Main entry point for `split` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = std::time::Instant::now();
    tracing::info!("args_common = {:#?}", &args_common);
    tracing::info!("args = {:#?}", &args);

    let config = Config::from_args(args_common)?;
    let lines = crate::submission::read_submission(&args.path_in)?;
    let streams = split(&lines, &config.samples)
        .map_err(|e| anyhow::anyhow!("Splitting failed: {}", e))?;

    std::fs::create_dir_all(&args.output_dir).map_err(|e| {
        anyhow::anyhow!(
            "could not create output directory {:?}: {}",
            &args.output_dir,
            e
        )
    })?;
    for (sample, stream) in &streams {
        let path_out = output_path(&args.output_dir, Path::new(&args.path_in), sample);
        tracing::info!("writing {} to {:?}", sample, &path_out);
        write_lines(&path_out, &stream.lines)
            .map_err(|e| anyhow::anyhow!("could not write {:?}: {}", &path_out, e))?;
    }

    tracing::info!(
        "All of `split` completed in {:?}",
        before_anything.elapsed()
    );
    Ok(())
}

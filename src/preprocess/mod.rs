//! Implementation of `preprocess` subcommand.
//!
//! Splits a submission by sample and converts each sample's calls to VCF.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::common::io::write_maybe_gz;
use crate::conf::Config;
use crate::convert::{
    convert,
    truth::{TruthSource, VcfTruthSource},
};
use crate::err::SubmissionError;
use crate::submission::{schema::ColumnSchema, SchemaConfig};

/// Command line arguments for `preprocess` subcommand.
#[derive(Debug, clap::Parser)]
#[command(author, version, about = "split and convert a submission file", long_about = None)]
pub struct Args {
    /// Path to the submission file.
    pub path_in: String,
    /// Directory to write the per-sample VCF files to.
    #[arg(long)]
    pub output_dir: PathBuf,
    /// Truth VCF for a sample as `SAMPLE=PATH`, overrides the configuration.
    #[arg(long)]
    pub truth: Vec<String>,
}

/// Split `lines` and convert the calls of each sample in `master_samples`.
///
/// The output for sample `s` is written to `<output_dir>/<s>.vcf`.  Returns
/// the written paths with their sample, in the order of `master_samples`.
/// The first failing sample aborts the whole batch; its output file is not
/// created.
pub fn preprocess<S: TruthSource>(
    lines: &[String],
    columns: &ColumnSchema,
    master_samples: &[String],
    truth_sources: &mut IndexMap<String, S>,
    output_dir: &Path,
) -> Result<Vec<(PathBuf, String)>, SubmissionError> {
    if let Some(sample) = master_samples
        .iter()
        .find(|sample| !truth_sources.contains_key(sample.as_str()))
    {
        return Err(SubmissionError::MissingInput {
            path: sample.clone(),
            reason: "no truth file configured for sample".to_string(),
        });
    }

    let streams = crate::split::split(lines, master_samples)?;

    let mut result = Vec::new();
    for (sample, stream) in &streams {
        let truth = truth_sources
            .get_mut(sample)
            .ok_or_else(|| SubmissionError::MissingInput {
                path: sample.clone(),
                reason: "no truth file configured for sample".to_string(),
            })?;

        let path_out = output_dir.join(format!("{}.vcf", sample));
        tracing::info!("converting sample {} to {:?}", sample, &path_out);
        let mut buf = Vec::new();
        convert(&stream.lines, columns, truth, &mut buf)?;
        write_maybe_gz(&path_out, &buf)?;

        result.push((path_out, sample.clone()));
    }

    Ok(result)
}

/// Main entry point for `preprocess` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = std::time::Instant::now();
    tracing::info!("args_common = {:#?}", &args_common);
    tracing::info!("args = {:#?}", &args);

    let config = Config::from_args(args_common)?.with_truth_overrides(&args.truth)?;
    let schema_config = SchemaConfig::from(config.schema);
    let mut truth_sources = config
        .truth
        .iter()
        .map(|(sample, path)| (sample.clone(), VcfTruthSource::new(path)))
        .collect::<IndexMap<_, _>>();

    let lines = crate::submission::read_submission(&args.path_in)?;
    std::fs::create_dir_all(&args.output_dir).map_err(|e| {
        anyhow::anyhow!(
            "could not create output directory {:?}: {}",
            &args.output_dir,
            e
        )
    })?;
    let outputs = preprocess(
        &lines,
        &schema_config.columns,
        &config.samples,
        &mut truth_sources,
        &args.output_dir,
    )
    .map_err(|e| anyhow::anyhow!("Preprocessing failed: {}", e))?;

    for (path, sample) in &outputs {
        tracing::info!("sample {}: {:?}", sample, path);
    }
    tracing::info!(
        "All of `preprocess` completed in {:?}",
        before_anything.elapsed()
    );
    Ok(())
}

#[cfg(test)]
mod test {
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    use super::preprocess;
    use crate::convert::truth::StaticTruth;
    use crate::err::SubmissionError;
    use crate::submission::{SchemaConfig, SchemaVariant};

    fn samples(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn truth_sources() -> IndexMap<String, StaticTruth> {
        IndexMap::from([
            (
                "IS1".to_string(),
                StaticTruth::new("IS1.vcf", &[("1", 12345, "G", "T")]),
            ),
            (
                "IS2".to_string(),
                StaticTruth::new("IS2.vcf.gz", &[("X", 1000, "C", "T")]),
            ),
        ])
    }

    #[test]
    fn preprocess_multi_sample() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let lines = crate::submission::read_submission("tests/data/multi_sample.txt")?;
        let columns = SchemaConfig::from(SchemaVariant::PerSamplePipelines).columns;

        let outputs = preprocess(
            &lines,
            &columns,
            &samples(&["IS1", "IS2"]),
            &mut truth_sources(),
            &tmp_dir,
        )?;

        assert_eq!(
            outputs,
            vec![
                (tmp_dir.join("IS1.vcf"), "IS1".to_string()),
                (tmp_dir.join("IS2.vcf"), "IS2".to_string()),
            ]
        );
        assert_eq!(
            crate::common::io::read_lines(tmp_dir.join("IS1.vcf"))?,
            vec![
                "##fileformat=VCFv4.1",
                "##SAMPLE=<ID=IS1>",
                "##IS1_Pipelines=bwa,mutect",
                "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO",
                "1\t12345\t.\tG\tT\t.\tPASS\tSOMATIC",
            ]
        );
        assert_eq!(
            crate::common::io::read_lines(tmp_dir.join("IS2.vcf"))?,
            vec![
                "##fileformat=VCFv4.1",
                "##SAMPLE=<ID=IS2>",
                "##IS2_Pipelines=bowtie,strelka",
                "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO",
                "X\t1000\t.\tC\tT\t.\tPASS\tSOMATIC",
                "22\t42\t.\tN\tA\t.\tPASS\tSOMATIC",
            ]
        );

        Ok(())
    }

    #[test]
    fn preprocess_missing_truth_source() {
        let tmp_dir = temp_testdir::TempDir::default();
        let lines = vec!["#CHROM\tPOS\tSample\tPredicted".to_string()];
        let columns = SchemaConfig::from(SchemaVariant::PerSamplePipelines).columns;

        let res = preprocess(
            &lines,
            &columns,
            &samples(&["IS1", "IS2", "IS3"]),
            &mut truth_sources(),
            &tmp_dir,
        );

        match res {
            Err(SubmissionError::MissingInput { path, .. }) => assert_eq!(path, "IS3"),
            other => panic!("expected missing input, got {:?}", other),
        }
        assert!(!tmp_dir.join("IS1.vcf").exists());
    }

    #[test]
    fn preprocess_aborts_on_first_failure() {
        let tmp_dir = temp_testdir::TempDir::default();
        let lines = crate::submission::read_submission("tests/data/multi_sample.txt")
            .expect("could not read submission");
        let columns = SchemaConfig::from(SchemaVariant::PerSamplePipelines).columns;
        let mut truth = truth_sources();
        truth.insert("IS1".to_string(), StaticTruth::new("IS1.bed", &[]));

        let res = preprocess(
            &lines,
            &columns,
            &samples(&["IS1", "IS2"]),
            &mut truth,
            &tmp_dir,
        );

        assert!(matches!(res, Err(SubmissionError::FormatViolation { .. })));
        assert!(!tmp_dir.join("IS2.vcf").exists());
    }

    #[test]
    fn preprocess_failing_record_leaves_no_output() {
        let tmp_dir = temp_testdir::TempDir::default();
        let lines = [
            "##IS1_Pipelines=bwa",
            "##IS2_Pipelines=bowtie",
            "#CHROM\tPOS\tSample\tPredicted",
            "1\t12345\tIS1\t1",
            "1\tabc\tIS2\t1",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>();
        let columns = SchemaConfig::from(SchemaVariant::PerSamplePipelines).columns;

        let res = preprocess(
            &lines,
            &columns,
            &samples(&["IS1", "IS2"]),
            &mut truth_sources(),
            &tmp_dir,
        );

        assert!(matches!(res, Err(SubmissionError::DomainViolation { .. })));
        assert!(tmp_dir.join("IS1.vcf").exists());
        assert!(!tmp_dir.join("IS2.vcf").exists());
    }

    #[test]
    fn run_with_config() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let args_common = crate::common::Args {
            path_config: Some("tests/data/config.json".into()),
            ..Default::default()
        };
        let args = super::Args {
            path_in: "tests/data/multi_sample.txt".into(),
            output_dir: tmp_dir.join("out"),
            truth: vec![],
        };

        super::run(&args_common, &args)?;

        let is1 = crate::common::io::read_lines(tmp_dir.join("out").join("IS1.vcf"))?;
        assert_eq!(is1.last().map(String::as_str), Some("1\t12345\t.\tG\tT\t.\tPASS\tSOMATIC"));
        let is2 = crate::common::io::read_lines(tmp_dir.join("out").join("IS2.vcf"))?;
        assert_eq!(is2.len(), 6);

        Ok(())
    }

    #[test]
    fn run_truth_override_to_missing_file() {
        let tmp_dir = temp_testdir::TempDir::default();
        let args_common = crate::common::Args {
            path_config: Some("tests/data/config.json".into()),
            ..Default::default()
        };
        let args = super::Args {
            path_in: "tests/data/multi_sample.txt".into(),
            output_dir: tmp_dir.to_path_buf(),
            truth: vec!["IS2=tests/data/no-such-truth.vcf".into()],
        };

        assert!(super::run(&args_common, &args).is_err());
    }
}

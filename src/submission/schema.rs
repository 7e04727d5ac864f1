//! Schema variants of the submission file.
//!
//! The submission format went through several revisions.  Each revision is
//! modelled as a named `SchemaVariant` that selects a `SchemaConfig`.

use serde::{Deserialize, Serialize};

/// Name of the chromosome column in the header line.
pub const COLUMN_CHROM: &str = "#CHROM";
/// Name of the position column.
pub const COLUMN_POS: &str = "POS";
/// Name of the sample column.
pub const COLUMN_SAMPLE: &str = "Sample";

/// Index of the chromosome field in data lines.
pub const IDX_CHROM: usize = 0;
/// Index of the position field in data lines.
pub const IDX_POS: usize = 1;
/// Index of the sample field in data lines.
pub const IDX_SAMPLE: usize = 2;
/// Index of the prediction field in data lines.
pub const IDX_PREDICTION: usize = 3;
/// Index of the optional confidence field in data lines.
pub const IDX_CONFIDENCE: usize = 4;

/// The known revisions of the submission format.
#[derive(
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum::Display,
    strum::EnumString,
    PartialEq,
    Eq,
    Clone,
    Copy,
    Debug,
    Default,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SchemaVariant {
    /// One `##Pipelines=` line, `Binary.Cutoff` columns, one sample per file.
    SingleSample,
    /// One `##Pipelines=` line, `Predicted` columns, many samples per file.
    MultiSample,
    /// One `##<sample>_Pipelines=` line per sample, `Predicted` columns.
    #[default]
    PerSamplePipelines,
}

/// How pipeline directives are declared in the `##` header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveStyle {
    /// A single `##Pipelines=...` line as the first line of the file.
    Shared,
    /// One `##<sample>_Pipelines=...` line per sample.
    PerSample,
}

/// Ordered column names expected in the header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    /// Name of the binary prediction column.
    pub prediction: &'static str,
    /// Name of the optional trailing confidence column.
    pub confidence: &'static str,
}

impl ColumnSchema {
    /// Return all column names in order, the optional one last.
    pub fn names(&self) -> [&'static str; 5] {
        [
            COLUMN_CHROM,
            COLUMN_POS,
            COLUMN_SAMPLE,
            self.prediction,
            self.confidence,
        ]
    }

    /// Number of columns that must be present.
    pub fn required_len(&self) -> usize {
        IDX_CONFIDENCE
    }
}

/// Behaviour selected by a `SchemaVariant`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaConfig {
    /// The variant this configuration was built from.
    pub variant: SchemaVariant,
    /// The expected columns.
    pub columns: ColumnSchema,
    /// How the pipeline directives are declared.
    pub directives: DirectiveStyle,
    /// Whether all records must carry the same sample name.
    pub single_sample: bool,
}

impl From<SchemaVariant> for SchemaConfig {
    fn from(variant: SchemaVariant) -> Self {
        match variant {
            SchemaVariant::SingleSample => SchemaConfig {
                variant,
                columns: ColumnSchema {
                    prediction: "Binary.Cutoff",
                    confidence: "Continuous.Confidence.Score",
                },
                directives: DirectiveStyle::Shared,
                single_sample: true,
            },
            SchemaVariant::MultiSample => SchemaConfig {
                variant,
                columns: ColumnSchema {
                    prediction: "Predicted",
                    confidence: "Probability",
                },
                directives: DirectiveStyle::Shared,
                single_sample: false,
            },
            SchemaVariant::PerSamplePipelines => SchemaConfig {
                variant,
                columns: ColumnSchema {
                    prediction: "Predicted",
                    confidence: "Probability",
                },
                directives: DirectiveStyle::PerSample,
                single_sample: false,
            },
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{DirectiveStyle, SchemaConfig, SchemaVariant};

    #[rstest::rstest]
    #[case(SchemaVariant::SingleSample, "single-sample")]
    #[case(SchemaVariant::MultiSample, "multi-sample")]
    #[case(SchemaVariant::PerSamplePipelines, "per-sample-pipelines")]
    fn variant_names(#[case] variant: SchemaVariant, #[case] name: &str) -> Result<(), anyhow::Error> {
        assert_eq!(variant.to_string(), name);
        assert_eq!(name.parse::<SchemaVariant>()?, variant);
        assert_eq!(
            serde_json::from_str::<SchemaVariant>(&format!("{:?}", name))?,
            variant
        );
        Ok(())
    }

    #[test]
    fn single_sample_config() {
        let config = SchemaConfig::from(SchemaVariant::SingleSample);
        assert_eq!(
            config.columns.names(),
            [
                "#CHROM",
                "POS",
                "Sample",
                "Binary.Cutoff",
                "Continuous.Confidence.Score"
            ]
        );
        assert_eq!(config.directives, DirectiveStyle::Shared);
        assert!(config.single_sample);
    }

    #[test]
    fn per_sample_config() {
        let config = SchemaConfig::from(SchemaVariant::PerSamplePipelines);
        assert_eq!(config.columns.prediction, "Predicted");
        assert_eq!(config.columns.confidence, "Probability");
        assert_eq!(config.directives, DirectiveStyle::PerSample);
        assert!(!config.single_sample);
    }
}

//! Code for supporting the JSON configuration file.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::submission::SchemaVariant;

/// Sample identifiers used when no configuration file is given.
pub const DEFAULT_SAMPLES: &[&str] = &["IS1", "IS2", "IS3", "IS4"];

/// Configuration of a submission run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Master list of sample identifiers a submission must cover.
    pub samples: Vec<String>,
    /// The submission format revision.
    pub schema: SchemaVariant,
    /// Truth VCF per sample.
    pub truth: IndexMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES.iter().map(|s| s.to_string()).collect(),
            schema: SchemaVariant::default(),
            truth: IndexMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from the JSON file at `path`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let file = std::fs::File::open(path.as_ref()).map_err(|e| {
            anyhow::anyhow!(
                "could not open configuration file {:?}: {}",
                path.as_ref(),
                e
            )
        })?;
        serde_json::from_reader(std::io::BufReader::new(file)).map_err(|e| {
            anyhow::anyhow!(
                "could not parse configuration file {:?}: {}",
                path.as_ref(),
                e
            )
        })
    }

    /// Load from `path` if given, fall back to the defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, anyhow::Error> {
        match path {
            Some(path) => {
                tracing::info!("loading configuration from {:?}", path);
                Self::from_path(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Load configuration as selected by the common command line arguments.
    pub fn from_args(args_common: &crate::common::Args) -> Result<Self, anyhow::Error> {
        let mut config = Self::load(args_common.path_config.as_deref())?;
        if let Some(schema) = args_common.schema {
            config.schema = schema;
        }
        tracing::debug!("config = {:#?}", &config);
        Ok(config)
    }

    /// Apply command line overrides of `SAMPLE=PATH` truth assignments.
    pub fn with_truth_overrides(mut self, overrides: &[String]) -> Result<Self, anyhow::Error> {
        for value in overrides {
            let (sample, path) = value.split_once('=').ok_or_else(|| {
                anyhow::anyhow!("invalid truth assignment {:?}, expected SAMPLE=PATH", value)
            })?;
            self.truth.insert(sample.to_string(), path.to_string());
        }
        Ok(self)
    }
}

//! Common functionality.

use std::path::PathBuf;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

use crate::submission::SchemaVariant;

pub mod io;

/// Commonly used command line arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
    /// Path to JSON configuration file with master sample list and truth files.
    #[clap(long, global = true)]
    pub path_config: Option<PathBuf>,
    /// Submission format revision; overrides the configuration file.
    #[clap(long, global = true, value_enum)]
    pub schema: Option<SchemaVariant>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            verbose: Verbosity::new(0, 0),
            path_config: None,
            schema: None,
        }
    }
}

/// Definition of the chromosome names accepted in submissions.
pub const CHROMS: &[&str] = &[
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15", "16", "17",
    "18", "19", "20", "21", "22", "X", "Y",
];

/// Strip a leading `chr` prefix from a chromosome name.
pub fn normalize_chrom(chrom: &str) -> &str {
    chrom.strip_prefix("chr").unwrap_or(chrom)
}

/// Return whether `chrom` (already normalized) is a canonical chromosome.
pub fn is_canonical(chrom: &str) -> bool {
    CHROMS.contains(&chrom)
}

/// Return the version of the `dream-vcf` crate and `x.y.z` in tests.
pub fn worker_version() -> &'static str {
    if cfg!(test) {
        "x.y.z"
    } else {
        env!("CARGO_PKG_VERSION")
    }
}

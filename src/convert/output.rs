//! Writing of the minimal output VCF.

use std::io::Write;

/// File format declaration of the output.
pub const FILEFORMAT_LINE: &str = "##fileformat=VCFv4.1";
/// The fixed 8-column header line.
pub const COLUMN_HEADER_LINE: &str = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO";

/// Reference allele for positive calls without truth match.
pub const PLACEHOLDER_REF: &str = "N";
/// Alternate allele for positive calls without truth match.
pub const PLACEHOLDER_ALT: &str = "A";

/// One output record; `ID` and `QUAL` are `.`, `FILTER` is `PASS` and
/// `INFO` is `SOMATIC`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputVcfRecord {
    pub chrom: String,
    pub pos: u64,
    pub reference: String,
    pub alternative: String,
}

impl std::fmt::Display for OutputVcfRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t.\t{}\t{}\t.\tPASS\tSOMATIC",
            self.chrom, self.pos, self.reference, self.alternative
        )
    }
}

/// Write the output header.
///
/// `meta_lines` are the `##` lines of the submission, written verbatim.
pub fn write_header<W, S>(
    out: &mut W,
    sample: Option<&str>,
    meta_lines: &[S],
) -> Result<(), std::io::Error>
where
    W: Write + ?Sized,
    S: AsRef<str>,
{
    writeln!(out, "{}", FILEFORMAT_LINE)?;
    if let Some(sample) = sample {
        writeln!(out, "##SAMPLE=<ID={}>", sample)?;
    }
    for line in meta_lines {
        writeln!(out, "{}", line.as_ref())?;
    }
    writeln!(out, "{}", COLUMN_HEADER_LINE)
}

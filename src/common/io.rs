//! Common, IO-related code.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use flate2::{bufread::MultiGzDecoder, write::GzEncoder, Compression};

/// Transparently open a file with gzip decoder.
///
/// `MultiGzDecoder` also reads BGZF files as produced by `bgzip`.
pub fn open_read_maybe_gz<P>(path: P) -> Result<Box<dyn BufRead>, std::io::Error>
where
    P: AsRef<Path>,
{
    if path.as_ref().extension().map(|s| s.to_str()) == Some(Some("gz")) {
        tracing::trace!("Opening {:?} as gzip for reading", path.as_ref());
        let file = File::open(path)?;
        let bufreader = BufReader::new(file);
        let decoder = MultiGzDecoder::new(bufreader);
        Ok(Box::new(BufReader::new(decoder)))
    } else {
        tracing::trace!("Opening {:?} as plain text for reading", path.as_ref());
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Output file that is either plain or gzip-compressed.
///
/// Call `finish` when done; for gzip output this writes the trailer and
/// reports any error doing so.
pub enum MaybeGzWriter {
    Plain(BufWriter<File>),
    Gz(GzEncoder<BufWriter<File>>),
}

impl MaybeGzWriter {
    /// Complete the gzip stream, if any, and flush to disk.
    pub fn finish(self) -> Result<(), std::io::Error> {
        match self {
            MaybeGzWriter::Plain(mut writer) => writer.flush(),
            MaybeGzWriter::Gz(mut encoder) => {
                encoder.try_finish()?;
                encoder.get_mut().flush()
            }
        }
    }
}

impl Write for MaybeGzWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            MaybeGzWriter::Plain(writer) => writer.write(buf),
            MaybeGzWriter::Gz(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            MaybeGzWriter::Plain(writer) => writer.flush(),
            MaybeGzWriter::Gz(encoder) => encoder.flush(),
        }
    }
}

/// Transparently open a file with gzip encoder.
pub fn open_write_maybe_gz<P>(path: P) -> Result<MaybeGzWriter, std::io::Error>
where
    P: AsRef<Path>,
{
    if path.as_ref().extension().map(|s| s.to_str()) == Some(Some("gz")) {
        tracing::trace!("Opening {:?} as gzip for writing", path.as_ref());
        let file = File::create(path)?;
        let bufwriter = BufWriter::new(file);
        Ok(MaybeGzWriter::Gz(GzEncoder::new(
            bufwriter,
            Compression::default(),
        )))
    } else {
        tracing::trace!("Opening {:?} as plain text for writing", path.as_ref());
        let file = File::create(path)?;
        Ok(MaybeGzWriter::Plain(BufWriter::new(file)))
    }
}

/// Write the complete `content` to the (maybe gzip-compressed) file at `path`.
pub fn write_maybe_gz<P>(path: P, content: &[u8]) -> Result<(), std::io::Error>
where
    P: AsRef<Path>,
{
    let mut writer = open_write_maybe_gz(path)?;
    writer.write_all(content)?;
    writer.finish()
}

/// Read all lines of the (maybe gzip-compressed) file at `path`.
///
/// Trailing `\r` characters are removed so files with Windows line endings
/// compare equal to their Unix counterparts.
pub fn read_lines<P>(path: P) -> Result<Vec<String>, std::io::Error>
where
    P: AsRef<Path>,
{
    open_read_maybe_gz(path)?
        .lines()
        .map(|line| line.map(|line| line.trim_end_matches('\r').to_string()))
        .collect()
}

/// Write `lines` to the (maybe gzip-compressed) file at `path`, one per line.
pub fn write_lines<P, S>(path: P, lines: &[S]) -> Result<(), std::io::Error>
where
    P: AsRef<Path>,
    S: AsRef<str>,
{
    let mut writer = open_write_maybe_gz(path)?;
    for line in lines {
        writeln!(writer, "{}", line.as_ref())?;
    }
    writer.finish()
}

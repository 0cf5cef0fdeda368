//! Tab-separated report rows, one per input file.
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::errors::ParseError;
use crate::parser::{parse_fastx_file, parse_fastx_reader, FastxReader};
use crate::stats::{LengthStats, Percentile, Thresholds};

/// Printed instead of any row when no file is given
pub const HEADER: &str =
    "filename\tseq_count\ttotal_length\tn99_length\tn90_length\tn50_length\tn10_length\tn01_length";

/// Threshold columns in the order they are printed
pub const COLUMNS: [Percentile; 5] = [
    Percentile::N99,
    Percentile::N90,
    Percentile::N50,
    Percentile::N10,
    Percentile::N01,
];

/// Statistics for a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    /// Name as given on the command line, not necessarily UTF-8
    pub filename: OsString,
    pub seq_count: usize,
    pub total_length: u64,
    pub thresholds: Thresholds,
}

impl FileSummary {
    pub fn new(filename: impl Into<OsString>, stats: LengthStats) -> Self {
        Self {
            filename: filename.into(),
            seq_count: stats.count(),
            total_length: stats.total(),
            thresholds: stats.thresholds(),
        }
    }

    /// Drains `reader` and summarizes its records
    pub fn from_reader(
        filename: impl Into<OsString>,
        reader: &mut dyn FastxReader,
    ) -> Result<Self, ParseError> {
        Ok(Self::new(filename, LengthStats::from_reader(reader)?))
    }

    /// Writes the row followed by a newline. The file name is written as raw
    /// bytes where the platform allows it.
    pub fn write_row<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(&name_bytes(&self.filename))?;
        writeln!(out, "\t{}", Columns(self))
    }
}

#[cfg(unix)]
fn name_bytes(name: &OsStr) -> std::borrow::Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    name.as_bytes().into()
}

#[cfg(not(unix))]
fn name_bytes(name: &OsStr) -> std::borrow::Cow<'_, [u8]> {
    name.to_string_lossy().into_owned().into_bytes().into()
}

/// Every column after the file name
struct Columns<'a>(&'a FileSummary);

impl fmt::Display for Columns<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let summary = self.0;
        write!(f, "{}\t{}", summary.seq_count, summary.total_length)?;
        for p in COLUMNS {
            write!(f, "\t{}", summary.thresholds.get(p))?;
        }
        Ok(())
    }
}

/// `filename  seq_count  total_length  n99  n90  n50  n10  n01`, no trailing newline.
/// A non-UTF-8 file name is shown lossily; use [`FileSummary::write_row`] to keep it.
impl fmt::Display for FileSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t{}", self.filename.to_string_lossy(), Columns(self))
    }
}

/// Runs the whole pipeline on one file. The file is closed before this returns,
/// whether it succeeds or not.
pub fn summarize_path<P: AsRef<Path>>(path: P) -> Result<FileSummary, ParseError> {
    let path = path.as_ref();
    let mut reader = parse_fastx_file(path)?;
    FileSummary::from_reader(path.as_os_str(), &mut *reader)
}

/// Same as [`summarize_path`] for a stream that is already open
pub fn summarize_reader<R: Read + Send>(
    filename: &str,
    reader: R,
) -> Result<FileSummary, ParseError> {
    let mut reader = parse_fastx_reader(reader)?;
    FileSummary::from_reader(filename, &mut *reader)
}

//! Handles all the FASTA/FASTQ parsing
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use crate::errors::ParseError;
pub use crate::parser::fasta::Reader as FastaReader;
pub use crate::parser::fastq::Reader as FastqReader;

mod decoder;
mod record;
mod utils;

mod fasta;
mod fastq;

pub use crate::parser::decoder::{open_stream, Compression, Decoder, Rewound};
pub use crate::parser::utils::{EmptyReader, FastxReader};

// Leading blank lines are sniffed in chunks of this size
const SNIFF_CHUNK: usize = 8 * 1024;

/// Skips the blank lines at the start of a decompressed stream and returns the
/// first byte of the first non-empty line (if any) together with the stream,
/// rewound so that it starts on that line.
fn sniff_format<R: Read>(mut reader: R) -> Result<(Option<u8>, Rewound<R>), ParseError> {
    loop {
        let chunk = decoder::read_prefix(&mut reader, SNIFF_CHUNK)?;
        if chunk.is_empty() {
            return Ok((None, Cursor::new(chunk).chain(reader)));
        }
        if let Some(idx) = chunk.iter().position(|c| *c != b'\n' && *c != b'\r') {
            let first = chunk[idx];
            let mut head = Cursor::new(chunk);
            head.set_position(idx as u64);
            return Ok((Some(first), head.chain(reader)));
        }
    }
}

/// Parses any decompressed stream, picking the FASTA or FASTQ parser from the first
/// byte of the first non-empty line. Anything else, including an empty stream,
/// gives a reader without records.
///
/// Lines and byte offsets reported by the records count from that first non-empty line.
pub fn parse_plain_reader<'a, R: 'a + Read + Send>(
    reader: R,
) -> Result<Box<dyn FastxReader + 'a>, ParseError> {
    let (first, stream) = sniff_format(reader)?;
    match first.and_then(Format::from_start_byte) {
        Some(Format::Fasta) => {
            tracing::debug!("detected FASTA");
            Ok(Box::new(FastaReader::new(stream)))
        }
        Some(Format::Fastq) => {
            tracing::debug!("detected FASTQ");
            Ok(Box::new(FastqReader::new(stream)))
        }
        None => {
            match first {
                Some(b) => tracing::debug!(
                    found = %(b as char).escape_default(),
                    "expected '@' or '>' at the start of the input, no records"
                ),
                None => tracing::debug!("input is empty"),
            }
            Ok(Box::new(EmptyReader::new()))
        }
    }
}

/// Parses a stream that may be compressed.
/// This automatically detects whether the stream is:
/// 1. compressed: gzip, bz and xz are supported and will use the appropriate decoder
/// 2. FASTA or FASTQ: the right parser will be automatically instantiated
///
/// 1 is only available if the `compression` feature is enabled; otherwise compressed
/// input is a [`Decode`](crate::errors::ParseErrorKind::Decode) error.
pub fn parse_fastx_reader<'a, R: 'a + Read + Send>(
    reader: R,
) -> Result<Box<dyn FastxReader + 'a>, ParseError> {
    parse_plain_reader(open_stream(reader)?)
}

/// The main entry point of fast_count.
/// Parses the file given a path and return an iterator-like reader struct,
/// see [`parse_fastx_reader`].
///
/// The file handle and any decoder state are released when the returned
/// reader is dropped.
pub fn parse_fastx_file<P: AsRef<Path>>(path: P) -> Result<Box<dyn FastxReader>, ParseError> {
    let f = File::open(&path)?;
    parse_fastx_reader(f)
}

pub use record::SequenceRecord;
pub use utils::{Format, LineEnding, Position};

#[cfg(test)]
mod tests {
    use super::*;

    fn count(input: &[u8]) -> (usize, Option<Format>) {
        let mut reader = parse_fastx_reader(input).unwrap();
        let mut n = 0;
        let mut format = None;
        while let Some(rec) = reader.next() {
            let rec = rec.unwrap();
            format = Some(rec.format());
            n += 1;
        }
        (n, format)
    }

    #[test]
    fn test_detects_format() {
        assert_eq!(count(b">a\nACGT\n>b\nAC\n"), (2, Some(Format::Fasta)));
        assert_eq!(count(b"@a\nACGT\n+\nIIII\n"), (1, Some(Format::Fastq)));
    }

    #[test]
    fn test_skips_leading_blank_lines() {
        assert_eq!(count(b"\n\r\n\n>a\nACGT\n"), (1, Some(Format::Fasta)));
        assert_eq!(count(b"\n@a\nACGT\n+\nIIII\n"), (1, Some(Format::Fastq)));
    }

    #[test]
    fn test_leading_blank_lines_longer_than_a_chunk() {
        let mut input = vec![b'\n'; SNIFF_CHUNK * 2 + 3];
        input.extend_from_slice(b">a\nACGT\n");
        assert_eq!(count(&input), (1, Some(Format::Fasta)));
    }

    #[test]
    fn test_unknown_or_empty_input_has_no_records() {
        assert_eq!(count(b""), (0, None));
        assert_eq!(count(b"\n\n"), (0, None));
        assert_eq!(count(b"ACGT\n>a\nACGT\n"), (0, None));
        assert_eq!(count(b"#comment\n@a\nA\n+\nI\n"), (0, None));
    }

    #[test]
    fn test_missing_file() {
        let err = parse_fastx_file("tests/data/does_not_exist.fa").err().unwrap();
        assert_eq!(err.kind, crate::errors::ParseErrorKind::Io);
    }
}

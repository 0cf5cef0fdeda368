//! The errors fast_count can return while reading FASTA/FASTQ files.
//!
//! Truncated or malformed trailing records are not errors: the readers stop
//! at the last complete record instead.

use crate::parser::Format;
use std::error::Error as StdError;
use std::fmt;
use std::io;

/// Represents where we were in a stream when an error occurred.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorPosition {
    /// Line number where the error occurred (starting with 1, 0 if unknown)
    pub line: u64,
}

impl fmt::Display for ErrorPosition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}", self.line)
    }
}

/// The type of error that occured while reading a file
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The file could not be opened or read
    Io,
    /// The compressed stream is corrupt or truncated
    Decode,
}

/// The only error type that fast_count returns
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    /// A description of what went wrong
    pub msg: String,
    /// The type of error that occurred
    pub kind: ParseErrorKind,
    /// Position within the decompressed stream
    pub position: ErrorPosition,
    /// The format of the file we were parsing, if already known
    pub format: Option<Format>,
}

impl ParseError {
    pub fn new_decode(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            kind: ParseErrorKind::Decode,
            position: ErrorPosition::default(),
            format: None,
        }
    }

    /// Attaches the line and format the reader was at when the error surfaced
    pub(crate) fn at(mut self, line: u64, format: Format) -> Self {
        self.position = ErrorPosition { line };
        self.format = Some(format);
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ParseErrorKind::Io => write!(f, "I/O error: {}", self.msg),
            ParseErrorKind::Decode if self.position.line > 0 => {
                write!(f, "Decompression error: {} ({})", self.msg, self.position)
            }
            ParseErrorKind::Decode => write!(f, "Decompression error: {}", self.msg),
        }
    }
}

/// Marker wrapped into the `io::Error`s coming out of a decompressor so that they
/// can be told apart from plain read failures once they reach a parser.
#[derive(Debug)]
pub(crate) struct DecodeFailure(pub(crate) io::Error);

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl StdError for DecodeFailure {}

impl From<io::Error> for ParseError {
    fn from(err: io::Error) -> Self {
        let kind = match err.get_ref() {
            Some(inner) if inner.is::<DecodeFailure>() => ParseErrorKind::Decode,
            _ => ParseErrorKind::Io,
        };
        Self {
            msg: err.to_string(),
            kind,
            position: ErrorPosition::default(),
            format: None,
        }
    }
}

impl StdError for ParseError {}

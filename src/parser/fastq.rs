//! Buffered FASTQ reader; the record search follows the approach of
//! https://github.com/markschl/seq_io/blob/master/src/fastq.rs
//!
//! Unlike seq_io, a record that is truncated or does not frame properly does not
//! produce an error: it ends the stream and everything before it is kept.
//! Blank lines between records are skipped.

use std::io::{self, BufRead};

use crate::errors::ParseError;
use crate::parser::record::SequenceRecord;
use crate::parser::utils::{
    fill_buf, find_line_ending, grow_to, is_blank, trim_cr, FastxReader, Format, LineEnding,
    Position, BUFSIZE,
};
use memchr::memchr;

/// Represents the position of a record within a buffer
#[derive(Debug, Clone, Default)]
pub struct BufferPosition {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) seq: usize,
    pub(crate) sep: usize,
    pub(crate) qual: usize,
}

impl BufferPosition {
    #[inline]
    pub(crate) fn is_new(&self) -> bool {
        self.end == 0
    }

    #[inline]
    pub(crate) fn len(&self) -> u64 {
        (self.end + 1 - self.start) as u64
    }

    #[inline]
    pub(crate) fn id<'a>(&'a self, buffer: &'a [u8]) -> &'a [u8] {
        trim_cr(&buffer[self.start + 1..self.seq - 1])
    }

    #[inline]
    pub(crate) fn seq<'a>(&'a self, buffer: &'a [u8]) -> &'a [u8] {
        trim_cr(&buffer[self.seq..self.sep - 1])
    }

    #[inline]
    pub(crate) fn qual<'a>(&'a self, buffer: &'a [u8]) -> &'a [u8] {
        trim_cr(&buffer[self.qual..self.end])
    }

    #[inline]
    pub(crate) fn num_bases<'a>(&'a self, buffer: &'a [u8]) -> usize {
        self.seq(buffer).len()
    }

    #[inline]
    fn find_line_ending<'a>(&'a self, buffer: &'a [u8]) -> Option<LineEnding> {
        find_line_ending(self.all(buffer))
    }

    #[inline]
    pub(crate) fn all<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        &buffer[self.start..self.end]
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
enum SearchPosition {
    Id,
    Sequence,
    Separator,
    Quality,
}

/// Parser for FASTQ files.
/// Only use this directly if you know your file is FASTQ and that it is not compressed as
/// it does not handle decompression.
/// If you are unsure, it's better to use [`parse_fastx_file`](crate::parse_fastx_file).
pub struct Reader<R: io::Read> {
    buf_reader: buffer_redux::BufReader<R>,
    buf_pos: BufferPosition,
    search_pos: SearchPosition,
    position: Position,
    finished: bool,
    line_ending: Option<LineEnding>,
}

impl<R> Reader<R>
where
    R: io::Read,
{
    /// Creates a new reader with the default buffer size of 64 KiB
    ///
    /// # Example:
    ///
    /// ```
    /// use fast_count::parser::{FastqReader, FastxReader};
    /// let fastq = b"@id\nACGT\n+\nIIII";
    ///
    /// let mut reader = FastqReader::new(&fastq[..]);
    /// let record = reader.next().unwrap().unwrap();
    /// assert_eq!(record.id(), b"id");
    /// assert_eq!(record.num_bases(), 4);
    /// ```
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, BUFSIZE)
    }

    /// Creates a new reader with a given buffer capacity. The minimum allowed
    /// capacity is 3.
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        assert!(capacity >= 3);
        Self {
            buf_reader: buffer_redux::BufReader::with_capacity(capacity, reader),
            buf_pos: BufferPosition::default(),
            search_pos: SearchPosition::Id,
            position: Position::new(1, 0),
            finished: false,
            line_ending: None,
        }
    }
}

impl<R> Reader<R>
where
    R: io::Read,
{
    #[inline]
    fn get_buf(&self) -> &[u8] {
        self.buf_reader.buffer()
    }

    /// Reads the current record and returns true if found.
    /// Returns false if incomplete because end of buffer reached,
    /// meaning that the last record may be incomplete.
    /// Resumes from `self.search_pos` without re-searching positions that
    /// were already found, and updates it.
    fn find(&mut self) -> bool {
        if self.search_pos == SearchPosition::Id {
            self.buf_pos.seq = if let Some(p) = self.find_line(self.buf_pos.start) {
                p
            } else {
                return false;
            };
            self.search_pos = SearchPosition::Sequence;
        }

        if self.search_pos == SearchPosition::Sequence {
            self.buf_pos.sep = if let Some(p) = self.find_line(self.buf_pos.seq) {
                p
            } else {
                return false;
            };
            self.search_pos = SearchPosition::Separator;
        }

        if self.search_pos == SearchPosition::Separator {
            self.buf_pos.qual = if let Some(p) = self.find_line(self.buf_pos.sep) {
                p
            } else {
                return false;
            };
            self.search_pos = SearchPosition::Quality;
        }

        self.buf_pos.end = if let Some(p) = self.find_line(self.buf_pos.qual) {
            p - 1
        } else {
            return false;
        };
        self.search_pos = SearchPosition::Id;

        true
    }

    /// Checks the framing of the record that was just found:
    /// - starts with @
    /// - separator line starts with +
    /// - quality and sequence have the same length; a shorter quality
    ///   line means the record was cut off
    ///
    /// Returns why the record is unusable, if it is.
    fn framing_problem(&self) -> Option<&'static str> {
        let buf = self.get_buf();
        if buf[self.buf_pos.start] != b'@' {
            return Some("record does not start with '@'");
        }
        if buf[self.buf_pos.sep] != b'+' {
            return Some("separator line does not start with '+'");
        }
        // We assume we only have ASCII in sequence and quality
        if self.buf_pos.seq(buf).len() != self.buf_pos.qual(buf).len() {
            return Some("sequence and quality lengths differ");
        }
        None
    }

    /// Ends the stream at the current record, which is dropped
    fn stop(&mut self, reason: &str) {
        self.finished = true;
        tracing::debug!(
            line = self.position.line,
            reason,
            "dropping incomplete FASTQ record, ending stream"
        );
    }

    #[inline]
    fn find_line(&self, search_start: usize) -> Option<usize> {
        memchr(b'\n', &self.get_buf()[search_start..]).map(|pos| search_start + pos + 1)
    }

    /// Called when we couldn't find a complete record.
    /// We might be at EOF, buffer might be too small or we need to refill it
    fn next_complete(&mut self) -> Result<bool, ParseError> {
        loop {
            if self.get_buf().len() < self.buf_reader.capacity() {
                // EOF reached, there will be no next record
                return Ok(self.check_end());
            }

            if self.buf_pos.start == 0 {
                // first record already incomplete -> buffer too small
                self.grow();
            } else {
                // not the first record -> buffer may be big enough but we need to make some space
                self.make_room();
            }

            fill_buf(&mut self.buf_reader)?;

            if self.find() {
                return Ok(true);
            }
        }
    }

    /// Moves the start of the next record past blank lines, refilling the
    /// buffer as needed. Returns false if only blank lines were left.
    fn skip_blank_lines(&mut self) -> Result<bool, ParseError> {
        loop {
            let rest = &self.get_buf()[self.buf_pos.start..];
            let blank = rest
                .iter()
                .take_while(|c| **c == b'\n' || **c == b'\r')
                .count();
            let lines = bytecount::count(&rest[..blank], b'\n');
            self.buf_pos.start += blank;
            self.position.byte += blank as u64;
            self.position.line += lines as u64;

            if self.buf_pos.start < self.get_buf().len() {
                return Ok(true);
            }
            if self.get_buf().len() < self.buf_reader.capacity() {
                self.finished = true;
                return Ok(false);
            }
            self.make_room();
            fill_buf(&mut self.buf_reader)?;
        }
    }

    /// Checks for EOF.
    /// If there is one last record that can be sent, return `true` otherwise `false`.
    fn check_end(&mut self) -> bool {
        self.finished = true;
        if self.search_pos == SearchPosition::Quality {
            // no line ending at end of last record
            self.buf_pos.end = self.get_buf().len();
            return true;
        }

        // It allows some blank lines at the end of the file
        if !is_blank(&self.get_buf()[self.buf_pos.start..]) {
            self.stop("stream ends in the middle of a record");
        }
        false
    }

    // Grow the internal buffer. Used if the initial buffer is not big
    // enough for a record
    fn grow(&mut self) {
        let cap = self.buf_reader.capacity();
        let new_size = grow_to(cap);
        let additional = new_size - cap;
        self.buf_reader.reserve(additional);
    }

    // Consume bytes from records we've seen and move incomplete bytes to start of buffer
    fn make_room(&mut self) {
        let consumed = self.buf_pos.start;
        self.buf_reader.consume(consumed);
        self.buf_reader.make_room();

        self.buf_pos.start = 0;

        if self.search_pos >= SearchPosition::Sequence {
            self.buf_pos.seq -= consumed;
        }
        if self.search_pos >= SearchPosition::Separator {
            self.buf_pos.sep -= consumed;
        }
        if self.search_pos >= SearchPosition::Quality {
            self.buf_pos.qual -= consumed;
        }
    }
}

impl<R: io::Read + Send> FastxReader for Reader<R> {
    fn next(&mut self) -> Option<Result<SequenceRecord<'_>, ParseError>> {
        // No more records to read
        if self.finished {
            return None;
        }

        // Empty buffer, let's fill it
        if self.get_buf().is_empty() {
            // If we get an error when reading or get back 0 bytes, we're done
            match fill_buf(&mut self.buf_reader) {
                Ok(0) => {
                    self.finished = true;
                    return None;
                }
                Ok(_) => {}
                Err(e) => {
                    self.finished = true;
                    return Some(Err(ParseError::from(e).at(self.position.line, Format::Fastq)));
                }
            };
        }

        // If we already did look at a record, let's setup for the next one
        if !self.buf_pos.is_new() {
            self.position.byte += self.buf_pos.len();
            self.position.line += 4;
            self.buf_pos.start = self.buf_pos.end + 1;
        }

        match self.skip_blank_lines() {
            Ok(true) => {}
            Ok(false) => return None,
            Err(e) => {
                self.finished = true;
                return Some(Err(e.at(self.position.line, Format::Fastq)));
            }
        }

        // Can we identify all the positions of each element of the next record?
        // If it's not complete, try to fetch more from the buffer until we have it in full
        if !self.find() {
            match self.next_complete() {
                Ok(true) => {}
                Ok(false) => return None,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e.at(self.position.line, Format::Fastq)));
                }
            }
        }

        if let Some(reason) = self.framing_problem() {
            self.stop(reason);
            return None;
        }

        if self.line_ending.is_none() {
            self.line_ending = self.buf_pos.find_line_ending(self.get_buf());
        }
        // We got one!
        Some(Ok(SequenceRecord::fastq(
            self.get_buf(),
            &self.buf_pos,
            &self.position,
        )))
    }

    fn position(&self) -> &Position {
        &self.position
    }

    fn line_ending(&self) -> Option<LineEnding> {
        self.line_ending
    }
}

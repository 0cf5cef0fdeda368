use crate::parser::fasta::BufferPosition as FastaBufferPosition;
use crate::parser::fastq::BufferPosition as FastqBufferPosition;
use crate::parser::utils::{Format, Position};

/// Where the parts of a record sit in the reader buffer
#[derive(Debug, Clone, Copy)]
enum Layout<'a> {
    Fasta(&'a FastaBufferPosition),
    Fastq(&'a FastqBufferPosition),
}

/// A FASTA or FASTQ record, borrowed from the reader's buffer.
/// It is only valid until the next call to `next`.
#[derive(Debug, Clone, Copy)]
pub struct SequenceRecord<'a> {
    buffer: &'a [u8],
    layout: Layout<'a>,
    position: &'a Position,
}

impl<'a> SequenceRecord<'a> {
    pub(crate) fn fasta(
        buffer: &'a [u8],
        buf_pos: &'a FastaBufferPosition,
        position: &'a Position,
    ) -> Self {
        Self {
            buffer,
            layout: Layout::Fasta(buf_pos),
            position,
        }
    }

    pub(crate) fn fastq(
        buffer: &'a [u8],
        buf_pos: &'a FastqBufferPosition,
        position: &'a Position,
    ) -> Self {
        Self {
            buffer,
            layout: Layout::Fastq(buf_pos),
            position,
        }
    }

    #[inline]
    pub fn format(&self) -> Format {
        match self.layout {
            Layout::Fasta(_) => Format::Fasta,
            Layout::Fastq(_) => Format::Fastq,
        }
    }

    /// Header line without the leading `>`/`@`
    #[inline]
    pub fn id(&self) -> &'a [u8] {
        match self.layout {
            Layout::Fasta(bp) => bp.id(self.buffer),
            Layout::Fastq(bp) => bp.id(self.buffer),
        }
    }

    /// Sequence bytes as stored. A wrapped FASTA sequence keeps its inner line
    /// terminators.
    #[inline]
    pub fn raw_seq(&self) -> &'a [u8] {
        match self.layout {
            Layout::Fasta(bp) => bp.raw_seq(self.buffer),
            Layout::Fastq(bp) => bp.seq(self.buffer),
        }
    }

    /// Length of the sequence, line terminators excluded
    #[inline]
    pub fn num_bases(&self) -> usize {
        match self.layout {
            Layout::Fasta(bp) => bp.num_bases(self.buffer),
            Layout::Fastq(bp) => bp.num_bases(self.buffer),
        }
    }

    /// Line of the header, counting from 1
    pub fn start_line_number(&self) -> u64 {
        self.position.line
    }

    pub fn position(&self) -> &'a Position {
        self.position
    }
}

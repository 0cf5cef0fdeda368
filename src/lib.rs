#![crate_name = "fast_count"]
//! Sequence count, total length and N01/N10/N50/N90/N99 length thresholds for
//! FASTA/FASTQ files, plain or compressed.
//!
//! ```
//! use fast_count::report::summarize_reader;
//!
//! let fasta = b">a\nACGTACGT\n>b\nACGT\n>c\nAC\nGT\n";
//! let summary = summarize_reader("seqs.fa", &fasta[..]).unwrap();
//! assert_eq!(summary.to_string(), "seqs.fa\t3\t16\t4\t4\t8\t8\t8");
//! ```
pub mod errors;
pub mod parser;
pub mod report;
pub mod stats;

pub use errors::{ParseError, ParseErrorKind};
pub use parser::{parse_fastx_file, parse_fastx_reader, FastxReader};

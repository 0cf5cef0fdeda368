use fast_count::parse_fastx_file;
use fast_count::report::summarize_path;

const TEST_FILES: [&str; 3] = [
    "./tests/data/test.fa.gz",
    "./tests/data/test.fa.bz2",
    "./tests/data/test.fa.xz",
];

#[cfg(feature = "compression")]
#[test]
fn can_read_compressed_files_automatically() {
    use fast_count::parser::Format;
    for p in &TEST_FILES {
        let mut reader = parse_fastx_file(p).unwrap();
        let mut i = 0;
        while let Some(record) = reader.next() {
            let seq = record.unwrap();
            assert_eq!(seq.format(), Format::Fasta);

            match i {
                0 => {
                    assert_eq!(seq.id(), b"test");
                    assert_eq!(seq.raw_seq(), b"AGCTGATCGA");
                }
                1 => {
                    assert_eq!(seq.id(), b"test2");
                    assert_eq!(seq.raw_seq(), b"TAGC");
                }
                _ => unreachable!("Too many records"),
            }
            i += 1;
        }
        assert_eq!(i, 2);
    }
}

#[cfg(feature = "compression")]
#[test]
fn compressed_and_plain_give_the_same_stats() {
    let plain = summarize_path("./tests/data/test.fa").unwrap();
    for p in &TEST_FILES {
        let summary = summarize_path(p).unwrap();
        assert_eq!(summary.seq_count, plain.seq_count);
        assert_eq!(summary.total_length, plain.total_length);
        assert_eq!(summary.thresholds, plain.thresholds);
    }
}

#[cfg(feature = "compression")]
#[test]
fn reads_every_gzip_member() {
    let summary = summarize_path("./tests/data/multi_member.fq.gz").unwrap();
    assert_eq!(summary.seq_count, 2);
    assert_eq!(summary.total_length, 15);
}

#[cfg(feature = "compression")]
#[test]
fn corrupt_gzip_is_a_decode_error() {
    use fast_count::ParseErrorKind;
    let err = summarize_path("./tests/data/corrupt.fa.gz").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Decode);
}

#[cfg(not(feature = "compression"))]
#[test]
fn errors_on_compressed_files() {
    for p in &TEST_FILES {
        assert!(parse_fastx_file(p).is_err());
    }
}

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fast_count::report::summarize_reader;
use fast_count::stats::LengthStats;

fn make_fastq(n_records: usize) -> Vec<u8> {
    let mut data = Vec::new();
    for i in 0..n_records {
        let len = 50 + (i * 7919) % 250;
        data.extend_from_slice(format!("@read{}\n", i).as_bytes());
        data.extend(std::iter::repeat(b'A').take(len));
        data.extend_from_slice(b"\n+\n");
        data.extend(std::iter::repeat(b'I').take(len));
        data.push(b'\n');
    }
    data
}

fn make_fasta(n_records: usize) -> Vec<u8> {
    let mut data = Vec::new();
    for i in 0..n_records {
        let len = 500 + (i * 104_729) % 5_000;
        data.extend_from_slice(format!(">contig{}\n", i).as_bytes());
        for chunk in vec![b'C'; len].chunks(60) {
            data.extend_from_slice(chunk);
            data.push(b'\n');
        }
    }
    data
}

fn bench_summaries(c: &mut Criterion) {
    let fastq = make_fastq(20_000);
    let fasta = make_fasta(2_000);

    let mut group = c.benchmark_group("summarize");
    group.sample_size(20);
    group.bench_function("fastq", |b| {
        b.iter(|| summarize_reader("bench.fq", black_box(&fastq[..])).unwrap())
    });
    group.bench_function("wrapped fasta", |b| {
        b.iter(|| summarize_reader("bench.fa", black_box(&fasta[..])).unwrap())
    });
    group.finish();
}

fn bench_thresholds(c: &mut Criterion) {
    let lengths: Vec<usize> = (0..1_000_000).map(|i| (i * 7919) % 30_000 + 1).collect();
    c.bench_function("thresholds 1M lengths", |b| {
        b.iter(|| {
            let stats: LengthStats = lengths.iter().copied().collect();
            black_box(stats.thresholds())
        })
    });
}

criterion_group!(benches, bench_summaries, bench_thresholds);
criterion_main!(benches);

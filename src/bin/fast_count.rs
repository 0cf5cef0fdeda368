use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fast_count::report::{summarize_path, HEADER};
use tracing::warn;

/// Prints the sequence count, total length and N99/N90/N50/N10/N01 of
/// FASTA/FASTQ files (plain, gzip, bzip2 or xz), one tab-separated row per file.
/// Without any file, prints the header row.
#[derive(Parser)]
#[command(name = "fast_count", version, about, long_about = None)]
struct Cli {
    /// FASTA/FASTQ files to summarize. Names starting with '-' are taken as files too
    #[arg(allow_hyphen_values = true)]
    files: Vec<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if cli.files.is_empty() {
        writeln!(out, "{}", HEADER).context("failed to write to stdout")?;
    }

    for path in &cli.files {
        match summarize_path(path) {
            Ok(summary) => summary
                .write_row(&mut out)
                .context("failed to write to stdout")?,
            Err(e) => warn!(path = %path.display(), "skipping file: {}", e),
        }
    }

    out.flush().context("failed to write to stdout")?;
    Ok(())
}

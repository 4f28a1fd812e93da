use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

/// Restore a file written by `encode`.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Compressed file.
    input: PathBuf,
    /// Where to write the decoded bytes.
    output: PathBuf,
    /// Do not print the summary.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    info!("--- Start Decoding ---");
    info!("Reading encoded file: {}", args.input.display());
    let file = File::open(&args.input)
        .with_context(|| format!("open input {}", args.input.display()))?;
    let mut reader = BufReader::new(file);

    let out = File::create(&args.output)
        .with_context(|| format!("create output {}", args.output.display()))?;
    let mut writer = BufWriter::new(out);

    let summary = bytehuff::decode(&mut reader, &mut writer)
        .with_context(|| format!("decode {}", args.input.display()))?;
    writer.flush().context("flush output")?;
    info!("Write successful.");

    if !args.quiet {
        println!(
            "✅ Decoding successful.\n\
             📂 Input:        {} ({} bytes)\n\
             💾 Output:       {} ({} bytes)\n\
             🔣 Symbols:      {}\n\
             🗜️ Ratio:        {:.2}% (encoded relative to decoded)",
            args.input.display(),
            summary.input_bytes,
            args.output.display(),
            summary.output_bytes,
            summary.symbols,
            summary.ratio() * 100.0
        );
    }

    info!("--- End ---");
    Ok(())
}

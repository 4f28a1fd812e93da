use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use bytehuff::{Encoder, FrequencyTable};
use clap::Parser;
use log::{debug, info};

/// Compress a file with a byte-level Huffman code.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// File to compress.
    input: PathBuf,
    /// Where to write the compressed file.
    output: PathBuf,
    /// Decode the written file and compare it with the input.
    #[arg(long)]
    verify: bool,
    /// Do not print the summary.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    info!("--- Start Encoding ---");
    let file = File::open(&args.input)
        .with_context(|| format!("open input {}", args.input.display()))?;
    let mut reader = BufReader::new(file);

    let frequencies = FrequencyTable::from_reader(&mut reader).context("read input")?;
    let total = frequencies.total();
    debug!(
        "Read {} bytes, {} unique symbols",
        total,
        frequencies.distinct()
    );

    let encoder = Encoder::from_frequencies(&frequencies).context("build code table")?;
    reader.seek(SeekFrom::Start(0)).context("rewind input")?;

    let out = File::create(&args.output)
        .with_context(|| format!("create output {}", args.output.display()))?;
    let mut writer = BufWriter::new(out);
    let summary = encoder
        .encode(&mut reader, &mut writer, total)
        .context("encode input")?;
    writer.flush().context("flush output")?;
    info!("Write successful.");

    if args.verify {
        verify(&args)?;
        info!("Verified {} against {}", args.output.display(), args.input.display());
    }

    if !args.quiet {
        let average_bits = if total > 0 {
            encoder.table().encoded_bits(&frequencies) as f64 / total as f64
        } else {
            0.0
        };
        println!(
            "✅ Encoding successful.\n\
             📂  Input:       {} ({} bytes)\n\
             💾  Output:      {} ({} bytes)\n\
             🔣  Symbols:     {}\n\
             ℹ️  Entropy:     {:.4} bits/symbol\n\
             📏  Avg code:    {:.4} bits/symbol\n\
             🗜️  Ratio:       {:.2}%",
            args.input.display(),
            summary.input_bytes,
            args.output.display(),
            summary.output_bytes(),
            summary.symbols,
            frequencies.entropy(),
            average_bits,
            summary.ratio() * 100.0
        );
    }

    info!("--- End ---");
    Ok(())
}

fn verify(args: &Args) -> Result<()> {
    let original = fs::read(&args.input).context("re-read input")?;
    let packed = fs::read(&args.output).context("read back output")?;
    let decoded = bytehuff::decompress(&packed).context("decode written output")?;
    if decoded != original {
        bail!(
            "verification failed: decoded {} bytes, expected {}",
            decoded.len(),
            original.len()
        );
    }
    Ok(())
}

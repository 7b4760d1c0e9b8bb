use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};

use static_huffman::{
    build_code_table, CodecOptions, Compressor, Framing, OverwritePolicy, UnknownSymbolPolicy, WriteOutcome
};


#[derive(Parser)]
#[command(author, version, about)]
struct Cli {

    /// Log more (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,

}


#[derive(Subcommand)]
enum Commands {

    /// Build a code table from a text file
    BuildTable {
        #[arg(value_name = "TEXT")]
        text: PathBuf,
        #[arg(value_name = "TABLE")]
        table: PathBuf,
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Compress text files with a code table
    Compress {
        #[command(flatten)]
        codec: CodecArgs,
        #[command(flatten)]
        source: SourceArgs,
        /// Output file, or output directory when several inputs are given
        #[arg(value_name = "OUT")]
        output: PathBuf,
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Decompress a file with the table it was compressed with
    Decompress {
        #[command(flatten)]
        codec: CodecArgs,
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        #[arg(value_name = "OUT")]
        output: PathBuf,
    },

    /// Print how well a table compresses a text file
    Stats {
        #[command(flatten)]
        codec: CodecArgs,
        #[command(flatten)]
        source: SourceArgs,
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },

}


#[derive(Args)]
struct CodecArgs {

    #[arg(long, value_name = "TABLE")]
    table: PathBuf,

    /// Store the padding length in a header byte
    #[arg(long)]
    framed: bool,

    /// Fail on characters missing from the table instead of skipping them
    #[arg(long)]
    strict: bool,

    #[arg(long, value_enum, default_value_t = Overwrite::Ask)]
    overwrite: Overwrite,

}

impl CodecArgs {

    fn options(&self) -> CodecOptions {
        CodecOptions {
            framing: if self.framed { Framing::PaddingHeader } else { Framing::Raw },
            unknown_symbols: if self.strict { UnknownSymbolPolicy::Fail } else { UnknownSymbolPolicy::Skip }
        }
    }


    fn compressor(&self) -> anyhow::Result<Compressor> {
        Compressor::from_table_file(&self.table, self.options())
            .with_context(|| format!("could not load codes from {}", self.table.display()))
    }


    fn overwrite_policy(&self) -> OverwritePolicy<'static> {
        match self.overwrite {
            Overwrite::Always => OverwritePolicy::Always,
            Overwrite::Never => OverwritePolicy::Never,
            Overwrite::Ask => OverwritePolicy::ask(confirm_overwrite)
        }
    }

}


#[derive(Args)]
struct SourceArgs {

    /// Keep leading and trailing whitespace of every line
    #[arg(long)]
    keep_whitespace: bool,

}


#[derive(Clone, Copy, ValueEnum)]
enum Overwrite {
    Always,
    Never,
    Ask,
}


/// Reads a text file, stripping every line unless `keep_whitespace` is set.
fn read_text(path: &Path, source: &SourceArgs) -> anyhow::Result<String> {

    let text = fs::read_to_string(path)
        .with_context(|| format!("could not read {}", path.display()))?;

    if source.keep_whitespace {
        return Ok(text);
    }

    Ok(
        text.lines()
            .map(|line| format!("{}\n", line.trim()))
            .collect()
    )
}


/// Asks on the terminal until the answer is "y" or "n".
fn confirm_overwrite(path: &Path) -> bool {

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        println!("A file {} already exists.\nDo you wish to overwrite it? (y/n)", path.display());
        let _ = io::stdout().flush();

        match lines.next() {
            Some(Ok(answer)) => match answer.trim().to_lowercase().as_str() {
                "y" => return true,
                "n" => {
                    println!("Not overwriting.");
                    return false;
                },
                _ => {}
            },
            // No more input: keep the existing file
            _ => return false
        }
    }
}


fn compress(codec: &CodecArgs, source: &SourceArgs, output: &Path, inputs: &[PathBuf]) -> anyhow::Result<()> {

    let compressor = codec.compressor()?;
    let mut overwrite = codec.overwrite_policy();

    let batch = inputs.len() > 1;
    if batch && !output.is_dir() {
        bail!("{} must be a directory when compressing several files", output.display());
    }

    for input in inputs {

        let text = read_text(input, source)?;

        let target = if batch {
            let name = input.file_stem()
                .with_context(|| format!("{} has no file name", input.display()))?;
            output.join(name).with_extension("bin")
        } else {
            output.to_path_buf()
        };

        let outcome = compressor.compress_to_file(&text, &target, &mut overwrite)
            .with_context(|| format!("could not compress {}", input.display()))?;

        if outcome == WriteOutcome::Written {
            println!("{} -> {}", input.display(), target.display());
        }
    }

    Ok(())
}


fn stats(codec: &CodecArgs, source: &SourceArgs, input: &Path) -> anyhow::Result<()> {

    let compressor = codec.compressor()?;
    let text = read_text(input, source)?;

    let compressed = compressor.encode(&text)?;

    let original_size = text.len();
    let compressed_size = compressed.len();

    println!("Original size: {} bytes\nCompressed size: {} bytes\nCompression ratio: {:.2}%",
        original_size, compressed_size, compressed_size as f64 / original_size.max(1) as f64 * 100.0);

    Ok(())
}


fn main() -> anyhow::Result<()> {

    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match &cli.command {

        Commands::BuildTable { text, table, source } => {
            let codes = build_code_table(&read_text(text, source)?);
            if codes.is_empty() {
                bail!("{} needs at least 3 distinct characters to build a table", text.display());
            }
            codes.save(table)?;
        },

        Commands::Compress { codec, source, output, inputs } => {
            compress(codec, source, output, inputs)?;
        },

        Commands::Decompress { codec, input, output } => {
            let compressor = codec.compressor()?;
            let decoded = compressor.decompress_file(input, output, &mut codec.overwrite_policy())
                .with_context(|| format!("could not decompress {}", input.display()))?;
            if decoded.unknown_count() != 0 {
                log::warn!("{} undecodable bit runs in {}", decoded.unknown_count(), input.display());
            }
        },

        Commands::Stats { codec, source, input } => {
            stats(codec, source, input)?;
        },
    }

    Ok(())
}

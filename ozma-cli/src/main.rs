//! Ozma CLI - LZMA1 compression from the command line.
//!
//! Reads one named file, writes the result to standard output, and reports
//! failures on standard error with exit code 1.

use clap::{Parser, Subcommand};
use ozma_codec::{LzmaParams, compress};
use ozma_core::error::Result;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "ozma")]
#[command(author, version, about = "Pure Rust LZMA1 compressor")]
#[command(long_about = "
Ozma compresses and decompresses classic .lzma streams.

Examples:
  ozma compress file.txt > file.txt.lzma
  ozma compress -l 9 file.txt > file.txt.lzma
  ozma decompress file.txt.lzma > file.txt
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file to stdout
    #[command(alias = "c")]
    Compress {
        /// File to compress
        file: PathBuf,

        /// Compression level (0-9)
        #[arg(short, long, default_value_t = 5)]
        level: u8,

        /// Emit an explicit end marker even though the size is known
        #[arg(long)]
        end_mark: bool,
    },

    /// Decompress a .lzma file to stdout
    #[command(alias = "d")]
    Decompress {
        /// File to decompress
        file: PathBuf,
    },
}

fn run(cli: Cli) -> Result<()> {
    let output = match cli.command {
        Commands::Compress {
            file,
            level,
            end_mark,
        } => {
            let data = std::fs::read(&file)?;
            let mut params = LzmaParams::from_level(level);
            params.write_end_mark = end_mark;
            compress(&data, params)?
        }
        Commands::Decompress { file } => {
            let data = std::fs::read(&file)?;
            ozma_codec::decompress_bytes(&data)?
        }
    };

    let mut stdout = io::stdout().lock();
    stdout.write_all(&output)?;
    stdout.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ozma: {err}");
            ExitCode::FAILURE
        }
    }
}

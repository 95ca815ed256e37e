//! Foldpack CLI - pack directories into a single compressed archive and back.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use foldpack::{Archive, Compressor, Config, Lz4Compressor, ZstdCompressor};

/// Foldpack - directory archiver
#[derive(Parser)]
#[command(name = "foldpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log every file as it is processed
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Common {
    /// TOML file with limits and compression level
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use LZ4 instead of zstd
    #[arg(long)]
    lz4: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack files and directories into an archive
    Pack {
        /// Files or directories to pack
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Archive to write
        #[arg(short, long)]
        output: PathBuf,

        /// Compression level (overrides the config file)
        #[arg(short, long, allow_hyphen_values = true)]
        level: Option<i32>,

        /// Only pack the top level of each directory
        #[arg(long)]
        no_recursive: bool,

        #[command(flatten)]
        common: Common,
    },

    /// Extract an archive into a directory
    Unpack {
        /// Archive to read
        archive: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Extract even if the output directory exists
        #[arg(long)]
        overwrite: bool,

        #[command(flatten)]
        common: Common,
    },

    /// List the entries of an archive
    List {
        /// Archive to read
        archive: PathBuf,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        common: Common,
    },
}

#[derive(Serialize)]
struct ListedEntry<'a> {
    index: usize,
    path: &'a str,
    offset: usize,
    length: u32,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Pack {
            inputs,
            output,
            level,
            no_recursive,
            common,
        } => {
            cmd_pack(&inputs, &output, level, !no_recursive, &common)?;
        }
        Commands::Unpack {
            archive,
            output,
            overwrite,
            common,
        } => {
            cmd_unpack(&archive, &output, overwrite, &common)?;
        }
        Commands::List {
            archive,
            json,
            common,
        } => {
            cmd_list(&archive, json, &common)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(common: &Common) -> Result<Config> {
    match &common.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn compressor(common: &Common) -> &'static dyn Compressor {
    if common.lz4 {
        &Lz4Compressor
    } else {
        &ZstdCompressor
    }
}

fn cmd_pack(
    inputs: &[PathBuf],
    output: &Path,
    level: Option<i32>,
    recursive: bool,
    common: &Common,
) -> Result<()> {
    let mut config = load_config(common)?;
    if let Some(level) = level {
        config.compression_level = level;
    }
    config.validate().context("Invalid compression settings")?;

    let mut archive = Archive::with_limits(config.limits);
    for input in inputs {
        if input.is_dir() {
            archive
                .add_directory(input, recursive)
                .with_context(|| format!("Failed to add directory {}", input.display()))?;
        } else {
            archive
                .add_file(input)
                .with_context(|| format!("Failed to add file {}", input.display()))?;
        }
    }

    let stats = archive
        .to_file_with(compressor(common), output, config.compression_level)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Number of files: {}", stats.entry_count);
    println!(
        "Original size:   {} b -- {} kb",
        stats.raw_size,
        stats.raw_size / 1024
    );
    println!(
        "Compressed size: {} b -- {} kb",
        stats.compressed_size,
        stats.compressed_size / 1024
    );
    Ok(())
}

fn read_archive(path: &Path, common: &Common) -> Result<Archive> {
    let config = load_config(common)?;
    Archive::from_file_with(compressor(common), path, config.limits)
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn cmd_unpack(archive: &Path, output: &Path, overwrite: bool, common: &Common) -> Result<()> {
    let archive = read_archive(archive, common)?;
    let written = archive
        .extract_to(output, overwrite)
        .with_context(|| format!("Failed to extract into {}", output.display()))?;

    println!("Extracted {} files to {}", written, output.display());
    Ok(())
}

fn cmd_list(archive: &Path, json: bool, common: &Common) -> Result<()> {
    let archive = read_archive(archive, common)?;

    let mut offset = 0;
    let listed: Vec<ListedEntry> = archive
        .entries()
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let item = ListedEntry {
                index,
                path: &entry.path,
                offset,
                length: entry.length,
            };
            offset += entry.length as usize;
            item
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&listed)?);
    } else {
        for item in &listed {
            println!("{:>10}  {}", item.length, item.path);
        }
        println!(
            "{} files, {} bytes",
            archive.len(),
            archive.content_length()
        );
    }
    Ok(())
}

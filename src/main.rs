use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use splice_paths::{load_bundles, save_snapshot, Assembler, PathFinderConfig};

/// Reconstruct isoforms from locus splice graphs.
#[derive(Parser, Debug)]
#[command(name = "splice-paths")]
#[command(author, version, about)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enumerate isoforms for every locus and print them as BED12 lines
    Assemble(AssembleArgs),

    /// Print a graph summary for every locus
    Stats(StatsArgs),

    /// Convert a JSON bundle file into a binary snapshot
    Pack(PackArgs),
}

#[derive(Args, Debug)]
struct AssembleArgs {
    /// Locus bundle file (.json, .json.gz or snapshot)
    #[arg(long, short)]
    input: PathBuf,

    /// Stop once a path scores below this fraction of the best path of its TSS
    #[arg(long, default_value_t = PathFinderConfig::default().fraction_major_path)]
    fraction_major_path: f64,

    /// Maximum isoforms per TSS
    #[arg(long, default_value_t = PathFinderConfig::default().max_paths)]
    max_paths: usize,

    /// Maximum best-path searches per TSS
    #[arg(long, default_value_t = PathFinderConfig::default().max_iters)]
    max_iters: usize,
}

#[derive(Args, Debug)]
struct StatsArgs {
    /// Locus bundle file (.json, .json.gz or snapshot)
    #[arg(long, short)]
    input: PathBuf,
}

#[derive(Args, Debug)]
struct PackArgs {
    /// JSON bundle file (.json or .json.gz)
    #[arg(long, short)]
    input: PathBuf,

    /// Output snapshot file
    #[arg(long, short)]
    output: PathBuf,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.cmd {
        Command::Assemble(args) => {
            let config = PathFinderConfig {
                fraction_major_path: args.fraction_major_path,
                max_paths: args.max_paths,
                max_iters: args.max_iters,
            };
            let mut asm = Assembler::new(config).context("invalid path finder parameters")?;

            let bundles = load_bundles(&args.input)
                .with_context(|| format!("reading bundles from {}", args.input.display()))?;

            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            let mut isoforms = 0usize;
            for (i, bundle) in bundles.into_iter().enumerate() {
                let locus = bundle
                    .into_locus()
                    .with_context(|| format!("building locus #{i}"))?;
                let records = asm
                    .assemble_locus(&locus)
                    .with_context(|| format!("assembling locus #{i} ({locus})"))?;
                for r in &records {
                    writeln!(out, "{r}")?;
                }
                isoforms += records.len();
            }
            out.flush()?;

            tracing::info!(loci = asm.loci_processed(), isoforms, "assembly finished");
        }

        Command::Stats(args) => {
            let bundles = load_bundles(&args.input)
                .with_context(|| format!("reading bundles from {}", args.input.display()))?;
            for (i, bundle) in bundles.into_iter().enumerate() {
                let locus = bundle
                    .into_locus()
                    .with_context(|| format!("building locus #{i}"))?;
                println!("{locus}");
            }
        }

        Command::Pack(args) => {
            let bundles = load_bundles(&args.input)
                .with_context(|| format!("reading bundles from {}", args.input.display()))?;

            // store built graphs so later runs skip chaining
            let bundles = bundles
                .into_iter()
                .enumerate()
                .map(|(i, b)| {
                    let locus = b.into_locus().with_context(|| format!("building locus #{i}"))?;
                    Ok(splice_paths::LocusBundle::from_locus(&locus))
                })
                .collect::<Result<Vec<_>>>()?;

            save_snapshot(&bundles, &args.output)
                .with_context(|| format!("writing snapshot to {}", args.output.display()))?;

            eprintln!("{} loci written to {}", bundles.len(), args.output.display());
        }
    }

    Ok(())
}

//! PolyScop Command Line Interface
//!
//! Usage:
//!   polyscop [OPTIONS] <input-file>
//!   polyscop --help
//!
//! Examples:
//!   polyscop kernel.json                 # Extract and print to stdout
//!   polyscop -o kernel.scop kernel.json  # Write the interchange text
//!   polyscop --emit=model kernel.json    # Dump the extracted model
//!
//! The input file holds the JSON-serialized statement tree produced by a
//! front-end; this binary only drives the extractor and writes its output.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, error, info};
use polyscop::ir::ast::Stmt;
use std::fs;
use std::path::PathBuf;

/// PolyScop - Affine program extractor
#[derive(Parser, Debug)]
#[command(name = "polyscop")]
#[command(version)]
#[command(about = "Extracts a polyhedral model and emits interchange text", long_about = None)]
struct Cli {
    /// Input file holding the serialized statement tree (JSON)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// What to emit
    #[arg(long, default_value = "openscop")]
    emit: EmitKind,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress warnings)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EmitKind {
    /// Interchange matrix text
    Openscop,
    /// The extracted model (debug dump)
    Model,
    /// The input tree as parsed (debug dump)
    Tree,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.quiet {
        log::LevelFilter::Error
    } else {
        match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    info!("PolyScop v{}", polyscop::VERSION);
    debug!("Input file: {:?}", cli.input);

    // Read the serialized tree
    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read input file: {:?}", cli.input))?;
    let program: Vec<Stmt> = serde_json::from_str(&source)
        .with_context(|| format!("Failed to decode statement tree from {:?}", cli.input))?;

    if matches!(cli.emit, EmitKind::Tree) {
        return write_output(&cli.output, &format!("{:#?}", program));
    }

    // Extract
    info!("Extracting...");
    let scop = match polyscop::extract(&program) {
        Ok(scop) => scop,
        Err(e) => {
            error!("Extraction failed: {}", e);
            return Err(e.into());
        }
    };
    info!(
        "Extracted {} statement(s), {} parameter(s)",
        scop.n_statements(),
        scop.context.n_params()
    );

    let output = match cli.emit {
        EmitKind::Openscop => polyscop::emit::emit(&scop),
        EmitKind::Model => format!("{:#?}", scop),
        EmitKind::Tree => unreachable!(),
    };
    write_output(&cli.output, &output)
}

fn write_output(path: &Option<PathBuf>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("Failed to write output file: {:?}", path))?;
            info!("Wrote {:?}", path);
        }
        None => print!("{}", content),
    }
    Ok(())
}

// stackc: parse, resolve and type a source file, then print the typed tree

use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "stackc")]
#[command(about = "Parse, resolve and type a source file for the stack machine")]
struct Args {
    /// Source file to parse
    file: PathBuf,

    /// Print the typed tree as JSON instead of an outline
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// `RUST_LOG` overrides the level picked from the `-v` count
fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "stackc=debug",
            _ => "stackc=trace",
        })
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<()> {
    let source = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read '{}'", args.file.display()))?;

    info!("Parsing {}", args.file.display());

    let tokens = stackc::tokenize(&source)?;
    debug!(tokens = tokens.len(), "source tokenized");

    let module = stackc::parse(&tokens)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&module)?);
    } else {
        print!("{}", module);
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

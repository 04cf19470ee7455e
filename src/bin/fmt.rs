//! Carch Format CLI
//!
//! Rewrites schema files in canonical layout, or checks that they already are.

use anyhow::Context;
use carch::format::{self, Skipped};
use carch::{sources, CarchConfig, FormatStyle};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "carch-fmt")]
#[command(about = "Format Carch schema files")]
struct Cli {
    /// Schema files or directories containing .carch files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Report files that need formatting instead of rewriting them
    #[arg(long)]
    check: bool,

    /// Layout: compact, expanded or auto (overrides configuration)
    #[arg(long)]
    style: Option<FormatStyle>,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns false if a file failed to parse, or needs formatting under --check
fn run(cli: Cli) -> anyhow::Result<bool> {
    let mut config = CarchConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    if let Some(style) = cli.style {
        config.format.style = style;
    }

    let mut passed = true;
    for path in sources::collect(&cli.inputs)? {
        let original = sources::read(&path)?;
        let formatted = match format::format_source(&original, &config.format) {
            Ok(formatted) => formatted,
            Err(Skipped::HasComments) => {
                info!(path = %path.display(), "skipping file with comments");
                println!("⏭️  {} contains comments; left unchanged", path.display());
                continue;
            }
            Err(Skipped::Invalid(diagnostics)) => {
                println!("❌ {} could not be parsed", path.display());
                for diagnostic in &diagnostics {
                    println!("   {}", diagnostic);
                }
                passed = false;
                continue;
            }
        };

        if formatted == original {
            continue;
        }
        let name = path.to_string_lossy().to_string();
        if cli.check {
            println!("❌ {} needs formatting", name);
            print!("{}", format::diff(&name, &original, &formatted));
            passed = false;
        } else {
            sources::write(&path, &formatted)?;
            println!("✅ Formatted {}", name);
        }
    }

    Ok(passed)
}

//! Carch Lint CLI
//!
//! Style checks (naming, size, nesting) for schema files.

use anyhow::Context;
use carch::lint::{lint_paths, FileLint};
use carch::CarchConfig;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "carch-lint")]
#[command(about = "Check Carch schema files for style issues")]
struct Cli {
    /// Schema files or directories containing .carch files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Treat warnings as errors
    #[arg(long)]
    strict: bool,

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

/// Returns false if any error-severity issue or unparsable file was found
fn run(cli: Cli) -> anyhow::Result<bool> {
    let mut config = CarchConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    if cli.strict {
        config.lint.strict = true;
    }

    let mut passed = true;
    let mut warnings = 0;
    let mut errors = 0;

    for outcome in lint_paths(&cli.inputs, &config.lint)? {
        match outcome {
            FileLint::Linted(result) => {
                for issue in result.issues() {
                    println!("{}", issue.render(&result.source_name));
                }
                warnings += result.warnings.len();
                errors += result.errors.len();
                passed &= result.is_clean();
            }
            FileLint::Unparsable { path, diagnostics } => {
                println!("❌ {} could not be parsed; fix syntax errors before linting", path.display());
                for diagnostic in &diagnostics {
                    println!("   {}", diagnostic);
                }
                passed = false;
            }
        }
    }

    if warnings + errors > 0 {
        println!();
        println!("{} error(s), {} warning(s)", errors, warnings);
    }

    Ok(passed)
}

//! Carch Validator CLI
//!
//! Re-runs the tokenizer, parser and semantic analyzer over schema files and
//! reports pass/fail for each.

use anyhow::{bail, Context};
use carch::lint::SchemaLinter;
use carch::{sources, CarchConfig, Diagnostics};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "carch-validate")]
#[command(about = "Validate Carch schema files")]
struct Cli {
    /// Schema files or directories containing .carch files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Print a JSON report instead of text
    #[arg(long)]
    json: bool,

    /// Write the definition dependency graph as DOT (single input only)
    #[arg(long, value_name = "FILE")]
    graph: Option<PathBuf>,

    /// Also fail on style lint findings
    #[arg(long)]
    pedantic: bool,

    /// Configuration file (lint thresholds for --pedantic)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Serialize)]
struct FileReport {
    path: PathBuf,
    valid: bool,
    diagnostics: Diagnostics,
    /// Rendered lint findings (with --pedantic)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    lint: Vec<String>,
}

#[derive(Serialize)]
struct ValidationReport {
    files: Vec<FileReport>,
    valid: usize,
    failed: usize,
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

/// Returns whether every input passed
fn run(cli: Cli) -> anyhow::Result<bool> {
    let files = sources::collect(&cli.inputs)?;
    if cli.graph.is_some() && files.len() != 1 {
        bail!("--graph needs exactly one schema file, found {}", files.len());
    }

    let linter = if cli.pedantic {
        let config = CarchConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
        Some(SchemaLinter::new(config.lint)?)
    } else {
        None
    };

    let mut report = ValidationReport {
        files: Vec::new(),
        valid: 0,
        failed: 0,
    };

    for path in files {
        let source = sources::read(&path)?;
        let name = path.to_string_lossy().to_string();

        let (diagnostics, lint) = match carch::compile(&source) {
            Ok(schema) => {
                if let Some(graph_path) = &cli.graph {
                    sources::write(graph_path, &schema.graph().to_dot())?;
                }
                let lint = match &linter {
                    Some(linter) => linter
                        .lint(&name, schema.schema())
                        .issues()
                        .iter()
                        .map(|issue| issue.render(&name))
                        .collect(),
                    None => Vec::new(),
                };
                (Diagnostics::new(), lint)
            }
            Err(diagnostics) => (diagnostics, Vec::new()),
        };

        let valid = diagnostics.is_empty() && lint.is_empty();
        if valid {
            report.valid += 1;
        } else {
            report.failed += 1;
        }
        report.files.push(FileReport {
            path,
            valid,
            diagnostics,
            lint,
        });
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(report.failed == 0)
}

fn print_report(report: &ValidationReport) {
    for file in &report.files {
        if file.valid {
            println!("✅ {} is valid", file.path.display());
            continue;
        }
        println!("❌ {}", file.path.display());
        for diagnostic in &file.diagnostics {
            println!("   {}", diagnostic);
        }
        for finding in &file.lint {
            println!("   {}", finding);
        }
    }

    if report.files.len() > 1 {
        println!();
        println!("{} valid, {} failed", report.valid, report.failed);
    }
}

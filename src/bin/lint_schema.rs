//! Lint frame schema files: layout (overlaps, gaps, bounds), decoder widths, markers.
//!
//! Usage:
//!   lint_schema [--human] [FILE.schema ...]
//!   lint_schema < file.schema
//!
//! With no files, reads stdin. Built-in models can be checked with `--builtin`.
//! Exit code 1 if any error-level finding (or a file that does not parse).

use anyhow::Result;
use clap::Parser;
use ktframe::lint::{lint, LintMessage, Severity};
use ktframe::{parse, Model};
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lint_schema", version, about = "Lint frame schema files")]
struct Cli {
    /// Human-readable output.
    #[arg(short = 'H', long)]
    human: bool,

    /// Also lint the schemas embedded in the crate.
    #[arg(long)]
    builtin: bool,

    /// Schema files. Reads stdin when none are given and --builtin is not set.
    files: Vec<PathBuf>,
}

#[derive(Clone, Copy)]
enum OutputStyle {
    Compact,
    Human,
}

#[derive(Default)]
struct Totals {
    errors: usize,
    warnings: usize,
    failed: bool,
}

fn print_message(path: &str, schema: &str, m: &LintMessage, style: OutputStyle) {
    let severity_str = match m.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    };
    let field = m.field.as_deref().unwrap_or("-");
    match style {
        OutputStyle::Compact => {
            println!(
                "{}:{}:{}: {}: {} [{}]",
                path,
                schema,
                field,
                severity_str,
                m.message,
                m.rule.id()
            );
        }
        OutputStyle::Human => {
            println!("  {} schema {} field {}: {}", path, schema, field, m.message);
            println!("    rule: {} ({})", m.rule.id(), severity_str);
        }
    }
}

fn lint_source(path: &str, src: &str, style: OutputStyle, totals: &mut Totals) {
    let file = match parse(src) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("{}: {}", path, e);
            totals.failed = true;
            return;
        }
    };
    if file.schemas.is_empty() {
        eprintln!("{}: no schema sections", path);
    }
    for section in &file.schemas {
        let messages = lint(section);
        for m in &messages {
            match m.severity {
                Severity::Error => totals.errors += 1,
                Severity::Warning => totals.warnings += 1,
            }
            print_message(path, &section.name, m, style);
        }
        if messages.iter().any(|m| m.severity == Severity::Error) {
            totals.failed = true;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let style = if cli.human {
        OutputStyle::Human
    } else {
        OutputStyle::Compact
    };
    let mut totals = Totals::default();

    if cli.builtin {
        for m in Model::ALL {
            lint_source(&format!("<builtin:{}>", m), m.source(), style, &mut totals);
        }
    }
    if cli.files.is_empty() && !cli.builtin {
        let mut src = String::new();
        io::stdin().read_to_string(&mut src)?;
        lint_source("<stdin>", &src, style, &mut totals);
    }
    for path in &cli.files {
        let src = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                totals.failed = true;
                continue;
            }
        };
        lint_source(&path.display().to_string(), &src, style, &mut totals);
    }

    if totals.errors > 0 || totals.warnings > 0 {
        eprintln!("lint: {} error(s), {} warning(s)", totals.errors, totals.warnings);
    }
    if totals.failed {
        std::process::exit(1);
    }
    Ok(())
}

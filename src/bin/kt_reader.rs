//! Read KT series frames from a capture file, a serial device node, or stdin, and
//! write one CSV file per decoded frame.
//!
//! Usage:
//!   kt_reader --input /dev/ttyUSB0 --model kt-classic --output-dir results
//!   kt_reader --schema-file custom.schema --schema-name my-variant < capture.bin
//!
//! The serial line (9600 baud, 8N1) must already be
//! configured, e.g. with `stty`. A rejected frame is logged and skipped unless
//! `--strict` is given; after a frame with a missing marker the reader realigns on
//! the next header.

use anyhow::{Context, Result};
use clap::Parser;
use ktframe::dump::{write_record_csv, write_summary_csv};
use ktframe::{Model, Records, RejectPolicy, Schema};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "kt_reader", version, about = "KT series analyzer frame reader")]
struct Cli {
    /// Frame source: capture file or serial device node. Reads stdin when omitted.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Built-in device model (kt-classic, kt-extended).
    #[arg(short, long, default_value = "kt-classic", value_parser = parse_model)]
    model: Model,

    /// Schema DSL file to use instead of a built-in model.
    #[arg(long, conflicts_with = "model")]
    schema_file: Option<PathBuf>,

    /// Section to pick from --schema-file when it defines several.
    #[arg(long, requires = "schema_file")]
    schema_name: Option<String>,

    /// Directory for the CSV files.
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Write the three-column summary (parameter, result, reference range) instead of the full table.
    #[arg(long)]
    summary: bool,

    /// Stop at the first rejected frame.
    #[arg(long)]
    strict: bool,

    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<u64>,

    /// Debug-level logging.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_model(s: &str) -> Result<Model, String> {
    s.parse()
}

fn load_schema(cli: &Cli) -> Result<Schema> {
    match &cli.schema_file {
        Some(path) => {
            let src = std::fs::read_to_string(path)
                .with_context(|| format!("reading schema {}", path.display()))?;
            Schema::from_source(&src, cli.schema_name.as_deref())
                .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))
        }
        None => cli.model.schema().map_err(|e| anyhow::anyhow!(e)),
    }
}

/// Output name: local time with ':' replaced so the name is valid everywhere.
fn output_path(dir: &Path, summary: bool) -> PathBuf {
    let stamp = chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S%.6f")
        .to_string()
        .replace(':', "-");
    let name = if summary {
        format!("{}-summary.csv", stamp)
    } else {
        format!("{}.csv", stamp)
    };
    dir.join(name)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    let schema = load_schema(&cli)?;
    info!(schema = schema.name(), frame_len = schema.frame_len(), "schema loaded");
    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("creating {}", cli.output_dir.display()))?;

    let input: Box<dyn Read> = match &cli.input {
        Some(path) => {
            info!("reading frames from {}", path.display());
            Box::new(File::open(path).with_context(|| format!("opening {}", path.display()))?)
        }
        None => {
            info!("reading frames from stdin");
            Box::new(io::stdin().lock())
        }
    };

    let policy = if cli.strict {
        RejectPolicy::Stop
    } else {
        RejectPolicy::Skip
    };
    let mut records = Records::new(input, &schema, policy).max_frames(cli.max_frames);
    let mut written = 0u64;
    for item in records.by_ref() {
        let record = item.context("reading frames")?;
        let path = output_path(&cli.output_dir, cli.summary);
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        let mut w = BufWriter::new(file);
        if cli.summary {
            write_summary_csv(&mut w, &record, &schema)?;
        } else {
            write_record_csv(&mut w, &record)?;
        }
        w.flush()?;
        written += 1;
        info!("wrote {}", path.display());
    }

    let stats = records.stats();
    info!(
        frames = stats.frames,
        written,
        rejected = stats.rejected,
        resync_bytes = stats.resync_bytes,
        "done"
    );
    Ok(())
}
